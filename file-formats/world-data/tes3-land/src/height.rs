//! Height delta codec (VHGT)
//!
//! A cell's 65x65 absolute heights are stored as one `f32` base offset plus a
//! signed 8-bit step per vertex. Row 0 is decoded west to east from the
//! offset. Every later row starts from the first vertex of the row below it
//! (the row seed, carried up column 0) and is then decoded west to east from
//! its own first vertex.
//!
//! Encoding quantises each step to a whole number of [`UNIT_SCALE`] and
//! clamps it to the `i8` range. The encoder advances its accumulators by the
//! stored step, not by the exact difference, so `decode(encode(h))` always
//! equals the quantised heights and re-encoding them is lossless.
//!
//! ## Binary Format Layout
//!
//! ```text
//! offset   size  field
//! 0        4     f32 base height (little-endian)
//! 4        4225  i8 deltas, 65 rows of 65, southern row first
//! 4229     3     padding (optional on read, always written)
//! ```

use crate::error::{LandError, Result};
use crate::tag::RecordTag;
use crate::types::{CELL_VERTICES, CellCoord, Grid, HeightGrid, UNIT_SCALE, VERTEX_COUNT};

/// Per-vertex height steps of one cell
pub type DeltaGrid = Grid<i8, CELL_VERTICES>;

/// VHGT payload without the trailing padding
pub const VHGT_DATA_SIZE: usize = 4 + VERTEX_COUNT;

/// VHGT payload as written by the game and by this crate
pub const VHGT_PADDED_SIZE: usize = VHGT_DATA_SIZE + 3;

/// Offset plus delta chain for one cell
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedHeights {
    /// Base height in height units
    pub offset: f32,
    /// Step per vertex
    pub deltas: DeltaGrid,
    /// Number of steps that did not fit in an `i8` and were clamped
    pub clamped_steps: usize,
}

impl EncodedHeights {
    /// Serialize as a padded VHGT payload
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(VHGT_PADDED_SIZE);
        data.extend_from_slice(&self.offset.to_le_bytes());
        data.extend(self.deltas.as_slice().iter().map(|&d| d as u8));
        data.extend_from_slice(&[0u8; 3]);
        data
    }

    /// Heights this encoding decodes to
    pub fn decode(&self) -> HeightGrid {
        decode(self.offset, &self.deltas)
    }
}

/// Rebuild absolute heights from an offset and a delta chain.
///
/// The step stored for vertex (0, 0) is applied to the offset like every
/// other step, as the game's loader does (see the VHGT section of
/// <https://en.uesp.net/wiki/Morrowind_Mod:Mod_File_Format/LAND>). Grids
/// produced by [`encode`] always store zero there, so their first vertex
/// equals the offset.
pub fn decode(offset: f32, deltas: &DeltaGrid) -> HeightGrid {
    let mut heights = HeightGrid::filled(0.0);
    let mut row_seed = offset;

    for y in 0..CELL_VERTICES {
        row_seed += f32::from(deltas[(0, y)]) * UNIT_SCALE;
        heights[(0, y)] = row_seed;

        let mut running = row_seed;
        for x in 1..CELL_VERTICES {
            running += f32::from(deltas[(x, y)]) * UNIT_SCALE;
            heights[(x, y)] = running;
        }
    }

    heights
}

/// Encode absolute heights as an offset and a delta chain. Never fails.
pub fn encode(heights: &HeightGrid) -> EncodedHeights {
    let offset = heights[(0, 0)];
    let mut deltas = DeltaGrid::filled(0);
    let mut clamped_steps = 0;
    let mut row_seed = offset;

    for y in 0..CELL_VERTICES {
        if y > 0 {
            let (step, clamped) = quantize_step(heights[(0, y)] - row_seed);
            deltas[(0, y)] = step;
            row_seed += f32::from(step) * UNIT_SCALE;
            clamped_steps += usize::from(clamped);
        }

        let mut running = row_seed;
        for x in 1..CELL_VERTICES {
            let (step, clamped) = quantize_step(heights[(x, y)] - running);
            deltas[(x, y)] = step;
            running += f32::from(step) * UNIT_SCALE;
            clamped_steps += usize::from(clamped);
        }
    }

    EncodedHeights {
        offset,
        deltas,
        clamped_steps,
    }
}

/// Round a height difference to whole steps and clamp it to `i8`.
///
/// Returns the step and whether clamping changed it.
fn quantize_step(difference: f32) -> (i8, bool) {
    let steps = (difference / UNIT_SCALE).round();
    let stored = steps.clamp(f32::from(i8::MIN), f32::from(i8::MAX));
    (stored as i8, stored != steps)
}

/// Split a VHGT payload into its offset and deltas.
///
/// Accepts the bare 4229-byte layout and the padded 4232-byte layout.
pub fn parse_vhgt(cell: CellCoord, data: &[u8]) -> Result<(f32, DeltaGrid)> {
    if data.len() != VHGT_DATA_SIZE && data.len() != VHGT_PADDED_SIZE {
        return Err(LandError::malformed(
            cell,
            RecordTag::VHGT,
            format!(
                "expected {} or {} bytes, found {}",
                VHGT_DATA_SIZE,
                VHGT_PADDED_SIZE,
                data.len()
            ),
        ));
    }

    let offset = f32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    if !offset.is_finite() {
        return Err(LandError::malformed(
            cell,
            RecordTag::VHGT,
            format!("height offset is not a finite number ({offset})"),
        ));
    }

    let steps = data[4..VHGT_DATA_SIZE].iter().map(|&b| b as i8).collect();
    let deltas = DeltaGrid::from_vec(steps).ok_or_else(|| {
        LandError::malformed(cell, RecordTag::VHGT, "delta grid is not 65x65")
    })?;

    Ok((offset, deltas))
}

/// Decode a VHGT payload straight to absolute heights
pub fn decode_vhgt(cell: CellCoord, data: &[u8]) -> Result<HeightGrid> {
    let (offset, deltas) = parse_vhgt(cell, data)?;
    Ok(decode(offset, &deltas))
}
