//! Vertex colour codec (VCLR)
//!
//! 65x65 RGB triples, southern row first, three bytes per vertex. Colours
//! tint the terrain textures; pure white leaves them unchanged.

use crate::error::{LandError, Result};
use crate::tag::RecordTag;
use crate::types::{CellCoord, ColorGrid, Rgb, VERTEX_COUNT};

/// VCLR payload size
pub const VCLR_SIZE: usize = VERTEX_COUNT * 3;

/// Colour the game uses when a cell has no VCLR subrecord
pub const NEUTRAL_COLOR: Rgb = [0xFF, 0xFF, 0xFF];

/// Serialize a colour grid as a VCLR payload
pub fn encode_vclr(colors: &ColorGrid) -> Vec<u8> {
    colors.as_slice().iter().flatten().copied().collect()
}

/// Parse a VCLR payload
pub fn decode_vclr(cell: CellCoord, data: &[u8]) -> Result<ColorGrid> {
    if data.len() != VCLR_SIZE {
        return Err(LandError::malformed(
            cell,
            RecordTag::VCLR,
            format!("expected {} bytes, found {}", VCLR_SIZE, data.len()),
        ));
    }

    let colors = data
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect();

    ColorGrid::from_vec(colors)
        .ok_or_else(|| LandError::malformed(cell, RecordTag::VCLR, "colour grid is not 65x65"))
}
