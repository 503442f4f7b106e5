//! Import pipeline: heightmap image to LAND records
//!
//! Every cell touched by the image is built in row-major order. A cell's
//! payloads are all computed before the first one is written, so a failure
//! never leaves a half-written cell behind.

use log::{debug, info, warn};

use crate::color::encode_vclr;
use crate::error::{LandError, Result};
use crate::grid::{cells_touched_by, pixel_for};
use crate::height;
use crate::normals::{generate_vnml, generate_wnam};
use crate::policy::ConversionPolicy;
use crate::raster::Raster;
use crate::store::{FLAG_COLORS, FLAG_HEIGHTS, FLAG_TEXTURES, RecordStore, SubrecordKind};
use crate::texture::uniform_vtex;
use crate::types::{CELL_VERTICES, CellCoord, ColorGrid, HeightGrid, LocalVertex, Rgb};

/// Totals from one import run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Cells written to the store
    pub cells_written: usize,
    /// Cells left out because they lay inside the ignore-land band
    pub cells_skipped: usize,
    /// Vertex heights moved by the clamp limits
    pub heights_clamped: usize,
    /// Delta steps that exceeded the signed byte range
    pub deltas_clamped: usize,
}

/// Import a heightmap (and optional colour image) into a record store
pub fn import_heightmap<S: RecordStore + ?Sized>(
    heights: &Raster<i32>,
    colors: Option<&Raster<Rgb>>,
    policy: &ConversionPolicy,
    store: &mut S,
) -> Result<ImportReport> {
    import_heightmap_with(heights, colors, policy, store, |_| {})
}

/// [`import_heightmap`] with a callback invoked after each cell
pub fn import_heightmap_with<S, F>(
    heights: &Raster<i32>,
    colors: Option<&Raster<Rgb>>,
    policy: &ConversionPolicy,
    store: &mut S,
    mut on_cell: F,
) -> Result<ImportReport>
where
    S: RecordStore + ?Sized,
    F: FnMut(CellCoord),
{
    if let Some(colors) = colors
        && (colors.width(), colors.height()) != (heights.width(), heights.height())
    {
        return Err(LandError::ImageSize {
            expected: heights.width() * heights.height(),
            found: colors.width() * colors.height(),
        });
    }

    let origin = policy.cell_offset();
    let cells = cells_touched_by(heights.rect(), origin).ok_or_else(|| {
        LandError::InvalidPolicy(format!(
            "a {}x{} image at cell {origin} runs past the edge of the cell grid",
            heights.width(),
            heights.height()
        ))
    })?;
    let mut report = ImportReport::default();

    for cell in cells {
        let (grid, clamped) = gather_heights(heights, cell, origin, policy);
        report.heights_clamped += clamped;

        if policy.is_ignored(&grid) {
            debug!("{cell}: inside ignore-land band, skipped");
            report.cells_skipped += 1;
            on_cell(cell);
            continue;
        }

        let encoded = height::encode(&grid);
        report.deltas_clamped += encoded.clamped_steps;

        let mut flags = FLAG_HEIGHTS;
        let mut payloads = vec![
            (SubrecordKind::CellCoord, cell.to_bytes().to_vec()),
            (SubrecordKind::Flags, Vec::new()),
            (SubrecordKind::Normals, generate_vnml(&grid)),
            (SubrecordKind::Height, encoded.to_bytes()),
            (SubrecordKind::WorldMap, generate_wnam(&grid)),
        ];
        if let Some(colors) = colors {
            flags |= FLAG_COLORS;
            let cell_colors = gather_colors(colors, cell, origin);
            payloads.push((SubrecordKind::Color, encode_vclr(&cell_colors)));
        }
        if let Some(texture) = policy.fixed_texture() {
            flags |= FLAG_TEXTURES;
            payloads.push((SubrecordKind::Texture, uniform_vtex(texture)));
        }
        payloads[1].1 = flags.to_le_bytes().to_vec();

        for (kind, bytes) in payloads {
            store.write_subrecord(cell, kind, bytes)?;
        }

        let (low, high) = grid.height_range();
        debug!(
            "{cell}: heights {low}..{high}, {} lossy steps",
            encoded.clamped_steps
        );
        report.cells_written += 1;
        on_cell(cell);
    }

    if report.heights_clamped > 0 {
        warn!(
            "{} vertex heights were clamped to the height limits",
            report.heights_clamped
        );
    }
    if report.deltas_clamped > 0 {
        warn!(
            "{} height steps were too steep to store exactly",
            report.deltas_clamped
        );
    }
    info!(
        "Imported {} cells, skipped {}",
        report.cells_written, report.cells_skipped
    );
    Ok(report)
}

/// Heights of one cell after scale, offset and clamping, with the number of
/// clamped vertices
fn gather_heights(
    heights: &Raster<i32>,
    cell: CellCoord,
    origin: CellCoord,
    policy: &ConversionPolicy,
) -> (HeightGrid, usize) {
    let mut grid = HeightGrid::filled(0.0);
    let mut clamped = 0;
    for y in 0..CELL_VERTICES {
        for x in 0..CELL_VERTICES {
            let (px, py) = pixel_for(cell, LocalVertex::new(x, y), origin);
            let sample = heights.get_clamped(px, py).unwrap_or_default();
            let (height, moved) = policy.clamp_height(policy.sample_to_height(sample as f32));
            if moved {
                clamped += 1;
            }
            grid[(x, y)] = height;
        }
    }
    (grid, clamped)
}

fn gather_colors(colors: &Raster<Rgb>, cell: CellCoord, origin: CellCoord) -> ColorGrid {
    let mut grid = ColorGrid::filled([0; 3]);
    for y in 0..CELL_VERTICES {
        for x in 0..CELL_VERTICES {
            let (px, py) = pixel_for(cell, LocalVertex::new(x, y), origin);
            grid[(x, y)] = colors.get_clamped(px, py).unwrap_or_default();
        }
    }
    grid
}
