//! Export pipeline: LAND records to a heightmap image
//!
//! The image spans the bounding box of every cell in the store that has
//! heights, with pixel (0, 0) at the south-west corner of the minimum cell.
//! LAND records without `VHGT` are legal (their `DATA` flags lack the heights
//! bit) and are left out. All cells are decoded before any pixel is produced,
//! so a corrupt record fails the whole export.

use log::{debug, info, warn};

use crate::color::decode_vclr;
use crate::error::{LandError, Result};
use crate::grid::pixel_for;
use crate::height::decode_vhgt;
use crate::policy::ConversionPolicy;
use crate::raster::{Raster, SampleFormat};
use crate::store::{RecordStore, SubrecordKind};
use crate::texture::decode_vtex;
use crate::types::{
    CELL_SPAN, CELL_VERTICES, CellCoord, ColorGrid, HeightGrid, LocalVertex, Rgb, TEXTURE_TILES,
    TextureGrid,
};

/// Shared vertices further apart than this, in samples, are inconsistent
const CONSISTENCY_TOLERANCE: f32 = 1e-3;

/// Colour of pixels no cell covers
const UNCOVERED_COLOR: Rgb = [0, 0, 0];

/// Largest image an export will allocate, 256 by 256 cells
pub const MAX_EXPORT_PIXELS: usize = 16384 * 16384;

/// Totals from one export run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Cells decoded into the image
    pub cells_exported: usize,
    /// LAND records left out because they carry no heights
    pub cells_skipped: usize,
    /// Samples that did not fit the sample format and were saturated
    pub samples_saturated: usize,
    /// Shared edge vertices whose cells disagreed
    pub inconsistent_vertices: usize,
}

/// Result of an export
#[derive(Debug, Clone)]
pub struct ExportedHeightmap {
    /// Cell at pixel (0, 0)
    pub origin: CellCoord,
    /// Quantised height samples
    pub heights: Raster<i32>,
    /// Vertex colours, when requested and present
    pub colors: Option<Raster<Rgb>>,
    /// Texture indices, 16 per cell per axis, when any cell has them
    pub textures: Option<Raster<u16>>,
    /// Totals
    pub report: ExportReport,
}

struct DecodedCell {
    cell: CellCoord,
    heights: HeightGrid,
    colors: Option<ColorGrid>,
    textures: Option<TextureGrid>,
}

/// Export every cell of a record store as a heightmap
pub fn export_heightmap<S: RecordStore + ?Sized>(
    store: &S,
    policy: &ConversionPolicy,
) -> Result<ExportedHeightmap> {
    export_heightmap_with(store, policy, |_| {})
}

/// [`export_heightmap`] with a callback invoked after each cell is decoded
pub fn export_heightmap_with<S, F>(
    store: &S,
    policy: &ConversionPolicy,
    mut on_cell: F,
) -> Result<ExportedHeightmap>
where
    S: RecordStore + ?Sized,
    F: FnMut(CellCoord),
{
    let listed = store.list_cells();
    let mut decoded = Vec::with_capacity(listed.len());
    let mut cells_skipped = 0;
    for &cell in &listed {
        match decode_cell(store, cell, policy)? {
            Some(decoded_cell) => decoded.push(decoded_cell),
            None => {
                debug!("{cell}: LAND record has no heights, skipped");
                cells_skipped += 1;
            }
        }
        on_cell(cell);
    }
    if cells_skipped > 0 {
        warn!("{cells_skipped} LAND records have no heights and were left out");
    }

    let mut report = ExportReport {
        cells_exported: decoded.len(),
        cells_skipped,
        ..ExportReport::default()
    };

    let cells: Vec<CellCoord> = decoded.iter().map(|cell| cell.cell).collect();
    let Some((origin, columns, rows)) = bounding_box(&cells) else {
        return Ok(ExportedHeightmap {
            origin: CellCoord::default(),
            heights: Raster::new(0, 0, 0),
            colors: None,
            textures: None,
            report,
        });
    };
    let (width, height) = image_extent(columns, rows)?;

    let mut working: Vec<Option<f32>> = vec![None; width * height];
    for cell in &decoded {
        for y in 0..CELL_VERTICES {
            for x in 0..CELL_VERTICES {
                let Some(index) = pixel_index(cell.cell, x, y, origin, width, height) else {
                    continue;
                };
                let sample = policy.height_to_sample(cell.heights[(x, y)]);
                if let Some(previous) = working[index]
                    && (previous - sample).abs() > CONSISTENCY_TOLERANCE
                {
                    debug!(
                        "{}: vertex ({x}, {y}) is {sample}, neighbour has {previous}",
                        cell.cell
                    );
                    report.inconsistent_vertices += 1;
                }
                working[index] = Some(sample);
            }
        }
    }
    if report.inconsistent_vertices > 0 {
        warn!(
            "{} shared edge vertices differ between neighbouring cells",
            report.inconsistent_vertices
        );
    }

    let (low, high) = working
        .iter()
        .flatten()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let mut samples: Vec<f32> = working.iter().map(|v| v.unwrap_or(low)).collect();

    if policy.rescale() {
        let (target_low, target_high) = SampleFormat::Grey8.range();
        let span = high - low;
        for sample in &mut samples {
            *sample = if span > 0.0 {
                (*sample - low) * (target_high - target_low) as f32 / span + target_low as f32
            } else {
                target_low as f32
            };
        }
        debug!("Rescaled samples {low}..{high} onto {target_low}..{target_high}");
    }

    let format = policy.sample_format();
    let heights: Vec<i32> = samples
        .into_iter()
        .map(|sample| {
            let (value, saturated) = quantize(sample, format);
            if saturated {
                report.samples_saturated += 1;
            }
            value
        })
        .collect();
    let mut heights = Raster::from_vec(width, height, heights)?;

    if report.samples_saturated > 0 {
        warn!(
            "{} samples did not fit {:?} and were saturated",
            report.samples_saturated, format
        );
    }

    if policy.grid_overlay() {
        draw_grid(&mut heights, &cells, origin, format.max_sample());
    }

    let colors = if policy.vertex_color() {
        scatter_colors(&decoded, origin, width, height)
    } else {
        None
    };
    let textures = scatter_textures(&decoded, origin, columns, rows);

    info!(
        "Exported {} cells as a {width}x{height} image, origin cell {origin}",
        report.cells_exported
    );
    Ok(ExportedHeightmap {
        origin,
        heights,
        colors,
        textures,
        report,
    })
}

/// Minimum cell plus the number of cell columns and rows
fn bounding_box(cells: &[CellCoord]) -> Option<(CellCoord, usize, usize)> {
    let first = cells.first()?;
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
    for cell in cells {
        min_x = min_x.min(cell.x);
        max_x = max_x.max(cell.x);
        min_y = min_y.min(cell.y);
        max_y = max_y.max(cell.y);
    }
    let columns = usize::try_from(i64::from(max_x) - i64::from(min_x) + 1).unwrap_or(usize::MAX);
    let rows = usize::try_from(i64::from(max_y) - i64::from(min_y) + 1).unwrap_or(usize::MAX);
    Some((CellCoord::new(min_x, min_y), columns, rows))
}

/// Pixel extent of a block of cells, refused above [`MAX_EXPORT_PIXELS`]
fn image_extent(columns: usize, rows: usize) -> Result<(usize, usize)> {
    let width = columns.checked_mul(CELL_SPAN);
    let height = rows.checked_mul(CELL_SPAN);
    match (width, height) {
        (Some(width), Some(height))
            if width
                .checked_mul(height)
                .is_some_and(|pixels| pixels <= MAX_EXPORT_PIXELS) =>
        {
            Ok((width, height))
        }
        _ => Err(LandError::ImageTooLarge {
            width: width.unwrap_or(usize::MAX),
            height: height.unwrap_or(usize::MAX),
            limit: MAX_EXPORT_PIXELS,
        }),
    }
}

/// Decode one cell, `None` when its LAND record carries no heights
fn decode_cell<S: RecordStore + ?Sized>(
    store: &S,
    cell: CellCoord,
    policy: &ConversionPolicy,
) -> Result<Option<DecodedCell>> {
    let Some(vhgt) = store.read_subrecord(cell, SubrecordKind::Height)? else {
        return Ok(None);
    };
    let heights = decode_vhgt(cell, &vhgt)?;

    let colors = match store.read_subrecord(cell, SubrecordKind::Color)? {
        Some(vclr) if policy.vertex_color() => Some(decode_vclr(cell, &vclr)?),
        _ => None,
    };
    let textures = store
        .read_subrecord(cell, SubrecordKind::Texture)?
        .map(|vtex| decode_vtex(cell, &vtex))
        .transpose()?;

    let (low, high) = heights.height_range();
    debug!("{cell}: heights {low}..{high}");
    Ok(Some(DecodedCell {
        cell,
        heights,
        colors,
        textures,
    }))
}

fn pixel_index(
    cell: CellCoord,
    x: usize,
    y: usize,
    origin: CellCoord,
    width: usize,
    height: usize,
) -> Option<usize> {
    let (px, py) = pixel_for(cell, LocalVertex::new(x, y), origin);
    let (px, py) = (usize::try_from(px).ok()?, usize::try_from(py).ok()?);
    (px < width && py < height).then_some(py * width + px)
}

/// Round to the nearest integer and saturate to the format's range
fn quantize(sample: f32, format: SampleFormat) -> (i32, bool) {
    let (min, max) = format.range();
    let rounded = f64::from(sample).round();
    if rounded < f64::from(min) {
        (min, true)
    } else if rounded > f64::from(max) {
        (max, true)
    } else {
        (rounded as i32, false)
    }
}

/// Mark the footprint border of every present cell
fn draw_grid(heights: &mut Raster<i32>, cells: &[CellCoord], origin: CellCoord, value: i32) {
    let last = CELL_SPAN - 1;
    for &cell in cells {
        for y in 0..CELL_SPAN {
            for x in 0..CELL_SPAN {
                if x != 0 && x != last && y != 0 && y != last {
                    continue;
                }
                let (px, py) = pixel_for(cell, LocalVertex::new(x, y), origin);
                heights.set(px as usize, py as usize, value);
            }
        }
    }
}

fn scatter_colors(
    decoded: &[DecodedCell],
    origin: CellCoord,
    width: usize,
    height: usize,
) -> Option<Raster<Rgb>> {
    if decoded.iter().all(|cell| cell.colors.is_none()) {
        return None;
    }
    let mut raster = Raster::new(width, height, UNCOVERED_COLOR);
    for cell in decoded {
        let Some(colors) = &cell.colors else {
            continue;
        };
        for y in 0..CELL_VERTICES {
            for x in 0..CELL_VERTICES {
                let (px, py) = pixel_for(cell.cell, LocalVertex::new(x, y), origin);
                raster.set(px as usize, py as usize, colors[(x, y)]);
            }
        }
    }
    Some(raster)
}

fn scatter_textures(
    decoded: &[DecodedCell],
    origin: CellCoord,
    columns: usize,
    rows: usize,
) -> Option<Raster<u16>> {
    if decoded.iter().all(|cell| cell.textures.is_none()) {
        return None;
    }
    let mut raster = Raster::new(columns * TEXTURE_TILES, rows * TEXTURE_TILES, 0u16);
    for cell in decoded {
        let Some(textures) = &cell.textures else {
            continue;
        };
        let base_x = (cell.cell.x - origin.x) as usize * TEXTURE_TILES;
        let base_y = (cell.cell.y - origin.y) as usize * TEXTURE_TILES;
        for (x, y, texture) in textures.iter_indexed() {
            raster.set(base_x + x, base_y + y, texture);
        }
    }
    Some(raster)
}
