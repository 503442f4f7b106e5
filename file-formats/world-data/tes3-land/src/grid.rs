//! Cell grid mapper
//!
//! Translates between global pixel coordinates of a heightmap image and
//! `(cell, local vertex)` pairs. Pixel `(0, 0)` is the south-west vertex of
//! the origin cell, and every cell owns a 64x64 pixel footprint. A cell's
//! vertex 64 on either axis is the same pixel as the next cell's vertex 0,
//! so pixels on a cell boundary have two owners (four on a corner).

use crate::types::{
    CELL_SPAN, CELL_VERTICES, CellCoord, LocalVertex, PIXELS_PER_TEXTURE_TILE, TEXTURE_TILES,
};

/// Extent of an image in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
}

impl PixelRect {
    /// Create a rectangle anchored at pixel (0, 0)
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Number of cells needed along each axis, `(columns, rows)`
    pub const fn cell_span(&self) -> (usize, usize) {
        (
            self.width.div_ceil(CELL_SPAN),
            self.height.div_ceil(CELL_SPAN),
        )
    }
}

/// Primary owner of a pixel: `cell = origin + floor(pixel / 64)`,
/// `local = pixel mod 64`.
///
/// ```
/// use tes3_land::grid::cell_for;
/// use tes3_land::types::{CellCoord, LocalVertex};
///
/// let origin = CellCoord::new(-2, 3);
/// assert_eq!(cell_for(70, 5, origin), Some((CellCoord::new(-1, 3), LocalVertex::new(6, 5))));
/// assert_eq!(cell_for(-1, 0, origin), Some((CellCoord::new(-3, 3), LocalVertex::new(63, 0))));
/// assert_eq!(cell_for(64, 0, CellCoord::new(i32::MAX, 0)), None);
/// ```
pub fn cell_for(pixel_x: i64, pixel_y: i64, origin: CellCoord) -> Option<(CellCoord, LocalVertex)> {
    let span = CELL_SPAN as i64;
    let cell = origin.checked_offset(
        i32::try_from(pixel_x.div_euclid(span)).ok()?,
        i32::try_from(pixel_y.div_euclid(span)).ok()?,
    )?;
    let local = LocalVertex::new(
        pixel_x.rem_euclid(span) as usize,
        pixel_y.rem_euclid(span) as usize,
    );
    Some((cell, local))
}

/// Every `(cell, local vertex)` pair that shares a pixel.
///
/// The primary owner comes first. On a vertical boundary the western cell's
/// vertex 64 follows, on a horizontal boundary the southern cell's, and on a
/// corner all four cells are listed. Cells beyond the `i32` grid are left
/// out.
pub fn owners_of(pixel_x: i64, pixel_y: i64, origin: CellCoord) -> Vec<(CellCoord, LocalVertex)> {
    let Some((cell, local)) = cell_for(pixel_x, pixel_y, origin) else {
        return Vec::new();
    };
    let edge = CELL_VERTICES - 1;

    // (cell step, local index) candidates per axis
    let axis = |local: usize| -> Vec<(i32, usize)> {
        if local == 0 {
            vec![(0, 0), (-1, edge)]
        } else {
            vec![(0, local)]
        }
    };
    let xs = axis(local.x);
    let ys = axis(local.y);

    let mut owners = Vec::with_capacity(xs.len() * ys.len());
    for &(dy, ly) in &ys {
        for &(dx, lx) in &xs {
            if let Some(owner) = cell.checked_offset(dx, dy) {
                owners.push((owner, LocalVertex::new(lx, ly)));
            }
        }
    }
    owners
}

/// Pixel of a cell's local vertex, the inverse of [`cell_for`].
///
/// Vertex 64 maps onto the neighbouring cell's first pixel, so the result may
/// lie one pixel past the image for cells on its east or north edge.
pub fn pixel_for(cell: CellCoord, local: LocalVertex, origin: CellCoord) -> (i64, i64) {
    let span = CELL_SPAN as i64;
    (
        (i64::from(cell.x) - i64::from(origin.x)) * span + local.x as i64,
        (i64::from(cell.y) - i64::from(origin.y)) * span + local.y as i64,
    )
}

/// Cells whose footprint intersects an image anchored at `origin`, in
/// row-major order (south to north, west to east).
///
/// `None` when the north-east cell would lie beyond the `i32` grid.
pub fn cells_touched_by(rect: PixelRect, origin: CellCoord) -> Option<Vec<CellCoord>> {
    let (columns, rows) = rect.cell_span();
    let step = |n: usize| i32::try_from(n.saturating_sub(1)).ok();
    origin.checked_offset(step(columns)?, step(rows)?)?;

    let mut cells = Vec::with_capacity(columns * rows);
    for row in 0..rows {
        for column in 0..columns {
            cells.push(origin.checked_offset(column as i32, row as i32)?);
        }
    }
    Some(cells)
}

/// Texture tile covering a local vertex coordinate. Vertex 64 belongs to the
/// last tile.
pub fn texture_tile(local: usize) -> usize {
    (local / PIXELS_PER_TEXTURE_TILE).min(TEXTURE_TILES - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn interior_pixel_has_one_owner() {
        let owners = owners_of(10, 20, CellCoord::default());
        assert_eq!(owners, vec![(CellCoord::new(0, 0), LocalVertex::new(10, 20))]);
    }

    #[test]
    fn vertical_boundary_is_shared_with_western_cell() {
        let owners = owners_of(64, 5, CellCoord::default());
        assert_eq!(
            owners,
            vec![
                (CellCoord::new(1, 0), LocalVertex::new(0, 5)),
                (CellCoord::new(0, 0), LocalVertex::new(64, 5)),
            ]
        );
    }

    #[test]
    fn corner_has_four_owners() {
        let owners = owners_of(128, 64, CellCoord::new(10, 10));
        assert_eq!(
            owners,
            vec![
                (CellCoord::new(12, 11), LocalVertex::new(0, 0)),
                (CellCoord::new(11, 11), LocalVertex::new(64, 0)),
                (CellCoord::new(12, 10), LocalVertex::new(0, 64)),
                (CellCoord::new(11, 10), LocalVertex::new(64, 64)),
            ]
        );
    }

    #[test]
    fn pixel_for_inverts_every_owner() {
        let origin = CellCoord::new(-4, 2);
        for &(px, py) in &[(0i64, 0i64), (64, 64), (127, 3), (200, 130)] {
            for (cell, local) in owners_of(px, py, origin) {
                assert_eq!(pixel_for(cell, local, origin), (px, py));
            }
        }
    }

    #[test]
    fn touched_cells_cover_partial_footprints() {
        let cells = cells_touched_by(PixelRect::new(128, 128), CellCoord::default());
        assert_eq!(
            cells.unwrap(),
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
                CellCoord::new(0, 1),
                CellCoord::new(1, 1),
            ]
        );

        let cells = cells_touched_by(PixelRect::new(65, 10), CellCoord::new(3, -1));
        assert_eq!(cells.unwrap(), vec![CellCoord::new(3, -1), CellCoord::new(4, -1)]);
    }

    #[test]
    fn cells_past_the_grid_edge_are_refused() {
        let rect = PixelRect::new(128, 64);
        assert_eq!(cells_touched_by(rect, CellCoord::new(i32::MAX, 0)), None);
        assert_eq!(
            cells_touched_by(rect, CellCoord::new(i32::MAX - 1, 0)),
            Some(vec![CellCoord::new(i32::MAX - 1, 0), CellCoord::new(i32::MAX, 0)])
        );
    }

    #[test]
    fn pixels_span_the_whole_grid() {
        let origin = CellCoord::new(i32::MIN, 0);
        let far = CellCoord::new(i32::MAX, 0);
        let (px, _) = pixel_for(far, LocalVertex::new(0, 0), origin);
        assert_eq!(px, i64::from(u32::MAX) * 64);

        let owners = owners_of(0, 0, origin);
        assert_eq!(
            owners,
            vec![
                (origin, LocalVertex::new(0, 0)),
                (CellCoord::new(i32::MIN, -1), LocalVertex::new(0, 64)),
            ]
        );
    }

    #[test]
    fn texture_tiles_are_four_vertices_wide() {
        assert_eq!(texture_tile(0), 0);
        assert_eq!(texture_tile(3), 0);
        assert_eq!(texture_tile(4), 1);
        assert_eq!(texture_tile(63), 15);
        assert_eq!(texture_tile(64), 15);
    }
}
