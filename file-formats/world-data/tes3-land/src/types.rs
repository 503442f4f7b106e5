//! Core types shared by the codecs and pipelines

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Index, IndexMut};

/// Vertices along one edge of a cell (64 quads plus the shared edge)
pub const CELL_VERTICES: usize = 65;

/// Pixels along one edge of a cell footprint in an image
pub const CELL_SPAN: usize = 64;

/// Vertices in one cell (65x65)
pub const VERTEX_COUNT: usize = CELL_VERTICES * CELL_VERTICES;

/// Texture tiles along one edge of a cell
pub const TEXTURE_TILES: usize = 16;

/// Vertices (pixels) covered by one texture tile along each axis
pub const PIXELS_PER_TEXTURE_TILE: usize = CELL_SPAN / TEXTURE_TILES;

/// World map samples along one edge of a cell (WNAM)
pub const WORLD_MAP_SAMPLES: usize = 9;

/// Game units represented by one height unit (one VHGT delta step)
pub const GAME_UNITS_PER_HEIGHT_UNIT: i32 = 8;

/// Height units advanced by one delta step
pub const UNIT_SCALE: f32 = 1.0;

/// Horizontal distance between neighbouring vertices, in game units
pub const GAME_UNITS_PER_VERTEX: f32 = 128.0;

/// 24-bit RGB triple
pub type Rgb = [u8; 3];

/// Signed grid position of an exterior cell.
///
/// Cells order row-major: south to north by `y`, then west to east by `x`.
/// Every pipeline visits cells in this order, which makes shared-edge
/// resolution reproducible.
///
/// ```
/// use tes3_land::types::CellCoord;
///
/// let mut cells = vec![CellCoord::new(1, 0), CellCoord::new(0, 1), CellCoord::new(0, 0)];
/// cells.sort();
/// assert_eq!(cells, vec![CellCoord::new(0, 0), CellCoord::new(1, 0), CellCoord::new(0, 1)]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellCoord {
    /// West-east grid coordinate
    pub x: i32,
    /// South-north grid coordinate
    pub y: i32,
}

impl CellCoord {
    /// Create a cell coordinate
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Coordinate shifted by a number of cells, `None` past the `i32` grid
    pub const fn checked_offset(self, dx: i32, dy: i32) -> Option<Self> {
        match (self.x.checked_add(dx), self.y.checked_add(dy)) {
            (Some(x), Some(y)) => Some(Self { x, y }),
            _ => None,
        }
    }

    /// Encode as the 8-byte INTV payload
    pub fn to_bytes(self) -> [u8; 8] {
        let mut bytes = [0u8; 8];
        bytes[..4].copy_from_slice(&self.x.to_le_bytes());
        bytes[4..].copy_from_slice(&self.y.to_le_bytes());
        bytes
    }

    /// Decode an INTV payload, `None` unless it is exactly 8 bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let x = bytes.get(..4)?.try_into().ok().map(i32::from_le_bytes)?;
        let y = bytes.get(4..8)?.try_into().ok().map(i32::from_le_bytes)?;
        (bytes.len() == 8).then_some(Self { x, y })
    }
}

impl Ord for CellCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for CellCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Vertex index inside one cell, both axes in `0..=64`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LocalVertex {
    /// Column, west to east
    pub x: usize,
    /// Row, south to north
    pub y: usize,
}

impl LocalVertex {
    /// Create a local vertex index
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Square grid of `N x N` values stored row-major, row 0 southern-most.
///
/// Indexing with `(x, y)` panics when out of range, the same as slice
/// indexing; use [`Grid::get`] for checked access.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T, const N: usize> {
    values: Vec<T>,
}

/// Absolute heights of one cell, in height units
pub type HeightGrid = Grid<f32, CELL_VERTICES>;

/// Vertex colours of one cell
pub type ColorGrid = Grid<Rgb, CELL_VERTICES>;

/// Texture indices of one cell, one per 4x4 vertex tile
pub type TextureGrid = Grid<u16, TEXTURE_TILES>;

impl<T: Copy, const N: usize> Grid<T, N> {
    /// Number of values along each edge
    pub const SIZE: usize = N;

    /// Grid with every value set to `value`
    pub fn filled(value: T) -> Self {
        Self {
            values: vec![value; N * N],
        }
    }

    /// Wrap row-major values, `None` unless there are exactly `N * N`
    pub fn from_vec(values: Vec<T>) -> Option<Self> {
        (values.len() == N * N).then_some(Self { values })
    }

    /// Checked read
    pub fn get(&self, x: usize, y: usize) -> Option<T> {
        if x < N && y < N {
            self.values.get(y * N + x).copied()
        } else {
            None
        }
    }

    /// Row-major values
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// Iterate over `(x, y, value)` in row-major order
    pub fn iter_indexed(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, v)| (i % N, i / N, *v))
    }
}

impl<T: Copy + Default, const N: usize> Default for Grid<T, N> {
    fn default() -> Self {
        Self::filled(T::default())
    }
}

impl<T, const N: usize> Index<(usize, usize)> for Grid<T, N> {
    type Output = T;

    fn index(&self, (x, y): (usize, usize)) -> &T {
        assert!(x < N && y < N, "grid index ({x}, {y}) out of range for {N}x{N}");
        &self.values[y * N + x]
    }
}

impl<T, const N: usize> IndexMut<(usize, usize)> for Grid<T, N> {
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut T {
        assert!(x < N && y < N, "grid index ({x}, {y}) out of range for {N}x{N}");
        &mut self.values[y * N + x]
    }
}

impl HeightGrid {
    /// Lowest and highest height in the grid
    pub fn height_range(&self) -> (f32, f32) {
        self.values
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| {
                (lo.min(h), hi.max(h))
            })
    }
}
