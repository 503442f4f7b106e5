//! Texture index codec (VTEX)
//!
//! Each cell carries 16x16 `u16` texture indices, one per 4x4-vertex tile.
//! Index 0 is the default land texture; other values are one more than the
//! index of an `LTEX` record.
//!
//! The game does not store the tiles row-major. The 256 entries are grouped
//! into sixteen 4x4 blocks: blocks run row-major across the cell, and tiles
//! run row-major inside each block.
//!
//! ```text
//! storage index i -> block = i / 16, inner = i % 16
//! tile x = (block % 4) * 4 + inner % 4
//! tile y = (block / 4) * 4 + inner / 4
//! ```

use crate::error::{LandError, Result};
use crate::tag::RecordTag;
use crate::types::{CellCoord, TEXTURE_TILES, TextureGrid};

/// VTEX payload size
pub const VTEX_SIZE: usize = TEXTURE_TILES * TEXTURE_TILES * 2;

const BLOCK: usize = 4;

/// Tile position of a VTEX storage index
fn storage_to_tile(index: usize) -> (usize, usize) {
    let block = index / (BLOCK * BLOCK);
    let inner = index % (BLOCK * BLOCK);
    let x = (block % BLOCK) * BLOCK + inner % BLOCK;
    let y = (block / BLOCK) * BLOCK + inner / BLOCK;
    (x, y)
}

/// Serialize a texture grid in the game's block order
pub fn encode_vtex(textures: &TextureGrid) -> Vec<u8> {
    let mut data = Vec::with_capacity(VTEX_SIZE);
    for index in 0..TEXTURE_TILES * TEXTURE_TILES {
        let (x, y) = storage_to_tile(index);
        data.extend_from_slice(&textures[(x, y)].to_le_bytes());
    }
    data
}

/// Parse a VTEX payload into a row-major texture grid
pub fn decode_vtex(cell: CellCoord, data: &[u8]) -> Result<TextureGrid> {
    if data.len() != VTEX_SIZE {
        return Err(LandError::malformed(
            cell,
            RecordTag::VTEX,
            format!("expected {} bytes, found {}", VTEX_SIZE, data.len()),
        ));
    }

    let mut textures = TextureGrid::filled(0);
    for (index, pair) in data.chunks_exact(2).enumerate() {
        let (x, y) = storage_to_tile(index);
        textures[(x, y)] = u16::from_le_bytes([pair[0], pair[1]]);
    }
    Ok(textures)
}

/// VTEX payload that paints a whole cell with one texture
pub fn uniform_vtex(texture: u16) -> Vec<u8> {
    encode_vtex(&TextureGrid::filled(texture))
}
