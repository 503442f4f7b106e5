//! Derived LAND payloads: vertex normals (VNML) and world map heights (WNAM)
//!
//! Neither is edited in an image, so both are rebuilt from the cell's heights
//! whenever a cell is imported.

use crate::types::{
    CELL_SPAN, CELL_VERTICES, GAME_UNITS_PER_HEIGHT_UNIT, GAME_UNITS_PER_VERTEX, HeightGrid,
    VERTEX_COUNT, WORLD_MAP_SAMPLES,
};

/// VNML payload size
pub const VNML_SIZE: usize = VERTEX_COUNT * 3;

/// WNAM payload size
pub const WNAM_SIZE: usize = WORLD_MAP_SAMPLES * WORLD_MAP_SAMPLES;

/// Game units per WNAM step
const GAME_UNITS_PER_MAP_STEP: f32 = 128.0;

/// Build a VNML payload from a cell's heights.
///
/// Slopes use central differences inside the cell and one-sided differences
/// on its border. Each normal is stored as signed `x, y, z` bytes scaled to
/// 127, with `z` pointing up.
pub fn generate_vnml(heights: &HeightGrid) -> Vec<u8> {
    let last = CELL_VERTICES - 1;
    let vertical = GAME_UNITS_PER_HEIGHT_UNIT as f32;
    let mut data = Vec::with_capacity(VNML_SIZE);

    for y in 0..CELL_VERTICES {
        for x in 0..CELL_VERTICES {
            let (west, east) = (x.saturating_sub(1), (x + 1).min(last));
            let (south, north) = (y.saturating_sub(1), (y + 1).min(last));

            let run_x = (east - west) as f32 * GAME_UNITS_PER_VERTEX;
            let run_y = (north - south) as f32 * GAME_UNITS_PER_VERTEX;
            let slope_x = (heights[(east, y)] - heights[(west, y)]) * vertical / run_x;
            let slope_y = (heights[(x, north)] - heights[(x, south)]) * vertical / run_y;

            let (nx, ny, nz) = (-slope_x, -slope_y, 1.0f32);
            let length = (nx * nx + ny * ny + nz * nz).sqrt();

            data.push(scale_component(nx / length) as u8);
            data.push(scale_component(ny / length) as u8);
            data.push(scale_component(nz / length) as u8);
        }
    }

    data
}

fn scale_component(value: f32) -> i8 {
    (value * 127.0).round().clamp(-127.0, 127.0) as i8
}

/// Build a WNAM payload: every eighth vertex, scaled to the world map's
/// coarse `i8` height steps.
pub fn generate_wnam(heights: &HeightGrid) -> Vec<u8> {
    let stride = CELL_SPAN / (WORLD_MAP_SAMPLES - 1);
    let mut data = Vec::with_capacity(WNAM_SIZE);

    for y in 0..WORLD_MAP_SAMPLES {
        for x in 0..WORLD_MAP_SAMPLES {
            let game_units = heights[(x * stride, y * stride)] * GAME_UNITS_PER_HEIGHT_UNIT as f32;
            let step = (game_units / GAME_UNITS_PER_MAP_STEP)
                .round()
                .clamp(f32::from(i8::MIN), f32::from(i8::MAX)) as i8;
            data.push(step as u8);
        }
    }

    data
}
