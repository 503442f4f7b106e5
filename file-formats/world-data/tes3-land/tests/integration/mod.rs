mod export;
mod import;
mod plugin;
mod round_trip;

use tes3_land::Raster;

/// Gentle ramp whose neighbouring samples differ by at most three
pub fn ramp(width: usize, height: usize, base: i32) -> Raster<i32> {
    let mut raster = Raster::new(width, height, 0);
    for y in 0..height {
        for x in 0..width {
            raster.set(x, y, base + x as i32 + 2 * y as i32);
        }
    }
    raster
}
