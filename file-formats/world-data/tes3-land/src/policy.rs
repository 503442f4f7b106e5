//! Conversion policy
//!
//! One immutable set of options per run, built with
//! [`ConversionPolicy::builder`] and validated once. Limits and bands are
//! given in game units; the codec works in height units (one height unit is
//! [`GAME_UNITS_PER_HEIGHT_UNIT`] game units).

use crate::error::{LandError, Result};
use crate::grid::PixelRect;
use crate::raster::{ImageKind, SampleFormat};
use crate::types::{CellCoord, GAME_UNITS_PER_HEIGHT_UNIT, HeightGrid};

/// Default image width and height in pixels
pub const DEFAULT_DIMENSION: usize = 1024;

/// Options shared by the import and export pipelines
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionPolicy {
    dimensions: (usize, usize),
    image_kind: ImageKind,
    sample_format: SampleFormat,
    cell_offset: CellCoord,
    height_offset: i32,
    scale: f32,
    rescale: bool,
    vertex_color: bool,
    grid_overlay: bool,
    clamp_limits: Option<(i32, i32)>,
    ignore_band: Option<(i32, i32)>,
    fixed_texture: Option<u16>,
}

impl Default for ConversionPolicy {
    fn default() -> Self {
        Self {
            dimensions: (DEFAULT_DIMENSION, DEFAULT_DIMENSION),
            image_kind: ImageKind::Raw,
            sample_format: SampleFormat::Grey16,
            cell_offset: CellCoord::default(),
            height_offset: 0,
            scale: 1.0,
            rescale: false,
            vertex_color: false,
            grid_overlay: false,
            clamp_limits: None,
            ignore_band: None,
            fixed_texture: None,
        }
    }
}

impl ConversionPolicy {
    /// Start building a policy from defaults
    pub fn builder() -> ConversionPolicyBuilder {
        ConversionPolicyBuilder::new()
    }

    /// Image `(width, height)` in pixels
    pub fn dimensions(&self) -> (usize, usize) {
        self.dimensions
    }

    /// Image container format
    pub fn image_kind(&self) -> ImageKind {
        self.image_kind
    }

    /// Negotiated sample format
    pub fn sample_format(&self) -> SampleFormat {
        self.sample_format
    }

    /// Cell of image pixel (0, 0) on import
    pub fn cell_offset(&self) -> CellCoord {
        self.cell_offset
    }

    /// Height offset in game units
    pub fn height_offset(&self) -> i32 {
        self.height_offset
    }

    /// Height units per image sample
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Stretch exported samples over the full 8-bit range
    pub fn rescale(&self) -> bool {
        self.rescale
    }

    /// Carry vertex colours alongside the heightmap
    pub fn vertex_color(&self) -> bool {
        self.vertex_color
    }

    /// Draw cell borders into the exported heightmap
    pub fn grid_overlay(&self) -> bool {
        self.grid_overlay
    }

    /// Clamp band in game units
    pub fn clamp_limits(&self) -> Option<(i32, i32)> {
        self.clamp_limits
    }

    /// Ignore-land band in game units
    pub fn ignore_band(&self) -> Option<(i32, i32)> {
        self.ignore_band
    }

    /// Texture painted over every imported cell
    pub fn fixed_texture(&self) -> Option<u16> {
        self.fixed_texture
    }

    /// Height offset converted to height units
    pub fn offset_height_units(&self) -> f32 {
        self.height_offset as f32 / GAME_UNITS_PER_HEIGHT_UNIT as f32
    }

    /// Clamp band in height units.
    ///
    /// Limits are divided with integer division, so a limit that is not a
    /// multiple of eight game units truncates toward zero.
    pub fn clamp_height_units(&self) -> Option<(f32, f32)> {
        self.clamp_limits.map(|(lower, upper)| {
            (
                (lower / GAME_UNITS_PER_HEIGHT_UNIT) as f32,
                (upper / GAME_UNITS_PER_HEIGHT_UNIT) as f32,
            )
        })
    }

    /// Image sample to height units, before clamping
    pub fn sample_to_height(&self, sample: f32) -> f32 {
        sample * self.scale + self.offset_height_units()
    }

    /// Height units back to an image sample
    pub fn height_to_sample(&self, height: f32) -> f32 {
        (height - self.offset_height_units()) / self.scale
    }

    /// Apply the clamp band; the flag is set when the height moved
    pub fn clamp_height(&self, height: f32) -> (f32, bool) {
        match self.clamp_height_units() {
            Some((lower, upper)) => {
                let clamped = height.clamp(lower, upper);
                (clamped, clamped != height)
            }
            None => (height, false),
        }
    }

    /// Whether every vertex of a cell lies inside the ignore-land band
    pub fn is_ignored(&self, heights: &HeightGrid) -> bool {
        let Some((lower, upper)) = self.ignore_band else {
            return false;
        };
        let (lower, upper) = (lower as f32, upper as f32);
        heights.as_slice().iter().all(|&h| {
            let game_units = h * GAME_UNITS_PER_HEIGHT_UNIT as f32;
            (lower..=upper).contains(&game_units)
        })
    }
}

/// Builder for [`ConversionPolicy`]
#[derive(Debug, Clone)]
pub struct ConversionPolicyBuilder {
    policy: ConversionPolicy,
    bits: Option<u8>,
}

impl Default for ConversionPolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionPolicyBuilder {
    /// Builder seeded with the default policy
    pub fn new() -> Self {
        Self {
            policy: ConversionPolicy::default(),
            bits: None,
        }
    }

    /// Image size in pixels
    pub fn dimensions(mut self, width: usize, height: usize) -> Self {
        self.policy.dimensions = (width, height);
        self
    }

    /// Image container format
    pub fn image_kind(mut self, kind: ImageKind) -> Self {
        self.policy.image_kind = kind;
        self
    }

    /// Bits per height sample.
    ///
    /// When unset, RAW defaults to 16, BMP to 8 and CSV ignores the depth.
    pub fn bits(mut self, bits: u8) -> Self {
        self.bits = Some(bits);
        self
    }

    /// Cell that image pixel (0, 0) lands in
    pub fn cell_offset(mut self, x: i32, y: i32) -> Self {
        self.policy.cell_offset = CellCoord::new(x, y);
        self
    }

    /// Height offset in game units
    pub fn height_offset(mut self, offset: i32) -> Self {
        self.policy.height_offset = offset;
        self
    }

    /// Height units per image sample
    pub fn scale(mut self, scale: f32) -> Self {
        self.policy.scale = scale;
        self
    }

    /// Stretch exported samples over the full 8-bit range
    pub fn rescale(mut self, rescale: bool) -> Self {
        self.policy.rescale = rescale;
        self
    }

    /// Carry vertex colours alongside the heightmap
    pub fn vertex_color(mut self, enabled: bool) -> Self {
        self.policy.vertex_color = enabled;
        self
    }

    /// Draw cell borders into exported heightmaps
    pub fn grid_overlay(mut self, enabled: bool) -> Self {
        self.policy.grid_overlay = enabled;
        self
    }

    /// Clamp imported heights to `[lower, upper]` game units
    pub fn clamp_limits(mut self, lower: i32, upper: i32) -> Self {
        self.policy.clamp_limits = Some((lower, upper));
        self
    }

    /// Skip cells lying entirely within `[lower, upper]` game units
    pub fn ignore_band(mut self, lower: i32, upper: i32) -> Self {
        self.policy.ignore_band = Some((lower, upper));
        self
    }

    /// Paint every imported cell with one texture index
    pub fn fixed_texture(mut self, texture: u16) -> Self {
        self.policy.fixed_texture = Some(texture);
        self
    }

    /// Validate and produce the policy
    pub fn build(self) -> Result<ConversionPolicy> {
        let mut policy = self.policy;

        let bits = self.bits.unwrap_or(match policy.image_kind {
            ImageKind::Raw => 16,
            ImageKind::Bmp => 8,
            ImageKind::Csv => 32,
        });
        policy.sample_format = SampleFormat::new(policy.image_kind, bits)?;

        let (width, height) = policy.dimensions;
        if width == 0 || height == 0 {
            return Err(LandError::InvalidPolicy(format!(
                "image dimensions must be non-zero, got {width}x{height}"
            )));
        }

        let (columns, rows) = PixelRect::new(width, height).cell_span();
        let origin = policy.cell_offset;
        let north_east = i32::try_from(columns - 1)
            .ok()
            .zip(i32::try_from(rows - 1).ok())
            .and_then(|(dx, dy)| origin.checked_offset(dx, dy));
        if north_east.is_none() {
            return Err(LandError::InvalidPolicy(format!(
                "a {width}x{height} image at cell {origin} runs past the edge of the cell grid"
            )));
        }

        if !policy.scale.is_finite() || policy.scale == 0.0 {
            return Err(LandError::InvalidPolicy(format!(
                "scale must be finite and non-zero, got {}",
                policy.scale
            )));
        }

        if let Some((lower, upper)) = policy.clamp_limits
            && lower > upper
        {
            return Err(LandError::InvalidPolicy(format!(
                "clamp limits are inverted: {lower} > {upper}"
            )));
        }

        if let Some((lower, upper)) = policy.ignore_band
            && lower > upper
        {
            return Err(LandError::InvalidPolicy(format!(
                "ignore-land band is inverted: {lower} > {upper}"
            )));
        }

        // Heights are clamped before the ignore test, so a band reaching past
        // a limit would catch land that was only pushed onto the limit.
        if let (Some((clamp_lower, clamp_upper)), Some((ignore_lower, ignore_upper))) =
            (policy.clamp_limits, policy.ignore_band)
            && (ignore_lower < clamp_lower || ignore_upper > clamp_upper)
        {
            return Err(LandError::InvalidPolicy(format!(
                "ignore-land band {ignore_lower}..{ignore_upper} must lie within clamp limits {clamp_lower}..{clamp_upper}"
            )));
        }

        if policy.rescale && policy.sample_format != SampleFormat::Grey8 {
            return Err(LandError::InvalidPolicy(
                "rescale is only available for 8-bit images".to_string(),
            ));
        }

        Ok(policy)
    }
}
