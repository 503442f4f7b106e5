//! Command implementations

pub mod convert;
pub mod export;
pub mod import;
pub mod info;

use std::path::PathBuf;

use tes3_land::ImageKind;

/// Plugin written by `import` when no output is given
pub const DEFAULT_PLUGIN: &str = "tesannwyn.esp";

/// Vertex colour image used by both directions
pub const DEFAULT_VCLR_IMAGE: &str = "tesannwyn-vclr.bmp";

/// Heightmap written by `export` when no output is given
pub fn default_image(kind: ImageKind) -> PathBuf {
    PathBuf::from(format!("tesannwyn.{}", kind.extension()))
}
