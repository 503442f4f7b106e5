//! Heightmap codec for TES3 (Morrowind) `LAND` records
//!
//! This crate converts between raster heightmap images and the landscape
//! records of a TES3 plugin, in both directions. Each exterior cell stores a
//! 65x65 grid of heights as one absolute offset plus signed byte deltas, and
//! neighbouring cells share their edge vertices.
//!
//! ## Features
//!
//! - Delta-chain height codec (`VHGT`) with clamping of steep steps
//! - Vertex colour (`VCLR`) and texture index (`VTEX`) grids
//! - Derived vertex normals (`VNML`) and world map heights (`WNAM`)
//! - RAW (8/16/32-bit), BMP and CSV heightmaps
//! - Height offset, scale, clamp limits and ignore-land band on import
//! - Rescale to 8 bits and cell grid overlay on export
//!
//! ## Example
//!
//! ```no_run
//! use tes3_land::{ConversionPolicy, LandStore, ImageKind};
//! use tes3_land::{import_heightmap, image_io, plugin};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let policy = ConversionPolicy::builder()
//!     .image_kind(ImageKind::Raw)
//!     .bits(16)
//!     .dimensions(512, 512)
//!     .cell_offset(-4, -4)
//!     .build()?;
//!
//! let heights = image_io::read_heightmap("island.raw", &policy)?;
//! let mut store = LandStore::new();
//! let report = import_heightmap(&heights, None, &policy, &mut store)?;
//! println!("{} cells written", report.cells_written);
//!
//! plugin::write_plugin_file("island.esp", &store, &plugin::PluginHeader::default())?;
//! # Ok(())
//! # }
//! ```
//!
//! ## References
//!
//! - <https://en.uesp.net/wiki/Morrowind_Mod:Mod_File_Format/LAND>

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod color;
pub mod error;
pub mod export;
pub mod grid;
pub mod height;
pub mod image_io;
pub mod import;
pub mod normals;
pub mod plugin;
pub mod policy;
pub mod raster;
pub mod store;
/// Record and subrecord identifiers
pub mod tag;
pub mod texture;
pub mod types;

pub use error::{LandError, Result};
pub use export::{ExportReport, ExportedHeightmap, export_heightmap};
pub use import::{ImportReport, import_heightmap};
pub use policy::ConversionPolicy;
pub use raster::{ImageKind, Raster, SampleFormat};
pub use store::{LandStore, RecordStore, SubrecordKind};
pub use tag::RecordTag;
pub use types::{CellCoord, LocalVertex};
