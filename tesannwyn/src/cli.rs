//! Root CLI structure for tesannwyn

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tes3_land::{ConversionPolicy, ImageKind};

#[derive(Parser)]
#[command(name = "tesannwyn")]
#[command(about = "Heightmap importer/exporter for TES3 (Morrowind) landscapes", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import a heightmap image into a new plugin
    Import(ImportArgs),

    /// Export the landscape of one or more plugins to a heightmap image
    Export(ExportArgs),

    /// Import or export depending on what the input file is
    Convert(ConvertArgs),

    /// Display header, record and landscape information about plugins
    Info {
        /// Plugin files (.esp / .esm)
        #[arg(required = true)]
        plugins: Vec<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    /// Heightmap image (RAW, BMP or CSV)
    pub image: PathBuf,

    /// Plugin to write [default: tesannwyn.esp]
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// 24-bit BMP of vertex colours [default with -c: tesannwyn-vclr.bmp]
    #[arg(long, value_name = "FILE")]
    pub colors: Option<PathBuf>,

    #[command(flatten)]
    pub conversion: ConversionArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Plugin files; a later plugin's LAND replaces an earlier one's
    #[arg(required = true)]
    pub plugins: Vec<PathBuf>,

    /// Image to write [default: tesannwyn.<raw|bmp|csv>]
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Vertex colour image to write with -c [default: tesannwyn-vclr.bmp]
    #[arg(long, value_name = "FILE")]
    pub colors: Option<PathBuf>,

    /// Also write texture indices as CSV
    #[arg(long, value_name = "FILE")]
    pub textures: Option<PathBuf>,

    #[command(flatten)]
    pub conversion: ConversionArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// A plugin to export, or an image to import
    pub input: PathBuf,

    #[command(flatten)]
    pub conversion: ConversionArgs,
}

/// Options shared by import and export
#[derive(Args, Debug, Clone, Default)]
pub struct ConversionArgs {
    /// Image type: raw (1), bmp (2) or csv (3)
    #[arg(short = 'p', long = "kind", value_name = "TYPE", value_parser = parse_kind)]
    pub kind: Option<ImageKind>,

    /// Bits per height sample: 8, 16 or 32 for RAW, 8 for BMP
    #[arg(short, long, value_name = "BITS")]
    pub bits: Option<u8>,

    /// Image dimensions in pixels [default: 1024x1024]
    #[arg(short, long, value_name = "WxH", value_parser = parse_dimensions)]
    pub dimensions: Option<(usize, usize)>,

    /// Cell X of the image's south-west corner
    #[arg(short = 'x', default_value_t = 0, allow_negative_numbers = true)]
    pub x: i32,

    /// Cell Y of the image's south-west corner
    #[arg(short = 'y', default_value_t = 0, allow_negative_numbers = true)]
    pub y: i32,

    /// Height offset in game units
    #[arg(short = 'H', long, default_value_t = 0, allow_negative_numbers = true)]
    pub height_offset: i32,

    /// Height units per image sample
    #[arg(short, long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub scale: f32,

    /// Clamp imported heights to LOWER[,UPPER] game units
    #[arg(short, long, value_name = "LOWER[,UPPER]", value_parser = parse_limits, allow_hyphen_values = true)]
    pub limits: Option<(i32, i32)>,

    /// Skip cells lying entirely within LOWER[-UPPER] game units
    #[arg(short = 'o', long, value_name = "LOWER[-UPPER]", value_parser = parse_ignore_band, allow_hyphen_values = true)]
    pub ignore_land: Option<(i32, i32)>,

    /// Carry vertex colours (VCLR)
    #[arg(short = 'c', long)]
    pub vertex_colors: bool,

    /// Draw the cell grid into exported images
    #[arg(short, long)]
    pub grid: bool,

    /// Stretch exported heights over the full 8-bit range
    #[arg(short, long)]
    pub rescale: bool,

    /// Texture every imported cell with this texture index
    #[arg(short, long, value_name = "INDEX")]
    pub texture: Option<u16>,
}

impl ConversionArgs {
    /// Build and validate the conversion policy
    pub fn to_policy(&self) -> Result<ConversionPolicy> {
        let mut builder = ConversionPolicy::builder()
            .image_kind(self.kind.unwrap_or_default())
            .cell_offset(self.x, self.y)
            .height_offset(self.height_offset)
            .scale(self.scale)
            .vertex_color(self.vertex_colors)
            .grid_overlay(self.grid)
            .rescale(self.rescale);

        if let Some(bits) = self.bits {
            builder = builder.bits(bits);
        }
        if let Some((width, height)) = self.dimensions {
            builder = builder.dimensions(width, height);
        }
        if let Some((lower, upper)) = self.limits {
            builder = builder.clamp_limits(lower, upper);
        }
        if let Some((lower, upper)) = self.ignore_land {
            builder = builder.ignore_band(lower, upper);
        }
        if let Some(texture) = self.texture {
            builder = builder.fixed_texture(texture);
        }

        builder.build().context("Invalid conversion options")
    }
}

fn parse_kind(value: &str) -> std::result::Result<ImageKind, String> {
    value.parse().map_err(|e| format!("{e}"))
}

/// `WIDTHxHEIGHT`
fn parse_dimensions(value: &str) -> std::result::Result<(usize, usize), String> {
    let (width, height) = value
        .to_lowercase()
        .split_once('x')
        .map(|(w, h)| (w.trim().to_string(), h.trim().to_string()))
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let width = width
        .parse()
        .map_err(|_| format!("invalid width '{width}'"))?;
    let height = height
        .parse()
        .map_err(|_| format!("invalid height '{height}'"))?;
    Ok((width, height))
}

/// `LOWER[,UPPER]`, upper defaults to no limit
fn parse_limits(value: &str) -> std::result::Result<(i32, i32), String> {
    let parse = |s: &str| {
        s.trim()
            .parse::<i32>()
            .map_err(|_| format!("invalid limit '{s}'"))
    };
    match value.split_once(',') {
        Some((lower, upper)) => Ok((parse(lower)?, parse(upper)?)),
        None => Ok((parse(value)?, i32::MAX)),
    }
}

/// `LOWER[-UPPER]`; each bound may carry its own minus sign, so
/// `-1000--500` is the band from -1000 to -500. A single value is a band of
/// one height.
fn parse_ignore_band(value: &str) -> std::result::Result<(i32, i32), String> {
    let parse = |s: &str| {
        s.trim()
            .parse::<i32>()
            .map_err(|_| format!("invalid ignore-land bound '{s}'"))
    };

    let (sign, rest) = match value.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", value),
    };
    match rest.split_once('-') {
        Some((lower, upper)) => Ok((parse(&format!("{sign}{lower}"))?, parse(upper)?)),
        None => {
            let single = parse(value)?;
            Ok((single, single))
        }
    }
}
