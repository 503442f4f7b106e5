//! Dense sample rasters and the image formats they are read from

use std::fmt;
use std::str::FromStr;

use crate::error::{LandError, Result};
use crate::grid::PixelRect;

/// Image container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageKind {
    /// Headerless little-endian samples, northern row first
    #[default]
    Raw,
    /// Windows bitmap
    Bmp,
    /// Comma-separated integers, one image row per line
    Csv,
}

impl ImageKind {
    /// Kind from the numeric code used by the original tool (1 = RAW,
    /// 2 = BMP, 3 = CSV)
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Raw),
            2 => Some(Self::Bmp),
            3 => Some(Self::Csv),
            _ => None,
        }
    }

    /// File extension for exported images
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Bmp => "bmp",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw => write!(f, "RAW"),
            Self::Bmp => write!(f, "BMP"),
            Self::Csv => write!(f, "CSV"),
        }
    }
}

impl FromStr for ImageKind {
    type Err = LandError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "raw" | "1" => Ok(Self::Raw),
            "bmp" | "2" => Ok(Self::Bmp),
            "csv" | "3" => Ok(Self::Csv),
            _ => Err(LandError::UnsupportedFormat(format!("unknown image type '{s}'"))),
        }
    }
}

/// How height samples are stored in an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    /// 8-bit unsigned greyscale (RAW or BMP)
    Grey8,
    /// 16-bit signed little-endian (RAW)
    Grey16,
    /// 32-bit signed little-endian (RAW)
    Grey32,
    /// Decimal integers (CSV)
    Text,
}

impl SampleFormat {
    /// Negotiate the sample format for a heightmap image.
    ///
    /// Supported: RAW 8/16/32, BMP 8 (greyscale), CSV (any depth). 24-bit BMP
    /// is reserved for vertex colour images.
    ///
    /// ```
    /// use tes3_land::raster::{ImageKind, SampleFormat};
    ///
    /// assert_eq!(SampleFormat::new(ImageKind::Raw, 16).unwrap(), SampleFormat::Grey16);
    /// assert!(SampleFormat::new(ImageKind::Bmp, 16).is_err());
    /// ```
    pub fn new(kind: ImageKind, bits: u8) -> Result<Self> {
        match (kind, bits) {
            (ImageKind::Raw | ImageKind::Bmp, 8) => Ok(Self::Grey8),
            (ImageKind::Raw, 16) => Ok(Self::Grey16),
            (ImageKind::Raw, 32) => Ok(Self::Grey32),
            (ImageKind::Csv, _) => Ok(Self::Text),
            (ImageKind::Bmp, 24) => Err(LandError::UnsupportedFormat(
                "24-bit BMP holds vertex colours, not heights; use an 8-bit BMP".to_string(),
            )),
            _ => Err(LandError::UnsupportedFormat(format!(
                "{bits}-bit {kind} heightmaps are not supported"
            ))),
        }
    }

    /// Bytes per sample in binary formats
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            Self::Grey8 => 1,
            Self::Grey16 => 2,
            Self::Grey32 | Self::Text => 4,
        }
    }

    /// Smallest and largest storable sample
    pub fn range(&self) -> (i32, i32) {
        match self {
            Self::Grey8 => (0, i32::from(u8::MAX)),
            Self::Grey16 => (i32::from(i16::MIN), i32::from(i16::MAX)),
            Self::Grey32 | Self::Text => (i32::MIN, i32::MAX),
        }
    }

    /// Largest storable sample, used to draw grid lines
    pub fn max_sample(&self) -> i32 {
        self.range().1
    }
}

/// Dense 2-D array of samples.
///
/// Row 0 is the southern-most row; readers and writers flip rows for file
/// formats that store the northern row first.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Copy> Raster<T> {
    /// Raster with every sample set to `fill`
    pub fn new(width: usize, height: usize, fill: T) -> Self {
        Self {
            width,
            height,
            data: vec![fill; width * height],
        }
    }

    /// Wrap row-major samples (southern row first)
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != width * height {
            return Err(LandError::ImageSize {
                expected: width * height,
                found: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Extent as a pixel rectangle
    pub fn rect(&self) -> PixelRect {
        PixelRect::new(self.width, self.height)
    }

    /// Checked read
    pub fn get(&self, x: usize, y: usize) -> Option<T> {
        if x < self.width && y < self.height {
            self.data.get(y * self.width + x).copied()
        } else {
            None
        }
    }

    /// Checked write, returns `false` when out of range
    pub fn set(&mut self, x: usize, y: usize, value: T) -> bool {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = value;
            true
        } else {
            false
        }
    }

    /// Read with coordinates clamped onto the raster, repeating edge pixels.
    /// `None` only for an empty raster.
    pub fn get_clamped(&self, x: i64, y: i64) -> Option<T> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;
        self.get(x, y)
    }

    /// Samples in row-major order, southern row first
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Rows from north to south, the order image files store them in
    pub fn rows_north_first(&self) -> impl Iterator<Item = &[T]> {
        self.data.chunks(self.width.max(1)).rev()
    }

    /// Apply `f` to every sample
    pub fn map<U: Copy>(&self, f: impl FnMut(T) -> U) -> Raster<U> {
        Raster {
            width: self.width,
            height: self.height,
            data: self.data.iter().copied().map(f).collect(),
        }
    }

    /// Build from rows listed north to south
    pub fn from_rows_north_first(width: usize, height: usize, rows: Vec<Vec<T>>) -> Result<Self> {
        if rows.len() != height {
            return Err(LandError::ImageSize {
                expected: height,
                found: rows.len(),
            });
        }
        let mut data = Vec::with_capacity(width * height);
        for row in rows.into_iter().rev() {
            if row.len() != width {
                return Err(LandError::ImageSize {
                    expected: width,
                    found: row.len(),
                });
            }
            data.extend(row);
        }
        Self::from_vec(width, height, data)
    }
}
