//! Error types for LAND conversion.
//!
//! Every error here is fatal for the current run and is reported once, at
//! the point it is detected, with enough context to find the offending data.
//!
//! # Error Categories
//!
//! - [`LandError::Io`] - underlying file unreadable or unwritable
//! - [`LandError::UnsupportedFormat`] - image kind / bit depth combination not
//!   supported; raised before any output is produced
//! - [`LandError::MalformedRecord`] - subrecord size mismatch or corrupt data,
//!   carrying the cell and subrecord tag
//! - [`LandError::InvalidMagic`] - plugin does not start with a `TES3` record
//! - [`LandError::ImageSize`] - image data does not match its declared size
//! - [`LandError::ImageTooLarge`] - cells spread too far apart to export as
//!   one image
//! - [`LandError::InvalidPolicy`] - conversion options contradict each other
//! - [`LandError::Image`], [`LandError::Csv`], [`LandError::BinrwError`] -
//!   failures reported by the underlying codec libraries
//!
//! Values that overflow their storage width are not errors: they are
//! clamped, counted in the import/export reports and logged as warnings.

use thiserror::Error;

use crate::tag::RecordTag;
use crate::types::CellCoord;

/// Result type alias using [`LandError`] as the error type.
pub type Result<T> = std::result::Result<T, LandError>;

/// Errors that can occur while converting between images and LAND records.
#[derive(Error, Debug)]
pub enum LandError {
    /// Underlying I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image kind or sample width the converter cannot handle.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Subrecord has the wrong size or holds corrupt data.
    #[error("Malformed {tag} subrecord in cell {cell}: {reason}")]
    MalformedRecord {
        /// Cell whose LAND record is broken.
        cell: CellCoord,
        /// Subrecord being decoded.
        tag: RecordTag,
        /// What was wrong with it.
        reason: String,
    },

    /// File does not start with the expected record.
    #[error("Invalid magic: expected {expected}, found {found}")]
    InvalidMagic {
        /// Expected record tag.
        expected: RecordTag,
        /// Tag actually found.
        found: RecordTag,
    },

    /// Image data length does not match the declared dimensions.
    #[error("Image size mismatch: expected {expected} bytes/samples, found {found}")]
    ImageSize {
        /// Size implied by the dimensions and sample format.
        expected: usize,
        /// Size actually present.
        found: usize,
    },

    /// Image spanned by the cells is beyond the pixel budget.
    #[error("Image of {width}x{height} pixels exceeds the limit of {limit} pixels")]
    ImageTooLarge {
        /// Width in pixels, saturated on overflow.
        width: usize,
        /// Height in pixels, saturated on overflow.
        height: usize,
        /// Largest pixel count accepted.
        limit: usize,
    },

    /// Conversion options are inconsistent.
    #[error("Invalid conversion policy: {0}")]
    InvalidPolicy(String),

    /// Error reported by the image codec.
    #[error("Image codec error: {0}")]
    Image(String),

    /// Error reported by the CSV reader or writer.
    #[error("CSV error: {0}")]
    Csv(String),

    /// Error from the binrw record header codec.
    #[error("binrw error: {0}")]
    BinrwError(String),
}

impl LandError {
    /// Shorthand for [`LandError::MalformedRecord`]
    pub fn malformed(cell: CellCoord, tag: RecordTag, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            cell,
            tag,
            reason: reason.into(),
        }
    }
}

impl From<binrw::Error> for LandError {
    fn from(err: binrw::Error) -> Self {
        match err {
            binrw::Error::Io(io) => LandError::Io(io),
            other => LandError::BinrwError(format!("{other}")),
        }
    }
}

impl From<image::ImageError> for LandError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(io) => LandError::Io(io),
            other => LandError::Image(format!("{other}")),
        }
    }
}

impl From<csv::Error> for LandError {
    fn from(err: csv::Error) -> Self {
        LandError::Csv(format!("{err}"))
    }
}
