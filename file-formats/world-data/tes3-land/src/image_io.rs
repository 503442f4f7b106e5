//! Heightmap, colour and texture image readers and writers
//!
//! Every file format stores the northern row first. Rasters keep the
//! southern row at index 0, so rows are flipped on the way in and out.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, ImageReader, RgbImage};
use log::{debug, info};

use crate::error::{LandError, Result};
use crate::policy::ConversionPolicy;
use crate::raster::{ImageKind, Raster, SampleFormat};
use crate::types::Rgb;

/// What a file on disk holds, judged by its first bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// TES3 plugin (`.esp` / `.esm`)
    Plugin,
    /// Windows bitmap
    Bmp,
    /// Anything else is taken as headerless RAW samples
    Raw,
}

/// Classify a file by its magic bytes
pub fn detect_input<P: AsRef<Path>>(path: P) -> Result<InputKind> {
    let mut file = File::open(path.as_ref())?;
    let mut magic = [0u8; 4];
    let mut filled = 0;
    while filled < magic.len() {
        let read = file.read(&mut magic[filled..])?;
        if read == 0 {
            break;
        }
        filled += read;
    }

    let kind = match &magic[..filled] {
        [b'T', b'E', b'S', b'3', ..] => InputKind::Plugin,
        [b'B', b'M', ..] => InputKind::Bmp,
        _ => InputKind::Raw,
    };
    debug!("{} detected as {:?}", path.as_ref().display(), kind);
    Ok(kind)
}

/// Read a heightmap image as described by the policy.
///
/// RAW and CSV images must match the policy's dimensions; BMP images carry
/// their own.
pub fn read_heightmap<P: AsRef<Path>>(path: P, policy: &ConversionPolicy) -> Result<Raster<i32>> {
    let path = path.as_ref();
    let (width, height) = policy.dimensions();
    let reader = BufReader::new(File::open(path)?);

    let raster = match policy.image_kind() {
        ImageKind::Raw => read_raw(reader, policy.sample_format(), width, height)?,
        ImageKind::Csv => read_csv(reader, width, height)?,
        ImageKind::Bmp => read_bmp_heights(reader)?,
    };

    info!(
        "Read {}x{} {} heightmap from {}",
        raster.width(),
        raster.height(),
        policy.image_kind(),
        path.display()
    );
    Ok(raster)
}

/// Write a heightmap image in the policy's format
pub fn write_heightmap<P: AsRef<Path>>(
    path: P,
    raster: &Raster<i32>,
    policy: &ConversionPolicy,
) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);

    match policy.image_kind() {
        ImageKind::Raw => write_raw(&mut writer, raster, policy.sample_format())?,
        ImageKind::Csv => write_csv(&mut writer, raster)?,
        ImageKind::Bmp => write_bmp_heights(&mut writer, raster)?,
    }
    writer.flush()?;

    info!(
        "Wrote {}x{} {} heightmap to {}",
        raster.width(),
        raster.height(),
        policy.image_kind(),
        path.display()
    );
    Ok(())
}

/// Read headerless little-endian samples
pub fn read_raw<R: Read>(
    mut reader: R,
    format: SampleFormat,
    width: usize,
    height: usize,
) -> Result<Raster<i32>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let sample_size = format.bytes_per_sample();
    let expected = width * height * sample_size;
    if bytes.len() != expected {
        return Err(LandError::ImageSize {
            expected,
            found: bytes.len(),
        });
    }

    let samples: Vec<i32> = bytes
        .chunks_exact(sample_size)
        .map(|b| match format {
            SampleFormat::Grey8 => i32::from(b[0]),
            SampleFormat::Grey16 => i32::from(i16::from_le_bytes([b[0], b[1]])),
            SampleFormat::Grey32 | SampleFormat::Text => {
                i32::from_le_bytes([b[0], b[1], b[2], b[3]])
            }
        })
        .collect();

    let rows = samples
        .chunks(width.max(1))
        .map(<[i32]>::to_vec)
        .collect();
    Raster::from_rows_north_first(width, height, rows)
}

/// Write headerless little-endian samples.
///
/// Samples must already lie within the format's range; out-of-range values
/// saturate.
pub fn write_raw<W: Write>(mut writer: W, raster: &Raster<i32>, format: SampleFormat) -> Result<()> {
    let (min, max) = format.range();
    for row in raster.rows_north_first() {
        let mut bytes = Vec::with_capacity(row.len() * format.bytes_per_sample());
        for &sample in row {
            let sample = sample.clamp(min, max);
            match format {
                SampleFormat::Grey8 => bytes.push(sample as u8),
                SampleFormat::Grey16 => bytes.extend_from_slice(&(sample as i16).to_le_bytes()),
                SampleFormat::Grey32 | SampleFormat::Text => {
                    bytes.extend_from_slice(&sample.to_le_bytes())
                }
            }
        }
        writer.write_all(&bytes)?;
    }
    Ok(())
}

/// Read comma-separated integer rows
pub fn read_csv<R: Read>(reader: R, width: usize, height: usize) -> Result<Raster<i32>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::with_capacity(height);
    for (line, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row = record
            .iter()
            .filter(|field| !field.is_empty())
            .map(|field| {
                field.parse::<i32>().map_err(|e| {
                    LandError::Csv(format!("row {}: invalid sample '{field}': {e}", line + 1))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        rows.push(row);
    }

    Raster::from_rows_north_first(width, height, rows)
}

/// Write comma-separated integer rows
pub fn write_csv<W: Write, T: Copy + ToString>(writer: W, raster: &Raster<T>) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    for row in raster.rows_north_first() {
        csv_writer.write_record(row.iter().map(ToString::to_string))?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn decode_bmp<R: Read>(mut reader: R) -> Result<DynamicImage> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let image = ImageReader::with_format(std::io::Cursor::new(bytes), ImageFormat::Bmp).decode()?;
    Ok(image)
}

/// Read an 8-bit greyscale BMP heightmap
pub fn read_bmp_heights<R: Read>(reader: R) -> Result<Raster<i32>> {
    let image = decode_bmp(reader)?;
    if image.color() != image::ColorType::L8 {
        debug!("Converting {:?} bitmap to greyscale", image.color());
    }
    let grey = image.to_luma8();
    let (width, height) = (grey.width() as usize, grey.height() as usize);
    let rows = grey
        .rows()
        .map(|row| row.map(|p| i32::from(p.0[0])).collect())
        .collect();
    Raster::from_rows_north_first(width, height, rows)
}

/// Write an 8-bit greyscale BMP heightmap
pub fn write_bmp_heights<W: Write + Seek>(writer: &mut W, raster: &Raster<i32>) -> Result<()> {
    let mut image = GrayImage::new(raster.width() as u32, raster.height() as u32);
    for (row_index, row) in raster.rows_north_first().enumerate() {
        for (x, &sample) in row.iter().enumerate() {
            let value = sample.clamp(0, i32::from(u8::MAX)) as u8;
            image.put_pixel(x as u32, row_index as u32, image::Luma([value]));
        }
    }
    image.write_to(writer, ImageFormat::Bmp)?;
    Ok(())
}

/// Read a 24-bit BMP of vertex colours
pub fn read_colors<P: AsRef<Path>>(path: P) -> Result<Raster<Rgb>> {
    let path = path.as_ref();
    let image = decode_bmp(File::open(path)?)?.to_rgb8();
    let (width, height) = (image.width() as usize, image.height() as usize);
    let rows = image.rows().map(|row| row.map(|p| p.0).collect()).collect();
    let raster = Raster::from_rows_north_first(width, height, rows)?;
    info!("Read {width}x{height} vertex colour image from {}", path.display());
    Ok(raster)
}

/// Write vertex colours as a 24-bit BMP
pub fn write_colors<P: AsRef<Path>>(path: P, raster: &Raster<Rgb>) -> Result<()> {
    let path = path.as_ref();
    let mut image = RgbImage::new(raster.width() as u32, raster.height() as u32);
    for (row_index, row) in raster.rows_north_first().enumerate() {
        for (x, &color) in row.iter().enumerate() {
            image.put_pixel(x as u32, row_index as u32, image::Rgb(color));
        }
    }

    let mut writer = BufWriter::new(File::create(path)?);
    image.write_to(&mut writer, ImageFormat::Bmp)?;
    writer.flush()?;
    info!(
        "Wrote {}x{} vertex colour image to {}",
        raster.width(),
        raster.height(),
        path.display()
    );
    Ok(())
}

/// Write texture indices as CSV, one tile row per line
pub fn write_textures<P: AsRef<Path>>(path: P, raster: &Raster<u16>) -> Result<()> {
    let path = path.as_ref();
    write_csv(BufWriter::new(File::create(path)?), raster)?;
    info!(
        "Wrote {}x{} texture index grid to {}",
        raster.width(),
        raster.height(),
        path.display()
    );
    Ok(())
}
