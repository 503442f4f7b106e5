//! TES3 plugin reader and writer
//!
//! Only the records the heightmap codec needs are understood: the `TES3`
//! header, exterior `CELL` records and `LAND` records. Everything else is
//! counted and skipped on read.
//!
//! # Binary Layout
//!
//! ```text
//! Record:    tag[4] size:u32 header1:u32 flags:u32  then `size` bytes of subrecords
//! Subrecord: tag[4] size:u32                        then `size` bytes of payload
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use binrw::{BinRead, BinWrite};
use log::{debug, info, warn};

use crate::error::{LandError, Result};
use crate::store::{LandRecord, LandStore, SubrecordKind};
use crate::tag::RecordTag;
use crate::types::CellCoord;

/// Version stored in `HEDR`
pub const TES3_VERSION: f32 = 1.3;

/// Size of the `HEDR` payload
pub const HEDR_SIZE: usize = 300;

const AUTHOR_LEN: usize = 32;
const DESCRIPTION_LEN: usize = 256;

/// Record header (16 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct RecordHeader {
    /// Record type
    pub tag: RecordTag,
    /// Payload size, excluding this header
    pub size: u32,
    /// Unused by the game
    pub header1: u32,
    /// Record flags
    pub flags: u32,
}

impl RecordHeader {
    /// Header size in bytes
    pub const SIZE: usize = 16;

    fn new(tag: RecordTag, size: usize) -> Result<Self> {
        Ok(Self {
            tag,
            size: payload_size(size)?,
            header1: 0,
            flags: 0,
        })
    }
}

/// Subrecord header (8 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct SubrecordHeader {
    /// Subrecord type
    pub tag: RecordTag,
    /// Payload size, excluding this header
    pub size: u32,
}

impl SubrecordHeader {
    /// Header size in bytes
    pub const SIZE: usize = 8;
}

/// Raw `HEDR` payload
#[derive(Debug, Clone, BinRead, BinWrite)]
#[brw(little)]
struct Hedr {
    version: f32,
    file_type: u32,
    author: [u8; AUTHOR_LEN],
    description: [u8; DESCRIPTION_LEN],
    num_records: u32,
}

/// Plugin header information
#[derive(Debug, Clone, PartialEq)]
pub struct PluginHeader {
    /// Format version, 1.3 for Morrowind
    pub version: f32,
    /// 0 for plugins (`.esp`), 1 for masters (`.esm`)
    pub file_type: u32,
    /// Author, at most 31 bytes
    pub author: String,
    /// Description, at most 255 bytes
    pub description: String,
    /// Records following the header
    pub num_records: u32,
}

impl Default for PluginHeader {
    fn default() -> Self {
        Self {
            version: TES3_VERSION,
            file_type: 0,
            author: "TESAnnwyn".to_string(),
            description: "Landscape generated by TESAnnwyn".to_string(),
            num_records: 0,
        }
    }
}

impl PluginHeader {
    fn from_hedr(hedr: &Hedr) -> Self {
        Self {
            version: hedr.version,
            file_type: hedr.file_type,
            author: fixed_string(&hedr.author),
            description: fixed_string(&hedr.description),
            num_records: hedr.num_records,
        }
    }

    fn to_hedr(&self) -> Hedr {
        Hedr {
            version: self.version,
            file_type: self.file_type,
            author: fixed_bytes(&self.author),
            description: fixed_bytes(&self.description),
            num_records: self.num_records,
        }
    }
}

fn fixed_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

fn fixed_bytes<const N: usize>(text: &str) -> [u8; N] {
    let mut bytes = [0u8; N];
    // Keep one byte for the terminator
    let len = text.len().min(N - 1);
    bytes[..len].copy_from_slice(&text.as_bytes()[..len]);
    bytes
}

fn payload_size(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        LandError::UnsupportedFormat(format!("record payload of {len} bytes is too large"))
    })
}

/// A plugin's header, record counts and LAND data
#[derive(Debug, Clone)]
pub struct Plugin {
    /// Parsed `HEDR`
    pub header: PluginHeader,
    /// Number of records per type, header included
    pub record_counts: BTreeMap<RecordTag, usize>,
    /// LAND records keyed by cell
    pub land: LandStore,
}

/// Read a plugin file
pub fn read_plugin_file<P: AsRef<Path>>(path: P) -> Result<Plugin> {
    let path = path.as_ref();
    let mut bytes = Vec::new();
    File::open(path)?.read_to_end(&mut bytes)?;
    let plugin = read_plugin(&mut Cursor::new(bytes))?;
    info!(
        "Read {} LAND records from {}",
        plugin.land.len(),
        path.display()
    );
    Ok(plugin)
}

/// Read a plugin from a seekable reader
pub fn read_plugin<R: Read + Seek>(reader: &mut R) -> Result<Plugin> {
    let end = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(0))?;

    let first = RecordHeader::read(reader)?;
    if first.tag != RecordTag::TES3 {
        return Err(LandError::InvalidMagic {
            expected: RecordTag::TES3,
            found: first.tag,
        });
    }

    let mut record_counts = BTreeMap::new();
    *record_counts.entry(RecordTag::TES3).or_insert(0) += 1;
    let header = read_header_record(reader, &first, end)?;

    let mut land = LandStore::new();
    while reader.stream_position()? < end {
        let record = RecordHeader::read(reader)?;
        *record_counts.entry(record.tag).or_insert(0) += 1;

        if record.tag == RecordTag::LAND {
            let payload = read_payload(reader, &record, end)?;
            let (cell, land_record) = parse_land(&payload)?;
            if land.insert_record(cell, land_record).is_some() {
                warn!("Duplicate LAND record for cell {cell}, keeping the later one");
            }
        } else {
            ensure_fits(reader, &record, end)?;
            reader.seek(SeekFrom::Current(i64::from(record.size)))?;
        }
    }

    if header.num_records as usize + 1 != record_counts.values().sum::<usize>() {
        debug!(
            "HEDR lists {} records, file holds {}",
            header.num_records,
            record_counts.values().sum::<usize>() - 1
        );
    }

    Ok(Plugin {
        header,
        record_counts,
        land,
    })
}

/// Fail before allocating when a record claims more bytes than the file has left
fn ensure_fits<R: Seek>(reader: &mut R, record: &RecordHeader, end: u64) -> Result<()> {
    let remaining = end.saturating_sub(reader.stream_position()?);
    if u64::from(record.size) > remaining {
        return Err(LandError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!(
                "{} record claims {} bytes, only {remaining} left in the file",
                record.tag, record.size
            ),
        )));
    }
    Ok(())
}

fn read_payload<R: Read + Seek>(reader: &mut R, record: &RecordHeader, end: u64) -> Result<Vec<u8>> {
    ensure_fits(reader, record, end)?;
    let mut payload = vec![0u8; record.size as usize];
    reader.read_exact(&mut payload)?;
    Ok(payload)
}

fn read_header_record<R: Read + Seek>(
    reader: &mut R,
    record: &RecordHeader,
    end: u64,
) -> Result<PluginHeader> {
    let payload = read_payload(reader, record, end)?;

    let mut header = None;
    for (tag, data) in subrecords(&payload)? {
        if tag == RecordTag::HEDR {
            if data.len() < HEDR_SIZE {
                return Err(LandError::UnsupportedFormat(format!(
                    "HEDR is {} bytes, expected {HEDR_SIZE}",
                    data.len()
                )));
            }
            let hedr = Hedr::read(&mut Cursor::new(data))?;
            header = Some(PluginHeader::from_hedr(&hedr));
        }
    }

    header.ok_or_else(|| LandError::UnsupportedFormat("TES3 record has no HEDR".to_string()))
}

/// Split a record payload into `(tag, payload)` subrecords
fn subrecords(payload: &[u8]) -> Result<Vec<(RecordTag, &[u8])>> {
    let mut cursor = Cursor::new(payload);
    let mut out = Vec::new();
    while (cursor.position() as usize) < payload.len() {
        let header = SubrecordHeader::read(&mut cursor)?;
        let start = cursor.position() as usize;
        let stop = start + header.size as usize;
        let data = payload.get(start..stop).ok_or_else(|| {
            LandError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("{} subrecord runs past the end of its record", header.tag),
            ))
        })?;
        out.push((header.tag, data));
        cursor.set_position(stop as u64);
    }
    Ok(out)
}

fn parse_land(payload: &[u8]) -> Result<(CellCoord, LandRecord)> {
    let mut record = LandRecord::new();
    for (tag, data) in subrecords(payload)? {
        match SubrecordKind::from_tag(tag) {
            Some(kind) => {
                record.insert(kind, data.to_vec());
            }
            None => debug!("Skipping unknown LAND subrecord {tag}"),
        }
    }

    let cell = record
        .get(SubrecordKind::CellCoord)
        .and_then(CellCoord::from_bytes)
        .ok_or_else(|| {
            LandError::malformed(
                CellCoord::default(),
                RecordTag::INTV,
                "LAND record has no valid cell coordinates",
            )
        })?;
    Ok((cell, record))
}

/// Write a plugin file
pub fn write_plugin_file<P: AsRef<Path>>(
    path: P,
    land: &LandStore,
    header: &PluginHeader,
) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_plugin(&mut writer, land, header)?;
    writer.flush()?;
    info!("Wrote {} cells to {}", land.len(), path.display());
    Ok(())
}

/// Write a plugin: the `TES3` header, then a `CELL` and `LAND` record per
/// cell in row-major order. `num_records` is filled in from the store.
pub fn write_plugin<W: Write + Seek>(
    writer: &mut W,
    land: &LandStore,
    header: &PluginHeader,
) -> Result<()> {
    let header = PluginHeader {
        num_records: payload_size(land.len() * 2)?,
        ..header.clone()
    };

    let mut hedr = Cursor::new(Vec::with_capacity(HEDR_SIZE));
    header.to_hedr().write(&mut hedr)?;
    write_record(
        writer,
        RecordTag::TES3,
        &[(RecordTag::HEDR, hedr.get_ref().as_slice())],
    )?;

    for (cell, record) in land.iter() {
        let mut cell_data = Vec::with_capacity(12);
        cell_data.extend_from_slice(&0u32.to_le_bytes());
        cell_data.extend_from_slice(&cell.to_bytes());
        write_record(
            writer,
            RecordTag::CELL,
            &[(RecordTag::NAME, &[0u8][..]), (RecordTag::DATA, &cell_data[..])],
        )?;

        let subrecords: Vec<_> = record.iter().map(|(kind, data)| (kind.tag(), data)).collect();
        write_record(writer, RecordTag::LAND, &subrecords)?;
        debug!("Wrote CELL and LAND for {cell}");
    }
    Ok(())
}

fn write_record<W: Write + Seek>(
    writer: &mut W,
    tag: RecordTag,
    subrecords: &[(RecordTag, &[u8])],
) -> Result<()> {
    let size: usize = subrecords
        .iter()
        .map(|(_, data)| SubrecordHeader::SIZE + data.len())
        .sum();
    RecordHeader::new(tag, size)?.write(writer)?;

    for &(tag, data) in subrecords {
        SubrecordHeader {
            tag,
            size: payload_size(data.len())?,
        }
        .write(writer)?;
        writer.write_all(data)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordStore;
    use pretty_assertions::assert_eq;

    fn land_with(cell: CellCoord) -> LandStore {
        let mut store = LandStore::new();
        store
            .write_subrecord(cell, SubrecordKind::CellCoord, cell.to_bytes().to_vec())
            .unwrap();
        store
            .write_subrecord(cell, SubrecordKind::Flags, 1u32.to_le_bytes().to_vec())
            .unwrap();
        store
    }

    #[test]
    fn header_sizes() {
        let mut cursor = Cursor::new(Vec::new());
        RecordHeader::new(RecordTag::LAND, 10).unwrap().write(&mut cursor).unwrap();
        assert_eq!(cursor.get_ref().len(), RecordHeader::SIZE);

        let mut cursor = Cursor::new(Vec::new());
        PluginHeader::default().to_hedr().write(&mut cursor).unwrap();
        assert_eq!(cursor.get_ref().len(), HEDR_SIZE);
    }

    #[test]
    fn write_then_read() {
        let store = land_with(CellCoord::new(-2, 7));
        let mut cursor = Cursor::new(Vec::new());
        write_plugin(&mut cursor, &store, &PluginHeader::default()).unwrap();

        let plugin = read_plugin(&mut cursor).unwrap();
        assert_eq!(plugin.land, store);
        assert_eq!(plugin.header.author, "TESAnnwyn");
        assert_eq!(plugin.header.num_records, 2);
        assert_eq!(plugin.record_counts.get(&RecordTag::CELL), Some(&1));
        assert_eq!(plugin.record_counts.get(&RecordTag::LAND), Some(&1));
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let mut cursor = Cursor::new(b"TES4\0\0\0\0\0\0\0\0\0\0\0\0".to_vec());
        let err = read_plugin(&mut cursor).unwrap_err();
        assert!(matches!(
            err,
            LandError::InvalidMagic { found, .. } if found == RecordTag(*b"TES4")
        ));
    }

    #[test]
    fn land_without_intv_is_malformed() {
        let mut cursor = Cursor::new(Vec::new());
        write_plugin(&mut cursor, &LandStore::new(), &PluginHeader::default()).unwrap();
        write_record(
            &mut cursor,
            RecordTag::LAND,
            &[(RecordTag::DATA, &1u32.to_le_bytes()[..])],
        )
        .unwrap();

        let err = read_plugin(&mut cursor).unwrap_err();
        assert!(matches!(err, LandError::MalformedRecord { tag: RecordTag::INTV, .. }));
    }

    fn plugin_then(tag: RecordTag, size: u32) -> Cursor<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        write_plugin(&mut cursor, &LandStore::new(), &PluginHeader::default()).unwrap();
        RecordHeader {
            tag,
            size,
            header1: 0,
            flags: 0,
        }
        .write(&mut cursor)
        .unwrap();
        cursor.write_all(&[0u8; 32]).unwrap();
        cursor
    }

    #[test]
    fn oversized_record_fails_without_reading() {
        for tag in [RecordTag::LAND, RecordTag::CELL] {
            let err = read_plugin(&mut plugin_then(tag, u32::MAX)).unwrap_err();
            match err {
                LandError::Io(io) => {
                    assert_eq!(io.kind(), std::io::ErrorKind::UnexpectedEof);
                    assert!(io.to_string().contains(&tag.to_string()));
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn record_filling_the_rest_of_the_file_is_read() {
        let plugin = read_plugin(&mut plugin_then(RecordTag::CELL, 32)).unwrap();
        assert_eq!(plugin.record_counts.get(&RecordTag::CELL), Some(&1));
    }

    #[test]
    fn long_author_is_truncated() {
        let header = PluginHeader {
            author: "x".repeat(40),
            ..PluginHeader::default()
        };
        let hedr = header.to_hedr();
        assert_eq!(fixed_string(&hedr.author).len(), AUTHOR_LEN - 1);
    }
}
