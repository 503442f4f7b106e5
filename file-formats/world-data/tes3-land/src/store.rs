//! Record store: where the pipelines read and write LAND subrecords
//!
//! [`RecordStore`] is the boundary between the codec and the plugin file.
//! [`LandStore`] keeps every cell's subrecords in memory and is what
//! [`crate::plugin`] reads into and writes out of.

use std::collections::BTreeMap;
use std::collections::btree_map;

use log::trace;

use crate::color::VCLR_SIZE;
use crate::error::{LandError, Result};
use crate::height::{VHGT_DATA_SIZE, VHGT_PADDED_SIZE};
use crate::normals::{VNML_SIZE, WNAM_SIZE};
use crate::tag::RecordTag;
use crate::texture::VTEX_SIZE;
use crate::types::CellCoord;

/// `DATA` flag: heights, normals and world map data present
pub const FLAG_HEIGHTS: u32 = 0x1;
/// `DATA` flag: vertex colours present
pub const FLAG_COLORS: u32 = 0x2;
/// `DATA` flag: texture indices present
pub const FLAG_TEXTURES: u32 = 0x4;

/// LAND subrecords the codec knows, in the order the game writes them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubrecordKind {
    /// `INTV`: cell grid coordinates
    CellCoord,
    /// `DATA`: presence flags
    Flags,
    /// `VNML`: vertex normals
    Normals,
    /// `VHGT`: delta-encoded heights
    Height,
    /// `WNAM`: world map heights
    WorldMap,
    /// `VCLR`: vertex colours
    Color,
    /// `VTEX`: texture indices
    Texture,
}

impl SubrecordKind {
    /// Every kind, in write order
    pub const ALL: [Self; 7] = [
        Self::CellCoord,
        Self::Flags,
        Self::Normals,
        Self::Height,
        Self::WorldMap,
        Self::Color,
        Self::Texture,
    ];

    /// Subrecord tag
    pub fn tag(&self) -> RecordTag {
        match self {
            Self::CellCoord => RecordTag::INTV,
            Self::Flags => RecordTag::DATA,
            Self::Normals => RecordTag::VNML,
            Self::Height => RecordTag::VHGT,
            Self::WorldMap => RecordTag::WNAM,
            Self::Color => RecordTag::VCLR,
            Self::Texture => RecordTag::VTEX,
        }
    }

    /// Kind for a subrecord tag
    pub fn from_tag(tag: RecordTag) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Payload size this crate writes
    pub fn expected_len(&self) -> usize {
        match self {
            Self::CellCoord => 8,
            Self::Flags => 4,
            Self::Normals => VNML_SIZE,
            Self::Height => VHGT_PADDED_SIZE,
            Self::WorldMap => WNAM_SIZE,
            Self::Color => VCLR_SIZE,
            Self::Texture => VTEX_SIZE,
        }
    }

    /// Whether a payload size is valid for this kind. `VHGT` is accepted
    /// with or without its trailing padding.
    pub fn accepts_len(&self, len: usize) -> bool {
        match self {
            Self::Height => len == VHGT_PADDED_SIZE || len == VHGT_DATA_SIZE,
            other => len == other.expected_len(),
        }
    }
}

/// Read and write access to LAND subrecords keyed by cell
pub trait RecordStore {
    /// Payload of one subrecord, `None` when the cell or subrecord is absent
    fn read_subrecord(&self, cell: CellCoord, kind: SubrecordKind) -> Result<Option<Vec<u8>>>;

    /// Store one subrecord, replacing any previous payload of that kind
    fn write_subrecord(&mut self, cell: CellCoord, kind: SubrecordKind, bytes: Vec<u8>)
    -> Result<()>;

    /// Cells with LAND data, in row-major order
    fn list_cells(&self) -> Vec<CellCoord>;
}

/// Subrecords of one cell's LAND record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LandRecord {
    subrecords: BTreeMap<SubrecordKind, Vec<u8>>,
}

impl LandRecord {
    /// Empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload of one subrecord
    pub fn get(&self, kind: SubrecordKind) -> Option<&[u8]> {
        self.subrecords.get(&kind).map(Vec::as_slice)
    }

    /// Store a payload, returning the one it replaced
    pub fn insert(&mut self, kind: SubrecordKind, bytes: Vec<u8>) -> Option<Vec<u8>> {
        self.subrecords.insert(kind, bytes)
    }

    /// Whether the subrecord is present
    pub fn contains(&self, kind: SubrecordKind) -> bool {
        self.subrecords.contains_key(&kind)
    }

    /// Subrecords in write order
    pub fn iter(&self) -> impl Iterator<Item = (SubrecordKind, &[u8])> {
        self.subrecords
            .iter()
            .map(|(kind, bytes)| (*kind, bytes.as_slice()))
    }

    /// `DATA` flags, zero when absent or short
    pub fn flags(&self) -> u32 {
        self.get(SubrecordKind::Flags)
            .and_then(|b| b.get(..4))
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .unwrap_or(0)
    }

    /// Sum of payload sizes plus a subrecord header each
    pub fn encoded_len(&self) -> usize {
        self.subrecords.values().map(|b| 8 + b.len()).sum()
    }
}

/// In-memory record store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LandStore {
    cells: BTreeMap<CellCoord, LandRecord>,
}

impl LandStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cells with LAND data
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the store holds no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// LAND record of one cell
    pub fn record(&self, cell: CellCoord) -> Option<&LandRecord> {
        self.cells.get(&cell)
    }

    /// Put a whole LAND record, replacing any earlier record for the cell
    pub fn insert_record(&mut self, cell: CellCoord, record: LandRecord) -> Option<LandRecord> {
        self.cells.insert(cell, record)
    }

    /// Cells and records in row-major order
    pub fn iter(&self) -> btree_map::Iter<'_, CellCoord, LandRecord> {
        self.cells.iter()
    }

    /// Layer another store on top of this one. A cell present in both takes
    /// the other store's record wholesale. Returns how many cells were
    /// replaced.
    pub fn overlay(&mut self, other: LandStore) -> usize {
        let mut replaced = 0;
        for (cell, record) in other.cells {
            if self.cells.insert(cell, record).is_some() {
                replaced += 1;
            }
        }
        replaced
    }
}

impl RecordStore for LandStore {
    fn read_subrecord(&self, cell: CellCoord, kind: SubrecordKind) -> Result<Option<Vec<u8>>> {
        Ok(self
            .cells
            .get(&cell)
            .and_then(|record| record.get(kind))
            .map(<[u8]>::to_vec))
    }

    fn write_subrecord(
        &mut self,
        cell: CellCoord,
        kind: SubrecordKind,
        bytes: Vec<u8>,
    ) -> Result<()> {
        if !kind.accepts_len(bytes.len()) {
            return Err(LandError::malformed(
                cell,
                kind.tag(),
                format!(
                    "expected {} bytes, found {}",
                    kind.expected_len(),
                    bytes.len()
                ),
            ));
        }
        if kind == SubrecordKind::CellCoord && CellCoord::from_bytes(&bytes) != Some(cell) {
            return Err(LandError::malformed(
                cell,
                kind.tag(),
                "coordinates do not match the cell",
            ));
        }

        trace!("{cell} {}: {} bytes", kind.tag(), bytes.len());
        self.cells.entry(cell).or_default().insert(kind, bytes);
        Ok(())
    }

    fn list_cells(&self) -> Vec<CellCoord> {
        self.cells.keys().copied().collect()
    }
}
