use binrw::{BinRead, BinWrite};
use std::fmt;

/// 4-byte record or subrecord identifier.
///
/// TES3 stores identifiers in reading order, so the bytes on disk for a
/// `LAND` record are literally `b"LAND"`.
///
/// ```rust
/// use tes3_land::tag::RecordTag;
///
/// assert_eq!(RecordTag::VHGT.as_str(), "VHGT");
/// assert_eq!(RecordTag::from_bytes(*b"LAND"), RecordTag::LAND);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, BinRead, BinWrite)]
pub struct RecordTag(pub [u8; 4]);

impl RecordTag {
    // Records

    /// Plugin header record
    pub const TES3: Self = Self(*b"TES3");

    /// Cell record (interior or exterior)
    pub const CELL: Self = Self(*b"CELL");

    /// Landscape record, one per exterior cell
    pub const LAND: Self = Self(*b"LAND");

    // TES3 header subrecords

    /// Plugin header data (version, type, author, description, record count)
    pub const HEDR: Self = Self(*b"HEDR");

    // CELL subrecords

    /// Cell name (empty string for unnamed exterior cells)
    pub const NAME: Self = Self(*b"NAME");

    // Shared by CELL and LAND

    /// CELL: flags and grid position. LAND: presence flags.
    pub const DATA: Self = Self(*b"DATA");

    // LAND subrecords

    /// Cell grid coordinates (two i32)
    pub const INTV: Self = Self(*b"INTV");

    /// Vertex normals, 65x65 signed xyz triples
    pub const VNML: Self = Self(*b"VNML");

    /// Vertex heights: f32 offset plus 65x65 i8 deltas
    pub const VHGT: Self = Self(*b"VHGT");

    /// World map heights, 9x9 i8
    pub const WNAM: Self = Self(*b"WNAM");

    /// Vertex colours, 65x65 RGB triples
    pub const VCLR: Self = Self(*b"VCLR");

    /// Texture indices, 16x16 u16
    pub const VTEX: Self = Self(*b"VTEX");

    /// Create a tag from its raw bytes
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Tag as a string slice, `"????"` if the bytes are not ASCII
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("????")
    }
}

impl fmt::Display for RecordTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.iter().all(u8::is_ascii_graphic) {
            f.write_str(self.as_str())
        } else {
            write!(f, "{:02X?}", self.0)
        }
    }
}
