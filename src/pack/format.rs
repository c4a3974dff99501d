#![forbid(unsafe_code)]

use std::time::SystemTime;

use time::OffsetDateTime;
use zip::DateTime;

/// ZIP layout of a packed file (all integers little endian):
/// - [binary prefix, `base_offset` bytes, opaque]
/// - per entry: local file header, payload (stored or raw deflate)
/// - central directory headers, one per entry
/// - [zip64 end of central directory record + locator], only when needed
/// - end of central directory record
///
/// Every offset stored in the central directory and the trailers is counted
/// from the start of the whole file, prefix included. Only the inspector
/// needs the constants below; the archive itself is written by `zip`.
pub const LOCAL_FILE_HEADER_SIGNATURE: u32 = 0x0403_4b50;
pub const CENTRAL_DIRECTORY_HEADER_SIGNATURE: u32 = 0x0201_4b50;
pub const ZIP64_EOCD_RECORD_SIGNATURE: u32 = 0x0606_4b50;
pub const ZIP64_EOCD_LOCATOR_SIGNATURE: u32 = 0x0706_4b50;
pub const EOCD_SIGNATURE: u32 = 0x0605_4b50;

pub const ZIP64_EOCD_LOCATOR_LEN: u64 = 20;
pub const EOCD_LEN: u64 = 22;

pub const ZIP64_EXTRA_TAG: u16 = 0x0001;

pub const U16_SENTINEL: u64 = 0xFFFF;
pub const U32_SENTINEL: u64 = 0xFFFF_FFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Stored,
    /// Raw deflate at the given level (0..=9).
    Deflated(u32),
}

impl Default for Compression {
    fn default() -> Self {
        Compression::Deflated(6)
    }
}

/// Zip timestamp for `t`, taken in UTC. Moments outside 1980..=2107 become
/// 1980-01-01 00:00:00.
pub fn dos_time(t: SystemTime) -> DateTime {
    let dt = OffsetDateTime::from(t);
    let Ok(year) = u16::try_from(dt.year()) else {
        return DateTime::default();
    };
    DateTime::from_date_and_time(
        year,
        dt.month().into(),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second(),
    )
    .unwrap_or_default()
}

/// Per-entry metadata carried from the source file into the headers.
#[derive(Debug, Clone, Copy)]
pub struct EntryMeta {
    pub modified: DateTime,
    /// Unix permission bits, without file type.
    pub mode: u32,
    /// Source length in bytes; large sources get zip64 local headers.
    pub size: u64,
    pub is_dir: bool,
}

impl Default for EntryMeta {
    fn default() -> Self {
        EntryMeta {
            modified: DateTime::default(),
            mode: 0o644,
            size: 0,
            is_dir: false,
        }
    }
}

/// Public view of an archive entry, as read back from a finished file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub name: String,
    /// 0 = stored, 8 = deflate
    pub method: u16,
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    /// Absolute offset of the local file header.
    pub header_offset: u64,
}

impl EntryInfo {
    pub fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }
}
