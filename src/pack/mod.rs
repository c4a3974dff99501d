#![forbid(unsafe_code)]

mod archive;
mod assemble;
mod entry;
mod error;
mod format;
mod io;
mod ops;
mod path;
mod read;
mod walk;

pub use archive::{ArchiveOptions, ArchiveWriter};
pub use assemble::{pack, pack_with_progress, PackRequest, PackStage, PackSummary};
pub use entry::{write_entry, write_source};
pub use error::{PackError, PackResult};
pub use format::{dos_time, Compression, EntryInfo, EntryMeta};
pub use ops::{entries, list};
pub use walk::{enumerate, AssetEntry, Assets};
