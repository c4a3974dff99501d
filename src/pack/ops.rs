#![forbid(unsafe_code)]

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::pack::error::{PackError, PackResult};
use crate::pack::format::EntryInfo;
use crate::pack::read::{prefix_len, read_index};

/// Read the archive index of a packed file, following stored offsets only.
pub fn entries(packed: &Path) -> PackResult<Vec<EntryInfo>> {
    let f = File::open(packed).map_err(|e| PackError::at(packed, e))?;
    read_index(&mut BufReader::new(f))
}

pub fn list(packed: &Path) -> PackResult<()> {
    let entries = entries(packed)?;
    if let Some(prefix) = prefix_len(&entries) {
        println!("{}: {} byte prefix", packed.display(), prefix);
    }
    for e in &entries {
        println!(
            "{:>10} {:>10}  {}  off={}  {}",
            e.uncompressed_size,
            e.compressed_size,
            if e.method == 0 { "stored " } else { "deflate" },
            e.header_offset,
            e.name
        );
    }
    println!("{} entries", entries.len());
    Ok(())
}
