#![forbid(unsafe_code)]

use std::collections::HashSet;
use std::io::{Read, Seek, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::pack::error::{PackError, PackResult};
use crate::pack::format::{Compression, EntryMeta, U32_SENTINEL};
use crate::pack::io::stream_copy;

#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveOptions {
    /// Number of bytes already in the file before the archive starts.
    /// The writer must be positioned exactly here.
    pub base_offset: u64,
    pub compression: Compression,
}

/// Zip encoder over an output that already holds `base_offset` bytes.
///
/// `ZipWriter` records every offset from the stream position, so once the
/// position is checked against `base_offset` the stored offsets count from
/// the start of the whole file.
pub struct ArchiveWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    compression: Compression,
    names: HashSet<String>,
}

impl<W: Write + Seek> ArchiveWriter<W> {
    pub fn new(mut inner: W, options: ArchiveOptions) -> PackResult<Self> {
        let pos = inner.stream_position()?;
        if pos != options.base_offset {
            return Err(PackError::Invalid(format!(
                "archive would start at {pos}, expected {}",
                options.base_offset
            )));
        }
        Ok(ArchiveWriter {
            zip: ZipWriter::new(inner),
            compression: options.compression,
            names: HashSet::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Start a file entry named `name` and stream all of `src` into it.
    /// Returns the number of uncompressed bytes written.
    pub fn add_file(&mut self, name: &str, meta: EntryMeta, src: &mut dyn Read) -> PackResult<u64> {
        self.claim(name)?;

        let options = self.file_options(&meta);
        self.zip
            .start_file(name, options)
            .map_err(|e| PackError::entry(name, e.to_string()))?;
        Ok(stream_copy(src, &mut self.zip)?)
    }

    /// Add an empty directory record. A trailing `/` is appended if missing.
    pub fn add_directory(&mut self, name: &str, meta: EntryMeta) -> PackResult<()> {
        let name = if name.ends_with('/') {
            name.to_string()
        } else {
            format!("{name}/")
        };
        self.claim(&name)?;

        let options = FileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .last_modified_time(meta.modified)
            .unix_permissions(meta.mode);
        self.zip
            .add_directory(name.as_str(), options)
            .map_err(|e| PackError::entry(&name, e.to_string()))
    }

    /// Write the central directory and trailer, returning the inner writer.
    pub fn finish(mut self) -> PackResult<W> {
        Ok(self.zip.finish()?)
    }

    fn file_options(&self, meta: &EntryMeta) -> FileOptions {
        let options = FileOptions::default()
            .last_modified_time(meta.modified)
            .unix_permissions(meta.mode)
            .large_file(meta.size >= U32_SENTINEL);
        match self.compression {
            Compression::Stored => options.compression_method(CompressionMethod::Stored),
            Compression::Deflated(level) => options
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(level as i32)),
        }
    }

    fn claim(&mut self, name: &str) -> PackResult<()> {
        if name.is_empty() || name == "/" {
            return Err(PackError::entry(name, "empty name"));
        }
        if name.len() > u16::MAX as usize {
            return Err(PackError::entry(name, "name longer than 65535 bytes"));
        }
        if !self.names.insert(name.to_string()) {
            return Err(PackError::entry(name, "duplicate entry name"));
        }
        Ok(())
    }
}
