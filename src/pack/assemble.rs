#![forbid(unsafe_code)]

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::pack::archive::{ArchiveOptions, ArchiveWriter};
use crate::pack::entry::write_entry;
use crate::pack::error::{PackError, PackResult};
use crate::pack::format::Compression;
use crate::pack::io::stream_copy;
use crate::pack::walk::enumerate;

/// Everything one run needs, already split out of the command line.
#[derive(Debug, Clone)]
pub struct PackRequest {
    pub assets: Vec<PathBuf>,
    pub binary: PathBuf,
    pub output: PathBuf,
    pub compression: Compression,
    /// Also write explicit records for directories.
    pub include_dirs: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackSummary {
    pub binary_len: u64,
    pub entries: usize,
    pub output_len: u64,
}

/// Steps of a run, reported in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackStage {
    BinaryOpened,
    OutputCreated,
    BinaryCopied(u64),
    ArchiveOpened(u64),
    EntryWritten(String),
    ArchiveFinalized,
    Done,
}

impl PackStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackStage::BinaryOpened => "binary-opened",
            PackStage::OutputCreated => "output-created",
            PackStage::BinaryCopied(_) => "binary-copied",
            PackStage::ArchiveOpened(_) => "archive-opened",
            PackStage::EntryWritten(_) => "entry-written",
            PackStage::ArchiveFinalized => "archive-finalized",
            PackStage::Done => "done",
        }
    }
}

pub fn pack(req: &PackRequest) -> PackResult<PackSummary> {
    pack_with_progress(req, |stage| match &stage {
        PackStage::EntryWritten(name) => trace!("{}: {name}", stage.as_str()),
        PackStage::BinaryCopied(len) | PackStage::ArchiveOpened(len) => {
            debug!("{}: {len}", stage.as_str())
        }
        _ => debug!("{}", stage.as_str()),
    })
}

/// Copy the binary, then append a zip whose offsets count from the start of
/// the output file.
///
/// The output is staged in a temporary file next to `req.output` and renamed
/// into place only once the archive is complete, so a failed run leaves
/// nothing behind.
pub fn pack_with_progress<F>(req: &PackRequest, mut progress: F) -> PackResult<PackSummary>
where
    F: FnMut(PackStage),
{
    let mut bin = File::open(&req.binary).map_err(|e| PackError::at(&req.binary, e))?;
    let bin_meta = bin.metadata()?;
    if !bin_meta.is_file() {
        return Err(PackError::Invalid(format!(
            "{} is not a regular file",
            req.binary.display()
        )));
    }
    progress(PackStage::BinaryOpened);

    let dir = output_dir(&req.output);
    let tmp = NamedTempFile::new_in(dir).map_err(|e| PackError::at(dir, e))?;
    progress(PackStage::OutputCreated);

    let mut out = BufWriter::new(tmp.as_file());
    let copied = copy_binary(&mut bin, bin_meta.len(), &mut out)?;
    drop(bin);
    progress(PackStage::BinaryCopied(copied));

    let mut archive = ArchiveWriter::new(
        out,
        ArchiveOptions {
            base_offset: copied,
            compression: req.compression,
        },
    )?;
    progress(PackStage::ArchiveOpened(copied));

    let own = own_paths(tmp.path(), &req.output);
    for asset in &req.assets {
        let root = fs::canonicalize(asset).map_err(|e| PackError::at(asset, e))?;
        for entry in enumerate(&root, req.include_dirs)?.skipping(&own) {
            let entry = entry?;
            write_entry(&mut archive, &entry)?;
            progress(PackStage::EntryWritten(entry.archive_path));
        }
    }

    let entries = archive.len();
    let out = archive.finish()?;
    let file = out.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    let output_len = file.metadata()?.len();
    progress(PackStage::ArchiveFinalized);

    // keep the binary's mode so an executable stays executable
    fs::set_permissions(tmp.path(), bin_meta.permissions())?;
    tmp.persist(&req.output)
        .map_err(|e| PackError::at(&req.output, e.error))?;
    progress(PackStage::Done);

    let summary = PackSummary {
        binary_len: copied,
        entries,
        output_len,
    };
    info!(
        "wrote {} ({} byte binary + {} entries, {} bytes)",
        req.output.display(),
        summary.binary_len,
        summary.entries,
        summary.output_len
    );
    Ok(summary)
}

/// Copy the first `expected` bytes of `bin` into `out`. Bytes appended after
/// the length was taken are not copied.
fn copy_binary<R, W>(bin: &mut R, expected: u64, out: &mut W) -> PackResult<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let copied = stream_copy(&mut Read::take(&mut *bin, expected), out)?;
    if copied != expected {
        return Err(PackError::ShortCopy { expected, copied });
    }
    Ok(copied)
}

/// The staging file and the final output, as the walk would report them.
/// A directory asset that contains either must not pack it.
fn own_paths(staging: &Path, output: &Path) -> Vec<PathBuf> {
    let mut own = Vec::with_capacity(2);
    if let Ok(p) = fs::canonicalize(staging) {
        own.push(p);
    }
    if let (Ok(dir), Some(name)) = (fs::canonicalize(output_dir(output)), output.file_name()) {
        own.push(dir.join(name));
    }
    own
}

fn output_dir(output: &Path) -> &Path {
    match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}
