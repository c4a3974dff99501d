#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::pack::error::{PackError, PackResult};
use crate::pack::path::{base_name, normalize_rel_path, prefixed};

/// One packaged item: where it comes from and what it is called inside the
/// archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry {
    pub archive_path: String,
    pub source: PathBuf,
    pub is_dir: bool,
}

enum Source {
    Single(Option<AssetEntry>),
    Walk(walkdir::IntoIter),
}

/// Lazy, single-pass sequence of the entries below one asset argument.
pub struct Assets {
    root: PathBuf,
    prefix: String,
    include_dirs: bool,
    skip: Vec<PathBuf>,
    source: Source,
}

/// Classify `root` and prepare its entries.
///
/// A file yields one entry named by its base name. A directory yields every
/// non-directory below it as `<dir name>/<relative path>`, plus the
/// directories themselves when `include_dirs` is set. Order follows the file
/// system and is not sorted.
pub fn enumerate(root: &Path, include_dirs: bool) -> PackResult<Assets> {
    let meta = std::fs::metadata(root).map_err(|e| PackError::at(root, e))?;
    let prefix = base_name(root);

    let source = if meta.is_dir() {
        Source::Walk(WalkDir::new(root).follow_links(false).into_iter())
    } else {
        if prefix.is_empty() {
            return Err(PackError::Invalid(format!(
                "{} has no file name",
                root.display()
            )));
        }
        Source::Single(Some(AssetEntry {
            archive_path: prefix.clone(),
            source: root.to_path_buf(),
            is_dir: false,
        }))
    };

    Ok(Assets {
        root: root.to_path_buf(),
        prefix,
        include_dirs,
        skip: Vec::new(),
        source,
    })
}

impl Assets {
    /// Leave out entries whose source is one of `paths`. Paths are compared
    /// as given, so pass them canonicalized like the walk root.
    pub fn skipping(mut self, paths: &[PathBuf]) -> Self {
        self.skip.extend_from_slice(paths);
        self
    }
}

impl Iterator for Assets {
    type Item = PackResult<AssetEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let walk = match &mut self.source {
            Source::Single(entry) => {
                return entry.take().filter(|e| !self.skip.contains(&e.source)).map(Ok)
            }
            Source::Walk(walk) => walk,
        };

        loop {
            let ent = match walk.next()? {
                Ok(ent) => ent,
                Err(e) => return Some(Err(walk_error(e))),
            };

            let is_dir = ent.file_type().is_dir();
            if is_dir && !self.include_dirs {
                continue;
            }
            if ent.path_is_symlink() && ent.path().is_dir() {
                warn!("skipping symlinked directory {}", ent.path().display());
                continue;
            }
            if self.skip.iter().any(|p| p == ent.path()) {
                debug!("skipping {}", ent.path().display());
                continue;
            }

            let rel = match normalize_rel_path(&self.root, ent.path()) {
                Ok(rel) => rel,
                Err(e) => return Some(Err(e)),
            };
            let archive_path = prefixed(&self.prefix, &rel);
            if archive_path.is_empty() {
                // root of a nameless directory such as `/`
                continue;
            }

            return Some(Ok(AssetEntry {
                archive_path,
                source: ent.into_path(),
                is_dir,
            }));
        }
    }
}

fn walk_error(e: walkdir::Error) -> PackError {
    let path = e.path().map(Path::to_path_buf);
    let msg = e.to_string();
    let io = e
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, msg));
    match path {
        Some(path) => PackError::at(&path, io),
        None => PackError::Io(io),
    }
}
