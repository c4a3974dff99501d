#![forbid(unsafe_code)]

use std::fs::{self, File};
use std::io::{Read, Seek, Write};

use crate::pack::archive::ArchiveWriter;
use crate::pack::error::{PackError, PackResult};
use crate::pack::format::{dos_time, EntryMeta};
use crate::pack::path::entry_name;
use crate::pack::walk::AssetEntry;

/// Stream one enumerated asset into the archive. Returns bytes read from the
/// source.
pub fn write_entry<W: Write + Seek>(archive: &mut ArchiveWriter<W>, entry: &AssetEntry) -> PackResult<u64> {
    let md = fs::metadata(&entry.source).map_err(|e| PackError::at(&entry.source, e))?;
    let meta = entry_meta(&md, entry.is_dir);

    if entry.is_dir {
        archive.add_directory(&entry_name(&entry.archive_path), meta)?;
        trace!("dir  {}", entry.archive_path);
        return Ok(0);
    }

    let mut f = File::open(&entry.source).map_err(|e| PackError::at(&entry.source, e))?;
    let n = write_source(archive, &entry.archive_path, meta, &mut f)?;
    trace!("file {} ({n} bytes)", entry.archive_path);
    Ok(n)
}

/// Open an entry named `path` (separators normalized) and copy `src` into it.
pub fn write_source<W: Write + Seek>(
    archive: &mut ArchiveWriter<W>,
    path: &str,
    meta: EntryMeta,
    src: &mut dyn Read,
) -> PackResult<u64> {
    archive.add_file(&entry_name(path), meta, src)
}

fn entry_meta(md: &fs::Metadata, is_dir: bool) -> EntryMeta {
    let modified = md
        .modified()
        .map(dos_time)
        .unwrap_or_default();

    #[cfg(unix)]
    let mode = {
        use std::os::unix::fs::PermissionsExt;
        md.permissions().mode() & 0o7777
    };
    #[cfg(not(unix))]
    let mode = match (is_dir, md.permissions().readonly()) {
        (true, _) => 0o755,
        (false, true) => 0o444,
        (false, false) => 0o644,
    };

    EntryMeta {
        modified,
        mode,
        size: if is_dir { 0 } else { md.len() },
        is_dir,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::archive::ArchiveOptions;
    use crate::pack::format::Compression;
    use std::io::{self, Cursor, ErrorKind};
    use std::path::PathBuf;

    fn archive(compression: Compression) -> ArchiveWriter<Cursor<Vec<u8>>> {
        ArchiveWriter::new(
            Cursor::new(Vec::new()),
            ArchiveOptions {
                base_offset: 0,
                compression,
            },
        )
        .unwrap()
    }

    struct FailsMidway(usize);

    impl Read for FailsMidway {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0 == 0 {
                return Err(io::Error::new(ErrorKind::Other, "disk went away"));
            }
            self.0 -= 1;
            buf[0] = b'x';
            Ok(1)
        }
    }

    #[test]
    fn read_failure_propagates() {
        let mut zip = archive(Compression::default());
        let err = write_source(&mut zip, "a", EntryMeta::default(), &mut FailsMidway(3)).unwrap_err();
        assert!(matches!(err, PackError::Io(ref e) if e.kind() == ErrorKind::Other));
    }

    #[test]
    fn backslashes_become_slashes() {
        let mut zip = archive(Compression::Stored);
        write_source(&mut zip, "dir\\x.txt", EntryMeta::default(), &mut &b"x"[..]).unwrap();
        let bytes = zip.finish().unwrap().into_inner();
        let zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(zip.file_names().collect::<Vec<_>>(), vec!["dir/x.txt"]);
    }

    #[test]
    fn missing_source_is_not_found() {
        let mut zip = archive(Compression::default());
        let entry = AssetEntry {
            archive_path: "gone.txt".into(),
            source: PathBuf::from("/definitely/not/here/gone.txt"),
            is_dir: false,
        };
        assert!(matches!(
            write_entry(&mut zip, &entry),
            Err(PackError::NotFound(_))
        ));
        assert!(zip.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn mode_is_recorded() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let script = tmp.path().join("run.sh");
        fs::write(&script, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let mut zip = archive(Compression::default());
        let entry = AssetEntry {
            archive_path: "run.sh".into(),
            source: script,
            is_dir: false,
        };
        write_entry(&mut zip, &entry).unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(zip.by_name("run.sh").unwrap().unix_mode(), Some(0o100755));
    }
}
