#![forbid(unsafe_code)]

use std::io::{Read, Seek, SeekFrom};

use crate::pack::error::{PackError, PackResult};
use crate::pack::format::{
    EntryInfo, CENTRAL_DIRECTORY_HEADER_SIGNATURE, EOCD_LEN, EOCD_SIGNATURE,
    LOCAL_FILE_HEADER_SIGNATURE, U16_SENTINEL, U32_SENTINEL, ZIP64_EOCD_LOCATOR_LEN,
    ZIP64_EOCD_LOCATOR_SIGNATURE, ZIP64_EOCD_RECORD_SIGNATURE, ZIP64_EXTRA_TAG,
};
use crate::pack::io::{read_u16, read_u32, read_u64};

/// Where the central directory lives, as stated by the trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Trailer {
    pub entry_count: u64,
    pub cd_size: u64,
    pub cd_offset: u64,
}

/// Scan backward from end of file for the end of central directory record.
/// The record is accepted only if its comment runs exactly to end of file.
pub(crate) fn find_eocd<R: Read + Seek>(file: &mut R) -> PackResult<u64> {
    let size = file.seek(SeekFrom::End(0))?;
    if size < EOCD_LEN {
        return Err(PackError::Invalid("file too small for a zip trailer".into()));
    }
    let lower = (size - EOCD_LEN).saturating_sub(U16_SENTINEL);

    let mut pos = size - EOCD_LEN;
    loop {
        file.seek(SeekFrom::Start(pos))?;
        if read_u32(file)? == EOCD_SIGNATURE {
            file.seek(SeekFrom::Start(pos + EOCD_LEN - 2))?;
            let comment_len = read_u16(file)? as u64;
            if pos + EOCD_LEN + comment_len == size {
                return Ok(pos);
            }
        }
        if pos == lower {
            return Err(PackError::Invalid("end of central directory not found".into()));
        }
        pos -= 1;
    }
}

pub(crate) fn read_trailer<R: Read + Seek>(file: &mut R) -> PackResult<Trailer> {
    let eocd_offset = find_eocd(file)?;
    file.seek(SeekFrom::Start(eocd_offset + 4))?;

    let _disk = read_u16(file)?;
    let _cd_disk = read_u16(file)?;
    let _count_disk = read_u16(file)?;
    let count = read_u16(file)? as u64;
    let cd_size = read_u32(file)? as u64;
    let cd_offset = read_u32(file)? as u64;

    let mut trailer = Trailer {
        entry_count: count,
        cd_size,
        cd_offset,
    };

    let zip64 = count == U16_SENTINEL || cd_size == U32_SENTINEL || cd_offset == U32_SENTINEL;
    if zip64 && eocd_offset >= ZIP64_EOCD_LOCATOR_LEN {
        file.seek(SeekFrom::Start(eocd_offset - ZIP64_EOCD_LOCATOR_LEN))?;
        if read_u32(file)? == ZIP64_EOCD_LOCATOR_SIGNATURE {
            let _disk = read_u32(file)?;
            let record_offset = read_u64(file)?;

            file.seek(SeekFrom::Start(record_offset))?;
            if read_u32(file)? != ZIP64_EOCD_RECORD_SIGNATURE {
                return Err(PackError::Invalid("bad zip64 end of central directory".into()));
            }
            // record size, versions, disk numbers, per-disk count
            file.seek(SeekFrom::Current(8 + 2 + 2 + 4 + 4 + 8))?;
            trailer.entry_count = read_u64(file)?;
            trailer.cd_size = read_u64(file)?;
            trailer.cd_offset = read_u64(file)?;
        }
    }

    if trailer.cd_offset + trailer.cd_size > eocd_offset {
        return Err(PackError::Invalid("central directory overlaps trailer".into()));
    }
    Ok(trailer)
}

/// Read the central directory and check that every stored local header
/// offset lands on a local header carrying the same name.
pub(crate) fn read_index<R: Read + Seek>(file: &mut R) -> PackResult<Vec<EntryInfo>> {
    let trailer = read_trailer(file)?;

    file.seek(SeekFrom::Start(trailer.cd_offset))?;
    let mut out: Vec<EntryInfo> = Vec::with_capacity(trailer.entry_count.min(1 << 16) as usize);
    for _ in 0..trailer.entry_count {
        out.push(read_central_header(file)?);
    }

    for e in &out {
        if e.header_offset >= trailer.cd_offset {
            return Err(PackError::Invalid(format!("entry past central directory: {}", e.name)));
        }
        file.seek(SeekFrom::Start(e.header_offset))?;
        if read_u32(file)? != LOCAL_FILE_HEADER_SIGNATURE {
            return Err(PackError::Invalid(format!(
                "no local header at offset {} for {}",
                e.header_offset, e.name
            )));
        }
        // version, flags, method, time, date, crc, sizes
        file.seek(SeekFrom::Current(22))?;
        let name_len = read_u16(file)? as usize;
        let _extra_len = read_u16(file)?;
        let mut name = vec![0u8; name_len];
        file.read_exact(&mut name)?;
        if name != e.name.as_bytes() {
            return Err(PackError::Invalid(format!("local header name mismatch: {}", e.name)));
        }
    }

    Ok(out)
}

fn read_central_header<R: Read + Seek>(file: &mut R) -> PackResult<EntryInfo> {
    if read_u32(file)? != CENTRAL_DIRECTORY_HEADER_SIGNATURE {
        return Err(PackError::Invalid("bad central directory header".into()));
    }
    let _made_by = read_u16(file)?;
    let _needed = read_u16(file)?;
    let _flags = read_u16(file)?;
    let method = read_u16(file)?;
    let _time = read_u16(file)?;
    let _date = read_u16(file)?;
    let crc32 = read_u32(file)?;
    let mut compressed_size = read_u32(file)? as u64;
    let mut uncompressed_size = read_u32(file)? as u64;
    let name_len = read_u16(file)? as usize;
    let extra_len = read_u16(file)? as usize;
    let comment_len = read_u16(file)? as i64;
    let _disk_start = read_u16(file)?;
    let _internal = read_u16(file)?;
    let _external = read_u32(file)?;
    let mut header_offset = read_u32(file)? as u64;

    let mut name = vec![0u8; name_len];
    file.read_exact(&mut name)?;
    let name = String::from_utf8(name)
        .map_err(|_| PackError::Invalid("entry name is not utf8".into()))?;

    let mut extra = vec![0u8; extra_len];
    file.read_exact(&mut extra)?;
    file.seek(SeekFrom::Current(comment_len))?;

    let mut cur = std::io::Cursor::new(extra);
    while (cur.position() as usize) + 4 <= extra_len {
        let tag = read_u16(&mut cur)?;
        let len = read_u16(&mut cur)? as u64;
        if tag != ZIP64_EXTRA_TAG {
            cur.seek(SeekFrom::Current(len as i64))?;
            continue;
        }
        if uncompressed_size == U32_SENTINEL {
            uncompressed_size = read_u64(&mut cur)?;
        }
        if compressed_size == U32_SENTINEL {
            compressed_size = read_u64(&mut cur)?;
        }
        if header_offset == U32_SENTINEL {
            header_offset = read_u64(&mut cur)?;
        }
        break;
    }

    Ok(EntryInfo {
        name,
        method,
        crc32,
        compressed_size,
        uncompressed_size,
        header_offset,
    })
}

/// Bytes before the first local header: the prepended binary.
pub(crate) fn prefix_len(entries: &[EntryInfo]) -> Option<u64> {
    entries.iter().map(|e| e.header_offset).min()
}
