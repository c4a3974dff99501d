#![forbid(unsafe_code)]

use std::io::{self, ErrorKind, Read, Write};

use crate::pack::error::PackResult;

pub fn read_exact<const N: usize>(r: &mut dyn Read) -> PackResult<[u8; N]> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

pub fn read_u16(r: &mut dyn Read) -> PackResult<u16> {
    Ok(u16::from_le_bytes(read_exact::<2>(r)?))
}

pub fn read_u32(r: &mut dyn Read) -> PackResult<u32> {
    Ok(u32::from_le_bytes(read_exact::<4>(r)?))
}

pub fn read_u64(r: &mut dyn Read) -> PackResult<u64> {
    Ok(u64::from_le_bytes(read_exact::<8>(r)?))
}

/// Copy `src` into `dst` through a fixed buffer. Returns the number of bytes
/// read from `src`.
pub fn stream_copy<R, W>(src: &mut R, dst: &mut W) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = vec![0u8; 64 * 1024];
    let mut total = 0u64;
    loop {
        let n = match src.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        dst.write_all(&buf[..n])?;
        total += n as u64;
    }
}
