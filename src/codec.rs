//! Little-endian byte-stream codec for dictionary persistence.
//!
//! Every on-wire quantity is little-endian: vectors are a `u64` element
//! count followed by fixed-size element records, scalars are written in
//! place. The format contains no framing or checksums; a truncated or
//! corrupt stream surfaces as a [`DecodeError`] and the partially-read
//! object is discarded.

use std::io::{self, Read, Write};

/// Failure while reconstructing a dictionary from a byte source.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The underlying source failed or ended early.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The stream decoded but violates the format's structural rules.
    #[error("malformed stream: {0}")]
    Malformed(&'static str),
}

pub(crate) fn write_u8<W: Write + ?Sized>(w: &mut W, v: u8) -> io::Result<()> {
    w.write_all(&[v])
}

pub(crate) fn read_u8<R: Read>(r: &mut R) -> io::Result<u8> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub(crate) fn write_u32<W: Write + ?Sized>(w: &mut W, v: u32) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

pub(crate) fn read_u32<R: Read>(r: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub(crate) fn write_u64<W: Write + ?Sized>(w: &mut W, v: u64) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

pub(crate) fn read_u64<R: Read>(r: &mut R) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Writes a vector's length prefix.
pub(crate) fn write_len<W: Write + ?Sized>(w: &mut W, len: usize) -> io::Result<()> {
    write_u64(w, len as u64)
}

/// Reads a vector's length prefix, rejecting lengths that cannot fit in
/// memory on this host.
pub(crate) fn read_len<R: Read>(r: &mut R) -> Result<usize, DecodeError> {
    let len = read_u64(r)?;
    usize::try_from(len).map_err(|_| DecodeError::Malformed("vector length overflows usize"))
}

/// Bytes a length-prefixed vector of `elem_len`-byte records occupies.
pub(crate) fn vec_wire_len(len: usize, elem_len: usize) -> usize {
    8 + len * elem_len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_round_trip_little_endian() {
        let mut buf = Vec::new();
        write_u32(&mut buf, 0x0403_0201).unwrap();
        write_u64(&mut buf, 0x0807_0605_0403_0201).unwrap();
        assert_eq!(&buf[..4], &[1, 2, 3, 4]);
        assert_eq!(&buf[4..], &[1, 2, 3, 4, 5, 6, 7, 8]);

        let mut r = buf.as_slice();
        assert_eq!(read_u32(&mut r).unwrap(), 0x0403_0201);
        assert_eq!(read_u64(&mut r).unwrap(), 0x0807_0605_0403_0201);
    }

    #[test]
    fn truncated_scalar_is_an_io_error() {
        let mut r: &[u8] = &[1, 2];
        assert!(read_u32(&mut r).is_err());
    }
}
