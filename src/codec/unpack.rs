//! Backward bit-stream LZ codec used by packed assets.
//!
//! A packed buffer is self-describing from its end: the last three big-endian words are the
//! unpacked size, a checksum seed and the first bit word. Bits are consumed least significant
//! first, words are fetched walking towards the start of the buffer, and output is produced from
//! the end of the destination towards its start. Every fetched word is xor-ed into the seed; a
//! valid stream leaves it at zero.

use crate::foundation::error::{EngineError, EngineResult};

/// Largest unpacked size accepted from a packed trailer or an archive directory.
pub const MAX_UNPACKED_SIZE: usize = 0x40_0000;

/// Opaque decompression primitive with a checksum-validated contract.
pub trait Codec {
    /// Decompress the stream that ends at the end of `src` into the front of `dst`.
    ///
    /// Returns `false` when the integrity check fails or the stream does not fit `dst`.
    fn decompress(&self, dst: &mut [u8], src: &[u8]) -> bool;
}

/// Unpacked size recorded in the trailer of a packed buffer.
pub fn unpacked_size(src: &[u8]) -> Option<usize> {
    let tail = src.len().checked_sub(4)?;
    let word: [u8; 4] = src.get(tail..)?.try_into().ok()?;
    Some(u32::from_be_bytes(word) as usize)
}

/// Unpack `src` with `codec` into a buffer sized from its trailer.
///
/// `expected` is a size declared elsewhere (an archive directory, a chunk header) that the
/// trailer must agree with. Sizes above [`MAX_UNPACKED_SIZE`] are refused before allocating.
pub fn unpack_to_vec(
    codec: &dyn Codec,
    src: &[u8],
    expected: Option<usize>,
    what: &str,
) -> EngineResult<Vec<u8>> {
    let size = unpacked_size(src)
        .ok_or_else(|| EngineError::size_mismatch(format!("'{what}' too short to unpack")))?;
    if let Some(expected) = expected
        && expected != size
    {
        return Err(EngineError::size_mismatch(format!(
            "'{what}' unpacks to {size} bytes, expected {expected}"
        )));
    }
    if size > MAX_UNPACKED_SIZE {
        return Err(EngineError::allocation(format!(
            "'{what}' unpacks to {size} bytes, max {MAX_UNPACKED_SIZE}"
        )));
    }
    let mut out = Vec::new();
    out.try_reserve_exact(size)
        .map_err(|e| EngineError::allocation(format!("'{what}' needs {size} bytes: {e}")))?;
    out.resize(size, 0);
    if !codec.decompress(&mut out, src) {
        return Err(EngineError::checksum(format!("bad CRC for '{what}'")));
    }
    Ok(out)
}

/// Default codec implementation.
#[derive(Clone, Copy, Debug, Default)]
pub struct BackwardLz;

impl Codec for BackwardLz {
    fn decompress(&self, dst: &mut [u8], src: &[u8]) -> bool {
        Unpacker::run(dst, src).unwrap_or(false)
    }
}

struct Unpacker<'a> {
    src: &'a [u8],
    src_pos: usize,
    dst: &'a mut [u8],
    dst_pos: usize,
    chk: u32,
    crc: u32,
    size: usize,
    remaining: i64,
}

impl<'a> Unpacker<'a> {
    fn run(dst: &'a mut [u8], src: &'a [u8]) -> Option<bool> {
        let mut u = Unpacker {
            src,
            src_pos: src.len(),
            dst,
            dst_pos: 0,
            chk: 0,
            crc: 0,
            size: 0,
            remaining: 0,
        };
        let datasize = u.fetch()? as usize;
        if datasize > u.dst.len() {
            return None;
        }
        u.dst_pos = datasize;
        u.remaining = datasize as i64;
        u.crc = u.fetch()?;
        u.chk = u.fetch()?;
        u.crc ^= u.chk;

        while u.remaining > 0 {
            if !u.next_bit()? {
                u.size = 1;
                if !u.next_bit()? {
                    u.literals(3, 0)?;
                } else {
                    u.back_ref(8)?;
                }
            } else {
                let c = u.code(2)?;
                match c {
                    3 => u.literals(8, 8)?,
                    0 | 1 => {
                        u.size = c as usize + 2;
                        u.back_ref(c as u8 + 9)?;
                    }
                    _ => {
                        u.size = u.code(8)? as usize;
                        u.back_ref(12)?;
                    }
                }
            }
        }
        Some(u.crc == 0)
    }

    fn fetch(&mut self) -> Option<u32> {
        let start = self.src_pos.checked_sub(4)?;
        let word: [u8; 4] = self.src.get(start..self.src_pos)?.try_into().ok()?;
        self.src_pos = start;
        Some(u32::from_be_bytes(word))
    }

    fn next_bit(&mut self) -> Option<bool> {
        let mut bit = self.chk & 1 != 0;
        self.chk >>= 1;
        if self.chk == 0 {
            let w = self.fetch()?;
            self.crc ^= w;
            bit = w & 1 != 0;
            self.chk = (w >> 1) | 0x8000_0000;
        }
        Some(bit)
    }

    fn code(&mut self, bits: u8) -> Option<u16> {
        let mut c = 0u16;
        for _ in 0..bits {
            c <<= 1;
            if self.next_bit()? {
                c |= 1;
            }
        }
        Some(c)
    }

    fn put(&mut self, b: u8) -> Option<()> {
        self.dst_pos = self.dst_pos.checked_sub(1)?;
        self.dst[self.dst_pos] = b;
        Some(())
    }

    fn literals(&mut self, bits: u8, add: usize) -> Option<()> {
        let count = self.code(bits)? as usize + add + 1;
        self.remaining -= count as i64;
        for _ in 0..count {
            let b = self.code(8)? as u8;
            self.put(b)?;
        }
        Some(())
    }

    fn back_ref(&mut self, bits: u8) -> Option<()> {
        let dist = self.code(bits)? as usize;
        let count = self.size + 1;
        self.remaining -= count as i64;
        for _ in 0..count {
            let from = (self.dst_pos.checked_sub(1)?).checked_add(dist)?;
            let b = *self.dst.get(from)?;
            self.put(b)?;
        }
        Some(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/codec/unpack.rs"]
mod tests;
