use crate::foundation::error::{EngineError, EngineResult};

/// Byte order of multi-byte fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Most significant byte first.
    Big,
    /// Least significant byte first.
    Little,
}

pub(crate) fn slice_at<'a>(buf: &'a [u8], off: usize, len: usize) -> EngineResult<&'a [u8]> {
    off.checked_add(len)
        .and_then(|end| buf.get(off..end))
        .ok_or_else(|| {
            EngineError::size_mismatch(format!(
                "read of {len} bytes at offset {off} exceeds buffer of {} bytes",
                buf.len()
            ))
        })
}

fn array_at<const N: usize>(buf: &[u8], off: usize) -> EngineResult<[u8; N]> {
    let s = slice_at(buf, off, N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(s);
    Ok(out)
}

pub(crate) fn u8_at(buf: &[u8], off: usize) -> EngineResult<u8> {
    Ok(array_at::<1>(buf, off)?[0])
}

pub(crate) fn be_u16(buf: &[u8], off: usize) -> EngineResult<u16> {
    array_at(buf, off).map(u16::from_be_bytes)
}

pub(crate) fn le_u16(buf: &[u8], off: usize) -> EngineResult<u16> {
    array_at(buf, off).map(u16::from_le_bytes)
}

pub(crate) fn be_u32(buf: &[u8], off: usize) -> EngineResult<u32> {
    array_at(buf, off).map(u32::from_be_bytes)
}

pub(crate) fn le_u32(buf: &[u8], off: usize) -> EngineResult<u32> {
    array_at(buf, off).map(u32::from_le_bytes)
}

pub(crate) fn u16_at(buf: &[u8], off: usize, order: ByteOrder) -> EngineResult<u16> {
    match order {
        ByteOrder::Big => be_u16(buf, off),
        ByteOrder::Little => le_u16(buf, off),
    }
}

pub(crate) fn u32_at(buf: &[u8], off: usize, order: ByteOrder) -> EngineResult<u32> {
    match order {
        ByteOrder::Big => be_u32(buf, off),
        ByteOrder::Little => le_u32(buf, off),
    }
}

/// Sequential bounds-checked reader over an in-memory asset.
#[derive(Clone, Debug)]
pub(crate) struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
    order: ByteOrder,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(buf: &'a [u8], order: ByteOrder) -> Self {
        Self { buf, pos: 0, order }
    }

    pub(crate) fn at(buf: &'a [u8], pos: usize, order: ByteOrder) -> Self {
        Self { buf, pos, order }
    }

    pub(crate) fn u8(&mut self) -> EngineResult<u8> {
        let v = u8_at(self.buf, self.pos)?;
        self.pos += 1;
        Ok(v)
    }

    pub(crate) fn i8(&mut self) -> EngineResult<i8> {
        self.u8().map(|v| v as i8)
    }

    pub(crate) fn u16(&mut self) -> EngineResult<u16> {
        let v = u16_at(self.buf, self.pos, self.order)?;
        self.pos += 2;
        Ok(v)
    }

    pub(crate) fn u32(&mut self) -> EngineResult<u32> {
        let v = u32_at(self.buf, self.pos, self.order)?;
        self.pos += 4;
        Ok(v)
    }

    pub(crate) fn bytes(&mut self, len: usize) -> EngineResult<&'a [u8]> {
        let s = slice_at(self.buf, self.pos, len)?;
        self.pos += len;
        Ok(s)
    }

    pub(crate) fn skip(&mut self, len: usize) -> EngineResult<()> {
        self.bytes(len).map(|_| ())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/bytes.rs"]
mod tests;
