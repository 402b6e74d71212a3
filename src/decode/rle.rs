use crate::foundation::{
    bytes::{be_u16, u8_at},
    error::{EngineError, EngineResult},
};

/// Decode a "compact" run-length stream.
///
/// The stream starts with a big-endian size (top bit reserved) counting the control and
/// literal bytes that follow. Control byte `b` as `i8`: `b >= 0` copies the next `b + 1`
/// bytes, clamped to the stream size; `b < 0` repeats the following byte `1 - b` times.
/// Output longer than `limit` is rejected.
pub fn decode_compact(src: &[u8], limit: usize) -> EngineResult<Vec<u8>> {
    let size = usize::from(be_u16(src, 0)? & 0x7FFF);
    let body = &src[2..];
    let mut out = Vec::with_capacity(limit.min(size * 2));
    let mut i = 0;
    while i < size {
        let code = u8_at(body, i)? as i8;
        i += 1;
        if code >= 0 {
            let n = (code as usize + 1).min(size.saturating_sub(i));
            let lit = body.get(i..i + n).ok_or_else(|| {
                EngineError::size_mismatch(format!("compact literal run overruns stream at {i}"))
            })?;
            out.extend_from_slice(lit);
            i += n;
        } else {
            let n = (1 - i32::from(code)) as usize;
            let b = u8_at(body, i)?;
            i += 1;
            out.resize(out.len() + n, b);
        }
        if out.len() > limit {
            return Err(EngineError::size_mismatch(format!(
                "compact stream expands past {limit} bytes"
            )));
        }
    }
    Ok(out)
}

/// Expand `size` bytes of unprefixed literal/repeat runs into exactly `out_len` bytes.
pub fn expand_runs(src: &[u8], size: usize, out_len: usize) -> EngineResult<Vec<u8>> {
    let mut out = Vec::with_capacity(out_len);
    let mut i = 0;
    while i < size {
        let code = u8_at(src, i)? as i8;
        i += 1;
        if code < 0 {
            let n = (1 - i32::from(code)) as usize;
            let b = u8_at(src, i)?;
            i += 1;
            out.resize(out.len() + n, b);
        } else {
            let n = code as usize + 1;
            let lit = src.get(i..i + n).ok_or_else(|| {
                EngineError::size_mismatch(format!("literal run overruns input at {i}"))
            })?;
            out.extend_from_slice(lit);
            i += n;
        }
        if out.len() > out_len {
            break;
        }
    }
    if out.len() != out_len {
        return Err(EngineError::size_mismatch(format!(
            "runs expand to {} bytes, expected {out_len}",
            out.len()
        )));
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/decode/rle.rs"]
mod tests;
