//! Planar and nibble pixel decoders producing canonical 8-bit indexed pixels.

use crate::{
    decode::{Bitmap, rle::decode_compact},
    foundation::{
        bytes::{be_u16, le_u16, slice_at, u8_at},
        error::{EngineError, EngineResult},
    },
};

/// Largest decoded tile or sprite scratch buffer.
pub const TILE_BUFFER_SIZE: usize = 256 * 32;

/// Decode `depth` contiguous bitplanes of `w_words` 16-pixel words by `h` rows.
///
/// Plane `k` contributes bit `k` of each output index. Within a word the most significant bit
/// is the leftmost pixel.
pub fn planar16(src: &[u8], w_words: usize, h: usize, depth: usize) -> EngineResult<Bitmap> {
    let plane_size = w_words * 2 * h;
    slice_at(src, 0, plane_size * depth)?;
    let width = w_words * 16;
    let mut pixels = vec![0u8; width * h];
    for y in 0..h {
        for x in 0..w_words {
            let at = (y * w_words + x) * 2;
            for i in 0..16 {
                let mask = 1u16 << (15 - i);
                let mut color = 0u8;
                for bit in 0..depth {
                    if be_u16(src, at + bit * plane_size)? & mask != 0 {
                        color |= 1 << bit;
                    }
                }
                pixels[y * width + x * 16 + i] = color;
            }
        }
    }
    Ok(Bitmap::new(width, h, pixels))
}

fn interleaved_byte(src: &[u8], at: usize, i: usize) -> EngineResult<u8> {
    let mask = 1u8 << (7 - i);
    let mut color = 0u8;
    for bit in 0..4 {
        if u8_at(src, at + bit)? & mask != 0 {
            color |= 1 << bit;
        }
    }
    Ok(color)
}

/// 8-pixel wide cells: four interleaved plane bytes per row.
pub fn planar8(src: &[u8], h: usize) -> EngineResult<Bitmap> {
    slice_at(src, 0, h * 4)?;
    let mut pixels = Vec::with_capacity(8 * h);
    for y in 0..h {
        for i in 0..8 {
            pixels.push(interleaved_byte(src, y * 4, i)?);
        }
    }
    Ok(Bitmap::new(8, h, pixels))
}

/// 24-pixel wide cells: four interleaved plane words then four interleaved plane bytes per row.
pub fn planar24(src: &[u8], h: usize) -> EngineResult<Bitmap> {
    slice_at(src, 0, h * 12)?;
    let mut pixels = Vec::with_capacity(24 * h);
    for y in 0..h {
        let row = y * 12;
        for i in 0..16 {
            let mask = 1u16 << (15 - i);
            let mut color = 0u8;
            for bit in 0..4 {
                if be_u16(src, row + bit * 2)? & mask != 0 {
                    color |= 1 << bit;
                }
            }
            pixels.push(color);
        }
        for i in 0..8 {
            pixels.push(interleaved_byte(src, row + 8, i)?);
        }
    }
    Ok(Bitmap::new(24, h, pixels))
}

/// Split each byte into two pixels, high nibble first.
pub fn unpack_nibbles(src: &[u8], pixels: usize) -> EngineResult<Vec<u8>> {
    let bytes = slice_at(src, 0, pixels.div_ceil(2))?;
    let mut out = Vec::with_capacity(pixels + 1);
    for &b in bytes {
        out.push(b >> 4);
        out.push(b & 15);
    }
    out.truncate(pixels);
    Ok(out)
}

/// Planar sprite cell of an object frame; `None` for cell widths with no known layout.
pub fn decode_planar_cell(src: &[u8], w: usize, h: usize) -> EngineResult<Option<Bitmap>> {
    let bitmap = match w {
        8 => planar8(src, h)?,
        16 | 32 => planar16(src, w / 16, h, 4)?,
        24 => planar24(src, h)?,
        _ => {
            tracing::warn!(w, h, "planar sprite cell width not implemented");
            return Ok(None);
        }
    };
    Ok(Some(bitmap))
}

/// Nibble sprite cell of an object frame.
pub fn decode_nibble_cell(src: &[u8], w: usize, h: usize) -> EngineResult<Bitmap> {
    Ok(Bitmap::new(w, h, unpack_nibbles(src, w * h)?))
}

/// Icon `num` of a planar icon set: variable-size records of `(h - 1, w - 1, 4 bytes, planes)`.
pub fn decode_planar_icon(icons: &[u8], num: usize) -> EngineResult<Bitmap> {
    let mut at = 0;
    for _ in 0..num {
        let h = usize::from(u8_at(icons, at)?) + 1;
        let w = usize::from(u8_at(icons, at + 1)?) + 1;
        at += 2 + 4 + w * h * 8;
    }
    let h = usize::from(u8_at(icons, at)?) + 1;
    let w = usize::from(u8_at(icons, at + 1)?) + 1;
    let planes = icons
        .get(at + 6..)
        .ok_or_else(|| EngineError::size_mismatch(format!("icon {num} header past end")))?;
    planar16(planes, w, h, 4)
}

/// Icon `num` of a nibble icon set: 16x16 pixels behind a little-endian offset table.
pub fn decode_nibble_icon(icons: &[u8], num: usize) -> EngineResult<Bitmap> {
    let offset = usize::from(le_u16(icons, num * 2)?);
    let data = icons
        .get(offset + 2..)
        .ok_or_else(|| EngineError::size_mismatch(format!("icon {num} offset {offset} past end")))?;
    Ok(Bitmap::new(16, 16, unpack_nibbles(data, 16 * 16)?))
}

/// Packed planar character frame: header byte 2 gives the size, a compact stream at byte 3
/// holds three bitplanes.
pub fn decode_spm(src: &[u8]) -> EngineResult<Bitmap> {
    let dims = u8_at(src, 2)?;
    let w_words = usize::from(dims >> 7) + 1;
    let h = usize::from(dims & 0x7F);
    let planes = decode_compact(src.get(3..).unwrap_or_default(), TILE_BUFFER_SIZE)?;
    planar16(&planes, w_words, h, 3)
}

/// Width of the planar menu bitmap.
pub const MENU_W: usize = 320;
/// Height of the planar menu bitmap.
pub const MENU_H: usize = 224;
const MENU_HEADER_SIZE: usize = 6;
const MENU_DEPTH: usize = 5;

/// Full-screen menu bitmap: a 6-byte header, then five 320x224 bitplanes.
pub fn decode_menu_bitmap(src: &[u8]) -> EngineResult<Bitmap> {
    let planes_size = MENU_W / 8 * MENU_H * MENU_DEPTH;
    if src.len() < MENU_HEADER_SIZE + planes_size {
        return Err(EngineError::size_mismatch(format!(
            "menu bitmap is {} bytes, expected at least {}",
            src.len(),
            MENU_HEADER_SIZE + planes_size
        )));
    }
    planar16(&src[MENU_HEADER_SIZE..], MENU_W / 16, MENU_H, MENU_DEPTH)
}

/// Nibble character frame: nibble expansion followed by `0xF`-escaped runs.
///
/// `0xF c n` repeats `c` `n + 4` times; `0xF 0xF n1 n2 c` is the long form with count
/// `(n1 << 4 | n2) + 4`.
pub fn decode_character_frame(src: &[u8]) -> EngineResult<Vec<u8>> {
    let n = usize::from(be_u16(src, 0)?);
    let nibbles = unpack_nibbles(&src[2..], n * 2)?;
    let mut out = Vec::with_capacity(nibbles.len() * 2);
    let mut it = nibbles.iter().copied();
    let mut next = |what: &str| {
        it.next().ok_or_else(|| {
            EngineError::size_mismatch(format!("character frame truncated in {what}"))
        })
    };
    let mut remaining = n * 2;
    while remaining > 0 {
        let c1 = next("code")?;
        if c1 != 0xF {
            out.push(c1);
            remaining -= 1;
            continue;
        }
        let mut c2 = next("run colour")?;
        let mut count = usize::from(next("run length")?);
        let mut used = 3;
        if c2 == 0xF {
            let lo = next("long run length")?;
            c2 = next("long run colour")?;
            count = (count << 4) | usize::from(lo);
            used += 2;
        }
        out.resize(out.len() + count + 4, c2);
        remaining = remaining.checked_sub(used).ok_or_else(|| {
            EngineError::size_mismatch("character frame run crosses the end of data")
        })?;
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/decode/planar.rs"]
mod tests;
