use crate::foundation::{
    bytes::{be_u16, le_u16, slice_at},
    core::Rgb,
    error::EngineResult,
};

/// Colours per palette slot.
pub const SLOT_COLORS: usize = 16;

/// Expand a packed `0x0RGB` colour to 8 bits per channel; `swap_rb` exchanges red and blue.
pub fn convert_color(color: u16, swap_rb: bool) -> Rgb {
    let mut r = ((color & 0xF00) >> 8) as u8;
    let g = ((color & 0xF0) >> 4) as u8;
    let mut b = (color & 0xF) as u8;
    if swap_rb {
        std::mem::swap(&mut r, &mut b);
    }
    let expand = |n: u8| (n << 4) | n;
    Rgb::new(expand(r), expand(g), expand(b))
}

/// Sixteen big-endian colours at `pal[num * 0x20]`, red and blue swapped.
pub fn slot_be(pal: &[u8], num: usize) -> EngineResult<[Rgb; SLOT_COLORS]> {
    let base = num * 0x20;
    slice_at(pal, base, SLOT_COLORS * 2)?;
    let mut out = [Rgb::BLACK; SLOT_COLORS];
    for (i, c) in out.iter_mut().enumerate() {
        *c = convert_color(be_u16(pal, base + i * 2)?, true);
    }
    Ok(out)
}

/// Sixteen little-endian colours, channel order kept.
pub fn slot_le(data: &[u8]) -> EngineResult<[Rgb; SLOT_COLORS]> {
    slice_at(data, 0, SLOT_COLORS * 2)?;
    let mut out = [Rgb::BLACK; SLOT_COLORS];
    for (i, c) in out.iter_mut().enumerate() {
        *c = convert_color(le_u16(data, i * 2)?, false);
    }
    Ok(out)
}

/// Sixteen colours stored as plain RGB triples.
pub fn slot_rgb(data: &[u8]) -> EngineResult<[Rgb; SLOT_COLORS]> {
    let bytes = slice_at(data, 0, SLOT_COLORS * 3)?;
    let mut out = [Rgb::BLACK; SLOT_COLORS];
    for (c, rgb) in out.iter_mut().zip(bytes.chunks_exact(3)) {
        *c = Rgb::new(rgb[0], rgb[1], rgb[2]);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/decode/palette.rs"]
mod tests;
