use crate::{
    decode::{
        Bitmap,
        planar::{decode_nibble_cell, decode_nibble_icon, decode_planar_cell, decode_planar_icon},
        room::TileCell,
    },
    foundation::{
        bytes::{ByteOrder, slice_at},
        core::AssetFamily,
        error::EngineResult,
    },
};

/// Bytes per 8x8 background tile.
pub const TILE_SIZE: usize = 32;
/// Side of an inventory icon.
pub const ICON_SIDE: usize = 16;
/// Side of a font glyph.
pub const GLYPH_SIDE: usize = 8;

/// Where the frame list of an object record lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectLayout {
    /// Offset of the frame count byte.
    pub count_at: usize,
    /// Offset of the first 4-byte frame record.
    pub frames_at: usize,
}

/// Per-family pixel decoding, selected once from the asset family.
pub trait PixelFamily: Send + Sync {
    /// Family this decoder implements.
    fn family(&self) -> AssetFamily;

    /// Byte order of room tile maps.
    fn tile_map_order(&self) -> ByteOrder;

    /// Where object records keep their frames.
    fn object_layout(&self) -> ObjectLayout;

    /// Inventory icon `num` as a 16x16 bitmap.
    fn decode_icon(&self, icons: &[u8], num: usize) -> EngineResult<Bitmap>;

    /// Sprite cell of an object frame; `None` when the cell layout is unknown.
    fn decode_cell(&self, src: &[u8], w: usize, h: usize) -> EngineResult<Option<Bitmap>>;

    /// Draw one 8x8 tile with its top-left at `(x, y)`, skipping `color_key` pixels.
    fn draw_tile(
        &self,
        dst: &mut Bitmap,
        x: usize,
        y: usize,
        tile: &[u8],
        cell: TileCell,
        color_key: Option<u8>,
    ) -> EngineResult<()>;

    /// Raw 8x8 values of string glyph `c`.
    fn glyph(&self, font: &[u8], c: u8) -> EngineResult<Bitmap>;

    /// Framebuffer value for a glyph value drawn in `color`; `None` leaves the pixel alone.
    fn glyph_pixel(&self, value: u8, color: u8) -> Option<u8>;
}

/// Decoder for `family`.
pub fn family_decoder(family: AssetFamily) -> &'static dyn PixelFamily {
    match family {
        AssetFamily::Planar => &PlanarFamily,
        AssetFamily::Nibble => &NibbleFamily,
    }
}

fn tile_pixels(
    dst: &mut Bitmap,
    x: usize,
    y: usize,
    cell: TileCell,
    color_key: Option<u8>,
    mut sample: impl FnMut(usize, usize) -> u8,
    combine: impl Fn(u8, u8) -> u8,
) {
    for dy in 0..8 {
        let py = y + dy;
        if py >= dst.height {
            break;
        }
        let sy = if cell.yflip { 7 - dy } else { dy };
        for dx in 0..8 {
            let px = x + dx;
            if px >= dst.width {
                break;
            }
            let sx = if cell.xflip { 7 - dx } else { dx };
            let color = sample(sx, sy);
            if Some(color) != color_key {
                dst.pixels[py * dst.width + px] = combine(cell.mask, color);
            }
        }
    }
}

fn glyph_index(c: u8) -> usize {
    usize::from(c.saturating_sub(32))
}

/// Bitplane family.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlanarFamily;

impl PixelFamily for PlanarFamily {
    fn family(&self) -> AssetFamily {
        AssetFamily::Planar
    }

    fn tile_map_order(&self) -> ByteOrder {
        ByteOrder::Big
    }

    fn object_layout(&self) -> ObjectLayout {
        ObjectLayout {
            count_at: 8,
            frames_at: 9,
        }
    }

    fn decode_icon(&self, icons: &[u8], num: usize) -> EngineResult<Bitmap> {
        let mut out = Bitmap::filled(ICON_SIDE, ICON_SIDE, 0);
        let icon = match num {
            0..=30 => decode_planar_icon(icons, num)?,
            // cursor: corner marks
            76 => {
                for i in 0..3 {
                    out.pixels[i] = 1;
                    out.pixels[15 * 16 + (15 - i)] = 1;
                    out.pixels[i * 16] = 1;
                    out.pixels[(15 - i) * 16 + 15] = 1;
                }
                return Ok(out);
            }
            // arrows
            77 => decode_planar_icon(icons, 35)?,
            78 => decode_planar_icon(icons, 36)?,
            _ => return Ok(Bitmap::filled(ICON_SIDE, ICON_SIDE, 5)),
        };
        for y in 0..icon.height.min(ICON_SIDE) {
            let w = icon.width.min(ICON_SIDE);
            out.pixels[y * ICON_SIDE..y * ICON_SIDE + w].copy_from_slice(&icon.row(y)[..w]);
        }
        Ok(out)
    }

    fn decode_cell(&self, src: &[u8], w: usize, h: usize) -> EngineResult<Option<Bitmap>> {
        decode_planar_cell(src, w, h)
    }

    fn draw_tile(
        &self,
        dst: &mut Bitmap,
        x: usize,
        y: usize,
        tile: &[u8],
        cell: TileCell,
        color_key: Option<u8>,
    ) -> EngineResult<()> {
        let tile = slice_at(tile, 0, TILE_SIZE)?;
        let sample = |sx: usize, sy: usize| {
            let bit = 1u8 << (7 - sx);
            (0..4).fold(0u8, |c, plane| {
                if tile[8 * plane + sy] & bit != 0 {
                    c | (1 << plane)
                } else {
                    c
                }
            })
        };
        tile_pixels(dst, x, y, cell, color_key, sample, u8::wrapping_add);
        Ok(())
    }

    fn glyph(&self, font: &[u8], c: u8) -> EngineResult<Bitmap> {
        let icon = decode_planar_icon(font, glyph_index(c))?;
        let mut out = Bitmap::filled(GLYPH_SIDE, GLYPH_SIDE, 0);
        for y in 0..icon.height.min(GLYPH_SIDE) {
            let w = icon.width.min(GLYPH_SIDE);
            out.pixels[y * GLYPH_SIDE..y * GLYPH_SIDE + w].copy_from_slice(&icon.row(y)[..w]);
        }
        Ok(out)
    }

    fn glyph_pixel(&self, value: u8, color: u8) -> Option<u8> {
        (value != 0).then_some(color)
    }
}

/// Nibble-packed family.
#[derive(Clone, Copy, Debug, Default)]
pub struct NibbleFamily;

impl PixelFamily for NibbleFamily {
    fn family(&self) -> AssetFamily {
        AssetFamily::Nibble
    }

    fn tile_map_order(&self) -> ByteOrder {
        ByteOrder::Little
    }

    fn object_layout(&self) -> ObjectLayout {
        ObjectLayout {
            count_at: 5,
            frames_at: 6,
        }
    }

    fn decode_icon(&self, icons: &[u8], num: usize) -> EngineResult<Bitmap> {
        decode_nibble_icon(icons, num)
    }

    fn decode_cell(&self, src: &[u8], w: usize, h: usize) -> EngineResult<Option<Bitmap>> {
        decode_nibble_cell(src, w, h).map(Some)
    }

    fn draw_tile(
        &self,
        dst: &mut Bitmap,
        x: usize,
        y: usize,
        tile: &[u8],
        cell: TileCell,
        color_key: Option<u8>,
    ) -> EngineResult<()> {
        let tile = slice_at(tile, 0, TILE_SIZE)?;
        let sample = |sx: usize, sy: usize| {
            let b = tile[sy * 4 + sx / 2];
            if sx % 2 == 0 { b >> 4 } else { b & 15 }
        };
        tile_pixels(dst, x, y, cell, color_key, sample, |mask, c| mask | c);
        Ok(())
    }

    fn glyph(&self, font: &[u8], c: u8) -> EngineResult<Bitmap> {
        let at = glyph_index(c) * TILE_SIZE;
        decode_nibble_cell(slice_at(font, at, TILE_SIZE)?, GLYPH_SIDE, GLYPH_SIDE)
    }

    fn glyph_pixel(&self, value: u8, color: u8) -> Option<u8> {
        match value {
            0 => None,
            15 => Some(color),
            v => Some(0xE0 + v),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/decode/family.rs"]
mod tests;
