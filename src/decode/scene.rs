use std::collections::HashMap;

use crate::{
    decode::{Bitmap, planar::TILE_BUFFER_SIZE, rle::decode_compact},
    foundation::{
        bytes::{ByteOrder, ByteReader, be_u16, be_u32, slice_at},
        core::AssetFamily,
        error::{EngineError, EngineResult},
    },
};

/// One decoded scene tile: header, mask block, colour block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneTile {
    /// Width in 16-pixel words.
    pub w_words: usize,
    /// Height in rows.
    pub h: usize,
    /// Size of one mask or colour plane in bytes.
    pub plane_size: usize,
    data: Vec<u8>,
}

impl SceneTile {
    fn parse(data: Vec<u8>, family: AssetFamily) -> EngineResult<Self> {
        let w_words = (usize::from(*data.first().unwrap_or(&0)) + 1) >> 1;
        let h = usize::from(*data.get(1).unwrap_or(&0)) + 1;
        let plane_size = usize::from(be_u16(&data, 2)?);
        let mask_len = w_words * 2 * h;
        let color_len = match family {
            AssetFamily::Planar => 3 * plane_size + mask_len,
            AssetFamily::Nibble => {
                if plane_size != mask_len {
                    return Err(EngineError::size_mismatch(format!(
                        "scene tile plane size {plane_size} does not match {w_words}x{h}"
                    )));
                }
                w_words * 8 * h
            }
        };
        if mask_len > plane_size || data.len() < 4 + plane_size + color_len {
            return Err(EngineError::size_mismatch(format!(
                "scene tile of {} bytes too short for {w_words}x{h} words",
                data.len()
            )));
        }
        Ok(Self {
            w_words,
            h,
            plane_size,
            data,
        })
    }

    fn mask(&self) -> &[u8] {
        &self.data[4..4 + self.plane_size]
    }

    fn color(&self) -> &[u8] {
        &self.data[4 + self.plane_size..]
    }
}

/// Position of one tile stamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScenePlacement {
    /// Index into [`SceneProgram::tiles`].
    pub tile: usize,
    /// Left edge in room pixels.
    pub x: i16,
    /// Top edge in room pixels.
    pub y: i16,
}

/// Masked multi-tile scene, resolved into distinct tiles and their placements.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SceneProgram {
    family: Option<AssetFamily>,
    tiles: Vec<SceneTile>,
    placements: Vec<ScenePlacement>,
}

impl SceneProgram {
    /// Decode the `(tileRef, x, y)` stream against the scene tile data `sgd`.
    ///
    /// A tile reference of `0xFFFF` repeats the previous tile. Other references index a table
    /// of big-endian 32-bit offsets at the start of `sgd`; a negative offset addresses a stored
    /// tile, a positive one a compact-compressed tile.
    pub fn decode(stream: &[u8], sgd: &[u8], family: AssetFamily) -> EngineResult<Self> {
        let mut r = ByteReader::new(stream, ByteOrder::Big);
        let count = usize::from(r.u16()?).max(1);
        let mut tiles = Vec::new();
        let mut by_ref = HashMap::new();
        let mut placements = Vec::with_capacity(count);
        let mut current: Option<usize> = None;

        for _ in 0..count {
            let tile_ref = r.u16()?;
            let x = r.u16()? as i16;
            let y = r.u16()? as i16;
            if tile_ref != 0xFFFF {
                let id = tile_ref & 0x7FFF;
                let idx = match by_ref.get(&id) {
                    Some(&idx) => idx,
                    None => {
                        let tile = SceneTile::parse(load_tile(sgd, id)?, family)?;
                        tiles.push(tile);
                        by_ref.insert(id, tiles.len() - 1);
                        tiles.len() - 1
                    }
                };
                current = Some(idx);
            }
            let tile = current.ok_or_else(|| {
                EngineError::size_mismatch("scene repeats a tile before defining one")
            })?;
            placements.push(ScenePlacement { tile, x, y });
        }
        tracing::trace!(tiles = tiles.len(), placements = placements.len(), "decoded scene");
        Ok(Self {
            family: Some(family),
            tiles,
            placements,
        })
    }

    /// Distinct tiles in first-use order.
    pub fn tiles(&self) -> &[SceneTile] {
        &self.tiles
    }

    /// Stamps in drawing order.
    pub fn placements(&self) -> &[ScenePlacement] {
        &self.placements
    }

    /// Stamp every placement into `dst`, writing only where the tile mask is set.
    pub fn stamp(&self, dst: &mut Bitmap) {
        for p in &self.placements {
            let tile = &self.tiles[p.tile];
            match self.family {
                Some(AssetFamily::Planar) => stamp_planar(dst, tile, p.x.into(), p.y.into()),
                Some(AssetFamily::Nibble) => stamp_nibble(dst, tile, p.x.into(), p.y.into()),
                None => {}
            }
        }
    }
}

fn load_tile(sgd: &[u8], id: u16) -> EngineResult<Vec<u8>> {
    let offset = be_u32(sgd, usize::from(id) * 4)? as i32;
    if offset < 0 {
        let at = offset.unsigned_abs() as usize;
        let size = usize::from(be_u16(sgd, at)?);
        if size > TILE_BUFFER_SIZE {
            return Err(EngineError::allocation(format!(
                "scene tile {id} of {size} bytes exceeds tile buffer"
            )));
        }
        Ok(slice_at(sgd, at + 2, size)?.to_vec())
    } else {
        let src = sgd.get(offset as usize..).ok_or_else(|| {
            EngineError::size_mismatch(format!("scene tile {id} offset {offset} past end"))
        })?;
        decode_compact(src, TILE_BUFFER_SIZE)
    }
}

fn put(dst: &mut Bitmap, x: i32, y: i32, color: u8) {
    if x >= 0 && y >= 0 && (x as usize) < dst.width && (y as usize) < dst.height {
        dst.pixels[y as usize * dst.width + x as usize] = color;
    }
}

fn stamp_planar(dst: &mut Bitmap, tile: &SceneTile, x0: i32, y0: i32) {
    let (mask, color) = (tile.mask(), tile.color());
    let row_bytes = tile.w_words * 2;
    for y in 0..tile.h {
        for xb in 0..row_bytes {
            let at = y * row_bytes + xb;
            let bits = mask[at];
            for i in 0..8 {
                let m = 1u8 << (7 - i);
                if bits & m == 0 {
                    continue;
                }
                let mut c = 0u8;
                for plane in 0..4 {
                    if color[plane * tile.plane_size + at] & m != 0 {
                        c |= 1 << plane;
                    }
                }
                put(dst, x0 + (8 * xb + i) as i32, y0 + y as i32, c);
            }
        }
    }
}

fn stamp_nibble(dst: &mut Bitmap, tile: &SceneTile, x0: i32, y0: i32) {
    let (mask, color) = (tile.mask(), tile.color());
    for y in 0..tile.h {
        for x in 0..tile.w_words {
            let word = y * tile.w_words + x;
            let bits = u16::from_be_bytes([mask[word * 2], mask[word * 2 + 1]]);
            for bit in 0..8 {
                let c = color[word * 8 + bit];
                let px = x0 + 2 * (x * 8 + bit) as i32;
                let py = y0 + y as i32;
                if bits & (1 << (15 - bit * 2)) != 0 {
                    put(dst, px, py, c >> 4);
                }
                if bits & (1 << (14 - bit * 2)) != 0 {
                    put(dst, px + 1, py, c & 15);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/decode/scene.rs"]
mod tests;
