//! Room backgrounds: tile-map layouts and pre-rendered nibble maps.

use crate::{
    decode::{
        Bitmap,
        family::{PixelFamily, TILE_SIZE},
        rle::expand_runs,
    },
    foundation::{
        bytes::{ByteOrder, ByteReader, be_u16, le_u16, le_u32, slice_at, u8_at},
        error::{EngineError, EngineResult},
    },
};

/// Tile columns of a room.
pub const ROOM_COLS: usize = 32;
/// Tile rows of a room.
pub const ROOM_ROWS: usize = 28;
/// Room width in pixels.
pub const ROOM_W: usize = ROOM_COLS * 8;
/// Room height in pixels.
pub const ROOM_H: usize = ROOM_ROWS * 8;
/// Capacity of a room tile sheet, in tiles.
pub const MAX_SHEET_TILES: usize = 1024;
/// Rooms per level map.
pub const MAX_MAP_ROOMS: usize = 0x40;
const MAP_ENTRY_SIZE: usize = 6;
const MAP_BAND_H: usize = 56;
const SCENE_TILE_BASE: usize = 896;

/// One placed 8x8 tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileCell {
    /// Index into the room tile sheet; never 0.
    pub index: u16,
    /// Mirrored horizontally.
    pub xflip: bool,
    /// Mirrored vertically.
    pub yflip: bool,
    /// Palette bits combined with every tile pixel.
    pub mask: u8,
}

/// Which of the two tile maps of a room.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapLayer {
    /// Drawn opaque.
    Background,
    /// Drawn over the background with colour 0 transparent.
    Foreground,
}

/// 32x28 grid of optional tiles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMap {
    layer: MapLayer,
    cells: Vec<Option<TileCell>>,
}

impl TileMap {
    /// Parse the grid starting at `at`. `scene` rebases foreground indices and switches the
    /// foreground priority mask.
    pub fn parse(
        data: &[u8],
        at: usize,
        order: ByteOrder,
        layer: MapLayer,
        scene: bool,
    ) -> EngineResult<Self> {
        let mut r = ByteReader::at(data, at, order);
        let mut cells = Vec::with_capacity(ROOM_COLS * ROOM_ROWS);
        for _ in 0..ROOM_COLS * ROOM_ROWS {
            let d3 = r.u16()?;
            cells.push(Self::cell(d3, layer, scene)?);
        }
        Ok(Self { layer, cells })
    }

    fn cell(d3: u16, layer: MapLayer, scene: bool) -> EngineResult<Option<TileCell>> {
        let mut index = usize::from(d3 & 0x7FF);
        if index == 0 {
            return Ok(None);
        }
        let priority = if d3 & 0x8000 != 0 {
            0x80 + ((d3 >> 6) & 0x10) as u8
        } else {
            0
        };
        let mut mask = priority;
        if layer == MapLayer::Foreground && scene {
            index = index.checked_sub(SCENE_TILE_BASE).ok_or_else(|| {
                EngineError::size_mismatch(format!(
                    "foreground tile {index} below scene tile base {SCENE_TILE_BASE}"
                ))
            })?;
            if index == 0 {
                return Ok(None);
            }
            if d3 & 0x6000 != 0 {
                mask = 0x10;
            }
        }
        Ok(Some(TileCell {
            index: index as u16,
            xflip: d3 & (1 << 11) != 0,
            yflip: d3 & (1 << 12) != 0,
            mask,
        }))
    }

    /// Layer the map is drawn on.
    pub fn layer(&self) -> MapLayer {
        self.layer
    }

    /// Tile at column `col`, row `row`.
    pub fn cell_at(&self, col: usize, row: usize) -> Option<TileCell> {
        self.cells.get(row * ROOM_COLS + col).copied().flatten()
    }

    /// Draw every tile from `sheet` into `dst`.
    pub fn draw(
        &self,
        dst: &mut Bitmap,
        sheet: &TileSheet,
        family: &dyn PixelFamily,
    ) -> EngineResult<()> {
        let color_key = match self.layer {
            MapLayer::Background => None,
            MapLayer::Foreground => Some(0),
        };
        for (i, cell) in self.cells.iter().enumerate() {
            let Some(cell) = *cell else { continue };
            let tile = sheet.tile(cell.index)?;
            let (col, row) = (i % ROOM_COLS, i / ROOM_COLS);
            family.draw_tile(dst, col * 8, row * 8, tile, cell, color_key)?;
        }
        Ok(())
    }
}

/// How one bank contributes to the room tile sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BankStep {
    /// Append the whole decoded chunk.
    Whole {
        /// Bank number.
        bank: u16,
    },
    /// Append the listed 32-byte tiles of the chunk.
    Tiles {
        /// Bank number.
        bank: u16,
        /// Tile numbers inside the chunk.
        tiles: Vec<u8>,
    },
}

impl BankStep {
    /// Bank the step reads.
    pub fn bank(&self) -> u16 {
        match self {
            BankStep::Whole { bank } | BankStep::Tiles { bank, .. } => *bank,
        }
    }
}

/// Tiles gathered for one room. Tile 0 is always blank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileSheet {
    data: Vec<u8>,
}

impl Default for TileSheet {
    fn default() -> Self {
        Self::new()
    }
}

impl TileSheet {
    /// Sheet holding only the blank tile.
    pub fn new() -> Self {
        Self {
            data: vec![0; TILE_SIZE],
        }
    }

    /// Tiles in the sheet, the blank one included.
    pub fn len(&self) -> usize {
        self.data.len() / TILE_SIZE
    }

    /// Only the blank tile is present.
    pub fn is_empty(&self) -> bool {
        self.data.len() <= TILE_SIZE
    }

    fn reserve(&self, bytes: usize) -> EngineResult<()> {
        if self.data.len() + bytes > MAX_SHEET_TILES * TILE_SIZE {
            return Err(EngineError::allocation(format!(
                "room tile sheet overflows {MAX_SHEET_TILES} tiles"
            )));
        }
        Ok(())
    }

    /// Append the chunk of `step` decoded from its bank.
    pub fn push(&mut self, step: &BankStep, chunk: &[u8]) -> EngineResult<()> {
        match step {
            BankStep::Whole { .. } => {
                self.reserve(chunk.len())?;
                self.data.extend_from_slice(chunk);
            }
            BankStep::Tiles { tiles, .. } => {
                for &t in tiles {
                    self.reserve(TILE_SIZE)?;
                    let tile = slice_at(chunk, usize::from(t) * TILE_SIZE, TILE_SIZE)?;
                    self.data.extend_from_slice(tile);
                }
            }
        }
        Ok(())
    }

    /// Pixels of tile `index`.
    pub fn tile(&self, index: u16) -> EngineResult<&[u8]> {
        slice_at(&self.data, usize::from(index) * TILE_SIZE, TILE_SIZE)
    }
}

/// Header and tile maps of one unpacked level room.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomLayout {
    /// The room carries a masked scene instead of a background map.
    pub scene: bool,
    /// Big-endian palette slot numbers from the header.
    pub palette_slots: [u16; 4],
    /// Tiles to gather, in order.
    pub bank_steps: Vec<BankStep>,
    /// Background tile map.
    pub background: Option<TileMap>,
    /// Foreground tile map.
    pub foreground: Option<TileMap>,
    scene_at: Option<usize>,
    data: Vec<u8>,
}

impl RoomLayout {
    /// Parse an unpacked room block. `map_order` is the byte order of the tile maps; the
    /// header and the bank program are always big-endian.
    pub fn parse(data: Vec<u8>, map_order: ByteOrder) -> EngineResult<Self> {
        let scene = u8_at(&data, 1)? != 0;
        let mut palette_slots = [0u16; 4];
        for (i, slot) in palette_slots.iter_mut().enumerate() {
            *slot = be_u16(&data, 2 + i * 2)?;
        }
        let back_at = usize::from(be_u16(&data, 10)?);
        let fore_at = usize::from(be_u16(&data, 12)?);
        let program_at = usize::from(be_u16(&data, 14)?);

        let mut bank_steps = Vec::new();
        let mut r = ByteReader::at(&data, program_at, ByteOrder::Big);
        loop {
            let id = r.u16()?;
            let bank = id & 0x7FFF;
            let count = r.u8()?;
            if count == 0xFF {
                bank_steps.push(BankStep::Whole { bank });
            } else {
                let tiles = r.bytes(usize::from(count) + 1)?.to_vec();
                bank_steps.push(BankStep::Tiles { bank, tiles });
            }
            if id & 0x8000 != 0 {
                break;
            }
        }

        let (background, scene_at) = match (scene, back_at) {
            (true, at) => (None, Some(at)),
            (false, 0) => (None, None),
            (false, at) => (
                Some(TileMap::parse(&data, at, map_order, MapLayer::Background, false)?),
                None,
            ),
        };
        let foreground = if fore_at == 0 {
            None
        } else {
            Some(TileMap::parse(&data, fore_at, map_order, MapLayer::Foreground, scene)?)
        };
        tracing::trace!(scene, banks = bank_steps.len(), "parsed room layout");
        Ok(Self {
            scene,
            palette_slots,
            bank_steps,
            background,
            foreground,
            scene_at,
            data,
        })
    }

    /// Scene placement stream, when the room has one.
    pub fn scene_stream(&self) -> Option<&[u8]> {
        self.scene_at.and_then(|at| self.data.get(at..))
    }

    /// Draw the background then the foreground map.
    pub fn draw_maps(
        &self,
        dst: &mut Bitmap,
        sheet: &TileSheet,
        family: &dyn PixelFamily,
    ) -> EngineResult<()> {
        for map in [&self.background, &self.foreground].into_iter().flatten() {
            map.draw(dst, sheet, family)?;
        }
        Ok(())
    }
}

/// A pre-rendered nibble-family room.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapRoom {
    /// Palette slot numbers.
    pub palette_slots: [u16; 4],
    /// Room pixels.
    pub bitmap: Bitmap,
}

/// Decode room `room` of a level map file.
///
/// The map starts with 6-byte entries whose first field is a little-endian signed offset:
/// positive for four run-length bands, negative for four raw column-interleaved planes.
pub fn decode_map_room(map: &[u8], level: usize, room: usize) -> EngineResult<MapRoom> {
    if room >= MAX_MAP_ROOMS {
        return Err(EngineError::size_mismatch(format!(
            "room {room} outside the {MAX_MAP_ROOMS}-room map"
        )));
    }
    let off = le_u32(map, room * MAP_ENTRY_SIZE)? as i32;
    if off == 0 {
        return Err(EngineError::not_found(format!("invalid room {room}")));
    }
    let packed = off > 0;
    let mut at = off.unsigned_abs() as usize;

    let mut palette_slots = [0u16; 4];
    for slot in &mut palette_slots {
        *slot = u16::from(u8_at(map, at)?);
        at += 1;
    }
    if level == 4 && room == 60 {
        palette_slots[3] = 5;
    }

    let band = ROOM_W * MAP_BAND_H;
    let mut pixels = Vec::with_capacity(ROOM_W * ROOM_H);
    if packed {
        for _ in 0..4 {
            let size = usize::from(le_u16(map, at)?);
            at += 2;
            let src = slice_at(map, at, size)?;
            pixels.extend(expand_runs(src, size, band)?);
            at += size;
        }
    } else {
        pixels = deinterleave_columns(slice_at(map, at, ROOM_W * ROOM_H)?)?.pixels;
    }
    tracing::trace!(room, packed, "decoded map room");
    Ok(MapRoom {
        palette_slots,
        bitmap: Bitmap::new(ROOM_W, ROOM_H, pixels),
    })
}

/// Full-screen image stored as four planes of every fourth column.
pub fn deinterleave_columns(planes: &[u8]) -> EngineResult<Bitmap> {
    let planes = slice_at(planes, 0, ROOM_W * ROOM_H)?;
    let band = ROOM_W * MAP_BAND_H;
    let mut pixels = vec![0u8; ROOM_W * ROOM_H];
    for i in 0..4 {
        for y in 0..ROOM_H {
            for x in 0..ROOM_W / 4 {
                pixels[i + x * 4 + ROOM_W * y] = planes[band * i + x + (ROOM_W / 4) * y];
            }
        }
    }
    Ok(Bitmap::new(ROOM_W, ROOM_H, pixels))
}

#[cfg(test)]
#[path = "../../tests/unit/decode/room.rs"]
mod tests;
