use crate::{
    assets::{
        formats::SpriteRef,
        kind::AssetKind,
        store::{AssetStore, BankSource},
    },
    decode::{
        Bitmap,
        family::{GLYPH_SIDE, PixelFamily, family_decoder},
        palette::{SLOT_COLORS, convert_color, slot_be, slot_le, slot_rgb},
        planar::{decode_character_frame, decode_menu_bitmap, decode_spm},
        room::{ROOM_H, ROOM_W, RoomLayout, TileSheet, decode_map_room, deinterleave_columns},
        scene::SceneProgram,
    },
    foundation::{
        bytes::{be_u16, slice_at, u8_at},
        config::EngineConfig,
        core::{AssetFamily, Rect, Rgb},
        error::{EngineError, EngineResult},
    },
    render::{
        blit::{BlitMode, Orientation, SourceLayout, SpriteDescriptor, blit},
        dirty::DirtyGrid,
        layers::Layers,
        present::{DisplaySink, PresentReport, Presenter},
    },
};

const OBJECT_BANK_SLOTS: u8 = 0x4A;
const FRAME_SIZE: usize = 4;
const TEXT_PALETTE_SLOT: u8 = 0xE;
const MAX_PALETTE_SLOT: u8 = 0xF;

/// Colours used by [`Video::draw_char`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphColors {
    /// Index for glyph pixels other than the shadow.
    pub front: u8,
    /// Index for glyph value 2.
    pub shadow: u8,
    /// Written for empty glyph pixels; `None` leaves them alone.
    pub transparent: Option<u8>,
}

impl Default for GlyphColors {
    fn default() -> Self {
        Self {
            front: 0xEE,
            shadow: 0xE2,
            transparent: None,
        }
    }
}

/// Compositor façade: owns the layers, the dirty grid and the display sink.
///
/// Draw and decode calls borrow the [`AssetStore`] they read from; nothing here keeps a
/// reference into asset buffers between calls.
pub struct Video<S: DisplaySink> {
    family: &'static dyn PixelFamily,
    text_palette: Vec<u8>,
    hero_palettes: [Vec<u8>; 2],
    slot_0xf_palette: Vec<u8>,
    game_size: (usize, usize),
    layers: Layers,
    grid: DirtyGrid,
    presenter: Presenter,
    sink: S,
    erase_background: bool,
    map_palette_slots: [u16; 4],
    hero_palette_slot: u16,
    inventory_palette_slot: u16,
    glyph_colors: GlyphColors,
}

impl<S: DisplaySink> std::fmt::Debug for Video<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Video")
            .field("family", &self.family.family())
            .field("width", &self.layers.width())
            .field("height", &self.layers.height())
            .field("state", &self.presenter.state())
            .field("map_palette_slots", &self.map_palette_slots)
            .finish_non_exhaustive()
    }
}

impl<S: DisplaySink> Video<S> {
    /// Compositor at the configured screen size, presenting to `sink`.
    pub fn new(config: &EngineConfig, sink: S) -> EngineResult<Self> {
        config.validate()?;
        let (w, h) = (config.screen_width as usize, config.screen_height as usize);
        Ok(Self {
            family: family_decoder(config.family),
            text_palette: config.text_palette.clone(),
            hero_palettes: config.hero_palettes.clone(),
            slot_0xf_palette: config.slot_0xf_palette.clone(),
            game_size: (w, h),
            layers: Layers::new(w, h),
            grid: DirtyGrid::new(
                w,
                h,
                config.block_width as usize,
                config.block_height as usize,
            ),
            presenter: Presenter::new(),
            sink,
            erase_background: false,
            map_palette_slots: [0; 4],
            hero_palette_slot: 0,
            inventory_palette_slot: 0,
            glyph_colors: GlyphColors::default(),
        })
    }

    /// Asset family the pixel decoders were chosen for.
    pub fn family(&self) -> AssetFamily {
        self.family.family()
    }

    /// The framebuffer layers.
    pub fn layers(&self) -> &Layers {
        &self.layers
    }

    /// Mutable framebuffer layers. Writes here are not marked dirty.
    pub fn layers_mut(&mut self) -> &mut Layers {
        &mut self.layers
    }

    /// The composited front layer.
    pub fn front(&self) -> &Bitmap {
        &self.layers.front
    }

    /// The display sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable display sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the compositor and hand back its sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Dirty block counters of the front layer.
    pub fn dirty_grid(&self) -> &DirtyGrid {
        &self.grid
    }

    /// Screen size used for rooms and sprites.
    pub fn game_size(&self) -> (usize, usize) {
        self.game_size
    }

    /// Reallocate every layer at `width` by `height` and rebuild the dirty grid.
    ///
    /// Layer content is lost and the next present is a full refresh. A no-op when the size is
    /// unchanged.
    pub fn set_screen_size(&mut self, width: usize, height: usize) -> EngineResult<()> {
        if width == 0 || height == 0 {
            return Err(EngineError::size_mismatch(format!(
                "screen size {width}x{height} is empty"
            )));
        }
        if (self.layers.width(), self.layers.height()) == (width, height) {
            return Ok(());
        }
        self.layers.resize(width, height);
        self.grid = self.grid.resized(width, height);
        self.sink.resize(width, height)?;
        self.request_full_refresh();
        tracing::debug!(width, height, "screen resized");
        Ok(())
    }

    /// Go back to the game screen size after a menu bitmap.
    pub fn end_menu(&mut self) -> EngineResult<()> {
        let (w, h) = self.game_size;
        self.set_screen_size(w, h)
    }

    /// Regions that the next incremental present will send.
    pub fn dirty_rects(&self) -> Vec<Rect> {
        self.grid.dirty_rects()
    }

    /// Mark `rect` of the front layer for the next incremental present.
    pub fn mark_dirty(&mut self, rect: Rect) {
        self.grid.mark(rect);
    }

    /// Object frames overwrite the layer instead of respecting final pixels.
    pub fn set_erase_background(&mut self, erase: bool) {
        self.erase_background = erase;
    }

    /// Colours used by [`Video::draw_char`].
    pub fn set_glyph_colors(&mut self, colors: GlyphColors) {
        self.glyph_colors = colors;
    }

    /// Vertical offset applied to the next present only.
    pub fn set_shake(&mut self, shake: i32) {
        self.presenter.set_shake(shake);
    }

    /// Send the whole front layer on the next present.
    pub fn request_full_refresh(&mut self) {
        self.presenter.request_full_refresh(&mut self.grid);
    }

    /// Present the front layer to the sink.
    pub fn present_frame(&mut self) -> EngineResult<PresentReport> {
        self.presenter
            .present(&self.layers.front, &mut self.grid, &mut self.sink)
    }

    /// Palette slot numbers of the current room.
    pub fn map_palette_slots(&self) -> [u16; 4] {
        self.map_palette_slots
    }

    /// Palette slots chosen by the game for the hero and the inventory; 0 means "room default".
    pub fn set_alternate_palette_slots(&mut self, hero: u16, inventory: u16) {
        self.hero_palette_slot = hero;
        self.inventory_palette_slot = inventory;
    }

    fn draw_sprite_at(
        &mut self,
        sprite: &SpriteDescriptor<'_>,
        x: i32,
        y: i32,
        orientation: Orientation,
        mode: BlitMode,
        color_mask: u8,
    ) -> Option<Rect> {
        let area = blit(
            &mut self.layers.front,
            sprite,
            x,
            y,
            orientation,
            mode,
            color_mask,
        )?;
        self.grid.mark(area);
        Some(area)
    }

    /// Inventory icon `num`, overwrite mode, tinted with `col_mask << 4`.
    pub fn draw_icon(
        &mut self,
        store: &AssetStore,
        num: usize,
        x: i32,
        y: i32,
        col_mask: u8,
    ) -> EngineResult<Option<Rect>> {
        let icon = self.family.decode_icon(store.icons(), num)?;
        let sprite = SpriteDescriptor::from_bitmap(&icon)?;
        Ok(self.draw_sprite_at(
            &sprite,
            x,
            y,
            Orientation::NONE,
            BlitMode::Overwrite,
            col_mask << 4,
        ))
    }

    /// Draw every frame of an object record.
    ///
    /// Byte 0 selects the bank through the object bank map, bytes 1 and 2 are signed anchor
    /// offsets, and the family decides where the frame count and frame list sit. Bit 1 of
    /// `flags` mirrors the object horizontally.
    pub fn draw_object(
        &mut self,
        store: &mut AssetStore,
        data: &[u8],
        x: i32,
        y: i32,
        flags: u8,
    ) -> EngineResult<()> {
        let entry = u8_at(data, 0)?;
        if entry >= OBJECT_BANK_SLOTS {
            return Err(EngineError::size_mismatch(format!(
                "object bank entry {entry:#x} out of range"
            )));
        }
        let slot = store
            .object_bank_map()
            .ok_or_else(|| EngineError::not_found("object bank map not loaded"))?
            .get(usize::from(entry))
            .copied()
            .ok_or_else(|| EngineError::size_mismatch("object bank map truncated"))?;
        let dx = i32::from(u8_at(data, 1)? as i8);
        let dy = i32::from(u8_at(data, 2)? as i8);
        let pos_x = if flags & 2 != 0 { x + dx } else { x - dx };
        let pos_y = y - dy;

        let layout = self.family.object_layout();
        let count = usize::from(u8_at(data, layout.count_at)?);
        let frames = slice_at(data, layout.frames_at, count * FRAME_SIZE)?;
        let handle = store.bank_handle(u16::from(slot))?;
        let bank = store.bank_data(handle)?;
        for frame in frames.chunks_exact(FRAME_SIZE) {
            let frame = [frame[0], frame[1], frame[2], frame[3]];
            self.draw_object_frame(bank, frame, pos_x, pos_y, flags)?;
        }
        Ok(())
    }

    /// One 4-byte frame `(cell, dx, dy, size/mirror flags)` of an object.
    pub fn draw_object_frame(
        &mut self,
        bank: &[u8],
        frame: [u8; 4],
        x: i32,
        y: i32,
        flags: u8,
    ) -> EngineResult<Option<Rect>> {
        let src = bank.get(usize::from(frame[0]) * 32..).ok_or_else(|| {
            EngineError::size_mismatch(format!("object cell {} beyond bank chunk", frame[0]))
        })?;
        let mut sprite_flags = frame[3];
        if flags & 2 != 0 {
            sprite_flags ^= 0x10;
        }
        let h = ((usize::from(sprite_flags) & 3) + 1) * 8;
        let w = (((usize::from(sprite_flags) >> 2) & 3) + 1) * 8;
        let sprite_y = y + i32::from(frame[2]);
        let sprite_x = if flags & 2 != 0 {
            x - i32::from(frame[1]) - w as i32
        } else {
            x + i32::from(frame[1])
        };
        let Some(cell) = self.family.decode_cell(src, w, h)? else {
            return Ok(None);
        };
        let sprite = SpriteDescriptor::from_bitmap(&cell)?;
        let mode = if self.erase_background {
            BlitMode::Overwrite
        } else {
            BlitMode::Occlude
        };
        Ok(self.draw_sprite_at(
            &sprite,
            sprite_x,
            sprite_y,
            Orientation::mirrored_x(sprite_flags & 0x10 != 0),
            mode,
            (flags & 0x60) >> 1,
        ))
    }

    /// Animated character frame of `a` rows by `b` columns.
    ///
    /// Bit 6 of `b` marks a rotated frame: the extents swap and pixels are stored column by
    /// column. Characters always respect final pixels.
    pub fn draw_character(
        &mut self,
        pixels: &[u8],
        x: i32,
        y: i32,
        a: u8,
        b: u8,
        flags: u8,
    ) -> EngineResult<Option<Rect>> {
        let (mut a, mut b) = (a, b);
        let rotated = b & 0x40 != 0;
        if rotated {
            b &= 0xBF;
            std::mem::swap(&mut a, &mut b);
        }
        let layout = if rotated {
            SourceLayout::ColumnMajor
        } else {
            SourceLayout::RowMajor
        };
        let sprite = SpriteDescriptor::new(pixels, usize::from(b), usize::from(a), layout)?;
        let color_mask = if flags & 0x60 == 0x60 { 0x50 } else { 0x40 };
        Ok(self.draw_sprite_at(
            &sprite,
            x,
            y,
            Orientation::mirrored_x(flags & 2 != 0),
            BlitMode::Occlude,
            color_mask,
        ))
    }

    /// Decode the character frame at `sprite` for this family and draw it.
    pub fn draw_sprite(
        &mut self,
        store: &AssetStore,
        sprite: SpriteRef,
        x: i32,
        y: i32,
        a: u8,
        b: u8,
        flags: u8,
    ) -> EngineResult<Option<Rect>> {
        let data = store.sprite_data(sprite)?;
        match self.family.family() {
            AssetFamily::Planar => {
                let frame = decode_spm(data)?;
                self.draw_character(&frame.pixels, x, y, a, b, flags)
            }
            AssetFamily::Nibble => {
                if store.sprite_header_byte(sprite, 2)? & 0x80 == 0 {
                    let frame = decode_character_frame(data)?;
                    self.draw_character(&frame, x, y, a, b, flags)
                } else {
                    self.draw_character(data, x, y, a, b, flags)
                }
            }
        }
    }

    fn plot(&mut self, x: i32, y: i32, value: u8) {
        let front = &mut self.layers.front;
        if x >= 0 && y >= 0 && (x as usize) < front.width && (y as usize) < front.height {
            front.pixels[y as usize * front.width + x as usize] = value;
        }
    }

    /// Dialogue glyph `c` at text cell `(col, row)` using the glyph colours.
    ///
    /// Glyph value 2 is the shadow, other nonzero values the front colour.
    pub fn draw_char(&mut self, store: &AssetStore, c: u8, row: i32, col: i32) -> EngineResult<()> {
        if self.family.family() != AssetFamily::Nibble {
            return Err(EngineError::unsupported(
                "cell-addressed glyphs need a nibble font",
            ));
        }
        let glyph = self.family.glyph(store.require(AssetKind::Fnt)?, c)?;
        let (x0, y0) = (col * 8, row * 8);
        let colors = self.glyph_colors;
        for (i, &v) in glyph.pixels.iter().enumerate() {
            let value = match v {
                0 => match colors.transparent {
                    Some(t) => t,
                    None => continue,
                },
                2 => colors.shadow,
                _ => colors.front,
            };
            let (gx, gy) = ((i % GLYPH_SIDE) as i32, (i / GLYPH_SIDE) as i32);
            self.plot(x0 + gx, y0 + gy, value);
        }
        self.grid.mark(Rect::new(x0, y0, 8, 8));
        Ok(())
    }

    /// Draw `text` up to the first NUL, `0x0A` or `0x0B` byte and return how many bytes were
    /// drawn.
    pub fn draw_string(
        &mut self,
        store: &AssetStore,
        text: &[u8],
        x: i32,
        y: i32,
        color: u8,
    ) -> EngineResult<usize> {
        let font = store.require(AssetKind::Fnt)?;
        let len = text
            .iter()
            .position(|&c| matches!(c, 0 | 0x0A | 0x0B))
            .unwrap_or(text.len());
        for (n, &c) in text[..len].iter().enumerate() {
            let glyph = self.family.glyph(font, c)?;
            let cx = x + (n * GLYPH_SIDE) as i32;
            for (i, &v) in glyph.pixels.iter().enumerate() {
                if let Some(value) = self.family.glyph_pixel(v, color) {
                    let (gx, gy) = ((i % GLYPH_SIDE) as i32, (i / GLYPH_SIDE) as i32);
                    self.plot(cx + gx, y + gy, value);
                }
            }
        }
        let width = (len * GLYPH_SIDE) as i32;
        self.grid.mark(Rect::new(x, y, width, GLYPH_SIDE as i32));
        Ok(len)
    }

    /// Menu background: the 320x224 composite bitmap for the planar family, the
    /// column-interleaved map for the nibble family.
    ///
    /// The layers are resized to the bitmap; [`Video::end_menu`] or the next room decode
    /// restores the game size.
    pub fn draw_menu_bitmap(&mut self, store: &AssetStore) -> EngineResult<()> {
        let bitmap = match self.family.family() {
            AssetFamily::Planar => decode_menu_bitmap(store.require(AssetKind::MenuCmp)?)?,
            AssetFamily::Nibble => deinterleave_columns(store.require(AssetKind::MenuMap)?)?,
        };
        self.set_screen_size(bitmap.width, bitmap.height)?;
        self.layers.clear_front();
        self.layers.put_front(&bitmap);
        self.request_full_refresh();
        Ok(())
    }

    /// Decode room `room` of the level layout into the front and back layers.
    #[tracing::instrument(level = "debug", skip(self, store), fields(family = self.family.family().label()))]
    pub fn decode_level_room(
        &mut self,
        store: &mut AssetStore,
        level: usize,
        room: usize,
    ) -> EngineResult<()> {
        let layout = RoomLayout::parse(store.level_room(room)?, self.family.tile_map_order())?;
        let mut sheet = TileSheet::new();
        for step in &layout.bank_steps {
            let handle = store.bank_handle(step.bank())?;
            sheet.push(step, store.bank_data(handle)?)?;
        }

        let mut room_px = Bitmap::filled(ROOM_W, ROOM_H, 0);
        if let Some(stream) = layout.scene_stream() {
            let sgd = store.require(AssetKind::Sgd)?;
            SceneProgram::decode(stream, sgd, self.family.family())?.stamp(&mut room_px);
        }
        layout.draw_maps(&mut room_px, &sheet, self.family)?;

        self.end_menu()?;
        self.layers.clear_front();
        self.layers.put_front(&room_px);
        self.layers.save_background();
        self.map_palette_slots = layout.palette_slots;
        tracing::debug!(tiles = sheet.len(), scene = layout.scene, "room decoded");
        if self.family.family() == AssetFamily::Planar {
            self.set_level_palettes(store, level)?;
        }
        Ok(())
    }

    /// Level room decoded through the demo bank table.
    pub fn decode_demo_room(
        &mut self,
        store: &mut AssetStore,
        level: usize,
        room: usize,
    ) -> EngineResult<()> {
        store.set_bank_source(BankSource::Bnq);
        store.reset_bank_cache();
        let result = self.decode_level_room(store, level, room);
        store.set_bank_source(BankSource::Mbk);
        store.reset_bank_cache();
        result
    }

    /// Pre-rendered room `room` of the level map.
    #[tracing::instrument(level = "debug", skip(self, store))]
    pub fn decode_map_room(
        &mut self,
        store: &AssetStore,
        level: usize,
        room: usize,
    ) -> EngineResult<()> {
        let map_room = decode_map_room(store.require(AssetKind::Map)?, level, room)?;
        self.end_menu()?;
        self.layers.clear_front();
        self.layers.put_front(&map_room.bitmap);
        self.layers.save_background();
        self.map_palette_slots = map_room.palette_slots;
        Ok(())
    }

    fn set_slot(&mut self, slot: u8, colors: &[Rgb; SLOT_COLORS]) -> EngineResult<()> {
        if slot > MAX_PALETTE_SLOT {
            return Err(EngineError::size_mismatch(format!(
                "palette slot {slot:#x} out of range"
            )));
        }
        for (i, &c) in colors.iter().enumerate() {
            let index = usize::from(slot) * SLOT_COLORS + i;
            let index = u8::try_from(index).map_err(|_| {
                EngineError::size_mismatch(format!("palette entry {index} out of range"))
            })?;
            self.sink.set_palette_entry(index, c)?;
        }
        Ok(())
    }

    /// Sixteen colours of palette `num` from the level palette file into slot `slot`.
    pub fn set_palette_slot_be(
        &mut self,
        store: &AssetStore,
        slot: u8,
        num: u16,
    ) -> EngineResult<()> {
        let colors = slot_be(store.require(AssetKind::Pal)?, usize::from(num))?;
        self.set_slot(slot, &colors)
    }

    /// Sixteen little-endian packed colours into slot `slot`.
    pub fn set_palette_slot_le(&mut self, slot: u8, data: &[u8]) -> EngineResult<()> {
        self.set_slot(slot, &slot_le(data)?)
    }

    /// Single colour `offset` of the level palette file into entry `index`.
    pub fn set_palette_color_be(
        &mut self,
        store: &AssetStore,
        index: u8,
        offset: usize,
    ) -> EngineResult<()> {
        let color = be_u16(store.require(AssetKind::Pal)?, offset * 2)?;
        self.sink.set_palette_entry(index, convert_color(color, true))
    }

    /// Load the configured text palette into slot 0xE.
    pub fn set_text_palette(&mut self) -> EngineResult<()> {
        let colors = slot_le(&self.text_palette)?;
        self.set_slot(TEXT_PALETTE_SLOT, &colors)?;
        if self.family.family() == AssetFamily::Planar {
            self.sink.set_palette_entry(0xE7, Rgb::new(0xEE, 0xEE, 0))?;
        }
        Ok(())
    }

    /// Load the configured RGB palette into slot 0xF.
    pub fn set_palette_0xf(&mut self) -> EngineResult<()> {
        let colors = slot_rgb(&self.slot_0xf_palette)?;
        self.set_slot(0xF, &colors)
    }

    /// Assign the room palettes to their slots.
    pub fn set_level_palettes(&mut self, store: &AssetStore, level: usize) -> EngineResult<()> {
        let [s1, s2, s3, s4] = self.map_palette_slots;
        match self.family.family() {
            AssetFamily::Nibble => {
                if self.inventory_palette_slot == 0 {
                    self.inventory_palette_slot = s3;
                }
                if self.hero_palette_slot == 0 {
                    self.hero_palette_slot = s3;
                }
                for (slot, num) in [(0, s1), (1, s2), (2, s3), (3, s4)] {
                    self.set_palette_slot_be(store, slot, num)?;
                }
                let hero = if self.hero_palette_slot == s3 { 0 } else { 1 };
                let colors = slot_le(&self.hero_palettes[hero])?;
                self.set_slot(4, &colors)?;
                let inventory = self.inventory_palette_slot;
                for (slot, num) in [(8, s1), (9, s2), (0xA, inventory), (0xB, s4)] {
                    self.set_palette_slot_be(store, slot, num)?;
                }
                self.set_text_palette()
            }
            AssetFamily::Planar => {
                let first = level == 0;
                for (slot, num) in [
                    (0, s1),
                    (1, if first { s3 } else { s2 }),
                    (2, s3),
                    (3, s3),
                    (4, s3),
                    (8, s1),
                    (9, if first { s1 } else { s3 }),
                    (0xA, s3),
                ] {
                    self.set_palette_slot_be(store, slot, num)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/video.rs"]
mod tests;
