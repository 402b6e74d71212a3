use std::{collections::HashMap, sync::Arc};

use crate::{
    assets::{
        bank::{BankCache, BankHandle},
        formats::{
            BankTable, InitPge, NUM_OBJECT_NODES, NUM_SPRITES, ObjectTable,
            PRIMARY_SPRITE_DATA_SIZE, SoundFx, SpriteRef, SpriteSource, packed_sprite_ref,
            parse_fib, parse_pge, parse_spl, parse_sprite_offsets, split_cmp,
        },
        kind::AssetKind,
    },
    codec::unpack::{BackwardLz, Codec, unpack_to_vec},
    foundation::{
        bytes::{be_u16, be_u32, le_u16, slice_at},
        config::EngineConfig,
        core::AssetFamily,
        error::{EngineError, EngineResult},
    },
    io::{
        archive::{AbaArchive, Archive},
        fs::FileSystem,
    },
};

/// Decoded size of the collision table.
pub const COLLISION_TABLE_SIZE: usize = 0x1D00;
/// Size of the object-to-bank mapping.
pub const OBJECT_BANK_MAP_SIZE: usize = 0x4A;
/// Capacity of the monster sprite buffer.
pub const MONSTER_SPRITE_DATA_MAX: usize = 0x10000;
/// Exact size of a menu bitmap.
pub const MENU_MAP_SIZE: usize = 0xE000;
/// Exact size of a menu palette.
pub const MENU_PAL_SIZE: usize = 768;
const SPRITE_HEADER_SIZE: usize = 12;

/// Which bank table feeds the bank cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BankSource {
    /// Level bank table.
    #[default]
    Mbk,
    /// Demo bank table.
    Bnq,
}

impl BankSource {
    fn kind(self) -> AssetKind {
        match self {
            BankSource::Mbk => AssetKind::Mbk,
            BankSource::Bnq => AssetKind::Bnq,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Origin {
    File,
    Archive,
}

/// Owner of every loaded asset buffer and of the bank cache.
///
/// Each load parses into fresh values first and only then replaces the previous buffer of
/// the same category, so a failed load leaves the earlier state untouched.
pub struct AssetStore {
    config: EngineConfig,
    fs: Box<dyn FileSystem>,
    archive: Option<Box<dyn Archive>>,
    codec: Arc<dyn Codec>,
    demo: bool,
    bank_source: BankSource,
    bank: BankCache,
    buffers: HashMap<AssetKind, Vec<u8>>,
    icons: Vec<u8>,
    sprite_refs: Vec<Option<SpriteRef>>,
    objects: Option<ObjectTable>,
    pge: Vec<InitPge>,
    sounds: Vec<Option<SoundFx>>,
}

impl std::fmt::Debug for AssetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.buffers.keys().collect();
        kinds.sort();
        f.debug_struct("AssetStore")
            .field("family", &self.config.family)
            .field("demo", &self.demo)
            .field("buffers", &kinds)
            .field("bank", &self.bank)
            .finish_non_exhaustive()
    }
}

impl AssetStore {
    /// Store over `fs` using the default codec. Call [`AssetStore::init`] before loading.
    pub fn new(config: EngineConfig, fs: impl FileSystem + 'static) -> Self {
        Self::with_codec(config, Box::new(fs), Arc::new(BackwardLz))
    }

    /// Store over `fs` decoding packed data with `codec`.
    pub fn with_codec(
        config: EngineConfig,
        fs: Box<dyn FileSystem>,
        codec: Arc<dyn Codec>,
    ) -> Self {
        let bank = BankCache::new(config.bank_arena_size, config.max_bank_entries);
        Self {
            config,
            fs,
            archive: None,
            codec,
            demo: false,
            bank_source: BankSource::Mbk,
            bank,
            buffers: HashMap::new(),
            icons: Vec::new(),
            sprite_refs: vec![None; NUM_SPRITES],
            objects: None,
            pge: Vec::new(),
            sounds: Vec::new(),
        }
    }

    /// Detect demo data and open the archive container when present.
    pub fn init(&mut self) -> EngineResult<()> {
        match self.config.family {
            AssetFamily::Planar => {
                self.demo = self.fs.exists("DEMO.LEV");
            }
            AssetFamily::Nibble => {
                if let Some(bytes) = self.fs.read(&self.config.archive_name)? {
                    let aba = AbaArchive::parse(bytes, Arc::clone(&self.codec))?;
                    self.archive = Some(Box::new(aba));
                    self.demo = true;
                }
            }
        }
        tracing::debug!(
            family = self.config.family.label(),
            demo = self.demo,
            archive = self.archive.is_some(),
            "asset store initialized"
        );
        Ok(())
    }

    /// Use `archive` as the fallback container instead of the configured one.
    pub fn set_archive(&mut self, archive: Box<dyn Archive>) {
        self.archive = Some(archive);
    }

    /// Configuration the store was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Asset family of the data set.
    pub fn family(&self) -> AssetFamily {
        self.config.family
    }

    /// Demo data was detected at init.
    pub fn is_demo(&self) -> bool {
        self.demo
    }

    /// Load `name` as `kind`, from a standalone file or else from the archive container.
    #[tracing::instrument(level = "debug", skip(self), fields(family = self.config.family.label()))]
    pub fn load(&mut self, name: &str, kind: AssetKind, ext: Option<&str>) -> EngineResult<()> {
        let file_name = kind.file_name(name, ext);
        let (bytes, origin) = match self.fs.read(&file_name)? {
            Some(bytes) => (bytes, Origin::File),
            None => {
                let Some(archive) = self.archive.as_ref() else {
                    return Err(EngineError::not_found(file_name));
                };
                let Some(bytes) = archive.load_entry(&file_name)? else {
                    return Err(EngineError::not_found(file_name));
                };
                if !kind.archive_loadable() {
                    return Err(EngineError::unsupported(format!(
                        "{kind} cannot be loaded from the archive ('{file_name}')"
                    )));
                }
                (bytes, Origin::Archive)
            }
        };
        tracing::debug!(file = %file_name, bytes = bytes.len(), ?origin, "loaded asset bytes");
        self.install(kind, &file_name, bytes, origin)
    }

    fn install(
        &mut self,
        kind: AssetKind,
        file_name: &str,
        mut bytes: Vec<u8>,
        origin: Origin,
    ) -> EngineResult<()> {
        let order = self.config.family.byte_order();
        match kind {
            AssetKind::Mbk
            | AssetKind::Bnq
            | AssetKind::Pal
            | AssetKind::Map
            | AssetKind::Lev
            | AssetKind::Ani
            | AssetKind::Tbn
            | AssetKind::Fnt
            | AssetKind::Cmd
            | AssetKind::Pol
            | AssetKind::CineOffsets
            | AssetKind::CineText => {
                self.buffers.insert(kind, bytes);
            }
            AssetKind::Sgd => {
                let sgd = match self.config.family {
                    AssetFamily::Nibble => {
                        // first byte is the entry count; cleared so offsets read as 32 bits
                        if let Some(b) = bytes.first_mut() {
                            *b = 0;
                        }
                        bytes
                    }
                    AssetFamily::Planar => self.unpack(&bytes, file_name)?,
                };
                self.buffers.insert(kind, sgd);
            }
            AssetKind::Spc => {
                be_u16(&bytes, 0)?;
                self.buffers.insert(kind, bytes);
            }
            AssetKind::Icn => {
                self.icons.extend_from_slice(&bytes);
            }
            AssetKind::Ct => {
                let ct = self.unpack(&bytes, file_name)?;
                if ct.len() != COLLISION_TABLE_SIZE {
                    return Err(EngineError::size_mismatch(format!(
                        "'{file_name}' unpacks to {} bytes, expected {COLLISION_TABLE_SIZE}",
                        ct.len()
                    )));
                }
                self.buffers.insert(AssetKind::Ct, ct);
            }
            AssetKind::Rp | AssetKind::Rpc => {
                let exact = origin == Origin::Archive;
                if bytes.len() < OBJECT_BANK_MAP_SIZE
                    || (exact && bytes.len() != OBJECT_BANK_MAP_SIZE)
                {
                    return Err(EngineError::size_mismatch(format!(
                        "'{file_name}' is {} bytes, expected {OBJECT_BANK_MAP_SIZE}",
                        bytes.len()
                    )));
                }
                bytes.truncate(OBJECT_BANK_MAP_SIZE);
                self.buffers.insert(AssetKind::Rp, bytes);
            }
            AssetKind::Spr => {
                let data = strip_sprite_header(&bytes, file_name)?;
                self.buffers.insert(AssetKind::Spr, data);
            }
            AssetKind::Sprm => {
                let data = strip_sprite_header(&bytes, file_name)?;
                if data.len() > MONSTER_SPRITE_DATA_MAX {
                    return Err(EngineError::allocation(format!(
                        "'{file_name}' holds {} bytes of monster sprites, max {MONSTER_SPRITE_DATA_MAX}",
                        data.len()
                    )));
                }
                self.buffers.insert(AssetKind::Sprm, data);
            }
            AssetKind::Spm => self.install_packed_sprites(&bytes, file_name)?,
            AssetKind::SpriteOffsets | AssetKind::MonsterSpriteOffsets => {
                let source = if kind == AssetKind::SpriteOffsets {
                    SpriteSource::Primary
                } else {
                    SpriteSource::Monster
                };
                for (slot, offset) in parse_sprite_offsets(&bytes)? {
                    self.sprite_refs[slot] = offset.map(|offset| SpriteRef { source, offset });
                }
            }
            AssetKind::Obj => {
                let table = match self.config.family {
                    AssetFamily::Nibble => {
                        let count = usize::from(le_u16(&bytes, 0)?);
                        if count >= 255 {
                            return Err(EngineError::size_mismatch(format!(
                                "'{file_name}' declares {count} object nodes"
                            )));
                        }
                        ObjectTable::decode(&bytes[2..], count, order)?
                    }
                    AssetFamily::Planar => ObjectTable::decode(&bytes, NUM_OBJECT_NODES, order)?,
                };
                self.objects = Some(table);
            }
            AssetKind::Obc => {
                let packed_size = be_u32(&bytes, 0)? as usize;
                let stream = slice_at(&bytes, 4, packed_size)?;
                let data = self.unpack(stream, file_name)?;
                self.objects = Some(ObjectTable::decode(
                    &data,
                    NUM_OBJECT_NODES,
                    AssetFamily::Planar.byte_order(),
                )?);
            }
            AssetKind::Pge => {
                self.pge = parse_pge(&bytes, order)?;
            }
            AssetKind::Cmp => {
                let [pol, cmd] = split_cmp(&bytes)?;
                let pol = self.chunk(pol.bytes, pol.size, pol.packed, "cutscene polygon data")?;
                let cmd = self.chunk(cmd.bytes, cmd.size, cmd.packed, "cutscene command data")?;
                self.buffers.insert(AssetKind::Pol, pol);
                self.buffers.insert(AssetKind::Cmd, cmd);
            }
            AssetKind::Spl => {
                self.sounds = parse_spl(&bytes)?;
            }
            AssetKind::Fib => {
                self.sounds = parse_fib(&bytes)?;
            }
            AssetKind::MenuMap | AssetKind::MenuPal => {
                let expected = if kind == AssetKind::MenuMap {
                    MENU_MAP_SIZE
                } else {
                    MENU_PAL_SIZE
                };
                if bytes.len() != expected {
                    return Err(EngineError::size_mismatch(format!(
                        "'{file_name}' is {} bytes, expected {expected}",
                        bytes.len()
                    )));
                }
                self.buffers.insert(kind, bytes);
            }
            AssetKind::MenuCmp => {
                let packed_size = be_u32(&bytes, 0)? as usize;
                let stream = slice_at(&bytes, 4, packed_size)?;
                let bitmap = self.unpack(stream, file_name)?;
                self.buffers.insert(kind, bitmap);
            }
        }
        Ok(())
    }

    fn install_packed_sprites(&mut self, bytes: &[u8], file_name: &str) -> EngineResult<()> {
        let data = self.unpack(bytes, file_name)?;
        if data.len() == PRIMARY_SPRITE_DATA_SIZE {
            self.buffers.insert(AssetKind::Spr, data);
        } else if data.len() <= MONSTER_SPRITE_DATA_MAX {
            self.buffers.insert(AssetKind::Sprm, data);
        } else {
            return Err(EngineError::allocation(format!(
                "'{file_name}' unpacks to {} bytes of monster sprites",
                data.len()
            )));
        }
        for (slot, &offset) in self
            .config
            .packed_sprite_offsets
            .iter()
            .take(NUM_SPRITES)
            .enumerate()
        {
            self.sprite_refs[slot] = Some(packed_sprite_ref(offset));
        }
        Ok(())
    }

    fn unpack(&self, src: &[u8], what: &str) -> EngineResult<Vec<u8>> {
        unpack_to_vec(self.codec.as_ref(), src, None, what)
    }

    fn chunk(&self, bytes: &[u8], size: usize, packed: bool, what: &str) -> EngineResult<Vec<u8>> {
        if !packed {
            return Ok(bytes.to_vec());
        }
        unpack_to_vec(self.codec.as_ref(), bytes, Some(size), what)
    }

    /// Drop the level-scoped buffers and reset the bank cache.
    pub fn clear_level(&mut self) {
        self.buffers.retain(|kind, _| !kind.level_scoped());
        self.objects = None;
        self.bank.reset();
        tracing::debug!("cleared level resources");
    }

    /// Raw buffer of a single-slot category.
    pub fn buffer(&self, kind: AssetKind) -> Option<&[u8]> {
        self.buffers.get(&kind).map(Vec::as_slice)
    }

    /// Like [`AssetStore::buffer`] but an unloaded category is an error.
    pub fn require(&self, kind: AssetKind) -> EngineResult<&[u8]> {
        self.buffer(kind)
            .ok_or_else(|| EngineError::not_found(format!("{kind} data not loaded")))
    }

    /// Concatenation of every icon set loaded so far.
    pub fn icons(&self) -> &[u8] {
        &self.icons
    }

    /// Forget every icon set.
    pub fn clear_icons(&mut self) {
        self.icons.clear();
    }

    /// Decoded collision table.
    pub fn collision_table(&self) -> Option<&[u8]> {
        self.buffer(AssetKind::Ct)
    }

    /// Object-to-bank mapping (`.RP` / `.RPC`).
    pub fn object_bank_map(&self) -> Option<&[u8]> {
        self.buffer(AssetKind::Rp)
    }

    /// Number of sprite cells in the `.SPC` table.
    pub fn spc_count(&self) -> Option<usize> {
        self.buffer(AssetKind::Spc)
            .and_then(|spc| be_u16(spc, 0).ok())
            .map(|n| usize::from(n) / 2)
    }

    /// Frame location of sprite slot `num`.
    pub fn sprite_ref(&self, num: usize) -> Option<SpriteRef> {
        self.sprite_refs.get(num).copied().flatten()
    }

    /// Sprite bytes starting at `sprite` up to the end of its buffer.
    pub fn sprite_data(&self, sprite: SpriteRef) -> EngineResult<&[u8]> {
        let kind = match sprite.source {
            SpriteSource::Primary => AssetKind::Spr,
            SpriteSource::Monster => AssetKind::Sprm,
        };
        let data = self.require(kind)?;
        data.get(sprite.offset..).ok_or_else(|| {
            EngineError::size_mismatch(format!(
                "sprite offset {} beyond {kind} data of {} bytes",
                sprite.offset,
                data.len()
            ))
        })
    }

    /// Byte preceding the sprite frame (frame header flags).
    pub fn sprite_header_byte(&self, sprite: SpriteRef, back: usize) -> EngineResult<u8> {
        let kind = match sprite.source {
            SpriteSource::Primary => AssetKind::Spr,
            SpriteSource::Monster => AssetKind::Sprm,
        };
        let data = self.require(kind)?;
        sprite
            .offset
            .checked_sub(back)
            .and_then(|at| data.get(at).copied())
            .ok_or_else(|| {
                EngineError::size_mismatch(format!("no header before sprite at {}", sprite.offset))
            })
    }

    /// Decoded object node table.
    pub fn objects(&self) -> Option<&ObjectTable> {
        self.objects.as_ref()
    }

    /// Initial entity records.
    pub fn pge(&self) -> &[InitPge] {
        &self.pge
    }

    /// Sound slots from the last `.SPL` or `.FIB` load.
    pub fn sounds(&self) -> &[Option<SoundFx>] {
        &self.sounds
    }

    /// Select the bank table used by the bank helpers.
    pub fn set_bank_source(&mut self, source: BankSource) {
        self.bank_source = source;
    }

    /// Bank table feeding the cache.
    pub fn bank_source(&self) -> BankSource {
        self.bank_source
    }

    /// The bank cache.
    pub fn bank_cache(&self) -> &BankCache {
        &self.bank
    }

    /// Drop every cached chunk.
    pub fn reset_bank_cache(&mut self) {
        self.bank.reset();
    }

    /// View over the active bank table.
    pub fn bank_table(&self) -> EngineResult<BankTable<'_>> {
        let kind = self.bank_source.kind();
        let data = self.require(kind)?;
        Ok(BankTable::new(
            data,
            self.config.family,
            BankTable::convention_for(self.config.family, kind == AssetKind::Bnq),
        ))
    }

    /// Decoded size of bank `id` in the active table.
    pub fn bank_size(&self, id: u16) -> EngineResult<usize> {
        Ok(self.bank_table()?.entry(id)?.size)
    }

    /// Cached bank chunk `id`, decoded through the active table on first use.
    pub fn bank_handle(&mut self, id: u16) -> EngineResult<BankHandle> {
        let kind = self.bank_source.kind();
        let data = self
            .buffers
            .get(&kind)
            .ok_or_else(|| EngineError::not_found(format!("{kind} data not loaded")))?;
        let table = BankTable::new(
            data,
            self.config.family,
            BankTable::convention_for(self.config.family, kind == AssetKind::Bnq),
        );
        self.bank.get_or_load(id, &table, self.codec.as_ref())
    }

    /// Bytes of a previously issued bank handle.
    pub fn bank_data(&self, handle: BankHandle) -> EngineResult<&[u8]> {
        self.bank.data(handle)
    }

    /// Unpacked layout block of `room` from the level layout file.
    ///
    /// The level file starts with big-endian end offsets; the packed stream of a room ends
    /// at its offset.
    pub fn level_room(&self, room: usize) -> EngineResult<Vec<u8>> {
        let lev = self.require(AssetKind::Lev)?;
        let end = be_u32(lev, room * 4)? as usize;
        let stream = lev.get(..end).ok_or_else(|| {
            EngineError::size_mismatch(format!("room {room} ends past level data at {end}"))
        })?;
        self.unpack(stream, &format!("level room {room}"))
    }
}

fn strip_sprite_header(bytes: &[u8], file_name: &str) -> EngineResult<Vec<u8>> {
    bytes
        .get(SPRITE_HEADER_SIZE..)
        .map(<[u8]>::to_vec)
        .ok_or_else(|| EngineError::size_mismatch(format!("'{file_name}' shorter than its header")))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
