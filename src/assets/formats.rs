//! Byte layouts of the structured asset categories.
//!
//! Everything here is a pure parser over an in-memory buffer. Multi-byte fields follow the
//! family byte order unless a layout pins one explicitly.

use crate::foundation::{
    bytes::{ByteOrder, ByteReader, be_u16, be_u32, le_u16, le_u32, slice_at},
    core::AssetFamily,
    error::{EngineError, EngineResult},
};

/// Size of one bank table record.
pub const BANK_ENTRY_SIZE: usize = 6;
/// Bank chunk sizes are stored in units of this many bytes.
pub const BANK_UNIT: usize = 32;

/// How the 16-bit length field of a bank table record is read when its top bit is set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BankSizeConvention {
    /// Negate the field read as a signed 16-bit value.
    Signed,
    /// Mask off the top bit.
    Masked,
}

/// One decoded bank table record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BankTableEntry {
    /// Offset of the chunk (or of the end of its packed stream) inside the table buffer.
    pub offset: usize,
    /// Chunk bytes are stored verbatim.
    pub raw: bool,
    /// Decoded chunk size in bytes.
    pub size: usize,
}

/// Read-only view over a bank table buffer (`.MBK` / `.BNQ`).
#[derive(Clone, Copy, Debug)]
pub struct BankTable<'a> {
    data: &'a [u8],
    family: AssetFamily,
    convention: BankSizeConvention,
}

impl<'a> BankTable<'a> {
    /// Table view over `data` with the given size reading.
    pub fn new(data: &'a [u8], family: AssetFamily, convention: BankSizeConvention) -> Self {
        Self {
            data,
            family,
            convention,
        }
    }

    /// Conventional size reading for `family`; the demo `.BNQ` table overrides it.
    pub fn convention_for(family: AssetFamily, demo_table: bool) -> BankSizeConvention {
        match family {
            AssetFamily::Planar => BankSizeConvention::Signed,
            AssetFamily::Nibble if demo_table => BankSizeConvention::Signed,
            AssetFamily::Nibble => BankSizeConvention::Masked,
        }
    }

    /// Whole table file, chunk payloads included.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Record of bank `id`.
    pub fn entry(&self, id: u16) -> EngineResult<BankTableEntry> {
        let at = usize::from(id) * BANK_ENTRY_SIZE;
        let mut offset = be_u32(self.data, at)? as usize;
        if self.family == AssetFamily::Nibble {
            // the high bytes of the first record hold the entry count
            offset &= 0xFFFF;
        }
        let len = be_u16(self.data, at + 4)?;
        let raw = len & 0x8000 != 0;
        let units = if raw {
            match self.convention {
                BankSizeConvention::Signed => -i32::from(len as i16),
                BankSizeConvention::Masked => i32::from(len & 0x7FFF),
            }
        } else {
            i32::from(len)
        };
        Ok(BankTableEntry {
            offset,
            raw,
            size: units as usize * BANK_UNIT,
        })
    }
}

/// Number of addressable sprite slots.
pub const NUM_SPRITES: usize = 1287;
/// Unpacked size that identifies packed primary sprite data.
pub const PRIMARY_SPRITE_DATA_SIZE: usize = 178_647;

/// Which sprite buffer a sprite reference points into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpriteSource {
    /// `.SPR` data.
    Primary,
    /// Monster `.SPR` data.
    Monster,
}

/// Location of one sprite frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteRef {
    /// Buffer holding the frame.
    pub source: SpriteSource,
    /// Byte offset of the frame in that buffer.
    pub offset: usize,
}

/// Parse a `.OFF` table: `(slot, offset)` pairs where `None` clears the slot.
pub fn parse_sprite_offsets(data: &[u8]) -> EngineResult<Vec<(usize, Option<usize>)>> {
    let mut out = Vec::new();
    let mut at = 0;
    loop {
        let pos = le_u16(data, at)?;
        if pos == 0xFFFF {
            return Ok(out);
        }
        let pos = usize::from(pos);
        if pos >= NUM_SPRITES {
            return Err(EngineError::size_mismatch(format!(
                "sprite slot {pos} out of range"
            )));
        }
        let off = le_u32(data, at + 2)?;
        out.push((pos, (off != 0xFFFF_FFFF).then_some(off as usize)));
        at += 6;
    }
}

/// Map an offset of the packed sprite layout onto the buffer holding it.
pub fn packed_sprite_ref(offset: u32) -> SpriteRef {
    let offset = offset as usize;
    if offset >= PRIMARY_SPRITE_DATA_SIZE {
        SpriteRef {
            source: SpriteSource::Monster,
            offset: offset - PRIMARY_SPRITE_DATA_SIZE,
        }
    } else {
        SpriteRef {
            source: SpriteSource::Primary,
            offset,
        }
    }
}

/// Number of object nodes in planar object tables.
pub const NUM_OBJECT_NODES: usize = 230;
const OBJECT_RECORD_SIZE: usize = 0x12;

/// One object record (game-logic opcode tuple).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Object {
    /// Object type.
    pub kind: u16,
    /// Horizontal offset.
    pub dx: i8,
    /// Vertical offset.
    pub dy: i8,
    /// Type of the object to initialise.
    pub init_obj_type: u16,
    /// Second condition opcode.
    pub opcode2: u8,
    /// First condition opcode.
    pub opcode1: u8,
    /// Object flags.
    pub flags: u8,
    /// Action opcode.
    pub opcode3: u8,
    /// Number of the object to initialise.
    pub init_obj_number: u16,
    /// First opcode argument.
    pub opcode_arg1: u16,
    /// Second opcode argument.
    pub opcode_arg2: u16,
    /// Third opcode argument.
    pub opcode_arg3: u16,
}

/// Objects sharing one node number.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectNode {
    /// Highest object number of the node.
    pub last_obj_number: u16,
    /// Decoded object records.
    pub objects: Vec<Object>,
}

/// Object node table. Consecutive node numbers sharing a data offset share one decoded node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectTable {
    nodes: Vec<ObjectNode>,
    node_of: Vec<usize>,
}

impl ObjectTable {
    /// Decode `count` nodes: an offset table followed by node payloads, all relative to `data`.
    pub fn decode(data: &[u8], count: usize, order: ByteOrder) -> EngineResult<Self> {
        let mut r = ByteReader::new(data, order);
        let mut offsets = Vec::with_capacity(count + 1);
        for _ in 0..count {
            offsets.push(r.u32()? as usize);
        }
        offsets.push(data.len());

        let mut nodes = Vec::new();
        let mut node_of = Vec::with_capacity(count);
        let mut prev = None;
        for i in 0..count {
            let off = offsets[i];
            if prev != Some(off) {
                let next = offsets[i + 1..]
                    .iter()
                    .copied()
                    .find(|&o| o != off)
                    .unwrap_or(data.len());
                let num_objects = next
                    .checked_sub(off + 2)
                    .map(|n| n / OBJECT_RECORD_SIZE)
                    .ok_or_else(|| {
                        EngineError::size_mismatch(format!("object node {i} offsets not ascending"))
                    })?;
                nodes.push(decode_node(data, off, num_objects, order)?);
                prev = Some(off);
            }
            node_of.push(nodes.len() - 1);
        }
        Ok(Self { nodes, node_of })
    }

    /// Number of addressable node numbers.
    pub fn len(&self) -> usize {
        self.node_of.len()
    }

    /// No node was decoded.
    pub fn is_empty(&self) -> bool {
        self.node_of.is_empty()
    }

    /// Number of distinct decoded nodes.
    pub fn distinct_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Node `num`, shared with its aliases.
    pub fn node(&self, num: usize) -> Option<&ObjectNode> {
        self.node_of.get(num).map(|&i| &self.nodes[i])
    }

    /// Whether two node numbers resolve to the same decoded node.
    pub fn shares_node(&self, a: usize, b: usize) -> bool {
        matches!((self.node_of.get(a), self.node_of.get(b)), (Some(x), Some(y)) if x == y)
    }
}

fn decode_node(
    data: &[u8],
    off: usize,
    num_objects: usize,
    order: ByteOrder,
) -> EngineResult<ObjectNode> {
    let mut r = ByteReader::at(data, off, order);
    let last_obj_number = r.u16()?;
    let mut objects = Vec::with_capacity(num_objects);
    for _ in 0..num_objects {
        objects.push(Object {
            kind: r.u16()?,
            dx: r.i8()?,
            dy: r.i8()?,
            init_obj_type: r.u16()?,
            opcode2: r.u8()?,
            opcode1: r.u8()?,
            flags: r.u8()?,
            opcode3: r.u8()?,
            init_obj_number: r.u16()?,
            opcode_arg1: r.u16()?,
            opcode_arg2: r.u16()?,
            opcode_arg3: r.u16()?,
        });
    }
    Ok(ObjectNode {
        last_obj_number,
        objects,
    })
}

/// Maximum number of initial entity records.
pub const MAX_PGE: usize = 256;

/// Initial state of one game entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InitPge {
    /// Entity type.
    pub kind: u16,
    /// Initial x position.
    pub pos_x: u16,
    /// Initial y position.
    pub pos_y: u16,
    /// Object node driving the entity.
    pub obj_node_number: u16,
    /// Initial life.
    pub life: u16,
    /// Initial counter values.
    pub counter_values: [u16; 4],
    /// Object type.
    pub object_type: u8,
    /// Room the entity starts in.
    pub init_room: u8,
    /// Location inside the room.
    pub room_location: u8,
    /// Initial flags.
    pub init_flags: u8,
    /// Icon shown on collision.
    pub colliding_icon_num: u8,
    /// Inventory icon.
    pub icon_num: u8,
    /// Object identifier.
    pub object_id: u8,
    /// Skill level.
    pub skill: u8,
    /// Initial horizontal mirror.
    pub mirror_x: u8,
    /// Entity flags.
    pub flags: u8,
    /// Unused byte kept for round-tripping.
    pub unk1c: u8,
    /// Text shown for the entity.
    pub text_num: u16,
}

/// Parse a count-prefixed table of 32-byte entity records.
pub fn parse_pge(data: &[u8], order: ByteOrder) -> EngineResult<Vec<InitPge>> {
    let mut r = ByteReader::new(data, order);
    let count = usize::from(r.u16()?);
    if count > MAX_PGE {
        return Err(EngineError::size_mismatch(format!(
            "{count} entity records exceed the table of {MAX_PGE}"
        )));
    }
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let mut p = InitPge {
            kind: r.u16()?,
            pos_x: r.u16()?,
            pos_y: r.u16()?,
            obj_node_number: r.u16()?,
            life: r.u16()?,
            ..InitPge::default()
        };
        for v in &mut p.counter_values {
            *v = r.u16()?;
        }
        p.object_type = r.u8()?;
        p.init_room = r.u8()?;
        p.room_location = r.u8()?;
        p.init_flags = r.u8()?;
        p.colliding_icon_num = r.u8()?;
        p.icon_num = r.u8()?;
        p.object_id = r.u8()?;
        p.skill = r.u8()?;
        p.mirror_x = r.u8()?;
        p.flags = r.u8()?;
        p.unk1c = r.u8()?;
        r.skip(1)?;
        p.text_num = r.u16()?;
        out.push(p);
    }
    Ok(out)
}

/// One half of a cutscene `.CMP` file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CmpChunk<'a> {
    /// Stored bytes.
    pub bytes: &'a [u8],
    /// Decoded size; equal to `bytes.len()` for stored chunks.
    pub size: usize,
    /// Bytes must be unpacked.
    pub packed: bool,
}

/// Split a `.CMP` file into its polygon and command chunks.
pub fn split_cmp(data: &[u8]) -> EngineResult<[CmpChunk<'_>; 2]> {
    let mut at = 0;
    let pol = read_cmp_chunk(data, &mut at)?;
    let cmd = read_cmp_chunk(data, &mut at)?;
    Ok([pol, cmd])
}

fn read_cmp_chunk<'a>(data: &'a [u8], at: &mut usize) -> EngineResult<CmpChunk<'a>> {
    let declared = be_u32(data, *at)? as i32;
    *at += 4;
    let (len, size) = if declared < 0 {
        let len = declared.unsigned_abs() as usize;
        (len, len)
    } else {
        let len = declared as usize;
        let trailer = len
            .checked_sub(4)
            .ok_or_else(|| EngineError::size_mismatch("cutscene chunk too short"))?;
        (len, be_u32(data, *at + trailer)? as usize)
    };
    let bytes = slice_at(data, *at, len)?;
    *at += len;
    Ok(CmpChunk {
        bytes,
        size,
        packed: size != len,
    })
}

/// Number of sampled sound slots.
pub const NUM_SFXS: usize = 66;

/// One decoded sound effect.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SoundFx {
    /// Offset of the sample data inside its source file.
    pub offset: usize,
    /// Decoded samples.
    pub data: Vec<u8>,
}

/// Parse a `.SPL` table: per slot a BE size (top bit = empty slot) then the samples.
pub fn parse_spl(data: &[u8]) -> EngineResult<Vec<Option<SoundFx>>> {
    let mut out = vec![None; NUM_SFXS];
    let mut at = 0;
    for (i, slot) in out.iter_mut().enumerate() {
        let size = be_u16(data, at)?;
        at += 2;
        if size & 0x8000 != 0 {
            continue;
        }
        let size = usize::from(size);
        if size == 0 || size & 1 != 0 {
            return Err(EngineError::size_mismatch(format!(
                "sound {i} has invalid size {size}"
            )));
        }
        let bytes = slice_at(data, at, size)?;
        // slot 64 is present in the file but never played
        if i != 64 {
            *slot = Some(SoundFx {
                offset: at,
                data: bytes.to_vec(),
            });
        }
        at += size;
    }
    Ok(out)
}

const FIB_DELTAS: [u8; 16] = [
    0xDE, 0xEB, 0xF3, 0xF8, 0xFB, 0xFD, 0xFE, 0xFF, 0x00, 0x01, 0x02, 0x03, 0x05, 0x08, 0x0D, 0x15,
];

/// Parse a `.FIB` table, expanding every delta-coded sample byte into two samples.
pub fn parse_fib(data: &[u8]) -> EngineResult<Vec<Option<SoundFx>>> {
    let mut r = ByteReader::new(data, ByteOrder::Little);
    let count = usize::from(r.u16()?);
    let mut headers = Vec::with_capacity(count);
    for _ in 0..count {
        headers.push((r.u32()? as usize, usize::from(r.u16()?)));
    }

    let mut out = Vec::with_capacity(count);
    for (offset, len) in headers {
        if len == 0 {
            out.push(None);
            continue;
        }
        let src = slice_at(data, offset, len)?;
        let mut samples = Vec::with_capacity(len * 2);
        let mut c = src[0];
        samples.extend([c, c]);
        for &d in &src[1..] {
            c = c.wrapping_add(FIB_DELTAS[usize::from(d >> 4)]);
            samples.push(c);
            c = c.wrapping_add(FIB_DELTAS[usize::from(d & 15)]);
            samples.push(c);
        }
        out.push(Some(SoundFx {
            offset,
            data: samples,
        }));
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/formats.rs"]
mod tests;
