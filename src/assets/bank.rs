use crate::{
    assets::formats::BankTable,
    codec::unpack::Codec,
    foundation::{
        bytes::be_u32,
        error::{EngineError, EngineResult},
    },
};

/// Generation-tagged reference to a chunk inside a [`BankCache`] arena.
///
/// Valid until the next arena reset; resolving it afterwards yields
/// [`EngineError::StaleHandle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BankHandle {
    generation: u32,
    offset: usize,
    size: usize,
}

impl BankHandle {
    /// Byte offset of the chunk inside the arena.
    pub fn offset(self) -> usize {
        self.offset
    }

    /// Bytes covered by the handle.
    pub fn size(self) -> usize {
        self.size
    }

    /// Arena generation the handle was issued in.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Clone, Copy, Debug)]
struct BankEntry {
    id: u16,
    offset: usize,
    size: usize,
}

/// Bump-allocated arena of decoded bank chunks.
///
/// The only eviction is a wholesale reset, which happens at level load and whenever a chunk
/// does not fit the remaining contiguous space or the entry table is full.
#[derive(Debug)]
pub struct BankCache {
    arena: Vec<u8>,
    head: usize,
    entries: Vec<BankEntry>,
    max_entries: usize,
    generation: u32,
}

impl BankCache {
    /// Empty cache of `capacity` bytes holding at most `max_entries` chunks.
    pub fn new(capacity: usize, max_entries: usize) -> Self {
        Self {
            arena: vec![0; capacity],
            head: 0,
            entries: Vec::with_capacity(max_entries),
            max_entries,
            generation: 0,
        }
    }

    /// Arena size in bytes.
    pub fn capacity(&self) -> usize {
        self.arena.len()
    }

    /// Bytes allocated since the last reset.
    pub fn head(&self) -> usize {
        self.head
    }

    /// Number of chunks currently cached.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No chunk is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current arena generation; bumped by every reset.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Drop every cached chunk and invalidate all issued handles.
    pub fn reset(&mut self) {
        self.head = 0;
        self.entries.clear();
        self.generation = self.generation.wrapping_add(1);
        tracing::trace!(generation = self.generation, "bank arena reset");
    }

    /// Find a cached chunk by bank id.
    pub fn lookup(&self, id: u16) -> Option<BankHandle> {
        self.entries.iter().find(|e| e.id == id).map(|e| BankHandle {
            generation: self.generation,
            offset: e.offset,
            size: e.size,
        })
    }

    /// Decode bank `id` from `table` into the arena and register it.
    ///
    /// Resets the arena first when the chunk does not fit after the current head. On error no
    /// entry is registered.
    pub fn load_and_cache(
        &mut self,
        id: u16,
        table: &BankTable<'_>,
        codec: &dyn Codec,
    ) -> EngineResult<BankHandle> {
        let entry = table.entry(id)?;
        let size = entry.size;
        if size > self.capacity() {
            return Err(EngineError::allocation(format!(
                "bank {id} needs {size} bytes, arena holds {}",
                self.capacity()
            )));
        }
        if self.capacity() - self.head < size || self.entries.len() >= self.max_entries {
            self.reset();
        }

        let offset = self.head;
        let dst = &mut self.arena[offset..offset + size];
        let data = table.data();
        if entry.raw {
            let src = data
                .get(entry.offset..entry.offset + size)
                .ok_or_else(|| {
                    EngineError::size_mismatch(format!(
                        "bank {id} stored chunk at {} overruns table of {} bytes",
                        entry.offset,
                        data.len()
                    ))
                })?;
            dst.copy_from_slice(src);
        } else {
            if entry.offset <= 4 || entry.offset > data.len() {
                return Err(EngineError::size_mismatch(format!(
                    "bank {id} packed stream ends at invalid offset {}",
                    entry.offset
                )));
            }
            let declared = be_u32(data, entry.offset - 4)? as usize;
            if declared != size {
                return Err(EngineError::size_mismatch(format!(
                    "bank {id} unpacks to {declared} bytes, table says {size}"
                )));
            }
            if !codec.decompress(dst, &data[..entry.offset]) {
                return Err(EngineError::checksum(format!("bank {id} failed to unpack")));
            }
        }

        self.entries.push(BankEntry { id, offset, size });
        self.head += size;
        tracing::trace!(id, offset, size, "cached bank chunk");
        Ok(BankHandle {
            generation: self.generation,
            offset,
            size,
        })
    }

    /// Cached chunk for `id`, decoding it on first use.
    pub fn get_or_load(
        &mut self,
        id: u16,
        table: &BankTable<'_>,
        codec: &dyn Codec,
    ) -> EngineResult<BankHandle> {
        match self.lookup(id) {
            Some(h) => Ok(h),
            None => self.load_and_cache(id, table, codec),
        }
    }

    /// Resolve a handle to its bytes.
    pub fn data(&self, handle: BankHandle) -> EngineResult<&[u8]> {
        if handle.generation != self.generation {
            return Err(EngineError::stale(format!(
                "handle from generation {} used in generation {}",
                handle.generation, self.generation
            )));
        }
        Ok(&self.arena[handle.offset..handle.offset + handle.size])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/bank.rs"]
mod tests;
