use std::sync::Arc;

use crate::{
    codec::unpack::{Codec, unpack_to_vec},
    foundation::{
        bytes::{ByteOrder, ByteReader, slice_at},
        error::{EngineError, EngineResult},
    },
};

/// Named-entry container consulted when a standalone file is absent.
pub trait Archive {
    /// Load the entry called `name`; `Ok(None)` when the container has no such entry.
    fn load_entry(&self, name: &str) -> EngineResult<Option<Vec<u8>>>;
}

const ENTRY_SIZE: usize = 30;
const ENTRY_TAG: u32 = 0x442E_4D2E;

/// One directory record of an [`AbaArchive`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbaEntry {
    /// Entry filename, matched exactly.
    pub name: String,
    /// Payload offset from the start of the archive.
    pub offset: u32,
    /// Stored payload size.
    pub packed_size: u32,
    /// Size after unpacking.
    pub size: u32,
}

impl AbaEntry {
    /// Stored and unpacked sizes differ.
    pub fn is_packed(&self) -> bool {
        self.packed_size != self.size
    }
}

/// Demo archive: a big-endian directory followed by (optionally packed) entry payloads.
pub struct AbaArchive {
    data: Vec<u8>,
    entries: Vec<AbaEntry>,
    codec: Arc<dyn Codec>,
}

impl std::fmt::Debug for AbaArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbaArchive")
            .field("bytes", &self.data.len())
            .field("entries", &self.entries)
            .finish()
    }
}

impl AbaArchive {
    /// Parse the directory of an archive image held in memory.
    pub fn parse(data: Vec<u8>, codec: Arc<dyn Codec>) -> EngineResult<Self> {
        let mut r = ByteReader::new(&data, ByteOrder::Big);
        let count = r.u16()? as usize;
        let entry_size = r.u16()? as usize;
        if entry_size != ENTRY_SIZE {
            return Err(EngineError::size_mismatch(format!(
                "archive entry size is {entry_size}, expected {ENTRY_SIZE}"
            )));
        }

        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let raw_name = r.bytes(14)?;
            let name_len = raw_name.iter().position(|&b| b == 0).unwrap_or(raw_name.len());
            let name = String::from_utf8_lossy(&raw_name[..name_len]).into_owned();
            let offset = r.u32()?;
            let packed_size = r.u32()?;
            let size = r.u32()?;
            let tag = r.u32()?;
            if tag != ENTRY_TAG {
                return Err(EngineError::size_mismatch(format!(
                    "archive entry '{name}' has tag {tag:#010x}"
                )));
            }
            entries.push(AbaEntry {
                name,
                offset,
                packed_size,
                size,
            });
        }
        tracing::debug!(entries = entries.len(), "parsed archive directory");
        Ok(Self {
            data,
            entries,
            codec,
        })
    }

    /// Directory records in file order.
    pub fn entries(&self) -> &[AbaEntry] {
        &self.entries
    }

    fn find(&self, name: &str) -> Option<&AbaEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

impl Archive for AbaArchive {
    fn load_entry(&self, name: &str) -> EngineResult<Option<Vec<u8>>> {
        let Some(e) = self.find(name) else {
            return Ok(None);
        };
        let payload = slice_at(&self.data, e.offset as usize, e.packed_size as usize)?;
        if !e.is_packed() {
            return Ok(Some(payload.to_vec()));
        }
        let what = format!("archive entry {}", e.name);
        unpack_to_vec(self.codec.as_ref(), payload, Some(e.size as usize), &what).map(Some)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/io/archive.rs"]
mod tests;
