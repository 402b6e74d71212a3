use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::foundation::{
    core::AssetFamily,
    error::{EngineError, EngineResult},
};

/// Read-only access to data files by logical name.
///
/// Names are matched case-insensitively: the historical data sets ship with inconsistent casing.
pub trait FileSystem {
    /// Whether a file called `name` exists.
    fn exists(&self, name: &str) -> bool;

    /// Read the whole file called `name`; `Ok(None)` when it does not exist.
    fn read(&self, name: &str) -> EngineResult<Option<Vec<u8>>>;
}

/// Filesystem rooted at one data directory.
#[derive(Clone, Debug)]
pub struct DirFileSystem {
    root: PathBuf,
    paths_by_name: HashMap<String, PathBuf>,
}

impl DirFileSystem {
    /// Index the regular files directly under `root`.
    pub fn open(root: impl Into<PathBuf>) -> EngineResult<Self> {
        let root = root.into();
        let rd = std::fs::read_dir(&root)
            .with_context(|| format!("list data directory '{}'", root.display()))?;

        let mut paths_by_name = HashMap::new();
        for entry in rd.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            paths_by_name.insert(name.to_ascii_lowercase(), path.clone());
        }
        tracing::debug!(root = %root.display(), files = paths_by_name.len(), "indexed data directory");
        Ok(Self {
            root,
            paths_by_name,
        })
    }

    /// Directory this filesystem was opened on.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileSystem for DirFileSystem {
    fn exists(&self, name: &str) -> bool {
        self.paths_by_name.contains_key(&name.to_ascii_lowercase())
    }

    fn read(&self, name: &str) -> EngineResult<Option<Vec<u8>>> {
        let Some(path) = self.paths_by_name.get(&name.to_ascii_lowercase()) else {
            return Ok(None);
        };
        let bytes = std::fs::read(path)
            .with_context(|| format!("read data file '{}'", path.display()))
            .map_err(EngineError::from)?;
        Ok(Some(bytes))
    }
}

/// In-memory filesystem, mostly for tests and tools that synthesize data sets.
#[derive(Clone, Debug, Default)]
pub struct MemoryFileSystem {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryFileSystem {
    /// Empty filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&mut self, name: &str, bytes: impl Into<Vec<u8>>) {
        self.files.insert(name.to_ascii_lowercase(), bytes.into());
    }

    /// Builder-style [`MemoryFileSystem::insert`].
    pub fn with(mut self, name: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(name, bytes);
        self
    }
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, name: &str) -> bool {
        self.files.contains_key(&name.to_ascii_lowercase())
    }

    fn read(&self, name: &str) -> EngineResult<Option<Vec<u8>>> {
        Ok(self.files.get(&name.to_ascii_lowercase()).cloned())
    }
}

/// Guess the asset family from marker files, in priority order.
pub fn detect_family(fs: &dyn FileSystem) -> Option<AssetFamily> {
    const MARKERS: [(&str, AssetFamily, &str); 5] = [
        ("DEMO_UK.ABA", AssetFamily::Nibble, "nibble (demo)"),
        ("INTRO.SEQ", AssetFamily::Nibble, "nibble (cd)"),
        ("LEVEL1.MAP", AssetFamily::Nibble, "nibble"),
        ("LEVEL1.LEV", AssetFamily::Planar, "planar"),
        ("DEMO.LEV", AssetFamily::Planar, "planar (demo)"),
    ];
    MARKERS.iter().find_map(|(file, family, label)| {
        fs.exists(file).then(|| {
            tracing::debug!(marker = file, "detected {label} data set");
            *family
        })
    })
}

#[cfg(test)]
#[path = "../../tests/unit/io/fs.rs"]
mod tests;
