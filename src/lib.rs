//! pixbank decodes the asset files of a planar or nibble-packed 2D platform game and composites
//! indexed-colour frames from them.
//!
//! - Open the data directory as a [`FileSystem`] and build an [`AssetStore`]
//! - Create a [`Video`] over a [`DisplaySink`]
//! - Decode rooms, draw sprites and text, then present frames to the sink
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Asset categories, layouts and the asset store.
pub mod assets;
/// Decompression of packed assets.
pub mod codec;
/// Pixel, palette and room decoders.
pub mod decode;
/// Filesystem and archive access.
pub mod io;
/// Layers, blits, dirty tracking and display sinks.
pub mod render;

pub use crate::foundation::bytes::ByteOrder;
pub use crate::foundation::config::{EngineConfig, GAMESCREEN_H, GAMESCREEN_W};
pub use crate::foundation::core::{AssetFamily, Rect, Rgb};
pub use crate::foundation::error::{EngineError, EngineResult};

pub use crate::assets::bank::{BankCache, BankHandle};
pub use crate::assets::kind::AssetKind;
pub use crate::assets::store::{AssetStore, BankSource};
pub use crate::codec::unpack::{BackwardLz, Codec};
pub use crate::decode::Bitmap;
pub use crate::io::archive::{AbaArchive, Archive};
pub use crate::io::fs::{DirFileSystem, FileSystem, MemoryFileSystem, detect_family};
pub use crate::render::capture::CaptureSink;
pub use crate::render::dirty::DirtyGrid;
pub use crate::render::layers::Layers;
pub use crate::render::present::{DisplaySink, PresentReport, Presenter, RecordingSink};
pub use crate::render::video::{GlyphColors, Video};
