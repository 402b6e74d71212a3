//! Codec adapter for packed assets.

/// Literal-only encoder producing streams the default codec accepts.
pub mod pack;
/// Decompression contract and the default backward LZ implementation.
pub mod unpack;
