//! Asset categories, their byte layouts and the store that loads them.

/// Bank arena cache and generation-tagged handles.
pub mod bank;
/// Parsers for the structured asset categories.
pub mod formats;
/// Asset categories and their filename suffixes.
pub mod kind;
/// Loader and owner of every decoded asset buffer.
pub mod store;
