//! Filesystem and archive collaborators.

/// Archive container lookup.
pub mod archive;
/// Plain file access and family detection.
pub mod fs;
