/// Convenience result type used across the engine.
pub type EngineResult<T> = Result<T, EngineError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Every variant is fatal for the request that produced it: no caller is expected to retry or to
/// substitute default data for a failed load or decode.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// Neither the filesystem nor the archive container holds the requested name.
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// Decoded or trailing size disagrees with the size implied by the data structure.
    #[error("format size mismatch: {0}")]
    FormatSizeMismatch(String),

    /// The codec rejected a packed buffer (integrity check failed).
    #[error("checksum failure: {0}")]
    ChecksumFailure(String),

    /// A fixed-capacity buffer cannot hold the requested data.
    #[error("allocation failure: {0}")]
    AllocationFailure(String),

    /// The asset category cannot be produced by the selected source or family.
    #[error("unsupported category: {0}")]
    UnsupportedCategory(String),

    /// A bank handle was used after the arena it points into has been reset.
    #[error("stale bank handle: {0}")]
    StaleHandle(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EngineError {
    /// Build an [`EngineError::ResourceNotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::ResourceNotFound(msg.into())
    }

    /// Build an [`EngineError::FormatSizeMismatch`] value.
    pub fn size_mismatch(msg: impl Into<String>) -> Self {
        Self::FormatSizeMismatch(msg.into())
    }

    /// Build an [`EngineError::ChecksumFailure`] value.
    pub fn checksum(msg: impl Into<String>) -> Self {
        Self::ChecksumFailure(msg.into())
    }

    /// Build an [`EngineError::AllocationFailure`] value.
    pub fn allocation(msg: impl Into<String>) -> Self {
        Self::AllocationFailure(msg.into())
    }

    /// Build an [`EngineError::UnsupportedCategory`] value.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedCategory(msg.into())
    }

    /// Build an [`EngineError::StaleHandle`] value.
    pub fn stale(msg: impl Into<String>) -> Self {
        Self::StaleHandle(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
