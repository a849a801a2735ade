//! Error types for graph conversion and export

/// Errors raised while assembling an export
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// Export metadata could not be encoded
    #[error("failed to encode export metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}

/// Result type alias for normalizer operations
pub type NormalizeResult<T> = Result<T, NormalizeError>;
