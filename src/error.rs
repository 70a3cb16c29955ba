//! Error surface of the core facade.
use thiserror::Error;

/// Configuration problems detected at construction. Always fatal for the
/// build; a [`crate::Core`] that constructed successfully will not hit these
/// at query time.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("candidate limit must be greater than zero")]
    ZeroCandidateLimit,
    #[error("embedder dimension {embedder} does not match vector store dimension {store}")]
    DimensionMismatch { embedder: usize, store: usize },
    #[error(transparent)]
    Weights(#[from] ranker::WeightsError),
    #[error(transparent)]
    Implication(#[from] kernel::GraphError),
}

/// Failures surfaced by ingest and query.
///
/// Stage errors converge here as tagged values; callers pattern-match, never
/// string-match. Match rule failures are not represented — a non-compatible
/// candidate is a negative decision, not an error.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CoreError {
    /// The listing (or query) failed schema normalization; fatal for that
    /// listing only.
    #[error("listing rejected: {0}")]
    Normalize(#[from] listing::NormalizeError),
    /// Invalid construction input.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Listing or vector store I/O failure; the caller decides on retry.
    #[error("retrieval failure: {0}")]
    Retrieval(#[from] index::StoreError),
    /// The embedding model failed on this input.
    #[error("embedding failure: {0}")]
    Embed(#[from] semantic::EmbedError),
}
