//! The embedder seam.
use thiserror::Error;

/// Errors produced while generating an embedding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EmbedError {
    #[error("embedding input is empty")]
    EmptyInput,
    #[error("embedding model failure: {0}")]
    Model(String),
}

/// A dense text embedding model.
///
/// Implementations must be deterministic for a fixed model version and
/// produce vectors of exactly [`Embedder::dimension`] components. The core
/// shares one instance immutably between ingest and query paths.
pub trait Embedder: Send + Sync {
    /// Fixed output dimension of this model.
    fn dimension(&self) -> usize;

    /// Identifier of the underlying model, for logging and version pinning.
    fn model_name(&self) -> &str;

    /// Embed `text` into a dense vector of [`Embedder::dimension`] components.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;
}
