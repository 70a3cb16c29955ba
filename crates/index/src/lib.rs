//! Storage abstractions for the matching engine.
//!
//! Two stores, both keyed by intent:
//!
//! - [`ListingStore`] — one logical table per intent holding the canonical
//!   listing blob, with auxiliary term postings (domain for product/service,
//!   category for mutual) backing the structured retrieval filter.
//! - [`VectorStore`] — one collection per intent holding fixed-dimension
//!   dense vectors with a filterable payload.
//!
//! The bundled [`InMemoryListingStore`] and [`InMemoryVectorStore`] are the
//! reference backends: shared immutably behind interior locks, with upsert
//! semantics (same id overwrites) and deterministic query ordering. External
//! engines implement the same traits.
mod store;
mod vector;

use chrono::{DateTime, Utc};
use listing::Listing;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use store::{InMemoryListingStore, ListingStore};
pub use vector::{InMemoryVectorStore, TermFilter, VectorHit, VectorPayload, VectorPoint, VectorStore};

/// A canonical listing as persisted, with its identity and ingest timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredListing {
    pub id: String,
    pub listing: Listing,
    pub created_at: DateTime<Utc>,
}

/// Errors produced by the storage layer.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum StoreError {
    /// A vector of the wrong width reached a fixed-dimension collection.
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    /// Backend I/O failure; retry policy is the caller's decision.
    #[error("storage backend failure: {0}")]
    Backend(String),
}
