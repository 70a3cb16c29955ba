//! Umbrella crate for the bazaar two-sided listing matching engine.
//!
//! The engine decides, for a pair of structured marketplace listings (A, B),
//! whether B satisfies every requirement A expresses — across product
//! buy/sell, service seek/provide, and symmetric mutual exchange — and
//! serves that decision at corpus scale through a retrieve-then-rank
//! pipeline. The stage crates compose leaves-first:
//!
//! - `listing` — canonical data model and schema normalizer;
//! - `kernel` — range arithmetic, categorical subset with implication,
//!   exclusion disjointness;
//! - `matcher` — the gate-ordered boolean matcher;
//! - `index` — listing and vector store abstractions;
//! - `semantic` — embedding text rendition and the embedder seam;
//! - `ranker` — reciprocal rank fusion with locked per-intent weights.
//!
//! [`Core`] ties the stages together behind two entry points: [`Core::ingest`]
//! normalizes, persists, embeds, and indexes a listing; [`Core::query`]
//! normalizes a query listing, retrieves a bounded candidate set (structured
//! filters plus dense vector search), removes non-compatible candidates with
//! the boolean matcher, and fuses the survivors' rankings.
//!
//! ## Quick start
//!
//! ```
//! use bazaar::Core;
//! use serde_json::json;
//!
//! # fn demo() -> Result<(), bazaar::CoreError> {
//! let core = Core::builder().build()?;
//!
//! core.ingest(&json!({
//!     "id": "seller-1",
//!     "intent": "product",
//!     "subintent": "sell",
//!     "domain": ["electronics"],
//!     "items": [{ "type": "smartphone", "categorical": { "brand": "apple" } }]
//! }))?;
//!
//! let results = core.query(&json!({
//!     "intent": "product",
//!     "subintent": "buy",
//!     "domain": ["electronics"],
//!     "items": [{ "type": "smartphone" }]
//! }), 10)?;
//! assert_eq!(results[0].listing_id, "seller-1");
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```
//!
//! ## Construction
//!
//! Everything long-lived is explicit on the [`CoreBuilder`]: the embedding
//! model, the term-implication relation, the two stores, optional weight
//! overrides, and an optional [`QueryMetrics`] observer. Construction
//! validates eagerly — invalid weights, a keyword weight for mutual intent,
//! or an embedder/store dimension mismatch fail the build, never a query.
//! There is no process-global state.
//!
//! ## Errors
//!
//! Failures converge on [`CoreError`]: normalization rejections carry the
//! offending field path, configuration errors surface at build time, and
//! store failures pass through for the caller's retry policy. A rule failure
//! during matching is a negative decision, not an error. A candidate whose
//! embedding is missing at rank time is dropped with a logged warning and
//! the rest of the ranking proceeds.

mod config;
mod core;
mod error;
mod metrics;
mod retrieve;

pub use crate::config::CoreConfig;
pub use crate::core::{Core, CoreBuilder, QueryOptions};
pub use crate::error::{ConfigError, CoreError};
pub use crate::metrics::{QueryMetrics, Stage};

pub use index::{
    InMemoryListingStore, InMemoryVectorStore, ListingStore, StoreError, StoredListing,
    TermFilter, VectorHit, VectorPayload, VectorPoint, VectorStore,
};
pub use kernel::{ExactImplication, GraphError, Implies, Range, TermEdge, TermGraph};
pub use listing::{
    normalize, normalize_str, Constraint, Intent, Item, Listing, LocationConstraint, LocationMode,
    NormalizeError, Subintent,
};
pub use matcher::{GateKind, GateOutcome, MatchEngine, MatchFailure, MatchTrace};
pub use ranker::{RankCandidate, RankMethod, RankWeights, RankedResult, Ranker, WeightsError};
pub use semantic::{cosine_similarity, embedding_text, EmbedError, Embedder, HashedEmbedder};
