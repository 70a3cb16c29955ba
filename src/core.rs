//! The core facade: explicit construction, ingest, and query.
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use index::{
    InMemoryListingStore, InMemoryVectorStore, ListingStore, StoreError, StoredListing,
    VectorPayload, VectorPoint, VectorStore,
};
use kernel::{ExactImplication, Implies};
use listing::Intent;
use matcher::{MatchEngine, MatchTrace};
use ranker::{RankCandidate, RankMethod, RankedResult, Ranker};
use semantic::{embedding_text, Embedder, HashedEmbedder};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::config::CoreConfig;
use crate::error::{ConfigError, CoreError};
use crate::metrics::{QueryMetrics, Stage};

/// Per-query options beyond the result limit.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Maximum number of ranked results returned.
    pub limit: usize,
    /// Externally computed per-candidate scores for non-dense ranking
    /// methods (keyword, late-interaction, cross-encoder), keyed by listing
    /// id. Scores for methods the intent's weight table does not carry are
    /// ignored.
    pub method_scores: BTreeMap<String, BTreeMap<RankMethod, f64>>,
}

impl QueryOptions {
    pub fn with_limit(limit: usize) -> Self {
        Self { limit, method_scores: BTreeMap::new() }
    }
}

/// Builder for [`Core`]. Every collaborator is explicit; omitted ones fall
/// back to the bundled reference implementations (hashed embedder, equality
/// implication, in-memory stores).
#[derive(Default)]
pub struct CoreBuilder {
    embedder: Option<Arc<dyn Embedder>>,
    implication: Option<Arc<dyn Implies>>,
    listings: Option<Arc<dyn ListingStore>>,
    vectors: Option<Arc<dyn VectorStore>>,
    config: CoreConfig,
    metrics: Option<Arc<dyn QueryMetrics>>,
}

impl CoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The embedding model shared by ingest and query. The same model must
    /// serve both; version pinning is the caller's responsibility.
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// The term-implication relation used by categorical matching.
    pub fn implication(mut self, implication: Arc<dyn Implies>) -> Self {
        self.implication = Some(implication);
        self
    }

    pub fn listing_store(mut self, store: Arc<dyn ListingStore>) -> Self {
        self.listings = Some(store);
        self
    }

    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vectors = Some(store);
        self
    }

    pub fn config(mut self, config: CoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn metrics(mut self, metrics: Arc<dyn QueryMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Validate the configuration and assemble the core.
    ///
    /// Fails on a zero candidate cap, invalid ranking weights (including a
    /// keyword weight for mutual intent), or an embedder whose dimension
    /// disagrees with the vector store's.
    pub fn build(self) -> Result<Core, CoreError> {
        self.config.validate()?;
        let embedder = self
            .embedder
            .unwrap_or_else(|| Arc::new(HashedEmbedder::default()) as Arc<dyn Embedder>);
        let vectors = self.vectors.unwrap_or_else(|| {
            Arc::new(InMemoryVectorStore::new(embedder.dimension())) as Arc<dyn VectorStore>
        });
        if embedder.dimension() != vectors.dimension() {
            return Err(ConfigError::DimensionMismatch {
                embedder: embedder.dimension(),
                store: vectors.dimension(),
            }
            .into());
        }
        let listings = self
            .listings
            .unwrap_or_else(|| Arc::new(InMemoryListingStore::new()) as Arc<dyn ListingStore>);
        let implication = self
            .implication
            .unwrap_or_else(|| Arc::new(ExactImplication) as Arc<dyn Implies>);

        let mut rankers = BTreeMap::new();
        for intent in Intent::ALL {
            let ranker = match self.config.weight_overrides.get(&intent) {
                Some(weights) => Ranker::with_weights(intent, weights.clone())
                    .map_err(ConfigError::Weights)?,
                None => Ranker::for_intent(intent),
            };
            rankers.insert(intent, ranker);
        }

        Ok(Core {
            engine: MatchEngine::new(implication),
            embedder,
            listings,
            vectors,
            rankers,
            config: self.config,
            metrics: self.metrics,
        })
    }
}

/// The assembled matching engine.
///
/// Holds the two process-lifetime read-only caches (embedding model and
/// implication relation) plus the store handles. All methods take `&self`;
/// the value is safe to share across threads, and per-request state never
/// escapes a call.
pub struct Core {
    engine: MatchEngine,
    embedder: Arc<dyn Embedder>,
    pub(crate) listings: Arc<dyn ListingStore>,
    pub(crate) vectors: Arc<dyn VectorStore>,
    rankers: BTreeMap<Intent, Ranker>,
    pub(crate) config: CoreConfig,
    metrics: Option<Arc<dyn QueryMetrics>>,
}

impl std::fmt::Debug for Core {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Core")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Core {
    pub fn builder() -> CoreBuilder {
        CoreBuilder::new()
    }

    /// Normalize, persist, embed, and index one raw listing.
    ///
    /// The id is taken from the raw value's `id` field when present,
    /// generated otherwise; ingesting the same id again overwrites both the
    /// stored listing and its vector point.
    pub fn ingest(&self, raw: &Value) -> Result<String, CoreError> {
        let canonical = self.observe(Stage::Normalize, || listing::normalize(raw))?;
        let text = embedding_text(&canonical);
        let vector = self.observe(Stage::Embed, || self.embedder.embed(&text))?;

        let id = raw
            .get("id")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let created_at = Utc::now();
        let intent = canonical.intent;
        let terms = canonical.filter_terms().to_vec();

        self.observe(Stage::Persist, || -> Result<(), StoreError> {
            self.listings.upsert(StoredListing {
                id: id.clone(),
                listing: canonical.clone(),
                created_at,
            })?;
            self.vectors.upsert(VectorPoint {
                id: id.clone(),
                vector,
                payload: VectorPayload { listing_id: id.clone(), intent, terms, created_at },
            })
        })?;

        debug!(listing_id = %id, %intent, "listing ingested");
        Ok(id)
    }

    /// Query with default options: retrieve, match, rank, return at most
    /// `limit` results.
    pub fn query(&self, raw: &Value, limit: usize) -> Result<Vec<RankedResult>, CoreError> {
        self.query_opts(raw, QueryOptions::with_limit(limit))
    }

    /// Query with explicit options (see [`QueryOptions`]).
    pub fn query_opts(
        &self,
        raw: &Value,
        options: QueryOptions,
    ) -> Result<Vec<RankedResult>, CoreError> {
        let query = self.observe(Stage::Normalize, || listing::normalize(raw))?;
        let text = embedding_text(&query);
        let query_vector = self.observe(Stage::Embed, || self.embedder.embed(&text))?;

        let fetch_limit = self.config.candidate_limit.max(options.limit);
        let candidate_ids = self.observe(Stage::Retrieve, || {
            self.retrieve(&query, &query_vector, fetch_limit)
        })?;

        let survivors = self.observe(Stage::Match, || -> Result<Vec<String>, StoreError> {
            let mut survivors = Vec::new();
            for id in &candidate_ids {
                match self.listings.get(query.intent, id)? {
                    Some(stored) => {
                        if self.engine.listing_matches(&query, &stored.listing) {
                            survivors.push(stored.id);
                        }
                    }
                    None => debug!(listing_id = %id, "retrieved id missing from listing store"),
                }
            }
            Ok(survivors)
        })?;
        debug!(
            candidates = candidate_ids.len(),
            survivors = survivors.len(),
            "matching complete"
        );

        let mut ranked = self.observe(Stage::Rank, || -> Result<Vec<RankedResult>, StoreError> {
            let mut candidates = Vec::with_capacity(survivors.len());
            for id in survivors {
                let embedding = self.vectors.fetch(query.intent, &id)?.map(|point| point.vector);
                let mut candidate = RankCandidate::new(id, embedding);
                if let Some(scores) = options.method_scores.get(&candidate.listing_id) {
                    for (&method, &score) in scores {
                        candidate = candidate.with_score(method, score);
                    }
                }
                candidates.push(candidate);
            }
            Ok(self.rankers[&query.intent].rank(&query_vector, candidates))
        })?;

        ranked.truncate(options.limit);
        Ok(ranked)
    }

    /// Delete a listing from both stores. Returns whether it existed.
    pub fn remove(&self, intent: Intent, id: &str) -> Result<bool, CoreError> {
        let removed = self.listings.remove(intent, id)?;
        self.vectors.remove(intent, id)?;
        Ok(removed)
    }

    /// Direct access to the boolean matcher for in-memory pairs.
    pub fn matches(&self, query: &listing::Listing, candidate: &listing::Listing) -> bool {
        self.engine.listing_matches(query, candidate)
    }

    /// Structured diagnostic trace for one pair (see [`MatchEngine::explain`]).
    pub fn explain(&self, query: &listing::Listing, candidate: &listing::Listing) -> MatchTrace {
        self.engine.explain(query, candidate)
    }

    fn observe<T, E>(&self, stage: Stage, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        let start = Instant::now();
        let result = f();
        if let Some(metrics) = &self.metrics {
            metrics.record_stage(stage, start.elapsed(), result.is_ok());
        }
        result
    }
}
