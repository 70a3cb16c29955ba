//! Dense vector collections with payload filtering.
use std::cmp::Ordering;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use listing::Intent;
use serde::{Deserialize, Serialize};

use crate::StoreError;

/// Payload stored alongside each vector, used for server-side filtering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorPayload {
    pub listing_id: String,
    pub intent: Intent,
    /// Domain terms for product/service, category terms for mutual.
    pub terms: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// One point of a vector collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: VectorPayload,
}

/// Disjunctive payload term filter: a point passes when it carries at least
/// one of the listed terms. An empty filter passes everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermFilter {
    pub any_of: Vec<String>,
}

impl TermFilter {
    pub fn any_of(terms: impl IntoIterator<Item = String>) -> Self {
        Self { any_of: terms.into_iter().collect() }
    }

    fn passes(&self, payload_terms: &[String]) -> bool {
        self.any_of.is_empty() || payload_terms.iter().any(|t| self.any_of.contains(t))
    }
}

/// One search result; ordering reflects similarity only.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorHit {
    pub id: String,
    pub score: f32,
}

/// Fixed-dimension dense vector storage, one collection per intent.
///
/// The dimension is set at construction; a vector of any other width is a
/// hard error on both upsert and search.
pub trait VectorStore: Send + Sync {
    fn dimension(&self) -> usize;
    fn upsert(&self, point: VectorPoint) -> Result<(), StoreError>;
    fn fetch(&self, intent: Intent, id: &str) -> Result<Option<VectorPoint>, StoreError>;
    fn remove(&self, intent: Intent, id: &str) -> Result<bool, StoreError>;
    /// Top-`limit` points of the intent's collection by cosine similarity,
    /// restricted to points passing `filter`. Descending score, id tie-break.
    fn search(
        &self,
        intent: Intent,
        vector: &[f32],
        filter: Option<&TermFilter>,
        limit: usize,
    ) -> Result<Vec<VectorHit>, StoreError>;
}

/// Reference in-memory [`VectorStore`] using an exact linear scan.
pub struct InMemoryVectorStore {
    dimension: usize,
    collections: RwLock<HashMap<Intent, HashMap<String, VectorPoint>>>,
}

impl InMemoryVectorStore {
    pub fn new(dimension: usize) -> Self {
        Self { dimension, collections: RwLock::new(HashMap::new()) }
    }

    fn check_dimension(&self, actual: usize) -> Result<(), StoreError> {
        if actual != self.dimension {
            return Err(StoreError::DimensionMismatch { expected: self.dimension, actual });
        }
        Ok(())
    }
}

impl VectorStore for InMemoryVectorStore {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn upsert(&self, point: VectorPoint) -> Result<(), StoreError> {
        self.check_dimension(point.vector.len())?;
        let mut collections =
            self.collections.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        collections
            .entry(point.payload.intent)
            .or_default()
            .insert(point.id.clone(), point);
        Ok(())
    }

    fn fetch(&self, intent: Intent, id: &str) -> Result<Option<VectorPoint>, StoreError> {
        let collections =
            self.collections.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(collections.get(&intent).and_then(|points| points.get(id)).cloned())
    }

    fn remove(&self, intent: Intent, id: &str) -> Result<bool, StoreError> {
        let mut collections =
            self.collections.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(collections.get_mut(&intent).is_some_and(|points| points.remove(id).is_some()))
    }

    fn search(
        &self,
        intent: Intent,
        vector: &[f32],
        filter: Option<&TermFilter>,
        limit: usize,
    ) -> Result<Vec<VectorHit>, StoreError> {
        self.check_dimension(vector.len())?;
        if limit == 0 {
            return Ok(Vec::new());
        }
        let collections =
            self.collections.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        let Some(points) = collections.get(&intent) else {
            return Ok(Vec::new());
        };
        let mut hits: Vec<VectorHit> = points
            .values()
            .filter(|point| filter.is_none_or(|f| f.passes(&point.payload.terms)))
            .map(|point| VectorHit {
                id: point.id.clone(),
                score: cosine_similarity(vector, &point.vector),
            })
            .collect();
        // Ties break on id so identical inputs always order identically.
        hits.sort_unstable_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(limit);
        Ok(hits)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (&x, &y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
