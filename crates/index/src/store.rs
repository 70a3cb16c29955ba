//! Listing persistence and the structured retrieval filter.
use std::sync::RwLock;

use hashbrown::{HashMap, HashSet};
use listing::Intent;

use crate::{StoreError, StoredListing};

/// Persistence for canonical listings, one logical table per intent.
///
/// `upsert` overwrites any existing row with the same id. `ids_by_terms` is
/// the structured retrieval filter: ids of same-intent listings whose filter
/// terms (domain or category) intersect the given set.
pub trait ListingStore: Send + Sync {
    fn upsert(&self, record: StoredListing) -> Result<(), StoreError>;
    fn get(&self, intent: Intent, id: &str) -> Result<Option<StoredListing>, StoreError>;
    /// Returns whether a row was actually removed.
    fn remove(&self, intent: Intent, id: &str) -> Result<bool, StoreError>;
    /// Sorted, deduplicated ids with at least one term in common with `terms`.
    fn ids_by_terms(&self, intent: Intent, terms: &[String]) -> Result<Vec<String>, StoreError>;
    fn count(&self, intent: Intent) -> Result<usize, StoreError>;
}

#[derive(Default)]
struct IntentTable {
    rows: HashMap<String, StoredListing>,
    /// term -> ids of listings carrying it; kept in sync with `rows`.
    postings: HashMap<String, HashSet<String>>,
}

impl IntentTable {
    fn unlink(&mut self, id: &str, terms: &[String]) {
        for term in terms {
            if let Some(ids) = self.postings.get_mut(term) {
                ids.remove(id);
                if ids.is_empty() {
                    self.postings.remove(term);
                }
            }
        }
    }
}

/// Reference in-memory [`ListingStore`].
#[derive(Default)]
pub struct InMemoryListingStore {
    tables: RwLock<HashMap<Intent, IntentTable>>,
}

impl InMemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ListingStore for InMemoryListingStore {
    fn upsert(&self, record: StoredListing) -> Result<(), StoreError> {
        let intent = record.listing.intent;
        let mut tables = self.tables.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        let table = tables.entry(intent).or_default();
        if let Some(previous) = table.rows.get(&record.id) {
            let stale_terms = previous.listing.filter_terms().to_vec();
            let id = record.id.clone();
            table.unlink(&id, &stale_terms);
        }
        for term in record.listing.filter_terms() {
            table.postings.entry(term.clone()).or_default().insert(record.id.clone());
        }
        table.rows.insert(record.id.clone(), record);
        Ok(())
    }

    fn get(&self, intent: Intent, id: &str) -> Result<Option<StoredListing>, StoreError> {
        let tables = self.tables.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(tables.get(&intent).and_then(|table| table.rows.get(id)).cloned())
    }

    fn remove(&self, intent: Intent, id: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        let Some(table) = tables.get_mut(&intent) else {
            return Ok(false);
        };
        match table.rows.remove(id) {
            Some(previous) => {
                let stale_terms = previous.listing.filter_terms().to_vec();
                table.unlink(id, &stale_terms);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn ids_by_terms(&self, intent: Intent, terms: &[String]) -> Result<Vec<String>, StoreError> {
        let tables = self.tables.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        let Some(table) = tables.get(&intent) else {
            return Ok(Vec::new());
        };
        let mut ids: Vec<String> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for term in terms {
            if let Some(matching) = table.postings.get(term) {
                for id in matching {
                    if seen.insert(id.as_str()) {
                        ids.push(id.clone());
                    }
                }
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    fn count(&self, intent: Intent) -> Result<usize, StoreError> {
        let tables = self.tables.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(tables.get(&intent).map_or(0, |table| table.rows.len()))
    }
}
