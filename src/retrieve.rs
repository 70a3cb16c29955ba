//! Candidate retrieval: structured filter plus dense vector search.
use std::collections::HashSet;

use index::{StoreError, TermFilter};
use listing::Listing;

use crate::core::Core;

impl Core {
    /// Retrieve up to `limit` candidate ids for a normalized query listing.
    ///
    /// The vector stage searches the query intent's collection, constrained
    /// server-side to points sharing at least one domain/category term with
    /// the query. When that returns fewer than `limit` ids, the structured
    /// filter backfills every remaining same-intent listing whose terms
    /// intersect the query's. Retrieval therefore over-approximates the
    /// match set: with an unbounded limit, every candidate the matcher could
    /// accept is returned. Ordering reflects retrieval-stage similarity only
    /// and says nothing about eligibility.
    pub(crate) fn retrieve(
        &self,
        query: &Listing,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<String>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let terms = query.filter_terms();
        let filter = TermFilter::any_of(terms.iter().cloned());
        let hits = self.vectors.search(query.intent, query_vector, Some(&filter), limit)?;

        let mut ids: Vec<String> = Vec::with_capacity(hits.len());
        let mut seen: HashSet<String> = HashSet::with_capacity(hits.len());
        for hit in hits {
            if seen.insert(hit.id.clone()) {
                ids.push(hit.id);
            }
        }

        if ids.len() < limit {
            for id in self.listings.ids_by_terms(query.intent, terms)? {
                if ids.len() >= limit {
                    break;
                }
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }
        }
        Ok(ids)
    }
}
