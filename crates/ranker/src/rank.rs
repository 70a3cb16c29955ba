//! RRF fusion over per-method rankings.
use std::collections::BTreeMap;

use listing::Intent;
use semantic::cosine_similarity;
use tracing::warn;

use crate::weights::{RankMethod, RankWeights, WeightsError};
use crate::RRF_K;

/// One match survivor entering the ranker.
///
/// The dense signal is computed here from the stored embedding; scores for
/// any additional methods are supplied by external scorers and fused as-is.
#[derive(Debug, Clone)]
pub struct RankCandidate {
    pub listing_id: String,
    /// Stored embedding; a candidate without one is dropped with a warning.
    pub embedding: Option<Vec<f32>>,
    /// Externally computed scores for non-dense methods.
    pub method_scores: BTreeMap<RankMethod, f64>,
}

impl RankCandidate {
    pub fn new(listing_id: impl Into<String>, embedding: Option<Vec<f32>>) -> Self {
        Self { listing_id: listing_id.into(), embedding, method_scores: BTreeMap::new() }
    }

    pub fn with_score(mut self, method: RankMethod, score: f64) -> Self {
        self.method_scores.insert(method, score);
        self
    }
}

/// One fused result; `rank` is 1-indexed over the output order.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RankedResult {
    pub listing_id: String,
    pub rank: usize,
    pub final_score: f64,
    pub per_method_scores: BTreeMap<RankMethod, f64>,
}

/// Fuses per-method rankings with RRF under a validated weight table.
#[derive(Debug, Clone)]
pub struct Ranker {
    weights: RankWeights,
}

impl Ranker {
    /// Ranker with the locked weight table for `intent`.
    pub fn for_intent(intent: Intent) -> Self {
        Self { weights: RankWeights::for_intent(intent) }
    }

    /// Ranker with a custom table, validated for `intent` eagerly.
    pub fn with_weights(intent: Intent, weights: RankWeights) -> Result<Self, WeightsError> {
        weights.validate(intent)?;
        Ok(Self { weights })
    }

    /// Fuse the candidates into a deterministic descending order.
    ///
    /// Dense similarity is computed against `query_embedding` for every
    /// candidate. Methods with no configured weight or no scored candidate
    /// are elided and the remaining weights renormalized. Ties, both within
    /// a method ranking and in the fused order, resolve by input order, so
    /// identical inputs yield identical output.
    pub fn rank(&self, query_embedding: &[f32], candidates: Vec<RankCandidate>) -> Vec<RankedResult> {
        let mut scored: Vec<(RankCandidate, BTreeMap<RankMethod, f64>)> = Vec::new();
        for candidate in candidates {
            let Some(embedding) = candidate.embedding.as_deref() else {
                warn!(listing_id = %candidate.listing_id, "dropping candidate from ranking: no stored embedding");
                continue;
            };
            let dense = f64::from(cosine_similarity(query_embedding, embedding));
            let mut per_method = BTreeMap::from([(RankMethod::Dense, dense)]);
            for (&method, &score) in &candidate.method_scores {
                if self.weights.weight(method).is_some() {
                    per_method.insert(method, score);
                }
            }
            scored.push((candidate, per_method));
        }
        if scored.is_empty() {
            return Vec::new();
        }

        let effective = self.weights.renormalized_for(|method| {
            scored.iter().any(|(_, per_method)| per_method.contains_key(&method))
        });

        // Per-method 1-indexed rankings; ties keep input order.
        let mut fused = vec![0.0f64; scored.len()];
        for (&method, &weight) in &effective {
            let mut order: Vec<usize> = scored
                .iter()
                .enumerate()
                .filter(|(_, (_, per_method))| per_method.contains_key(&method))
                .map(|(position, _)| position)
                .collect();
            order.sort_by(|&a, &b| {
                let score_a = scored[a].1[&method];
                let score_b = scored[b].1[&method];
                score_b.partial_cmp(&score_a).unwrap_or(std::cmp::Ordering::Equal)
            });
            for (rank_minus_one, &position) in order.iter().enumerate() {
                fused[position] += weight / (RRF_K + (rank_minus_one + 1) as f64);
            }
        }

        let mut order: Vec<usize> = (0..scored.len()).collect();
        order.sort_by(|&a, &b| {
            fused[b].partial_cmp(&fused[a]).unwrap_or(std::cmp::Ordering::Equal)
        });

        order
            .into_iter()
            .enumerate()
            .map(|(position, index)| {
                let (candidate, per_method) = &scored[index];
                RankedResult {
                    listing_id: candidate.listing_id.clone(),
                    rank: position + 1,
                    final_score: fused[index],
                    per_method_scores: per_method.clone(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(dimension: usize, index: usize) -> Vec<f32> {
        let mut v = vec![0.0; dimension];
        v[index] = 1.0;
        v
    }

    fn blend(dimension: usize, index: usize, weight: f32) -> Vec<f32> {
        let mut v = vec![0.0; dimension];
        v[0] = 1.0;
        v[index] = weight;
        v
    }

    #[test]
    fn dense_only_ranking_orders_by_similarity() {
        let ranker = Ranker::for_intent(Intent::Product);
        let query = axis(4, 0);
        let results = ranker.rank(
            &query,
            vec![
                RankCandidate::new("far", Some(axis(4, 1))),
                RankCandidate::new("near", Some(blend(4, 1, 0.1))),
                RankCandidate::new("middling", Some(blend(4, 1, 1.0))),
            ],
        );
        let ids: Vec<&str> = results.iter().map(|r| r.listing_id.as_str()).collect();
        assert_eq!(ids, vec!["near", "middling", "far"]);
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[2].rank, 3);
        assert!(results[0].final_score > results[1].final_score);
    }

    #[test]
    fn rrf_fusion_matches_the_formula() {
        // Dense ranks come out (1, 2, 3); keyword scores force ranks (3, 1, 2).
        let ranker = Ranker::for_intent(Intent::Product);
        let query = axis(4, 0);
        let results = ranker.rank(
            &query,
            vec![
                RankCandidate::new("a", Some(blend(4, 1, 0.1)))
                    .with_score(RankMethod::Keyword, 0.2),
                RankCandidate::new("b", Some(blend(4, 1, 0.5)))
                    .with_score(RankMethod::Keyword, 0.9),
                RankCandidate::new("c", Some(blend(4, 1, 1.0)))
                    .with_score(RankMethod::Keyword, 0.5),
            ],
        );

        // Only dense and keyword are present: weights renormalize to
        // 0.35/0.60 and 0.25/0.60.
        let dense_weight = 0.35 / 0.60;
        let keyword_weight = 0.25 / 0.60;
        let expected = |dense_rank: f64, keyword_rank: f64| {
            dense_weight / (RRF_K + dense_rank) + keyword_weight / (RRF_K + keyword_rank)
        };
        let by_id = |id: &str| {
            results
                .iter()
                .find(|r| r.listing_id == id)
                .unwrap_or_else(|| panic!("missing result {id}"))
        };
        assert!((by_id("a").final_score - expected(1.0, 3.0)).abs() < 1e-12);
        assert!((by_id("b").final_score - expected(2.0, 1.0)).abs() < 1e-12);
        assert!((by_id("c").final_score - expected(3.0, 2.0)).abs() < 1e-12);
        // b overtakes a thanks to its keyword rank.
        assert_eq!(results[0].listing_id, "b");
    }

    #[test]
    fn ranking_is_deterministic_across_runs() {
        let ranker = Ranker::for_intent(Intent::Product);
        let query = axis(8, 0);
        let candidates: Vec<RankCandidate> = (0..6)
            .map(|i| {
                RankCandidate::new(format!("cand-{i}"), Some(blend(8, 1 + i % 4, 0.3)))
                    .with_score(RankMethod::Keyword, (i % 3) as f64)
            })
            .collect();
        let first = ranker.rank(&query, candidates.clone());
        let second = ranker.rank(&query, candidates);
        assert_eq!(first, second);
    }

    #[test]
    fn ties_preserve_input_order() {
        let ranker = Ranker::for_intent(Intent::Product);
        let query = axis(4, 0);
        let same = || Some(axis(4, 0));
        let results = ranker.rank(
            &query,
            vec![
                RankCandidate::new("first", same()),
                RankCandidate::new("second", same()),
                RankCandidate::new("third", same()),
            ],
        );
        let ids: Vec<&str> = results.iter().map(|r| r.listing_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn every_embedded_survivor_appears_in_output() {
        let ranker = Ranker::for_intent(Intent::Service);
        let query = axis(4, 0);
        let candidates: Vec<RankCandidate> =
            (0..5).map(|i| RankCandidate::new(format!("s-{i}"), Some(axis(4, i % 4)))).collect();
        let results = ranker.rank(&query, candidates);
        assert_eq!(results.len(), 5);
        let ranks: Vec<usize> = results.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn missing_embedding_drops_the_candidate_only() {
        let ranker = Ranker::for_intent(Intent::Product);
        let query = axis(4, 0);
        let results = ranker.rank(
            &query,
            vec![
                RankCandidate::new("kept", Some(axis(4, 0))),
                RankCandidate::new("dropped", None),
            ],
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].listing_id, "kept");
    }

    #[test]
    fn scores_for_unconfigured_methods_are_ignored() {
        let ranker = Ranker::for_intent(Intent::Mutual);
        let query = axis(4, 0);
        let results = ranker.rank(
            &query,
            vec![
                RankCandidate::new("a", Some(axis(4, 0)))
                    .with_score(RankMethod::Keyword, 100.0),
                RankCandidate::new("b", Some(axis(4, 0))),
            ],
        );
        // Keyword has no weight for mutual; the huge score changes nothing.
        assert_eq!(results[0].listing_id, "a");
        assert!((results[0].final_score - results[1].final_score).abs() < 1e-12);
        assert!(!results[0].per_method_scores.contains_key(&RankMethod::Keyword));
    }

    #[test]
    fn custom_weights_are_validated_at_construction() {
        let err = Ranker::with_weights(
            Intent::Mutual,
            RankWeights::from_entries([
                (RankMethod::Dense, 0.75),
                (RankMethod::Keyword, 0.25),
            ]),
        )
        .unwrap_err();
        assert_eq!(err, WeightsError::KeywordForbiddenForMutual);

        Ranker::with_weights(
            Intent::Product,
            RankWeights::from_entries([
                (RankMethod::Dense, 0.60),
                (RankMethod::Keyword, 0.40),
            ]),
        )
        .expect("valid custom table");
    }

    #[test]
    fn empty_input_produces_empty_output() {
        let ranker = Ranker::for_intent(Intent::Product);
        assert!(ranker.rank(&axis(4, 0), Vec::new()).is_empty());
    }
}
