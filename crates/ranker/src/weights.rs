//! Per-intent method weights.
use std::collections::BTreeMap;

use listing::Intent;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A ranking signal that can participate in fusion.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RankMethod {
    /// Cosine similarity of dense embeddings; always present.
    Dense,
    /// Lexical/BM25 scoring; product and service intents only.
    Keyword,
    /// Late-interaction (token-level) scoring.
    LateInteraction,
    /// Cross-encoder reranking.
    CrossEncoder,
}

/// Errors raised when validating ranking weights.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum WeightsError {
    #[error("ranking weights must include the dense method")]
    MissingDense,
    #[error("keyword ranking is not available for mutual intent")]
    KeywordForbiddenForMutual,
    #[error("ranking weight for {method:?} must be positive and finite, got {weight}")]
    InvalidWeight { method: RankMethod, weight: f64 },
    #[error("ranking weights must sum to 1.0, got {sum}")]
    SumNotUnit { sum: f64 },
}

static PRODUCT_SERVICE_WEIGHTS: Lazy<RankWeights> = Lazy::new(|| {
    RankWeights::from_entries([
        (RankMethod::Dense, 0.35),
        (RankMethod::Keyword, 0.25),
        (RankMethod::LateInteraction, 0.20),
        (RankMethod::CrossEncoder, 0.20),
    ])
});

static MUTUAL_WEIGHTS: Lazy<RankWeights> = Lazy::new(|| {
    RankWeights::from_entries([
        (RankMethod::Dense, 0.50),
        (RankMethod::LateInteraction, 0.20),
        (RankMethod::CrossEncoder, 0.30),
    ])
});

/// Weight table over ranking methods.
///
/// The locked per-intent defaults come from [`RankWeights::for_intent`];
/// custom tables must pass [`RankWeights::validate`] for their intent before
/// use. Methods absent at fusion time are elided with their weight
/// redistributed proportionally across the remaining methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankWeights {
    weights: BTreeMap<RankMethod, f64>,
}

impl RankWeights {
    /// The locked weight table for an intent.
    pub fn for_intent(intent: Intent) -> Self {
        match intent {
            Intent::Product | Intent::Service => PRODUCT_SERVICE_WEIGHTS.clone(),
            Intent::Mutual => MUTUAL_WEIGHTS.clone(),
        }
    }

    /// Build an unvalidated table from `(method, weight)` entries.
    pub fn from_entries(entries: impl IntoIterator<Item = (RankMethod, f64)>) -> Self {
        Self { weights: entries.into_iter().collect() }
    }

    /// Validate this table for use with `intent`.
    pub fn validate(&self, intent: Intent) -> Result<(), WeightsError> {
        if !self.weights.contains_key(&RankMethod::Dense) {
            return Err(WeightsError::MissingDense);
        }
        if intent == Intent::Mutual && self.weights.contains_key(&RankMethod::Keyword) {
            return Err(WeightsError::KeywordForbiddenForMutual);
        }
        for (&method, &weight) in &self.weights {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(WeightsError::InvalidWeight { method, weight });
            }
        }
        let sum: f64 = self.weights.values().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(WeightsError::SumNotUnit { sum });
        }
        Ok(())
    }

    pub fn weight(&self, method: RankMethod) -> Option<f64> {
        self.weights.get(&method).copied()
    }

    pub fn methods(&self) -> impl Iterator<Item = RankMethod> + '_ {
        self.weights.keys().copied()
    }

    /// Restrict to the methods actually present and renormalize the
    /// surviving weights proportionally so they sum to 1.0 again.
    pub(crate) fn renormalized_for(
        &self,
        present: impl Fn(RankMethod) -> bool,
    ) -> BTreeMap<RankMethod, f64> {
        let surviving: BTreeMap<RankMethod, f64> = self
            .weights
            .iter()
            .filter(|(&method, _)| present(method))
            .map(|(&method, &weight)| (method, weight))
            .collect();
        let total: f64 = surviving.values().sum();
        if total <= 0.0 {
            return BTreeMap::new();
        }
        surviving.into_iter().map(|(method, weight)| (method, weight / total)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_tables_validate_for_their_intents() {
        RankWeights::for_intent(Intent::Product).validate(Intent::Product).expect("product");
        RankWeights::for_intent(Intent::Service).validate(Intent::Service).expect("service");
        RankWeights::for_intent(Intent::Mutual).validate(Intent::Mutual).expect("mutual");
    }

    #[test]
    fn locked_product_weights_match_policy() {
        let weights = RankWeights::for_intent(Intent::Product);
        assert_eq!(weights.weight(RankMethod::Dense), Some(0.35));
        assert_eq!(weights.weight(RankMethod::Keyword), Some(0.25));
        assert_eq!(weights.weight(RankMethod::LateInteraction), Some(0.20));
        assert_eq!(weights.weight(RankMethod::CrossEncoder), Some(0.20));
    }

    #[test]
    fn locked_mutual_weights_exclude_keyword() {
        let weights = RankWeights::for_intent(Intent::Mutual);
        assert_eq!(weights.weight(RankMethod::Dense), Some(0.50));
        assert_eq!(weights.weight(RankMethod::Keyword), None);
        assert_eq!(weights.weight(RankMethod::LateInteraction), Some(0.20));
        assert_eq!(weights.weight(RankMethod::CrossEncoder), Some(0.30));
    }

    #[test]
    fn keyword_weight_for_mutual_is_a_configuration_error() {
        let weights = RankWeights::from_entries([
            (RankMethod::Dense, 0.75),
            (RankMethod::Keyword, 0.25),
        ]);
        assert_eq!(
            weights.validate(Intent::Mutual),
            Err(WeightsError::KeywordForbiddenForMutual)
        );
        // The same table is fine for product intent.
        weights.validate(Intent::Product).expect("valid for product");
    }

    #[test]
    fn dense_method_is_mandatory() {
        let weights = RankWeights::from_entries([(RankMethod::Keyword, 1.0)]);
        assert_eq!(weights.validate(Intent::Product), Err(WeightsError::MissingDense));
    }

    #[test]
    fn weights_must_be_positive_and_sum_to_one() {
        let negative = RankWeights::from_entries([
            (RankMethod::Dense, 1.2),
            (RankMethod::Keyword, -0.2),
        ]);
        assert!(matches!(
            negative.validate(Intent::Product),
            Err(WeightsError::InvalidWeight { method: RankMethod::Keyword, .. })
        ));

        let short = RankWeights::from_entries([(RankMethod::Dense, 0.5)]);
        assert!(matches!(short.validate(Intent::Product), Err(WeightsError::SumNotUnit { .. })));
    }

    #[test]
    fn renormalization_is_proportional() {
        let weights = RankWeights::for_intent(Intent::Product);
        let effective =
            weights.renormalized_for(|m| matches!(m, RankMethod::Dense | RankMethod::Keyword));
        let dense = effective[&RankMethod::Dense];
        let keyword = effective[&RankMethod::Keyword];
        assert!((dense - 0.35 / 0.60).abs() < 1e-12);
        assert!((keyword - 0.25 / 0.60).abs() < 1e-12);
        assert!((dense + keyword - 1.0).abs() < 1e-12);
    }
}
