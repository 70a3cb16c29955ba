//! Core configuration.
use std::collections::BTreeMap;

use listing::Intent;
use ranker::RankWeights;

use crate::error::ConfigError;

/// Tunables for the core pipeline.
///
/// Weight overrides replace the locked per-intent ranking tables and are
/// validated eagerly at [`crate::CoreBuilder::build`]; most deployments keep
/// the defaults.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Retrieval-stage candidate cap per query.
    pub candidate_limit: usize,
    /// Per-intent ranking weight overrides.
    pub weight_overrides: BTreeMap<Intent, RankWeights>,
}

impl CoreConfig {
    pub const DEFAULT_CANDIDATE_LIMIT: usize = 128;

    pub fn with_candidate_limit(mut self, candidate_limit: usize) -> Self {
        self.candidate_limit = candidate_limit;
        self
    }

    pub fn with_weights(mut self, intent: Intent, weights: RankWeights) -> Self {
        self.weight_overrides.insert(intent, weights);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.candidate_limit == 0 {
            return Err(ConfigError::ZeroCandidateLimit);
        }
        for (intent, weights) in &self.weight_overrides {
            weights.validate(*intent)?;
        }
        Ok(())
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            candidate_limit: Self::DEFAULT_CANDIDATE_LIMIT,
            weight_overrides: BTreeMap::new(),
        }
    }
}
