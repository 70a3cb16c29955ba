//! Rank fusion for match survivors.
//!
//! The ranker never decides eligibility: every candidate the matcher let
//! through appears in the output, constraints are never re-evaluated, and the
//! only drop is a candidate with no stored embedding (logged, never silently
//! re-admitted). Per-method scores become 1-indexed rankings which are fused
//! with Reciprocal Rank Fusion (`k = 60`) under per-intent weights locked at
//! construction. Identical inputs always produce the identical order.
mod rank;
mod weights;

pub use rank::{RankCandidate, RankedResult, Ranker};
pub use weights::{RankMethod, RankWeights, WeightsError};

/// RRF dampening constant: `score = Σ weight / (K + rank)`.
pub const RRF_K: f64 = 60.0;
