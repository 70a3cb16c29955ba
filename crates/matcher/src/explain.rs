//! Structured match diagnostics.
//!
//! The boolean contract of [`crate::MatchEngine::listing_matches`] stays
//! strict; explanation is a separate re-run of the same gates that records
//! what was checked and what first failed.
use kernel::NumericCheck;
use listing::{Intent, Subintent};
use serde::Serialize;

/// The gates in their fixed evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateKind {
    Intent,
    DomainCategory,
    Items,
    Counterparty,
    Location,
    /// Mutual intent only: the whole evaluation with arguments swapped.
    Reverse,
}

/// Verdict for one evaluated gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GateOutcome {
    pub gate: GateKind,
    pub passed: bool,
}

/// The first rule that failed, in enough detail to act on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum MatchFailure {
    IntentMismatch { query: Intent, candidate: Intent },
    RoleNotInverse { query: Subintent, candidate: Subintent },
    DomainDisjoint,
    CategoryDisjoint,
    /// No candidate item covers the required item at `index`.
    ItemUncovered { index: usize, kind: String },
    CounterpartyCategorical { key: String },
    CounterpartyNumeric { key: String, check: NumericCheck },
    CounterpartyExclusion { value: String },
    LocationCategorical { key: String },
    LocationNumeric { key: String, check: NumericCheck },
    /// The query's location exclusions intersect the candidate's location.
    LocationExclusion { value: String },
    /// The candidate's own location exclusions intersect the query's location.
    LocationCounterExclusion { value: String },
    /// Mutual intent: the reversed direction failed.
    Reverse(Box<MatchFailure>),
}

/// Structured trace of one match evaluation.
///
/// `gates` lists every gate that ran, in order, stopping at the first
/// failure; `failure` names the rule that produced it. A matched trace has
/// all gates passed and no failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchTrace {
    pub matched: bool,
    pub gates: Vec<GateOutcome>,
    pub failure: Option<MatchFailure>,
}
