//! Boolean listing matcher.
//!
//! [`MatchEngine::listing_matches`] decides whether candidate B satisfies
//! every requirement query A expresses. The decision composes the constraint
//! kernel through a fixed, observable gate order:
//!
//! 1. intent gate (same intent, inverse roles — or both `exchange`);
//! 2. domain/category intersection;
//! 3. items coverage (product/service only, skipped for mutual);
//! 4. counterparty constraints (A's `other` against B's `self`);
//! 5. location constraints;
//! 6. for mutual intent, the same evaluation with the arguments swapped —
//!    both directions must pass.
//!
//! Evaluation short-circuits at the first failing gate. The result is a
//! strict boolean: a failed rule is a negative answer, never an error, and
//! no partial-match scoring leaks out of this layer. When diagnostics are
//! needed, [`MatchEngine::explain`] re-runs the gates and returns a
//! structured [`MatchTrace`] instead of overloading the boolean.
mod engine;
mod explain;
mod location;

pub use engine::MatchEngine;
pub use explain::{GateKind, GateOutcome, MatchFailure, MatchTrace};
