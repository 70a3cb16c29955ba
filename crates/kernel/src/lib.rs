//! Constraint-evaluation kernel.
//!
//! Pure, stateless building blocks the matcher composes into listing-level
//! decisions:
//!
//! - [`Range`] arithmetic: every numeric constraint value is extracted as an
//!   ordered pair, never a scalar. Unbounded sides are `±inf`.
//! - Categorical subset under an injected [`Implies`] relation — reachability
//!   in a closed term graph, or plain string equality by default.
//! - Exclusion disjointness: exclusion sets are literal; implication never
//!   applies to them.
//!
//! Nothing here performs I/O or holds mutable state. The [`TermGraph`] is
//! built once at startup from an external edge list and shared immutably.
mod categorical;
mod exclusion;
mod implication;
mod range;

pub use categorical::{categorical_subset, first_categorical_violation};
pub use exclusion::{disjoint, first_exclusion_hit};
pub use implication::{ExactImplication, GraphError, Implies, TermEdge, TermGraph};
pub use range::{
    extract_range, first_numeric_violation, numeric_requirements_met, AttributeBounds,
    NumericCheck, NumericViolation, Range,
};
