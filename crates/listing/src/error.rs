//! Error types produced by the `listing` crate.
//!
//! [`NormalizeError`] is the whole error surface: the first malformed field
//! aborts normalization, and every variant names the field path it was found
//! at. Variants that enforce a documented data-model invariant also expose
//! its identifier through [`NormalizeError::invariant`], for upstream error
//! reports that cite the rule:
//!
//! - `I-02` — a constraint's mode set is exactly `{categorical, min, max,
//!   range}`; there is no `exact` mode.
//! - `I-04` — the `(intent, subintent)` pair is one of the five valid
//!   combinations.
//! - `I-05` — `domain` is non-empty for product/service, `category` for
//!   mutual.
//! - `I-06` — every range is an ordered pair with `lo <= hi`.
//! - `I-07` — exclusion sets are literal values; implication never applies
//!   to them.
use thiserror::Error;

/// Errors that can occur while normalizing a raw listing.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum NormalizeError {
    /// Input was not parseable as a JSON object at all.
    #[error("{path}: listing is not valid json: {message}")]
    InvalidJson { path: String, message: String },
    /// A required field is absent or null.
    #[error("{path}: missing required field")]
    MissingField { path: String },
    /// The `(intent, subintent)` pair is not one of the five valid combinations.
    #[error("{path}: `{intent}`/`{subintent}` is not a valid intent pair")]
    InvalidIntentPair {
        path: String,
        intent: String,
        subintent: String,
    },
    /// A constraint object carries a key outside `{categorical, min, max, range}`.
    #[error("{path}: unrecognized constraint mode `{mode}`")]
    InvalidConstraintMode { path: String, mode: String },
    /// A range pair with `lo > hi`.
    #[error("{path}: range lower bound {lo} exceeds upper bound {hi}")]
    RangeBounds { path: String, lo: f64, hi: f64 },
    /// `domain` empty for product/service, or `category` empty for mutual.
    #[error("{path}: must be non-empty for intent `{intent}`")]
    EmptyDomain { path: String, intent: String },
    /// A value of the wrong JSON type or shape.
    #[error("{path}: expected {expected}")]
    TypeMismatch { path: String, expected: String },
}

impl NormalizeError {
    /// Path of the field that caused the failure.
    pub fn path(&self) -> &str {
        match self {
            NormalizeError::InvalidJson { path, .. }
            | NormalizeError::MissingField { path }
            | NormalizeError::InvalidIntentPair { path, .. }
            | NormalizeError::InvalidConstraintMode { path, .. }
            | NormalizeError::RangeBounds { path, .. }
            | NormalizeError::EmptyDomain { path, .. }
            | NormalizeError::TypeMismatch { path, .. } => path,
        }
    }

    /// Identifier of the data-model invariant this error enforces, when the
    /// variant corresponds to one.
    pub fn invariant(&self) -> Option<&'static str> {
        match self {
            NormalizeError::InvalidIntentPair { .. } => Some("I-04"),
            NormalizeError::InvalidConstraintMode { .. } => Some("I-02"),
            NormalizeError::RangeBounds { .. } => Some("I-06"),
            NormalizeError::EmptyDomain { .. } => Some("I-05"),
            NormalizeError::InvalidJson { .. }
            | NormalizeError::MissingField { .. }
            | NormalizeError::TypeMismatch { .. } => None,
        }
    }
}
