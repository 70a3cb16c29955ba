//! Numeric range semantics.
//!
//! A candidate's numeric attribute is always read as a [`Range`]: an explicit
//! `range[k]` wins, else `min[k]` opens upward to `+inf`, else `max[k]` opens
//! downward from `-inf`, else the attribute is absent. Requirements are then
//! checked range-against-threshold or range-against-range; a scalar is only
//! ever the degenerate `range = [x, x]`.
use std::collections::BTreeMap;
use std::fmt;

use listing::{Constraint, Item};

/// An ordered numeric interval with `lo <= hi`, inclusive on both ends.
/// Unbounded sides are represented by `±inf`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub lo: f64,
    pub hi: f64,
}

impl Range {
    /// Build a range, returning `None` for NaN bounds or `lo > hi`.
    pub fn new(lo: f64, hi: f64) -> Option<Self> {
        if lo.is_nan() || hi.is_nan() || lo > hi {
            return None;
        }
        Some(Self { lo, hi })
    }

    /// `[m, +inf)` — a bare minimum.
    pub fn at_least(m: f64) -> Self {
        Self { lo: m, hi: f64::INFINITY }
    }

    /// `(-inf, m]` — a bare maximum.
    pub fn at_most(m: f64) -> Self {
        Self { lo: f64::NEG_INFINITY, hi: m }
    }

    /// The degenerate exact value `[x, x]`.
    pub fn exact(x: f64) -> Self {
        Self { lo: x, hi: x }
    }

    /// The whole number line.
    pub fn unbounded() -> Self {
        Self { lo: f64::NEG_INFINITY, hi: f64::INFINITY }
    }

    /// Whole candidate range sits at or above the threshold.
    pub fn satisfies_min(&self, threshold: f64) -> bool {
        self.lo >= threshold
    }

    /// Whole candidate range sits at or below the threshold.
    pub fn satisfies_max(&self, threshold: f64) -> bool {
        self.hi <= threshold
    }

    /// `inner` lies entirely within `self`.
    pub fn contains(&self, inner: &Range) -> bool {
        self.lo <= inner.lo && inner.hi <= self.hi
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}

/// Read access to the three numeric constraint modes of a value.
///
/// Both plain constraints and items carry the same trio of maps; the trait
/// lets extraction and checking work over either.
pub trait AttributeBounds {
    fn min_map(&self) -> &BTreeMap<String, f64>;
    fn max_map(&self) -> &BTreeMap<String, f64>;
    fn range_map(&self) -> &BTreeMap<String, (f64, f64)>;
}

impl AttributeBounds for Constraint {
    fn min_map(&self) -> &BTreeMap<String, f64> {
        &self.min
    }
    fn max_map(&self) -> &BTreeMap<String, f64> {
        &self.max
    }
    fn range_map(&self) -> &BTreeMap<String, (f64, f64)> {
        &self.range
    }
}

impl AttributeBounds for Item {
    fn min_map(&self) -> &BTreeMap<String, f64> {
        &self.min
    }
    fn max_map(&self) -> &BTreeMap<String, f64> {
        &self.max
    }
    fn range_map(&self) -> &BTreeMap<String, (f64, f64)> {
        &self.range
    }
}

/// Extract the candidate-side range for `key`, or `None` when the attribute
/// is absent. Precedence: explicit range, then min, then max.
pub fn extract_range<C: AttributeBounds + ?Sized>(candidate: &C, key: &str) -> Option<Range> {
    if let Some(&(lo, hi)) = candidate.range_map().get(key) {
        return Some(Range { lo, hi });
    }
    if let Some(&m) = candidate.min_map().get(key) {
        return Some(Range::at_least(m));
    }
    if let Some(&m) = candidate.max_map().get(key) {
        return Some(Range::at_most(m));
    }
    None
}

/// Which numeric mode a violated requirement came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericCheck {
    Min,
    Max,
    Range,
}

impl fmt::Display for NumericCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NumericCheck::Min => "min",
            NumericCheck::Max => "max",
            NumericCheck::Range => "range",
        };
        f.write_str(name)
    }
}

/// A single failed numeric requirement.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NumericViolation {
    pub key: String,
    pub check: NumericCheck,
}

/// First numeric requirement of `required` the candidate does not meet.
///
/// Empty requirement maps are vacuously satisfied; a required attribute the
/// candidate does not carry at all is a violation. Checks run in map order:
/// all minimums, then maximums, then ranges.
pub fn first_numeric_violation<R, C>(required: &R, candidate: &C) -> Option<NumericViolation>
where
    R: AttributeBounds + ?Sized,
    C: AttributeBounds + ?Sized,
{
    for (key, &threshold) in required.min_map() {
        let met = extract_range(candidate, key).is_some_and(|r| r.satisfies_min(threshold));
        if !met {
            return Some(NumericViolation { key: key.clone(), check: NumericCheck::Min });
        }
    }
    for (key, &threshold) in required.max_map() {
        let met = extract_range(candidate, key).is_some_and(|r| r.satisfies_max(threshold));
        if !met {
            return Some(NumericViolation { key: key.clone(), check: NumericCheck::Max });
        }
    }
    for (key, &(lo, hi)) in required.range_map() {
        let outer = Range { lo, hi };
        let met = extract_range(candidate, key).is_some_and(|inner| outer.contains(&inner));
        if !met {
            return Some(NumericViolation { key: key.clone(), check: NumericCheck::Range });
        }
    }
    None
}

/// Whether every numeric requirement of `required` is met by `candidate`.
pub fn numeric_requirements_met<R, C>(required: &R, candidate: &C) -> bool
where
    R: AttributeBounds + ?Sized,
    C: AttributeBounds + ?Sized,
{
    first_numeric_violation(required, candidate).is_none()
}
