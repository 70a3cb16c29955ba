//! Categorical subset under an injected implication relation.
use std::collections::BTreeMap;

use crate::implication::Implies;

/// First required key the candidate fails to satisfy, or `None` when
/// `required ⊆ candidate` holds under `implies`.
///
/// A key is satisfied when the candidate carries it and its value either
/// equals the required value or implies it. Empty `required` is vacuously
/// satisfied; a missing key is a violation.
pub fn first_categorical_violation(
    required: &BTreeMap<String, String>,
    candidate: &BTreeMap<String, String>,
    implies: &dyn Implies,
) -> Option<String> {
    for (key, required_value) in required {
        let satisfied = match candidate.get(key) {
            Some(candidate_value) => {
                candidate_value == required_value || implies.implies(candidate_value, required_value)
            }
            None => false,
        };
        if !satisfied {
            return Some(key.clone());
        }
    }
    None
}

/// Whether `required ⊆ candidate` holds under `implies`.
pub fn categorical_subset(
    required: &BTreeMap<String, String>,
    candidate: &BTreeMap<String, String>,
    implies: &dyn Implies,
) -> bool {
    first_categorical_violation(required, candidate, implies).is_none()
}
