//! The gate-ordered match engine.
use std::sync::Arc;

use kernel::{
    categorical_subset, disjoint, first_categorical_violation, first_exclusion_hit,
    first_numeric_violation, numeric_requirements_met, ExactImplication, Implies,
};
use listing::{Intent, Item, Listing, LocationMode, Subintent};

use crate::explain::{GateKind, GateOutcome, MatchFailure, MatchTrace};
use crate::location;


/// Matcher over canonical listings.
///
/// Holds the injected implication relation; everything else is per-call
/// input. The engine is immutable and safe to share across threads.
pub struct MatchEngine {
    implies: Arc<dyn Implies>,
}

impl MatchEngine {
    /// Build an engine over the given implication relation.
    pub fn new(implies: Arc<dyn Implies>) -> Self {
        Self { implies }
    }

    /// Engine with no vocabulary: implication is plain string equality.
    pub fn with_equality() -> Self {
        Self::new(Arc::new(ExactImplication))
    }

    /// Does `candidate` satisfy every requirement `query` expresses?
    ///
    /// Strict boolean; evaluation short-circuits on the first failing gate
    /// in the documented order. For mutual intent both directions must pass,
    /// the reverse being the same evaluation with arguments swapped.
    pub fn listing_matches(&self, query: &Listing, candidate: &Listing) -> bool {
        if self.direction_failure(query, candidate).is_some() {
            return false;
        }
        if query.intent == Intent::Mutual {
            return self.direction_failure(candidate, query).is_none();
        }
        true
    }

    /// Re-run the gates and report what was checked and what first failed.
    pub fn explain(&self, query: &Listing, candidate: &Listing) -> MatchTrace {
        let mut gates = Vec::new();
        let failure = self.traced_failure(query, candidate, &mut gates);
        MatchTrace { matched: failure.is_none(), gates, failure }
    }

    /// One direction of the evaluation, first failing rule wins.
    fn direction_failure(&self, query: &Listing, candidate: &Listing) -> Option<MatchFailure> {
        intent_failure(query, candidate)
            .or_else(|| domain_failure(query, candidate))
            .or_else(|| self.items_failure(query, candidate))
            .or_else(|| self.counterparty_failure(query, candidate))
            .or_else(|| self.location_failure(query, candidate))
    }

    fn traced_failure(
        &self,
        query: &Listing,
        candidate: &Listing,
        gates: &mut Vec<GateOutcome>,
    ) -> Option<MatchFailure> {
        if let Some(failure) = intent_failure(query, candidate) {
            gates.push(GateOutcome { gate: GateKind::Intent, passed: false });
            return Some(failure);
        }
        gates.push(GateOutcome { gate: GateKind::Intent, passed: true });

        if let Some(failure) = domain_failure(query, candidate) {
            gates.push(GateOutcome { gate: GateKind::DomainCategory, passed: false });
            return Some(failure);
        }
        gates.push(GateOutcome { gate: GateKind::DomainCategory, passed: true });

        if query.intent != Intent::Mutual {
            if let Some(failure) = self.items_failure(query, candidate) {
                gates.push(GateOutcome { gate: GateKind::Items, passed: false });
                return Some(failure);
            }
            gates.push(GateOutcome { gate: GateKind::Items, passed: true });
        }

        if let Some(failure) = self.counterparty_failure(query, candidate) {
            gates.push(GateOutcome { gate: GateKind::Counterparty, passed: false });
            return Some(failure);
        }
        gates.push(GateOutcome { gate: GateKind::Counterparty, passed: true });

        if let Some(failure) = self.location_failure(query, candidate) {
            gates.push(GateOutcome { gate: GateKind::Location, passed: false });
            return Some(failure);
        }
        gates.push(GateOutcome { gate: GateKind::Location, passed: true });

        if query.intent == Intent::Mutual {
            if let Some(failure) = self.direction_failure(candidate, query) {
                gates.push(GateOutcome { gate: GateKind::Reverse, passed: false });
                return Some(MatchFailure::Reverse(Box::new(failure)));
            }
            gates.push(GateOutcome { gate: GateKind::Reverse, passed: true });
        }

        None
    }

    /// Items gate: every required item needs at least one covering candidate
    /// item. Skipped for mutual intent, where items do not participate in
    /// matching. A candidate item may cover several required items.
    fn items_failure(&self, query: &Listing, candidate: &Listing) -> Option<MatchFailure> {
        if query.intent == Intent::Mutual {
            return None;
        }
        for (index, required) in query.items.iter().enumerate() {
            let covered = candidate
                .items
                .iter()
                .any(|offered| self.item_covers(required, offered, &query.item_exclusions));
            if !covered {
                return Some(MatchFailure::ItemUncovered { index, kind: required.kind.clone() });
            }
        }
        None
    }

    fn item_covers(&self, required: &Item, offered: &Item, listing_exclusions: &[String]) -> bool {
        if required.kind != offered.kind {
            return false;
        }
        if !categorical_subset(&required.categorical, &offered.categorical, self.implies.as_ref()) {
            return false;
        }
        if !numeric_requirements_met(required, offered) {
            return false;
        }
        let offered_values = || {
            std::iter::once(offered.kind.as_str())
                .chain(offered.categorical.values().map(String::as_str))
        };
        disjoint(&required.item_exclusions, offered_values())
            && disjoint(listing_exclusions, offered_values())
    }

    /// Counterparty gate: the query's `other` constraint against the
    /// candidate's `self`, plus the query's counterparty exclusions.
    fn counterparty_failure(&self, query: &Listing, candidate: &Listing) -> Option<MatchFailure> {
        if let Some(key) = first_categorical_violation(
            &query.other.categorical,
            &candidate.self_.categorical,
            self.implies.as_ref(),
        ) {
            return Some(MatchFailure::CounterpartyCategorical { key });
        }
        if let Some(violation) = first_numeric_violation(&query.other, &candidate.self_) {
            return Some(MatchFailure::CounterpartyNumeric {
                key: violation.key,
                check: violation.check,
            });
        }
        if let Some(value) = first_exclusion_hit(
            &query.other_exclusions,
            candidate.self_.categorical.values().map(String::as_str),
        ) {
            return Some(MatchFailure::CounterpartyExclusion { value });
        }
        None
    }

    /// Location gate: the query's location constraint against the
    /// candidate's, with categorical values related through the query's
    /// location mode on top of equality and implication. Exclusions stay
    /// literal in both directions.
    fn location_failure(&self, query: &Listing, candidate: &Listing) -> Option<MatchFailure> {
        let mode = query.location.mode;
        if mode != LocationMode::Global {
            for (key, required_value) in &query.location.constraint.categorical {
                let satisfied = match candidate.location.constraint.categorical.get(key) {
                    Some(candidate_value) => {
                        candidate_value == required_value
                            || self.implies.implies(candidate_value, required_value)
                            || location::value_matches(mode, candidate_value, required_value)
                    }
                    None => false,
                };
                if !satisfied {
                    return Some(MatchFailure::LocationCategorical { key: key.clone() });
                }
            }
        }
        if let Some(violation) =
            first_numeric_violation(&query.location.constraint, &candidate.location.constraint)
        {
            return Some(MatchFailure::LocationNumeric {
                key: violation.key,
                check: violation.check,
            });
        }
        if let Some(value) = first_exclusion_hit(
            &query.location_exclusions,
            candidate.location.constraint.categorical.values().map(String::as_str),
        ) {
            return Some(MatchFailure::LocationExclusion { value });
        }
        if let Some(value) = first_exclusion_hit(
            &candidate.location_exclusions,
            query.location.constraint.categorical.values().map(String::as_str),
        ) {
            return Some(MatchFailure::LocationCounterExclusion { value });
        }
        None
    }
}

/// Intent gate: same intent, inverse roles for product/service, both
/// `exchange` for mutual.
fn intent_failure(query: &Listing, candidate: &Listing) -> Option<MatchFailure> {
    if query.intent != candidate.intent {
        return Some(MatchFailure::IntentMismatch {
            query: query.intent,
            candidate: candidate.intent,
        });
    }
    let roles_pair = match query.intent {
        Intent::Mutual => {
            query.subintent == Subintent::Exchange && candidate.subintent == Subintent::Exchange
        }
        Intent::Product | Intent::Service => candidate.subintent == query.subintent.inverse(),
    };
    if !roles_pair {
        return Some(MatchFailure::RoleNotInverse {
            query: query.subintent,
            candidate: candidate.subintent,
        });
    }
    None
}

/// Domain/category gate: non-empty intersection of the intent's term sets.
fn domain_failure(query: &Listing, candidate: &Listing) -> Option<MatchFailure> {
    match query.intent {
        Intent::Product | Intent::Service => {
            if sorted_intersects(&query.domain, &candidate.domain) {
                None
            } else {
                Some(MatchFailure::DomainDisjoint)
            }
        }
        Intent::Mutual => {
            if sorted_intersects(&query.category, &candidate.category) {
                None
            } else {
                Some(MatchFailure::CategoryDisjoint)
            }
        }
    }
}

/// Intersection test over two sorted, deduplicated term slices.
fn sorted_intersects(a: &[String], b: &[String]) -> bool {
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Equal => return true,
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
        }
    }
    false
}
