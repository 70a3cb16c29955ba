//! Concrete location predicates, keyed on the query's location mode.
//!
//! The data model treats categorical location values as opaque strings; the
//! mode decides how two values relate. Every predicate here must preserve
//! exclusion monotonicity: refining a candidate's location can never weaken
//! the query's exclusions, which stay literal and bypass these predicates
//! entirely.
use listing::LocationMode;

/// Whether the candidate's location value satisfies the required one under
/// the given mode. Equality and graph implication are checked by the caller
/// first; this predicate only adds the mode-specific relation.
pub(crate) fn value_matches(mode: LocationMode, candidate: &str, required: &str) -> bool {
    match mode {
        LocationMode::Global => true,
        LocationMode::NearMe => tokens_overlap(candidate, required),
        LocationMode::Explicit | LocationMode::TargetOnly => {
            candidate.contains(required) || required.contains(candidate)
        }
        LocationMode::Route => route_endpoints_overlap(candidate, required),
    }
}

/// Normalized-token set overlap.
fn tokens_overlap(a: &str, b: &str) -> bool {
    let b_tokens: Vec<&str> = tokens(b).collect();
    tokens(a).any(|t| b_tokens.contains(&t))
}

fn tokens(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
}

/// Route values are endpoint lists ("a-b", "a to b"); two routes relate when
/// any endpoint of one overlaps any endpoint of the other.
fn route_endpoints_overlap(a: &str, b: &str) -> bool {
    let ends_a = endpoints(a);
    let ends_b = endpoints(b);
    ends_a
        .iter()
        .any(|ea| ends_b.iter().any(|eb| tokens_overlap(ea, eb)))
}

fn endpoints(route: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = route
        .split('-')
        .flat_map(|part| part.split(" to "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    // Only the two ends of the route count; via-points are dropped.
    match segments.len() {
        0 | 1 | 2 => segments,
        _ => {
            let last = segments.pop().expect("non-empty");
            vec![segments[0], last]
        }
    }
}
