//! Exclusion disjointness.
//!
//! Exclusion sets are literal banned values. They are compared by string
//! equality only; the implication relation never applies here, so a value
//! that merely implies an excluded term is not banned.

/// First candidate value that appears in the exclusion set.
///
/// `exclusions` must be sorted, which the normalizer guarantees for every
/// canonical exclusion list.
pub fn first_exclusion_hit<'a, I>(exclusions: &[String], values: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    if exclusions.is_empty() {
        return None;
    }
    values
        .into_iter()
        .find(|v| exclusions.binary_search_by(|e| e.as_str().cmp(v)).is_ok())
        .map(str::to_string)
}

/// Whether the exclusion set and the candidate values share no member.
pub fn disjoint<'a, I>(exclusions: &[String], values: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    first_exclusion_hit(exclusions, values).is_none()
}
