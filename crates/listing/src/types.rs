//! Core data model types for the `listing` crate.
//!
//! These are the canonical shapes produced by the normalizer. Matching and
//! ranking never mutate them; stores persist them as opaque structured
//! blobs. Maps are `BTreeMap` and set-typed fields are sorted `Vec`s so the
//! serialized form (and every iteration order) is deterministic.
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Nature of the interaction a listing describes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Goods changing hands.
    Product,
    /// Work performed by one party for another.
    Service,
    /// Symmetric exchange where both sides hold requirements and offers.
    Mutual,
}

impl Intent {
    pub const ALL: [Intent; 3] = [Intent::Product, Intent::Service, Intent::Mutual];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Product => "product",
            Intent::Service => "service",
            Intent::Mutual => "mutual",
        }
    }

    /// Whether `sub` is a legal role within this intent.
    ///
    /// The valid pairs are exactly `(product, buy)`, `(product, sell)`,
    /// `(service, seek)`, `(service, provide)`, and `(mutual, exchange)`.
    pub fn permits(&self, sub: Subintent) -> bool {
        matches!(
            (self, sub),
            (Intent::Product, Subintent::Buy)
                | (Intent::Product, Subintent::Sell)
                | (Intent::Service, Subintent::Seek)
                | (Intent::Service, Subintent::Provide)
                | (Intent::Mutual, Subintent::Exchange)
        )
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role within an intent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Subintent {
    Buy,
    Sell,
    Seek,
    Provide,
    Exchange,
}

impl Subintent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subintent::Buy => "buy",
            Subintent::Sell => "sell",
            Subintent::Seek => "seek",
            Subintent::Provide => "provide",
            Subintent::Exchange => "exchange",
        }
    }

    /// The counterparty role that completes this one.
    ///
    /// Buy pairs with sell, seek with provide; exchange pairs with itself.
    pub fn inverse(&self) -> Subintent {
        match self {
            Subintent::Buy => Subintent::Sell,
            Subintent::Sell => Subintent::Buy,
            Subintent::Seek => Subintent::Provide,
            Subintent::Provide => Subintent::Seek,
            Subintent::Exchange => Subintent::Exchange,
        }
    }
}

impl fmt::Display for Subintent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How categorical location values are interpreted during matching.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum LocationMode {
    /// Normalized-token overlap between the two location values.
    NearMe,
    /// Substring containment in either direction.
    Explicit,
    /// Substring containment; the listing only cares about the target place.
    TargetOnly,
    /// Route endpoints; any endpoint overlap matches.
    Route,
    /// Location never constrains the match.
    #[default]
    Global,
}

impl LocationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationMode::NearMe => "near_me",
            LocationMode::Explicit => "explicit",
            LocationMode::TargetOnly => "target_only",
            LocationMode::Route => "route",
            LocationMode::Global => "global",
        }
    }
}

impl fmt::Display for LocationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `{categorical, min, max, range}` tuple over attributes.
///
/// All four modes are always present after normalization (empty maps when
/// the raw listing omitted them). There is no `exact` mode; an exact value
/// is `range = [x, x]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Constraint {
    /// Attribute name to required/held string value.
    #[serde(default)]
    pub categorical: BTreeMap<String, String>,
    /// Attribute name to lower bound (inclusive).
    #[serde(default)]
    pub min: BTreeMap<String, f64>,
    /// Attribute name to upper bound (inclusive).
    #[serde(default)]
    pub max: BTreeMap<String, f64>,
    /// Attribute name to ordered pair `(lo, hi)` with `lo <= hi`.
    #[serde(default)]
    pub range: BTreeMap<String, (f64, f64)>,
}

impl Constraint {
    pub fn is_empty(&self) -> bool {
        self.categorical.is_empty()
            && self.min.is_empty()
            && self.max.is_empty()
            && self.range.is_empty()
    }
}

/// A single item a product/service listing is about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    /// Canonical noun for the item (non-empty, normalized).
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub categorical: BTreeMap<String, String>,
    #[serde(default)]
    pub min: BTreeMap<String, f64>,
    #[serde(default)]
    pub max: BTreeMap<String, f64>,
    #[serde(default)]
    pub range: BTreeMap<String, (f64, f64)>,
    /// Literal values this item must never be offered with.
    #[serde(default)]
    pub item_exclusions: Vec<String>,
}

/// Location constraint: a [`Constraint`] extended with an interpretation mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LocationConstraint {
    #[serde(rename = "location_mode", default)]
    pub mode: LocationMode,
    #[serde(flatten)]
    pub constraint: Constraint,
}

/// Canonical listing: the only shape matching, retrieval, and ranking accept.
///
/// Produced exclusively by [`crate::normalize`]; invariants documented on the
/// crate root hold for every value of this type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    pub intent: Intent,
    pub subintent: Subintent,
    /// Non-empty for product/service, empty for mutual.
    #[serde(default)]
    pub domain: Vec<String>,
    /// Non-empty for mutual, empty for product/service.
    #[serde(default)]
    pub category: Vec<String>,
    /// First category after normalization; mutual listings only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_category: Option<String>,
    /// What the interaction is about. Unused for matching when mutual.
    #[serde(default)]
    pub items: Vec<Item>,
    /// What the counterparty must be.
    #[serde(default)]
    pub other: Constraint,
    /// What this party is.
    #[serde(rename = "self", default)]
    pub self_: Constraint,
    #[serde(default)]
    pub location: LocationConstraint,
    /// Listing-wide item exclusions, applied to every required item.
    #[serde(default)]
    pub item_exclusions: Vec<String>,
    /// Literal values the counterparty must not carry.
    #[serde(default)]
    pub other_exclusions: Vec<String>,
    /// Carried for completeness; consumed by no matching rule.
    #[serde(default)]
    pub self_exclusions: Vec<String>,
    /// Literal location values the counterparty must not carry.
    #[serde(default)]
    pub location_exclusions: Vec<String>,
}

impl Listing {
    /// The terms the retriever filters on: `domain` for product/service,
    /// `category` for mutual.
    pub fn filter_terms(&self) -> &[String] {
        match self.intent {
            Intent::Product | Intent::Service => &self.domain,
            Intent::Mutual => &self.category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_permits_exactly_the_five_pairs() {
        let valid = [
            (Intent::Product, Subintent::Buy),
            (Intent::Product, Subintent::Sell),
            (Intent::Service, Subintent::Seek),
            (Intent::Service, Subintent::Provide),
            (Intent::Mutual, Subintent::Exchange),
        ];
        let subs = [
            Subintent::Buy,
            Subintent::Sell,
            Subintent::Seek,
            Subintent::Provide,
            Subintent::Exchange,
        ];
        for intent in Intent::ALL {
            for sub in subs {
                assert_eq!(
                    intent.permits(sub),
                    valid.contains(&(intent, sub)),
                    "pair ({intent}, {sub})"
                );
            }
        }
    }

    #[test]
    fn subintent_inverse_is_involutive() {
        for sub in [
            Subintent::Buy,
            Subintent::Sell,
            Subintent::Seek,
            Subintent::Provide,
            Subintent::Exchange,
        ] {
            assert_eq!(sub.inverse().inverse(), sub);
        }
    }

    #[test]
    fn intent_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Intent::Product).unwrap(), "\"product\"");
        assert_eq!(
            serde_json::from_str::<Subintent>("\"provide\"").unwrap(),
            Subintent::Provide
        );
        assert_eq!(
            serde_json::from_str::<LocationMode>("\"near_me\"").unwrap(),
            LocationMode::NearMe
        );
    }

    #[test]
    fn constraint_default_is_empty() {
        let c = Constraint::default();
        assert!(c.is_empty());
        assert_eq!(serde_json::from_str::<Constraint>("{}").unwrap(), c);
    }

    #[test]
    fn item_round_trips_with_type_key() {
        let item = Item {
            kind: "smartphone".into(),
            categorical: BTreeMap::from([("brand".to_string(), "apple".to_string())]),
            min: BTreeMap::new(),
            max: BTreeMap::from([("price".to_string(), 100_000.0)]),
            range: BTreeMap::from([("storage".to_string(), (256.0, 256.0))]),
            item_exclusions: vec![],
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "smartphone");
        let back: Item = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }
}
