//! Canonical listing model and schema normalizer.
//!
//! A listing describes one side of a marketplace interaction: a product
//! buy/sell, a service seek/provide, or a symmetric mutual exchange. Raw
//! listing-shaped JSON (as produced by upstream extraction) enters through
//! [`normalize`], which either yields the canonical [`Listing`] every
//! downstream stage consumes, or fails loudly with a [`NormalizeError`]
//! carrying the offending field path and the violated invariant.
//!
//! Canonicalization guarantees:
//!
//! - every string is lower-cased and trimmed;
//! - set-typed fields are deduplicated and sorted (scalars are accepted and
//!   coerced to singleton sets, `null` becomes the empty set);
//! - every constraint carries all four modes (`categorical`, `min`, `max`,
//!   `range`) so downstream code never checks for key presence;
//! - the `(intent, subintent)` pair is one of the five valid combinations;
//! - `domain` is non-empty for product/service, `category` for mutual;
//! - every range is an ordered pair with `lo <= hi`.
//!
//! There is no semantic inference here: no synonym expansion, no geocoding,
//! no currency conversion, and no relaxation of malformed input. An
//! unrecognized constraint mode (for example an `exact` key) is a hard
//! error; exact-value constraints are expressed as `range = [x, x]`.

mod error;
mod normalize;
mod types;

pub use error::NormalizeError;
pub use normalize::{normalize, normalize_str};
pub use types::{Constraint, Intent, Item, Listing, LocationConstraint, LocationMode, Subintent};
