//! Schema normalization: raw listing-shaped JSON into the canonical model.
//!
//! The normalizer validates shape and invariants only. It never infers
//! meaning: no synonym expansion, no geocoding, no unit or currency
//! conversion. The first malformed field aborts with a [`NormalizeError`]
//! naming the field path.
use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::NormalizeError;
use crate::types::{Constraint, Intent, Item, Listing, LocationConstraint, LocationMode, Subintent};

/// Keys a plain constraint object may carry.
const CONSTRAINT_KEYS: [&str; 4] = ["categorical", "min", "max", "range"];
/// Keys an item object may carry.
const ITEM_KEYS: [&str; 6] = ["type", "categorical", "min", "max", "range", "item_exclusions"];
/// Keys a location object may carry.
const LOCATION_KEYS: [&str; 5] = ["location_mode", "categorical", "min", "max", "range"];

/// Parse and normalize a raw listing from a JSON string.
pub fn normalize_str(raw: &str) -> Result<Listing, NormalizeError> {
    let value: Value = serde_json::from_str(raw).map_err(|e| NormalizeError::InvalidJson {
        path: "$".into(),
        message: e.to_string(),
    })?;
    normalize(&value)
}

/// Normalize a raw listing-shaped value into the canonical [`Listing`].
///
/// Unknown top-level keys (titles, free text, extraction metadata) are
/// ignored; unknown keys inside constraint-shaped objects are hard errors.
/// Normalization is idempotent: feeding a canonical listing's serialized
/// form back through produces an identical listing.
pub fn normalize(raw: &Value) -> Result<Listing, NormalizeError> {
    let obj = raw.as_object().ok_or_else(|| NormalizeError::TypeMismatch {
        path: "$".into(),
        expected: "object".into(),
    })?;

    let intent_raw = required_string(obj, "intent")?;
    let subintent_raw = required_string(obj, "subintent")?;
    let (intent, subintent) = parse_intent_pair(&intent_raw, &subintent_raw)?;

    let domain = string_set(obj, "domain")?;
    let category = string_set(obj, "category")?;
    check_domain_category(intent, &domain, &category)?;
    let primary_category = match intent {
        Intent::Mutual => category.first().cloned(),
        Intent::Product | Intent::Service => None,
    };

    let items = items_field(obj)?;
    let other = constraint_field(obj, "other")?;
    let self_ = constraint_field(obj, "self")?;
    let location = location_field(obj)?;

    Ok(Listing {
        intent,
        subintent,
        domain,
        category,
        primary_category,
        items,
        other,
        self_,
        location,
        item_exclusions: string_set(obj, "item_exclusions")?,
        other_exclusions: string_set(obj, "other_exclusions")?,
        self_exclusions: string_set(obj, "self_exclusions")?,
        location_exclusions: string_set(obj, "location_exclusions")?,
    })
}

fn norm_text(s: &str) -> String {
    s.trim().to_lowercase()
}

fn required_string(obj: &Map<String, Value>, key: &str) -> Result<String, NormalizeError> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(NormalizeError::MissingField { path: key.into() }),
        Some(Value::String(s)) => {
            let normalized = norm_text(s);
            if normalized.is_empty() {
                Err(NormalizeError::MissingField { path: key.into() })
            } else {
                Ok(normalized)
            }
        }
        Some(_) => Err(NormalizeError::TypeMismatch {
            path: key.into(),
            expected: "string".into(),
        }),
    }
}

fn parse_intent_pair(intent: &str, subintent: &str) -> Result<(Intent, Subintent), NormalizeError> {
    let invalid = || NormalizeError::InvalidIntentPair {
        path: "intent".into(),
        intent: intent.to_string(),
        subintent: subintent.to_string(),
    };
    let parsed_intent = match intent {
        "product" => Intent::Product,
        "service" => Intent::Service,
        "mutual" => Intent::Mutual,
        _ => return Err(invalid()),
    };
    let parsed_sub = match subintent {
        "buy" => Subintent::Buy,
        "sell" => Subintent::Sell,
        "seek" => Subintent::Seek,
        "provide" => Subintent::Provide,
        "exchange" => Subintent::Exchange,
        _ => return Err(invalid()),
    };
    if !parsed_intent.permits(parsed_sub) {
        return Err(invalid());
    }
    Ok((parsed_intent, parsed_sub))
}

fn check_domain_category(
    intent: Intent,
    domain: &[String],
    category: &[String],
) -> Result<(), NormalizeError> {
    match intent {
        Intent::Product | Intent::Service => {
            if domain.is_empty() {
                return Err(NormalizeError::EmptyDomain {
                    path: "domain".into(),
                    intent: intent.to_string(),
                });
            }
            if !category.is_empty() {
                return Err(NormalizeError::TypeMismatch {
                    path: "category".into(),
                    expected: format!("empty category for {intent} intent"),
                });
            }
        }
        Intent::Mutual => {
            if category.is_empty() {
                return Err(NormalizeError::EmptyDomain {
                    path: "category".into(),
                    intent: intent.to_string(),
                });
            }
            if !domain.is_empty() {
                return Err(NormalizeError::TypeMismatch {
                    path: "domain".into(),
                    expected: "empty domain for mutual intent".into(),
                });
            }
        }
    }
    Ok(())
}

/// Set-typed string field: absent or null is the empty set, a scalar string
/// is a singleton, an array is normalized element-wise. The result is
/// deduplicated and sorted; values that normalize to empty are dropped.
fn string_set(obj: &Map<String, Value>, key: &str) -> Result<Vec<String>, NormalizeError> {
    let values = match obj.get(key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(s)) => vec![norm_text(s)],
        Some(Value::Array(arr)) => {
            let mut out = Vec::with_capacity(arr.len());
            for (i, v) in arr.iter().enumerate() {
                match v {
                    Value::String(s) => out.push(norm_text(s)),
                    _ => {
                        return Err(NormalizeError::TypeMismatch {
                            path: format!("{key}[{i}]"),
                            expected: "string".into(),
                        })
                    }
                }
            }
            out
        }
        Some(_) => {
            return Err(NormalizeError::TypeMismatch {
                path: key.into(),
                expected: "string or array of strings".into(),
            })
        }
    };
    let mut out: Vec<String> = values.into_iter().filter(|s| !s.is_empty()).collect();
    out.sort();
    out.dedup();
    Ok(out)
}

fn object_field<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<&'a Map<String, Value>>, NormalizeError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(NormalizeError::TypeMismatch {
            path: path.into(),
            expected: "object".into(),
        }),
    }
}

fn reject_unknown_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    path: &str,
) -> Result<(), NormalizeError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(NormalizeError::InvalidConstraintMode {
                path: path.into(),
                mode: key.clone(),
            });
        }
    }
    Ok(())
}

fn attribute_key(key: &str, path: &str) -> Result<String, NormalizeError> {
    let normalized = norm_text(key);
    if normalized.is_empty() {
        return Err(NormalizeError::TypeMismatch {
            path: path.into(),
            expected: "non-empty attribute name".into(),
        });
    }
    Ok(normalized)
}

fn categorical_map(
    map: &Map<String, Value>,
    path: &str,
) -> Result<BTreeMap<String, String>, NormalizeError> {
    let mut out = BTreeMap::new();
    for (k, v) in map {
        let key = attribute_key(k, path)?;
        match v {
            Value::String(s) => {
                out.insert(key, norm_text(s));
            }
            _ => {
                return Err(NormalizeError::TypeMismatch {
                    path: format!("{path}.{key}"),
                    expected: "string".into(),
                })
            }
        }
    }
    Ok(out)
}

fn finite_number(v: &Value, path: &str) -> Result<f64, NormalizeError> {
    match v.as_f64() {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(NormalizeError::TypeMismatch {
            path: path.into(),
            expected: "finite number".into(),
        }),
    }
}

fn numeric_map(
    map: &Map<String, Value>,
    path: &str,
) -> Result<BTreeMap<String, f64>, NormalizeError> {
    let mut out = BTreeMap::new();
    for (k, v) in map {
        let key = attribute_key(k, path)?;
        let n = finite_number(v, &format!("{path}.{key}"))?;
        out.insert(key, n);
    }
    Ok(out)
}

fn range_map(
    map: &Map<String, Value>,
    path: &str,
) -> Result<BTreeMap<String, (f64, f64)>, NormalizeError> {
    let mut out = BTreeMap::new();
    for (k, v) in map {
        let key = attribute_key(k, path)?;
        let entry_path = format!("{path}.{key}");
        let pair = match v {
            Value::Array(arr) if arr.len() == 2 => {
                let lo = finite_number(&arr[0], &entry_path)?;
                let hi = finite_number(&arr[1], &entry_path)?;
                (lo, hi)
            }
            _ => {
                return Err(NormalizeError::TypeMismatch {
                    path: entry_path,
                    expected: "two-element numeric array".into(),
                })
            }
        };
        if pair.0 > pair.1 {
            return Err(NormalizeError::RangeBounds {
                path: entry_path,
                lo: pair.0,
                hi: pair.1,
            });
        }
        out.insert(key, pair);
    }
    Ok(out)
}

/// Parse the four constraint modes out of `map`, defaulting each absent mode
/// to the empty mapping so downstream never checks for presence.
fn constraint_modes(map: &Map<String, Value>, path: &str) -> Result<Constraint, NormalizeError> {
    let categorical = match object_field(map, "categorical", &format!("{path}.categorical"))? {
        Some(m) => categorical_map(m, &format!("{path}.categorical"))?,
        None => BTreeMap::new(),
    };
    let min = match object_field(map, "min", &format!("{path}.min"))? {
        Some(m) => numeric_map(m, &format!("{path}.min"))?,
        None => BTreeMap::new(),
    };
    let max = match object_field(map, "max", &format!("{path}.max"))? {
        Some(m) => numeric_map(m, &format!("{path}.max"))?,
        None => BTreeMap::new(),
    };
    let range = match object_field(map, "range", &format!("{path}.range"))? {
        Some(m) => range_map(m, &format!("{path}.range"))?,
        None => BTreeMap::new(),
    };
    Ok(Constraint { categorical, min, max, range })
}

fn constraint_field(obj: &Map<String, Value>, key: &str) -> Result<Constraint, NormalizeError> {
    match object_field(obj, key, key)? {
        None => Ok(Constraint::default()),
        Some(map) => {
            reject_unknown_keys(map, &CONSTRAINT_KEYS, key)?;
            constraint_modes(map, key)
        }
    }
}

fn location_field(obj: &Map<String, Value>) -> Result<LocationConstraint, NormalizeError> {
    let map = match object_field(obj, "location", "location")? {
        None => return Ok(LocationConstraint::default()),
        Some(map) => map,
    };
    reject_unknown_keys(map, &LOCATION_KEYS, "location")?;
    let mode = match map.get("location_mode") {
        None | Some(Value::Null) => LocationMode::default(),
        Some(Value::String(s)) => match norm_text(s).as_str() {
            "near_me" => LocationMode::NearMe,
            "explicit" => LocationMode::Explicit,
            "target_only" => LocationMode::TargetOnly,
            "route" => LocationMode::Route,
            "global" => LocationMode::Global,
            other => {
                return Err(NormalizeError::TypeMismatch {
                    path: "location.location_mode".into(),
                    expected: format!("one of near_me/explicit/target_only/route/global, got `{other}`"),
                })
            }
        },
        Some(_) => {
            return Err(NormalizeError::TypeMismatch {
                path: "location.location_mode".into(),
                expected: "string".into(),
            })
        }
    };
    Ok(LocationConstraint {
        mode,
        constraint: constraint_modes(map, "location")?,
    })
}

fn items_field(obj: &Map<String, Value>) -> Result<Vec<Item>, NormalizeError> {
    let arr = match obj.get("items") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(arr)) => arr,
        Some(_) => {
            return Err(NormalizeError::TypeMismatch {
                path: "items".into(),
                expected: "array of objects".into(),
            })
        }
    };
    let mut items = Vec::with_capacity(arr.len());
    for (i, v) in arr.iter().enumerate() {
        let path = format!("items[{i}]");
        let map = v.as_object().ok_or_else(|| NormalizeError::TypeMismatch {
            path: path.clone(),
            expected: "object".into(),
        })?;
        reject_unknown_keys(map, &ITEM_KEYS, &path)?;
        let kind = required_string(map, "type").map_err(|e| match e {
            NormalizeError::MissingField { .. } => NormalizeError::MissingField {
                path: format!("{path}.type"),
            },
            NormalizeError::TypeMismatch { expected, .. } => NormalizeError::TypeMismatch {
                path: format!("{path}.type"),
                expected,
            },
            other => other,
        })?;
        let constraint = constraint_modes(map, &path)?;
        items.push(Item {
            kind,
            categorical: constraint.categorical,
            min: constraint.min,
            max: constraint.max,
            range: constraint.range,
            item_exclusions: string_set(map, "item_exclusions")?,
        });
    }
    Ok(items)
}
