//! Listing-to-text rendering for embedding.
//!
//! Two strategies keyed on intent. Product/service listings render as a flat
//! keyword sequence; mutual listings render as a natural-language phrase.
//! Attribute names are discovered dynamically, nothing is hard-coded, and
//! numeric constraint values never appear in the text — only their keys, as
//! bare tokens.
use listing::{Constraint, Intent, Item, Listing};

/// Render the embedding text for a canonical listing.
pub fn embedding_text(listing: &Listing) -> String {
    match listing.intent {
        Intent::Product | Intent::Service => keyword_text(listing),
        Intent::Mutual => mutual_text(listing),
    }
}

/// `intent subintent d₁ … dₖ type₁ k₁ v₁ … type₂ …` with numeric keys as
/// bare tokens.
fn keyword_text(listing: &Listing) -> String {
    let mut tokens: Vec<&str> = vec![listing.intent.as_str(), listing.subintent.as_str()];
    tokens.extend(listing.domain.iter().map(String::as_str));
    for item in &listing.items {
        push_item_tokens(item, &mut tokens);
    }
    tokens.join(" ")
}

fn push_item_tokens<'a>(item: &'a Item, tokens: &mut Vec<&'a str>) {
    tokens.push(&item.kind);
    for (key, value) in &item.categorical {
        tokens.push(key);
        tokens.push(value);
    }
    tokens.extend(item.min.keys().map(String::as_str));
    tokens.extend(item.max.keys().map(String::as_str));
    tokens.extend(item.range.keys().map(String::as_str));
}

/// `mutual exchange in categories: c₁ and c₂ offering … wanting … with
/// attributes …`, eliding sections the listing does not populate.
fn mutual_text(listing: &Listing) -> String {
    let mut text = format!(
        "mutual exchange in categories: {}",
        listing.category.join(" and ")
    );
    if !listing.items.is_empty() {
        let offered: Vec<String> = listing.items.iter().map(describe_item).collect();
        text.push_str(" offering ");
        text.push_str(&offered.join(", "));
    }
    if !listing.other.is_empty() {
        text.push_str(" wanting ");
        text.push_str(&describe_constraint(&listing.other));
    }
    if !listing.self_.is_empty() {
        text.push_str(" with attributes ");
        text.push_str(&describe_constraint(&listing.self_));
    }
    text
}

fn describe_item(item: &Item) -> String {
    let mut parts: Vec<&str> = vec![&item.kind];
    for (key, value) in &item.categorical {
        parts.push(key);
        parts.push(value);
    }
    parts.extend(item.min.keys().map(String::as_str));
    parts.extend(item.max.keys().map(String::as_str));
    parts.extend(item.range.keys().map(String::as_str));
    parts.join(" ")
}

fn describe_constraint(constraint: &Constraint) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for (key, value) in &constraint.categorical {
        parts.push(key);
        parts.push(value);
    }
    parts.extend(constraint.min.keys().map(String::as_str));
    parts.extend(constraint.max.keys().map(String::as_str));
    parts.extend(constraint.range.keys().map(String::as_str));
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(raw: serde_json::Value) -> Listing {
        listing::normalize(&raw).expect("normalize")
    }

    #[test]
    fn keyword_text_concatenates_intent_domains_and_items() {
        let listing = normalize(json!({
            "intent": "product",
            "subintent": "buy",
            "domain": ["electronics"],
            "items": [{
                "type": "smartphone",
                "categorical": { "brand": "apple" },
                "max": { "price": 100000 },
                "range": { "storage": [256, 256] }
            }]
        }));
        let text = embedding_text(&listing);
        assert_eq!(
            text,
            "product buy electronics smartphone brand apple price storage"
        );
    }

    #[test]
    fn numeric_values_are_never_embedded() {
        let listing = normalize(json!({
            "intent": "product",
            "subintent": "sell",
            "domain": ["electronics"],
            "items": [{ "type": "laptop", "min": { "ram": 32 } }]
        }));
        let text = embedding_text(&listing);
        assert!(text.contains("ram"));
        assert!(!text.contains("32"));
    }

    #[test]
    fn mutual_text_is_phrased() {
        let listing = normalize(json!({
            "intent": "mutual",
            "subintent": "exchange",
            "category": ["roommate"],
            "other": { "categorical": { "diet": "vegetarian", "smoking": "no" } },
            "self": { "categorical": { "diet": "vegetarian" } }
        }));
        let text = embedding_text(&listing);
        assert_eq!(
            text,
            "mutual exchange in categories: roommate \
             wanting diet vegetarian smoking no with attributes diet vegetarian"
        );
    }

    #[test]
    fn mutual_text_elides_empty_sections() {
        let listing = normalize(json!({
            "intent": "mutual",
            "subintent": "exchange",
            "category": ["book swap", "reading"]
        }));
        assert_eq!(
            embedding_text(&listing),
            "mutual exchange in categories: book swap and reading"
        );
    }

    #[test]
    fn text_is_dynamic_over_attribute_names() {
        let listing = normalize(json!({
            "intent": "service",
            "subintent": "provide",
            "domain": ["tutoring"],
            "items": [{
                "type": "lesson",
                "categorical": { "subject": "mathematics", "level": "graduate" }
            }]
        }));
        let text = embedding_text(&listing);
        assert!(text.contains("subject mathematics"));
        assert!(text.contains("level graduate"));
    }
}
