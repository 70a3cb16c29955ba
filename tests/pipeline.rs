//! End-to-end ingest/query pipeline tests over the in-memory backends.
use std::sync::Arc;

use bazaar::{Core, Intent, QueryOptions, RankMethod};
use serde_json::{json, Value};

fn seller(id: &str, condition: &str, city: &str) -> Value {
    json!({
        "id": id,
        "intent": "product",
        "subintent": "sell",
        "domain": ["electronics"],
        "items": [{
            "type": "smartphone",
            "categorical": { "brand": "apple", "condition": condition },
            "range": { "price": [95000, 95000], "storage": [256, 256] }
        }],
        "self": { "categorical": { "type": "individual" }, "range": { "rating": [4.5, 4.5] } },
        "location": { "categorical": { "city": city } }
    })
}

fn buyer_query() -> Value {
    json!({
        "intent": "product",
        "subintent": "buy",
        "domain": ["electronics"],
        "items": [{
            "type": "smartphone",
            "categorical": { "brand": "apple" },
            "max": { "price": 100000 },
            "range": { "storage": [256, 256] },
            "item_exclusions": ["refurbished"]
        }],
        "other": { "min": { "rating": 4.0 } },
        "other_exclusions": ["dealer", "agent"],
        "location": { "categorical": { "city": "bangalore" } },
        "location_exclusions": ["chennai"]
    })
}

#[test]
fn query_returns_compatible_sellers_only() {
    let core = Core::builder().build().expect("core");
    core.ingest(&seller("good-seller", "excellent", "bangalore")).expect("ingest");
    core.ingest(&seller("refurb-seller", "refurbished", "bangalore")).expect("ingest");
    core.ingest(&seller("chennai-seller", "excellent", "chennai")).expect("ingest");
    // Same role as the query: filtered by the intent gate.
    core.ingest(&json!({
        "id": "another-buyer",
        "intent": "product",
        "subintent": "buy",
        "domain": ["electronics"],
        "items": [{ "type": "smartphone" }]
    }))
    .expect("ingest");

    let results = core.query(&buyer_query(), 10).expect("query");
    let ids: Vec<&str> = results.iter().map(|r| r.listing_id.as_str()).collect();
    assert_eq!(ids, vec!["good-seller"]);
    assert_eq!(results[0].rank, 1);
    assert!(results[0].per_method_scores.contains_key(&RankMethod::Dense));
}

#[test]
fn mutual_exchange_round_trip() {
    let core = Core::builder().build().expect("core");
    let listing = |id: &str, smoking_self: &str| {
        json!({
            "id": id,
            "intent": "mutual",
            "subintent": "exchange",
            "category": ["roommate"],
            "other": { "categorical": { "diet": "vegetarian", "smoking": "no" } },
            "self": { "categorical": { "diet": "vegetarian", "smoking": smoking_self } }
        })
    };
    core.ingest(&listing("compatible", "no")).expect("ingest");
    core.ingest(&listing("smoker", "yes")).expect("ingest");

    let results = core.query(&listing("query", "no"), 10).expect("query");
    let ids: Vec<&str> = results.iter().map(|r| r.listing_id.as_str()).collect();
    // The smoker fails the reverse direction; the query listing itself was
    // never ingested.
    assert_eq!(ids, vec!["compatible"]);
}

#[test]
fn retrieval_is_a_superset_of_the_match_set() {
    let core = Core::builder().build().expect("core");
    let mut expected = Vec::new();
    for i in 0..40 {
        let domain = if i % 2 == 0 { "electronics" } else { "furniture" };
        let city = if i % 3 == 0 { "bangalore" } else { "mysore" };
        let id = format!("seller-{i}");
        core.ingest(&seller(&id, "excellent", city)).expect("ingest");
        // Overwrite the domain on odd sellers so only even ones are eligible.
        if domain == "furniture" {
            let mut raw = seller(&id, "excellent", city);
            raw["domain"] = json!(["furniture"]);
            core.ingest(&raw).expect("re-ingest");
        } else {
            expected.push(id);
        }
    }

    let results = core.query(&buyer_query(), usize::MAX).expect("query");
    let returned: Vec<&str> = results.iter().map(|r| r.listing_id.as_str()).collect();
    for id in &expected {
        assert!(returned.contains(&id.as_str()), "{id} missing from results");
    }
    // Nothing from the other domain slipped through the matcher.
    assert_eq!(returned.len(), expected.len());
}

#[test]
fn ingesting_the_same_id_overwrites() {
    let core = Core::builder().build().expect("core");
    core.ingest(&seller("s-1", "excellent", "bangalore")).expect("ingest");

    let mut moved = seller("s-1", "excellent", "bangalore");
    moved["domain"] = json!(["furniture"]);
    core.ingest(&moved).expect("re-ingest");

    let results = core.query(&buyer_query(), 10).expect("query");
    assert!(results.is_empty(), "stale domain must not match after overwrite");
}

#[test]
fn remove_deletes_from_both_stores() {
    let core = Core::builder().build().expect("core");
    core.ingest(&seller("s-1", "excellent", "bangalore")).expect("ingest");
    assert!(core.remove(Intent::Product, "s-1").expect("remove"));
    assert!(!core.remove(Intent::Product, "s-1").expect("second remove"));
    assert!(core.query(&buyer_query(), 10).expect("query").is_empty());
}

#[test]
fn query_limit_truncates_ranked_output() {
    let core = Core::builder().build().expect("core");
    for i in 0..8 {
        core.ingest(&seller(&format!("s-{i}"), "excellent", "bangalore")).expect("ingest");
    }
    let results = core.query(&buyer_query(), 3).expect("query");
    assert_eq!(results.len(), 3);
    assert_eq!(results.last().expect("results").rank, 3);
}

#[test]
fn external_method_scores_reorder_survivors() {
    let core = Core::builder().build().expect("core");
    core.ingest(&seller("s-a", "excellent", "bangalore")).expect("ingest");
    core.ingest(&seller("s-b", "excellent", "bangalore")).expect("ingest");

    // Identical listings tie on the dense signal (ranks fall back to
    // retrieval order, favoring s-a); late-interaction and cross-encoder
    // scores supplied by the caller outweigh that and lift s-b on top.
    let mut options = QueryOptions::with_limit(10);
    for (method, a_score, b_score) in [
        (RankMethod::LateInteraction, 0.1, 0.9),
        (RankMethod::CrossEncoder, 0.2, 0.8),
    ] {
        options.method_scores.entry("s-a".to_string()).or_default().insert(method, a_score);
        options.method_scores.entry("s-b".to_string()).or_default().insert(method, b_score);
    }

    let results = core.query_opts(&buyer_query(), options).expect("query");
    assert_eq!(results[0].listing_id, "s-b");
    assert_eq!(results[1].listing_id, "s-a");
}

#[test]
fn generated_ids_are_unique_and_returned() {
    let core = Core::builder().build().expect("core");
    let raw = json!({
        "intent": "product",
        "subintent": "sell",
        "domain": ["electronics"],
        "items": [{ "type": "smartphone", "categorical": { "brand": "apple" } }]
    });
    let first = core.ingest(&raw).expect("ingest");
    let second = core.ingest(&raw).expect("ingest");
    assert_ne!(first, second);
}

#[test]
fn metrics_observer_sees_every_stage() {
    use std::sync::Mutex;

    use bazaar::{QueryMetrics, Stage};

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(Stage, bool)>>);

    impl QueryMetrics for Recorder {
        fn record_stage(&self, stage: Stage, _latency: std::time::Duration, ok: bool) {
            self.0.lock().expect("recorder lock").push((stage, ok));
        }
    }

    let recorder = Arc::new(Recorder::default());
    let core = Core::builder().metrics(recorder.clone()).build().expect("core");
    core.ingest(&seller("s-1", "excellent", "bangalore")).expect("ingest");
    core.query(&buyer_query(), 5).expect("query");

    let observed = recorder.0.lock().expect("recorder lock");
    assert!(observed.iter().all(|(_, ok)| *ok));
    let stages: Vec<Stage> = observed.iter().map(|(stage, _)| *stage).collect();
    for stage in
        [Stage::Normalize, Stage::Embed, Stage::Persist, Stage::Retrieve, Stage::Match, Stage::Rank]
    {
        assert!(stages.contains(&stage), "missing stage {stage}");
    }
}

#[test]
fn missing_embedding_degrades_ranking_without_failing() {
    use bazaar::{InMemoryListingStore, InMemoryVectorStore, VectorStore};

    let vectors = Arc::new(InMemoryVectorStore::new(384));
    let core = Core::builder()
        .listing_store(Arc::new(InMemoryListingStore::new()))
        .vector_store(vectors.clone())
        .build()
        .expect("core");

    core.ingest(&seller("kept", "excellent", "bangalore")).expect("ingest");
    core.ingest(&seller("degraded", "excellent", "bangalore")).expect("ingest");
    // Simulate a vector store losing one point.
    assert!(vectors.remove(Intent::Product, "degraded").expect("remove"));

    let results = core.query(&buyer_query(), 10).expect("query");
    let ids: Vec<&str> = results.iter().map(|r| r.listing_id.as_str()).collect();
    assert_eq!(ids, vec!["kept"]);
}
