//! Error propagation through the public surface: construction validates
//! eagerly, per-listing failures are tagged and carry their field path, and
//! nothing falls back to relaxed matching.
use std::sync::Arc;

use bazaar::{
    ConfigError, Core, CoreConfig, CoreError, GraphError, HashedEmbedder, InMemoryVectorStore,
    Intent, NormalizeError, RankMethod, RankWeights, TermGraph,
};
use serde_json::json;

#[test]
fn malformed_listing_is_rejected_with_field_path() {
    let core = Core::builder().build().expect("core");
    let err = core
        .ingest(&json!({
            "intent": "product",
            "subintent": "buy",
            "domain": ["electronics"],
            "other": { "exact": { "rating": 4.5 } }
        }))
        .expect_err("exact mode must be rejected");
    match err {
        CoreError::Normalize(NormalizeError::InvalidConstraintMode { path, mode }) => {
            assert_eq!(path, "other");
            assert_eq!(mode, "exact");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn invalid_intent_pair_is_rejected_on_query_too() {
    let core = Core::builder().build().expect("core");
    let err = core
        .query(&json!({ "intent": "product", "subintent": "exchange", "domain": ["x"] }), 5)
        .expect_err("invalid pair");
    match err {
        CoreError::Normalize(inner) => {
            assert!(matches!(inner, NormalizeError::InvalidIntentPair { .. }));
            assert_eq!(inner.invariant(), Some("I-04"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn nothing_is_persisted_when_normalization_fails() {
    let core = Core::builder().build().expect("core");
    let bad = json!({
        "id": "bad-listing",
        "intent": "product",
        "subintent": "buy",
        "domain": ["electronics"],
        "items": [{ "type": "phone", "range": { "storage": [512, 256] } }]
    });
    assert!(core.ingest(&bad).is_err());

    // A later query must not surface the rejected listing.
    let results = core
        .query(
            &json!({
                "intent": "product",
                "subintent": "sell",
                "domain": ["electronics"],
                "items": [{ "type": "phone" }]
            }),
            10,
        )
        .expect("query");
    assert!(results.is_empty());
}

#[test]
fn embedder_and_vector_store_dimensions_must_agree() {
    let err = Core::builder()
        .embedder(Arc::new(HashedEmbedder::new(384)))
        .vector_store(Arc::new(InMemoryVectorStore::new(128)))
        .build()
        .expect_err("dimension mismatch");
    match err {
        CoreError::Config(ConfigError::DimensionMismatch { embedder, store }) => {
            assert_eq!(embedder, 384);
            assert_eq!(store, 128);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn zero_candidate_limit_fails_construction() {
    let err = Core::builder()
        .config(CoreConfig::default().with_candidate_limit(0))
        .build()
        .expect_err("zero cap");
    assert!(matches!(err, CoreError::Config(ConfigError::ZeroCandidateLimit)));
}

#[test]
fn keyword_weights_for_mutual_fail_construction() {
    let config = CoreConfig::default().with_weights(
        Intent::Mutual,
        RankWeights::from_entries([(RankMethod::Dense, 0.75), (RankMethod::Keyword, 0.25)]),
    );
    let err = Core::builder().config(config).build().expect_err("mutual keyword");
    assert!(matches!(err, CoreError::Config(ConfigError::Weights(_))));
}

#[test]
fn custom_weight_overrides_are_accepted_when_valid() {
    let config = CoreConfig::default().with_weights(
        Intent::Product,
        RankWeights::from_entries([(RankMethod::Dense, 0.7), (RankMethod::Keyword, 0.3)]),
    );
    Core::builder().config(config).build().expect("valid override");
}

#[test]
fn empty_implication_source_is_a_construction_error() {
    let err = TermGraph::from_edges([]).expect_err("empty source");
    assert_eq!(err, GraphError::EmptySource);
    let config_err: ConfigError = err.into();
    assert!(matches!(config_err, ConfigError::Implication(GraphError::EmptySource)));
}

#[test]
fn store_dimension_errors_surface_as_retrieval_failures() {
    // A vector store narrower than the embedder is caught at build time, so
    // force the mismatch at the trait level instead.
    let store = InMemoryVectorStore::new(8);
    let err = bazaar::VectorStore::search(&store, Intent::Product, &[0.0; 4], None, 5)
        .expect_err("dimension mismatch");
    let core_err: CoreError = err.into();
    assert!(matches!(core_err, CoreError::Retrieval(_)));
}
