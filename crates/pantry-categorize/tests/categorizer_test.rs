//! Resolution tier ordering, write-through caching, and failure degradation.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::{
    categorizer_for, produce_catalog, Faults, FaultyStore, RecordingObserver, OTHER, PRODUCE,
};
use pantry_categorize::{CategorizationEvent, Categorizer, CategorizerConfig, Tier};
use pantry_core::{CacheEntry, CategoryId, CategoryRepository, NewCategory};
use pantry_db::MemoryStore;
use pantry_inference::mock::StubClassifier;

// =============================================================================
// TIER ORDERING
// =============================================================================

#[tokio::test]
async fn test_cache_hit_skips_keyword_and_classifier() {
    let store = produce_catalog();
    let other = store.categories()[1].clone();
    store.put_cache_entry_raw(CacheEntry::for_category("fresh apple", &other));

    let stub = StubClassifier::panicking();
    let (categorizer, observer) = categorizer_for(&store, &stub);

    assert_eq!(categorizer.resolve_category_id("Fresh Apple").await, Some(OTHER));
    assert_eq!(stub.call_count(), 0);
    assert!(observer.has(|e| matches!(e, CategorizationEvent::CacheHit { .. })));
    assert!(!observer.has(|e| matches!(e, CategorizationEvent::KeywordMatched { .. })));
}

#[tokio::test]
async fn test_keyword_match_is_cached() {
    let store = produce_catalog();
    let stub = StubClassifier::answering("Produce", 0.9);
    let (categorizer, observer) = categorizer_for(&store, &stub);

    assert_eq!(categorizer.resolve_category_id("Fresh Apple").await, Some(PRODUCE));

    let entry = store.cache_entry("fresh apple").expect("keyword result cached");
    assert_eq!(entry.category_id, Some(PRODUCE));
    assert_eq!(entry.category_name.as_deref(), Some("Produce"));
    assert_eq!(stub.call_count(), 0);

    observer.clear();
    assert_eq!(categorizer.resolve_category_id("fresh apple").await, Some(PRODUCE));
    assert!(observer.has(|e| matches!(e, CategorizationEvent::CacheHit { .. })));
    assert!(!observer.has(|e| matches!(e, CategorizationEvent::KeywordMatched { .. })));
}

#[tokio::test]
async fn test_cache_key_is_normalized() {
    let store = produce_catalog();
    let stub = StubClassifier::silent();
    let (categorizer, _) = categorizer_for(&store, &stub);

    categorizer.resolve_category_id("  FRESH \t  Apple ").await;

    assert!(store.cache_entry("fresh apple").is_some());
    assert_eq!(store.cache_len(), 1);
}

#[tokio::test]
async fn test_keywords_created_unnormalized_still_match() {
    let store = MemoryStore::new();
    store
        .create_category(NewCategory {
            name: "Produce".to_string(),
            keywords: vec!["Apple".to_string(), " tomato ".to_string()],
        })
        .await
        .unwrap();
    let stub = StubClassifier::silent();
    let (categorizer, _) = categorizer_for(&store, &stub);

    assert_eq!(categorizer.resolve_category_id("Fresh Apple").await, Some(CategoryId(1)));
    assert_eq!(categorizer.resolve_category_id("tomato").await, Some(CategoryId(1)));
    assert_eq!(stub.call_count(), 0);
}

#[tokio::test]
async fn test_confident_classifier_answer_is_cached() {
    let store = produce_catalog();
    let stub = StubClassifier::answering("Produce", 0.9);
    let (categorizer, observer) = categorizer_for(&store, &stub);

    assert_eq!(categorizer.resolve_category_id("Banana").await, Some(PRODUCE));
    assert_eq!(stub.call_count(), 1);
    assert_eq!(
        store.cache_entry("banana").and_then(|e| e.category_id),
        Some(PRODUCE)
    );
    assert!(observer.has(|e| matches!(
        e,
        CategorizationEvent::ClassifierAnswered { category_id, .. } if *category_id == PRODUCE
    )));

    assert_eq!(categorizer.resolve_category_id("banana").await, Some(PRODUCE));
    assert_eq!(stub.call_count(), 1);
}

#[tokio::test]
async fn test_classifier_answer_matched_case_insensitively() {
    let store = produce_catalog();
    let stub = StubClassifier::answering("PRODUCE", 0.9);
    let (categorizer, _) = categorizer_for(&store, &stub);

    assert_eq!(categorizer.resolve_category_id("Banana").await, Some(PRODUCE));
}

// =============================================================================
// CLASSIFIER ACCEPTANCE
// =============================================================================

#[tokio::test]
async fn test_low_confidence_falls_back_without_caching() {
    let store = produce_catalog();
    let stub = StubClassifier::answering("Produce", 0.1);
    let (categorizer, observer) = categorizer_for(&store, &stub);

    assert_eq!(categorizer.resolve_category_id("Quantum Widget").await, Some(OTHER));
    assert!(store.cache_entry("quantum widget").is_none());
    assert!(observer.has(|e| matches!(
        e,
        CategorizationEvent::ClassifierRejected { confidence, threshold, .. }
            if *confidence < *threshold
    )));
    assert!(observer.has(|e| matches!(e, CategorizationEvent::Fallback { .. })));
}

#[tokio::test]
async fn test_unknown_category_name_discarded() {
    let store = produce_catalog();
    let stub = StubClassifier::answering("Gadgets", 0.99);
    let (categorizer, observer) = categorizer_for(&store, &stub);

    assert_eq!(categorizer.resolve_category_id("Quantum Widget").await, Some(OTHER));
    assert_eq!(store.cache_len(), 0);
    assert!(observer.has(|e| matches!(
        e,
        CategorizationEvent::ClassifierRejected { category: Some(name), .. } if name == "Gadgets"
    )));
}

#[tokio::test]
async fn test_threshold_comes_from_classifier() {
    let store = produce_catalog();
    let stub = StubClassifier::answering("Produce", 0.1).with_threshold(0.05);
    let (categorizer, _) = categorizer_for(&store, &stub);

    assert_eq!(categorizer.resolve_category_id("Quantum Widget").await, Some(PRODUCE));
}

#[tokio::test]
async fn test_unavailable_classifier_is_skipped() {
    let store = produce_catalog();
    let stub = StubClassifier::answering("Produce", 0.9).unavailable();
    let (categorizer, observer) = categorizer_for(&store, &stub);

    assert_eq!(categorizer.resolve_category_id("Quantum Widget").await, Some(OTHER));
    assert_eq!(stub.call_count(), 0);
    assert!(observer.has(|e| matches!(e, CategorizationEvent::ClassifierUnavailable { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_slow_classifier_is_bounded() {
    let store = produce_catalog();
    let stub = StubClassifier::answering("Produce", 0.9).with_delay(Duration::from_secs(60));
    let (categorizer, observer) = categorizer_for(&store, &stub);
    let categorizer = categorizer.with_config(
        CategorizerConfig::default().with_classifier_budget(Duration::from_millis(50)),
    );

    assert_eq!(categorizer.resolve_category_id("Quantum Widget").await, Some(OTHER));
    assert_eq!(observer.failed_tiers(), vec![Tier::Classifier]);
    assert!(store.cache_entry("quantum widget").is_none());
}

// =============================================================================
// FALLBACK
// =============================================================================

#[tokio::test]
async fn test_fallback_is_not_cached() {
    let store = produce_catalog();
    let stub = StubClassifier::silent();
    let (categorizer, _) = categorizer_for(&store, &stub);

    assert_eq!(categorizer.resolve_category_id("Quantum Widget").await, Some(OTHER));
    assert_eq!(categorizer.resolve_category_id("Quantum Widget").await, Some(OTHER));

    assert_eq!(stub.call_count(), 2);
    assert_eq!(store.cache_len(), 0);
}

#[tokio::test]
async fn test_no_fallback_category_returns_none() {
    let store =
        MemoryStore::with_categories(vec![NewCategory::new("Produce", ["apple"])]).unwrap();
    let stub = StubClassifier::silent();
    let (categorizer, observer) = categorizer_for(&store, &stub);

    assert_eq!(categorizer.resolve_category_id("Quantum Widget").await, None);
    assert!(observer.has(|e| matches!(e, CategorizationEvent::Unresolved { .. })));
}

#[tokio::test]
async fn test_german_fallback_recognized() {
    let store = MemoryStore::with_categories(vec![
        NewCategory::new("Milchprodukte", ["milch"]),
        NewCategory::new("Sonstiges", Vec::<String>::new()),
    ])
    .unwrap();
    let stub = StubClassifier::silent();
    let (categorizer, _) = categorizer_for(&store, &stub);

    assert_eq!(
        categorizer.resolve_category_id("Schrauben").await,
        Some(CategoryId(2))
    );
}

#[tokio::test]
async fn test_fallback_names_tried_in_order() {
    let store = MemoryStore::with_categories(vec![
        NewCategory::new("Other", Vec::<String>::new()),
        NewCategory::new("Sonstiges", Vec::<String>::new()),
    ])
    .unwrap();
    let stub = StubClassifier::silent();
    let (categorizer, _) = categorizer_for(&store, &stub);
    let categorizer = categorizer
        .with_config(CategorizerConfig::default().with_fallback_names(["Sonstiges", "Other"]));

    assert_eq!(
        categorizer.resolve_category_id("Schrauben").await,
        Some(CategoryId(2))
    );
}

#[tokio::test]
async fn test_empty_catalog_returns_none() {
    let store = MemoryStore::new();
    let stub = StubClassifier::panicking();
    let (categorizer, _) = categorizer_for(&store, &stub);

    assert_eq!(categorizer.resolve_category_id("Fresh Apple").await, None);
    assert_eq!(stub.call_count(), 0);
}

// =============================================================================
// CACHE INTEGRITY
// =============================================================================

#[tokio::test]
async fn test_null_cache_entry_is_a_miss() {
    let store = produce_catalog();
    store.put_cache_entry_raw(CacheEntry {
        keyword: "fresh apple".to_string(),
        category_id: None,
        category_name: None,
        updated_at: None,
    });
    let stub = StubClassifier::silent();
    let (categorizer, _) = categorizer_for(&store, &stub);

    assert_eq!(categorizer.resolve_category_id("Fresh Apple").await, Some(PRODUCE));
    assert_eq!(
        store.cache_entry("fresh apple").and_then(|e| e.category_id),
        Some(PRODUCE)
    );
}

#[tokio::test]
async fn test_dangling_cache_reference_is_a_miss() {
    let store = MemoryStore::with_categories(vec![
        NewCategory::new("Produce", ["apple"]),
        NewCategory::new("Milchprodukte", ["milch"]),
        NewCategory::new("Other", Vec::<String>::new()),
    ])
    .unwrap();
    let produce = store.categories()[0].clone();
    store.put_cache_entry_raw(CacheEntry::for_category("frische milch", &produce));
    assert!(store.remove_category(produce.id));

    let stub = StubClassifier::silent();
    let (categorizer, observer) = categorizer_for(&store, &stub);

    assert_eq!(
        categorizer.resolve_category_id("Frische Milch").await,
        Some(CategoryId(2))
    );
    assert!(observer.has(|e| matches!(e, CategorizationEvent::CacheStale { .. })));
    assert_eq!(
        store.cache_entry("frische milch").and_then(|e| e.category_id),
        Some(CategoryId(2))
    );
}

// =============================================================================
// CORRECTIONS
// =============================================================================

#[tokio::test]
async fn test_correction_overrides_keyword_match() {
    let store = produce_catalog();
    let stub = StubClassifier::panicking();
    let (categorizer, observer) = categorizer_for(&store, &stub);

    assert!(categorizer.record_correction("fresh apple", OTHER).await);
    assert!(observer.has(|e| matches!(e, CategorizationEvent::CorrectionRecorded { .. })));

    observer.clear();
    assert_eq!(categorizer.resolve_category_id("Fresh Apple").await, Some(OTHER));
    assert!(!observer.has(|e| matches!(e, CategorizationEvent::KeywordMatched { .. })));

    let entry = store.cache_entry("fresh apple").unwrap();
    assert_eq!(entry.category_name.as_deref(), Some("Other"));
}

#[tokio::test]
async fn test_correction_replaces_earlier_resolution() {
    let store = produce_catalog();
    let stub = StubClassifier::silent();
    let (categorizer, _) = categorizer_for(&store, &stub);

    assert_eq!(categorizer.resolve_category_id("Tomato Soup").await, Some(PRODUCE));
    categorizer.record_correction("  TOMATO soup", OTHER).await;

    assert_eq!(categorizer.resolve_category_id("Tomato Soup").await, Some(OTHER));
    assert_eq!(store.cache_len(), 1);
}

#[tokio::test]
async fn test_correction_to_unknown_category_is_ignored() {
    let store = produce_catalog();
    let stub = StubClassifier::silent();
    let (categorizer, observer) = categorizer_for(&store, &stub);

    assert!(!categorizer.record_correction("widget", CategoryId(99)).await);

    assert!(store.cache_entry("widget").is_none());
    assert_eq!(observer.failed_tiers(), vec![Tier::Catalog]);
}

#[tokio::test]
async fn test_correction_with_blank_text_is_ignored() {
    let store = produce_catalog();
    let stub = StubClassifier::silent();
    let (categorizer, observer) = categorizer_for(&store, &stub);

    assert!(!categorizer.record_correction("   ", OTHER).await);

    assert_eq!(store.cache_len(), 0);
    assert!(observer.events().is_empty());
}

// =============================================================================
// FAILURE DEGRADATION
// =============================================================================

fn faulty_categorizer(
    store: &MemoryStore,
    faults: Faults,
    classifier: &StubClassifier,
) -> (Categorizer, RecordingObserver) {
    let faulty = FaultyStore::new(store.clone(), faults);
    let observer = RecordingObserver::default();
    let categorizer = Categorizer::new(
        Arc::new(faulty.clone()),
        Arc::new(faulty),
        Arc::new(classifier.clone()),
    )
    .with_observer(Arc::new(observer.clone()));
    (categorizer, observer)
}

#[tokio::test]
async fn test_cache_read_failure_falls_through_to_keyword() {
    let store = produce_catalog();
    let faults = Faults {
        cache_read: true,
        ..Faults::default()
    };
    let (categorizer, observer) =
        faulty_categorizer(&store, faults, &StubClassifier::panicking());

    assert_eq!(categorizer.resolve_category_id("Fresh Apple").await, Some(PRODUCE));
    assert_eq!(observer.failed_tiers(), vec![Tier::Cache]);
}

#[tokio::test]
async fn test_cache_write_failure_still_returns_match() {
    let store = produce_catalog();
    let faults = Faults {
        cache_write: true,
        ..Faults::default()
    };
    let stub = StubClassifier::answering("Produce", 0.9);
    let (categorizer, observer) = faulty_categorizer(&store, faults, &stub);

    assert_eq!(categorizer.resolve_category_id("Fresh Apple").await, Some(PRODUCE));
    assert_eq!(categorizer.resolve_category_id("Banana").await, Some(PRODUCE));
    assert_eq!(store.cache_len(), 0);
    assert_eq!(observer.failed_tiers(), vec![Tier::Cache, Tier::Cache]);

    assert!(!categorizer.record_correction("banana", OTHER).await);
    assert!(!observer.has(|e| matches!(e, CategorizationEvent::CorrectionRecorded { .. })));
}

#[tokio::test]
async fn test_unreachable_catalog_returns_none() {
    let store = produce_catalog();
    let faults = Faults {
        catalog: true,
        ..Faults::default()
    };
    let stub = StubClassifier::panicking();
    let (categorizer, observer) = faulty_categorizer(&store, faults, &stub);

    assert_eq!(categorizer.resolve_category_id("Fresh Apple").await, None);
    assert_eq!(observer.failed_tiers(), vec![Tier::Catalog]);
}

#[tokio::test]
async fn test_cache_hit_survives_failed_verification() {
    let store = produce_catalog();
    let other = store.categories()[1].clone();
    store.put_cache_entry_raw(CacheEntry::for_category("widget", &other));
    let faults = Faults {
        catalog: true,
        ..Faults::default()
    };
    let (categorizer, _) = faulty_categorizer(&store, faults, &StubClassifier::panicking());

    assert_eq!(categorizer.resolve_category_id("Widget").await, Some(OTHER));
}

#[tokio::test(start_paused = true)]
async fn test_slow_catalog_is_bounded() {
    let store = produce_catalog();
    let faults = Faults {
        catalog_delay: Some(Duration::from_secs(30)),
        ..Faults::default()
    };
    let (categorizer, observer) =
        faulty_categorizer(&store, faults, &StubClassifier::panicking());
    let categorizer = categorizer.with_config(
        CategorizerConfig::default().with_store_timeout(Duration::from_millis(100)),
    );

    assert_eq!(categorizer.resolve_category_id("Fresh Apple").await, None);
    assert_eq!(observer.failed_tiers(), vec![Tier::Catalog]);
}

#[tokio::test]
async fn test_concurrent_resolutions_agree() {
    let store = produce_catalog();
    let stub = StubClassifier::answering("Produce", 0.9);
    let (categorizer, _) = categorizer_for(&store, &stub);
    let categorizer = Arc::new(categorizer);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let categorizer = Arc::clone(&categorizer);
            tokio::spawn(async move { categorizer.resolve_category_id("Banana").await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), Some(PRODUCE));
    }
    assert_eq!(store.cache_len(), 1);
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[tokio::test]
async fn test_scenario_learning_cycle() {
    let store = produce_catalog();
    let stub = StubClassifier::answering("Produce", 0.9);
    let (categorizer, _) = categorizer_for(&store, &stub);

    // Keyword tier, then cached.
    assert_eq!(categorizer.resolve_category_id("Fresh Apple").await, Some(PRODUCE));
    assert_eq!(
        store.cache_entry("fresh apple").and_then(|e| e.category_id),
        Some(PRODUCE)
    );

    // Manual override wins from then on.
    categorizer.record_correction("fresh apple", OTHER).await;
    assert_eq!(categorizer.resolve_category_id("Fresh Apple").await, Some(OTHER));
    assert_eq!(stub.call_count(), 0);
}
