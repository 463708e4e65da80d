//! Test helpers for categorization tests.
//!
//! Provides the reference catalog, an event-recording observer, and a store
//! wrapper that injects failures and delays.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use pantry_categorize::{CategorizationEvent, CategorizationObserver, Categorizer, Tier};
use pantry_core::{
    CacheEntry, CategorizationCacheRepository, Category, CategoryId, CategoryRepository, Error,
    NewCategory, Result,
};
use pantry_db::MemoryStore;
use pantry_inference::mock::StubClassifier;

pub const PRODUCE: CategoryId = CategoryId(1);
pub const OTHER: CategoryId = CategoryId(2);

/// `[Produce: apple, tomato] [Other]`
pub fn produce_catalog() -> MemoryStore {
    MemoryStore::with_categories(vec![
        NewCategory::new("Produce", ["apple", "tomato"]),
        NewCategory::new("Other", Vec::<String>::new()),
    ])
    .expect("valid catalog")
}

/// Categorizer over a memory store, recording events.
pub fn categorizer_for(
    store: &MemoryStore,
    classifier: &StubClassifier,
) -> (Categorizer, RecordingObserver) {
    let observer = RecordingObserver::default();
    let categorizer = Categorizer::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(classifier.clone()),
    )
    .with_observer(Arc::new(observer.clone()));
    (categorizer, observer)
}

/// Collects every emitted event.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<CategorizationEvent>>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<CategorizationEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn failed_tiers(&self) -> Vec<Tier> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                CategorizationEvent::TierFailed { tier, .. } => Some(tier),
                _ => None,
            })
            .collect()
    }

    pub fn has(&self, predicate: impl Fn(&CategorizationEvent) -> bool) -> bool {
        self.events().iter().any(predicate)
    }
}

impl CategorizationObserver for RecordingObserver {
    fn on_event(&self, event: &CategorizationEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Which store calls misbehave.
#[derive(Debug, Clone, Default)]
pub struct Faults {
    pub cache_read: bool,
    pub cache_write: bool,
    pub catalog: bool,
    pub catalog_delay: Option<Duration>,
}

/// Memory store that fails or stalls on demand.
#[derive(Clone)]
pub struct FaultyStore {
    pub inner: MemoryStore,
    pub faults: Faults,
}

impl FaultyStore {
    pub fn new(inner: MemoryStore, faults: Faults) -> Self {
        Self { inner, faults }
    }

    async fn catalog_gate(&self) -> Result<()> {
        if let Some(delay) = self.faults.catalog_delay {
            tokio::time::sleep(delay).await;
        }
        if self.faults.catalog {
            return Err(Error::Request("catalog: connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for FaultyStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        self.catalog_gate().await?;
        self.inner.list_categories().await
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        self.catalog_gate().await?;
        self.inner.find_category_by_name(name).await
    }

    async fn find_category_by_id(&self, id: CategoryId) -> Result<Option<Category>> {
        self.catalog_gate().await?;
        self.inner.find_category_by_id(id).await
    }

    async fn create_category(&self, category: NewCategory) -> Result<Category> {
        self.inner.create_category(category).await
    }

    async fn seed_if_empty(&self, defaults: &[NewCategory]) -> Result<usize> {
        self.inner.seed_if_empty(defaults).await
    }
}

#[async_trait]
impl CategorizationCacheRepository for FaultyStore {
    async fn get_cache_entry(&self, keyword: &str) -> Result<Option<CacheEntry>> {
        if self.faults.cache_read {
            return Err(Error::Request("cache: connection reset".to_string()));
        }
        self.inner.get_cache_entry(keyword).await
    }

    async fn upsert_cache_entry(&self, entry: &CacheEntry) -> Result<()> {
        if self.faults.cache_write {
            return Err(Error::Request("cache: read-only transaction".to_string()));
        }
        self.inner.upsert_cache_entry(entry).await
    }
}
