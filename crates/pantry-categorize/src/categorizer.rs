//! Layered item categorization.
//!
//! Resolution tiers run strictly in order and the first one that produces a
//! category wins:
//!
//! 1. empty input → no category
//! 2. cache lookup by normalized text
//! 3. catalog snapshot (unreachable or empty → no category)
//! 4. keyword match → written to the cache
//! 5. external classifier, confident and known answer → written to the cache
//! 6. fallback category by name → NOT written to the cache
//!
//! Every store and classifier call is bounded by a timeout and any failure
//! degrades to "this tier produced nothing". Neither public operation
//! returns an error.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, field, instrument, Span};

use pantry_core::logging;
use pantry_core::{
    find_by_name, find_fallback, match_keywords, normalize_item_text, CacheEntry,
    CategorizationCacheRepository, Category, CategoryId, CategoryRepository,
    ClassificationRequest, Error, ItemClassifier, Result,
};

use crate::config::CategorizerConfig;
use crate::events::{CategorizationEvent, CategorizationObserver, Tier, TracingObserver};

/// Resolves free-text shopping items to catalog categories.
pub struct Categorizer {
    categories: Arc<dyn CategoryRepository>,
    cache: Arc<dyn CategorizationCacheRepository>,
    classifier: Arc<dyn ItemClassifier>,
    observer: Arc<dyn CategorizationObserver>,
    config: CategorizerConfig,
}

impl Categorizer {
    /// Create a categorizer with default bounds and the tracing observer.
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        cache: Arc<dyn CategorizationCacheRepository>,
        classifier: Arc<dyn ItemClassifier>,
    ) -> Self {
        Self {
            categories,
            cache,
            classifier,
            observer: Arc::new(TracingObserver),
            config: CategorizerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CategorizerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn CategorizationObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &CategorizerConfig {
        &self.config
    }

    /// Resolve the category for one item.
    ///
    /// Returns `None` when no tier produced a category, including when the
    /// stores are unreachable. Never fails.
    #[instrument(
        skip(self, item_text),
        fields(
            subsystem = "categorize",
            component = "categorizer",
            op = "resolve",
            item = field::Empty,
            category_id = field::Empty,
            duration_ms = field::Empty,
        )
    )]
    pub async fn resolve_category_id(&self, item_text: &str) -> Option<CategoryId> {
        let start = Instant::now();
        let key = normalize_item_text(item_text);
        if key.is_empty() {
            return None;
        }
        let span = Span::current();
        span.record(logging::ITEM, key.as_str());

        let resolved = self.resolve_key(item_text.trim(), &key).await;
        if let Some(id) = resolved {
            span.record(logging::CATEGORY_ID, id.0);
        }
        span.record(logging::DURATION_MS, start.elapsed().as_millis() as u64);
        debug!("Resolution finished");
        resolved
    }

    async fn resolve_key(&self, item_text: &str, key: &str) -> Option<CategoryId> {
        if let Some(id) = self.lookup_cache(key).await {
            return Some(id);
        }

        let catalog = self
            .bounded(Tier::Catalog, key, self.categories.list_categories())
            .await?;
        if catalog.is_empty() {
            self.emit(CategorizationEvent::Unresolved {
                key: key.to_string(),
            });
            return None;
        }

        if let Some(category) = match_keywords(key, &catalog) {
            self.emit(CategorizationEvent::KeywordMatched {
                key: key.to_string(),
                category_id: category.id,
            });
            self.write_through(key, category).await;
            return Some(category.id);
        }

        if let Some(category) = self.classify(item_text, key, &catalog).await {
            self.write_through(key, category).await;
            return Some(category.id);
        }

        match find_fallback(&catalog, &self.config.fallback_names) {
            Some(category) => {
                self.emit(CategorizationEvent::Fallback {
                    key: key.to_string(),
                    category_id: category.id,
                });
                Some(category.id)
            }
            None => {
                self.emit(CategorizationEvent::Unresolved {
                    key: key.to_string(),
                });
                None
            }
        }
    }

    /// Cache tier. A null or dangling reference reads as a miss.
    async fn lookup_cache(&self, key: &str) -> Option<CategoryId> {
        let cached = self
            .bounded(Tier::Cache, key, self.cache.get_cache_entry(key))
            .await
            .flatten()
            .and_then(|entry| entry.category_id);

        let Some(category_id) = cached else {
            self.emit(CategorizationEvent::CacheMiss {
                key: key.to_string(),
            });
            return None;
        };

        // Verification failures trust the cached id.
        let exists = self
            .bounded(
                Tier::Cache,
                key,
                self.categories.find_category_by_id(category_id),
            )
            .await
            .map(|found| found.is_some())
            .unwrap_or(true);

        if exists {
            self.emit(CategorizationEvent::CacheHit {
                key: key.to_string(),
                category_id,
            });
            Some(category_id)
        } else {
            self.emit(CategorizationEvent::CacheStale {
                key: key.to_string(),
                category_id,
            });
            None
        }
    }

    /// Classifier tier. Returns the catalog entry for a confident, known answer.
    async fn classify<'a>(
        &self,
        item_text: &str,
        key: &str,
        catalog: &'a [Category],
    ) -> Option<&'a Category> {
        let classifier = self.classifier.name().to_string();
        if !self.classifier.is_available() {
            self.emit(CategorizationEvent::ClassifierUnavailable {
                key: key.to_string(),
                classifier,
            });
            return None;
        }

        let request = ClassificationRequest::from_catalog(item_text, catalog);
        let budget = self.config.classifier_budget;
        let raw = match tokio::time::timeout(budget, self.classifier.classify(&request)).await {
            Ok(result) => result,
            Err(_) => {
                self.emit(CategorizationEvent::TierFailed {
                    key: key.to_string(),
                    tier: Tier::Classifier,
                    error: timeout_error(budget).to_string(),
                });
                return None;
            }
        };

        let threshold = self.classifier.confidence_threshold();
        let accepted = raw
            .clone()
            .validated(&request)
            .category
            .filter(|_| raw.confidence >= threshold)
            .and_then(|name| find_by_name(catalog, &name));

        match accepted {
            Some(category) => {
                self.emit(CategorizationEvent::ClassifierAnswered {
                    key: key.to_string(),
                    classifier,
                    category_id: category.id,
                    confidence: raw.confidence,
                });
                Some(category)
            }
            None => {
                self.emit(CategorizationEvent::ClassifierRejected {
                    key: key.to_string(),
                    classifier,
                    category: raw.category,
                    confidence: raw.confidence,
                    threshold,
                });
                None
            }
        }
    }

    /// Best-effort cache upsert for a resolved category.
    async fn write_through(&self, key: &str, category: &Category) {
        let entry = CacheEntry::for_category(key, category);
        self.bounded(Tier::Cache, key, self.cache.upsert_cache_entry(&entry))
            .await;
    }

    /// Remember a manual category choice for future identical items.
    ///
    /// Best effort: unknown categories and store failures are reported to
    /// the observer and otherwise ignored. Returns whether the choice was
    /// stored.
    #[instrument(
        skip(self, item_text),
        fields(
            subsystem = "categorize",
            component = "categorizer",
            op = "record_correction",
            item = field::Empty,
        )
    )]
    pub async fn record_correction(&self, item_text: &str, category_id: CategoryId) -> bool {
        let key = normalize_item_text(item_text);
        if key.is_empty() {
            return false;
        }
        Span::current().record(logging::ITEM, key.as_str());

        let category = match self
            .bounded(
                Tier::Catalog,
                &key,
                self.categories.find_category_by_id(category_id),
            )
            .await
        {
            Some(Some(category)) => category,
            Some(None) => {
                self.emit(CategorizationEvent::TierFailed {
                    key: key.clone(),
                    tier: Tier::Catalog,
                    error: Error::NotFound(format!("category {}", category_id)).to_string(),
                });
                return false;
            }
            None => return false,
        };

        let entry = CacheEntry::for_category(key.as_str(), &category);
        let stored = self
            .bounded(Tier::Cache, &key, self.cache.upsert_cache_entry(&entry))
            .await
            .is_some();
        if stored {
            self.emit(CategorizationEvent::CorrectionRecorded { key, category_id });
        }
        stored
    }

    /// Await a store call under the store timeout.
    ///
    /// Errors and timeouts are reported as `TierFailed` and yield `None`.
    async fn bounded<T>(
        &self,
        tier: Tier,
        key: &str,
        call: impl Future<Output = Result<T>>,
    ) -> Option<T> {
        let error = match tokio::time::timeout(self.config.store_timeout, call).await {
            Ok(Ok(value)) => return Some(value),
            Ok(Err(e)) => e,
            Err(_) => timeout_error(self.config.store_timeout),
        };
        self.emit(CategorizationEvent::TierFailed {
            key: key.to_string(),
            tier,
            error: error.to_string(),
        });
        None
    }

    fn emit(&self, event: CategorizationEvent) {
        self.observer.on_event(&event);
    }
}

fn timeout_error(limit: Duration) -> Error {
    Error::Timeout(limit.as_millis() as u64)
}
