//! Core traits for pantry abstractions.
//!
//! These traits define the narrow interfaces the categorizer consumes, so
//! storage and classification backends stay pluggable and testable.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// STORE TRAITS
// =============================================================================

/// Repository for the category catalog.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// List all categories in the catalog's natural (id) order.
    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// Find a category by name, case-insensitively.
    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>>;

    /// Find a category by id.
    async fn find_category_by_id(&self, id: CategoryId) -> Result<Option<Category>>;

    /// Create a category. Fails with `InvalidInput` on an empty or duplicate name.
    async fn create_category(&self, category: NewCategory) -> Result<Category>;

    /// Insert `defaults` when the catalog is empty.
    ///
    /// Returns the number of categories inserted (0 when the catalog already
    /// had entries).
    async fn seed_if_empty(&self, defaults: &[NewCategory]) -> Result<usize>;
}

/// Repository for the keyword → category resolution cache.
#[async_trait]
pub trait CategorizationCacheRepository: Send + Sync {
    /// Look up an entry by its normalized key.
    async fn get_cache_entry(&self, keyword: &str) -> Result<Option<CacheEntry>>;

    /// Insert or overwrite the entry for `entry.keyword` (last writer wins).
    async fn upsert_cache_entry(&self, entry: &CacheEntry) -> Result<()>;
}

/// Repository for shopping-list resources.
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// Insert a resource and return it with its assigned id.
    async fn insert_resource(&self, resource: NewResource) -> Result<Resource>;

    /// Apply a patch to a resource of a project.
    ///
    /// Returns `None` when no resource with that id exists in the project.
    async fn update_resource(
        &self,
        project_id: i64,
        resource_id: i64,
        patch: &ResourcePatch,
    ) -> Result<Option<Resource>>;

    /// List a project's resources in id order with category names attached.
    async fn list_resources(&self, project_id: i64) -> Result<Vec<ResourceView>>;
}

// =============================================================================
// CLASSIFIER TRAITS
// =============================================================================

/// External classification capability.
///
/// Implementations must not fail: transport errors, malformed payloads and
/// answers outside the request's candidates all surface as
/// [`ClassificationResult::none`].
#[async_trait]
pub trait ItemClassifier: Send + Sync {
    /// Short identifier used in logs ("zero_shot", "generative", ...).
    fn name(&self) -> &str;

    /// Whether the classifier is configured (e.g. has a credential).
    ///
    /// Checked before every call; an unavailable classifier is skipped.
    fn is_available(&self) -> bool;

    /// Minimum confidence this classifier's answers must reach.
    fn confidence_threshold(&self) -> f32 {
        crate::defaults::DEFAULT_CONFIDENCE_THRESHOLD
    }

    /// Pick at most one candidate for the request's item.
    async fn classify(&self, request: &ClassificationRequest) -> ClassificationResult;
}
