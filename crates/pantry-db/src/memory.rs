//! In-memory store implementing every repository trait.
//!
//! Used by tests and by embedders that do not need durability. Behaves like
//! the PostgreSQL repositories except that deleting a category leaves cache
//! entries and resources pointing at the removed id (dangling references).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use pantry_core::{
    clamp_quantity, CacheEntry, CategorizationCacheRepository, Category, CategoryId,
    CategoryRepository, Error, NewCategory, NewResource, Resource, ResourcePatch,
    ResourceRepository, ResourceView, Result,
};

use crate::categories::validate_category_name;

#[derive(Debug, Default)]
struct State {
    categories: Vec<Category>,
    next_category_id: i64,
    cache: HashMap<String, CacheEntry>,
    resources: Vec<Resource>,
    next_resource_id: i64,
}

impl State {
    fn check_new_category(&self, category: &NewCategory) -> Result<()> {
        validate_category_name(&category.name).map_err(Error::InvalidInput)?;
        let name = category.name.trim();
        if self.categories.iter().any(|c| c.has_name(name)) {
            return Err(Error::InvalidInput(format!(
                "Category '{}' already exists",
                name
            )));
        }
        Ok(())
    }

    fn insert_category(&mut self, category: &NewCategory) -> Result<Category> {
        self.check_new_category(category)?;
        let category = category.normalized();
        self.next_category_id += 1;
        let created = Category {
            id: CategoryId(self.next_category_id),
            name: category.name,
            keywords: category.keywords,
        };
        self.categories.push(created.clone());
        Ok(created)
    }
}

/// Thread-safe in-memory store; clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `categories` (ids assigned 1, 2, ...).
    pub fn with_categories(categories: Vec<NewCategory>) -> Result<Self> {
        let store = Self::new();
        {
            let mut state = store.lock();
            for category in &categories {
                state.insert_category(category)?;
            }
        }
        Ok(store)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock cannot leave State half-updated.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of the catalog.
    pub fn categories(&self) -> Vec<Category> {
        self.lock().categories.clone()
    }

    /// Remove a category without touching references to it.
    pub fn remove_category(&self, id: CategoryId) -> bool {
        let mut state = self.lock();
        let before = state.categories.len();
        state.categories.retain(|c| c.id != id);
        state.categories.len() != before
    }

    /// Peek at a cache entry without going through the async trait.
    pub fn cache_entry(&self, keyword: &str) -> Option<CacheEntry> {
        self.lock().cache.get(keyword).cloned()
    }

    /// Number of cache entries.
    pub fn cache_len(&self) -> usize {
        self.lock().cache.len()
    }

    /// Store an entry verbatim, bypassing validation (legacy/null rows).
    pub fn put_cache_entry_raw(&self, entry: CacheEntry) {
        self.lock().cache.insert(entry.keyword.clone(), entry);
    }

    /// Snapshot of all resources.
    pub fn resources(&self) -> Vec<Resource> {
        self.lock().resources.clone()
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let mut categories = self.categories();
        categories.sort_by_key(|c| c.id);
        Ok(categories)
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        Ok(self
            .lock()
            .categories
            .iter()
            .find(|c| c.has_name(name))
            .cloned())
    }

    async fn find_category_by_id(&self, id: CategoryId) -> Result<Option<Category>> {
        Ok(self
            .lock()
            .categories
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn create_category(&self, category: NewCategory) -> Result<Category> {
        self.lock().insert_category(&category)
    }

    async fn seed_if_empty(&self, defaults: &[NewCategory]) -> Result<usize> {
        let mut state = self.lock();
        if !state.categories.is_empty() {
            return Ok(0);
        }
        // All or nothing.
        let mut seeded = State::default();
        for category in defaults {
            seeded.insert_category(category)?;
        }
        state.categories = seeded.categories;
        state.next_category_id = seeded.next_category_id;
        Ok(defaults.len())
    }
}

#[async_trait]
impl CategorizationCacheRepository for MemoryStore {
    async fn get_cache_entry(&self, keyword: &str) -> Result<Option<CacheEntry>> {
        Ok(self.cache_entry(keyword))
    }

    async fn upsert_cache_entry(&self, entry: &CacheEntry) -> Result<()> {
        if entry.keyword.is_empty() {
            return Err(Error::InvalidInput(
                "Cache key cannot be empty".to_string(),
            ));
        }
        let mut stored = entry.clone();
        stored.updated_at = Some(Utc::now());
        self.lock().cache.insert(stored.keyword.clone(), stored);
        Ok(())
    }
}

#[async_trait]
impl ResourceRepository for MemoryStore {
    async fn insert_resource(&self, resource: NewResource) -> Result<Resource> {
        let mut state = self.lock();
        state.next_resource_id += 1;
        let created = Resource {
            id: state.next_resource_id,
            project_id: resource.project_id,
            name: resource.name,
            quantity: clamp_quantity(resource.quantity),
            purchased: false,
            category_id: resource.category_id,
        };
        state.resources.push(created.clone());
        Ok(created)
    }

    async fn update_resource(
        &self,
        project_id: i64,
        resource_id: i64,
        patch: &ResourcePatch,
    ) -> Result<Option<Resource>> {
        let mut state = self.lock();
        let Some(resource) = state
            .resources
            .iter_mut()
            .find(|r| r.id == resource_id && r.project_id == project_id)
        else {
            return Ok(None);
        };

        if let Some(purchased) = patch.purchased {
            resource.purchased = purchased;
        }
        if let Some(quantity) = patch.quantity {
            resource.quantity = clamp_quantity(quantity);
        }
        if let Some(category_id) = patch.category_id {
            resource.category_id = Some(category_id);
        }
        Ok(Some(resource.clone()))
    }

    async fn list_resources(&self, project_id: i64) -> Result<Vec<ResourceView>> {
        let state = self.lock();
        let mut views: Vec<ResourceView> = state
            .resources
            .iter()
            .filter(|r| r.project_id == project_id)
            .map(|r| ResourceView {
                category: r.category_id.and_then(|id| {
                    state
                        .categories
                        .iter()
                        .find(|c| c.id == id)
                        .map(|c| c.name.clone())
                }),
                resource: r.clone(),
            })
            .collect();
        views.sort_by_key(|v| v.resource.id);
        Ok(views)
    }
}
