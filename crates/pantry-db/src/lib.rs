//! # pantry-db
//!
//! Storage layer for pantry categorization.
//!
//! This crate provides:
//! - Connection pool management
//! - PostgreSQL repositories for the category catalog, the categorization
//!   cache, and shopping-list resources
//! - An in-memory store implementing the same traits
//!
//! ## Example
//!
//! ```rust,ignore
//! use pantry_db::{Database, CategoryRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/pantry").await?;
//!     db.seed_default_catalog().await?;
//!
//!     for category in db.categories.list_categories().await? {
//!         println!("{} {}", category.id, category.name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod categories;
pub mod memory;
pub mod pool;
pub mod resources;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use pantry_core::*;

pub use cache::PgCategorizationCacheRepository;
pub use categories::{validate_category_name, PgCategoryRepository};
pub use memory::MemoryStore;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use resources::PgResourceRepository;

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Category catalog repository.
    pub categories: PgCategoryRepository,
    /// Keyword → category resolution cache.
    pub cache: PgCategorizationCacheRepository,
    /// Shopping-list resources.
    pub resources: PgResourceRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            categories: PgCategoryRepository::new(pool.clone()),
            cache: PgCategorizationCacheRepository::new(pool.clone()),
            resources: PgResourceRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Insert the bootstrap catalog when the catalog is empty.
    pub async fn seed_default_catalog(&self) -> Result<usize> {
        self.categories.seed_if_empty(&default_catalog()).await
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
