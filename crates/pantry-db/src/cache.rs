//! Categorization cache repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};

use pantry_core::{CacheEntry, CategorizationCacheRepository, CategoryId, Error, Result};

/// PostgreSQL implementation of CategorizationCacheRepository.
#[derive(Clone)]
pub struct PgCategorizationCacheRepository {
    pool: Pool<Postgres>,
}

impl PgCategorizationCacheRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategorizationCacheRepository for PgCategorizationCacheRepository {
    async fn get_cache_entry(&self, keyword: &str) -> Result<Option<CacheEntry>> {
        let row = sqlx::query(
            "SELECT keyword, category_id, category, updated_at
             FROM categorization_cache WHERE keyword = $1",
        )
        .bind(keyword)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|row| CacheEntry {
            keyword: row.get("keyword"),
            category_id: row.get::<Option<i64>, _>("category_id").map(CategoryId),
            category_name: row.get("category"),
            updated_at: row.get("updated_at"),
        }))
    }

    async fn upsert_cache_entry(&self, entry: &CacheEntry) -> Result<()> {
        if entry.keyword.is_empty() {
            return Err(Error::InvalidInput(
                "Cache key cannot be empty".to_string(),
            ));
        }

        sqlx::query(
            "INSERT INTO categorization_cache (keyword, category_id, category, updated_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (keyword) DO UPDATE
             SET category_id = EXCLUDED.category_id,
                 category = EXCLUDED.category,
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(&entry.keyword)
        .bind(entry.category_id)
        .bind(&entry.category_name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }
}
