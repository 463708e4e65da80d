//! Category catalog repository implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::info;

use pantry_core::defaults::CATEGORY_NAME_MAX_LEN;
use pantry_core::{Category, CategoryId, CategoryRepository, Error, NewCategory, Result};

/// Validate a category name.
///
/// Rules:
/// - Not empty after trimming
/// - At most [`CATEGORY_NAME_MAX_LEN`] characters
pub fn validate_category_name(name: &str) -> std::result::Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Category name cannot be empty".to_string());
    }
    if name.chars().count() > CATEGORY_NAME_MAX_LEN {
        return Err(format!(
            "Category name must be {} characters or less",
            CATEGORY_NAME_MAX_LEN
        ));
    }
    Ok(())
}

fn category_from_row(row: &PgRow) -> Category {
    Category {
        id: CategoryId(row.get("id")),
        name: row.get("name"),
        keywords: row.get("keywords"),
    }
}

/// Map a unique-index violation on the name to `InvalidInput`.
fn map_insert_error(name: &str, e: sqlx::Error) -> Error {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Error::InvalidInput(format!("Category '{}' already exists", name))
        }
        _ => Error::Database(e),
    }
}

/// PostgreSQL implementation of CategoryRepository.
#[derive(Clone)]
pub struct PgCategoryRepository {
    pool: Pool<Postgres>,
}

impl PgCategoryRepository {
    /// Create a new PgCategoryRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Delete a category. Cache entries and resources referencing it are
    /// nulled by the schema's `ON DELETE SET NULL`.
    pub async fn delete_category(&self, id: CategoryId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM resource_categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name, keywords FROM resource_categories ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.iter().map(category_from_row).collect())
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        let row = sqlx::query(
            "SELECT id, name, keywords FROM resource_categories
             WHERE LOWER(name) = LOWER($1) LIMIT 1",
        )
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(category_from_row))
    }

    async fn find_category_by_id(&self, id: CategoryId) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT id, name, keywords FROM resource_categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.as_ref().map(category_from_row))
    }

    async fn create_category(&self, category: NewCategory) -> Result<Category> {
        validate_category_name(&category.name).map_err(Error::InvalidInput)?;
        let category = category.normalized();

        let row = sqlx::query(
            "INSERT INTO resource_categories (name, keywords) VALUES ($1, $2)
             RETURNING id, name, keywords",
        )
        .bind(&category.name)
        .bind(&category.keywords)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(&category.name, e))?;

        Ok(category_from_row(&row))
    }

    async fn seed_if_empty(&self, defaults: &[NewCategory]) -> Result<usize> {
        for category in defaults {
            validate_category_name(&category.name).map_err(Error::InvalidInput)?;
        }

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // Serialize concurrent seeders; readers are not blocked.
        sqlx::query("LOCK TABLE resource_categories IN EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM resource_categories")
            .fetch_one(&mut *tx)
            .await
            .map_err(Error::Database)?;

        if existing > 0 {
            tx.rollback().await.map_err(Error::Database)?;
            return Ok(0);
        }

        for category in defaults.iter().map(NewCategory::normalized) {
            sqlx::query("INSERT INTO resource_categories (name, keywords) VALUES ($1, $2)")
                .bind(&category.name)
                .bind(&category.keywords)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_insert_error(&category.name, e))?;
        }

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "categories",
            op = "seed",
            inserted = defaults.len(),
            "Seeded empty category catalog"
        );
        Ok(defaults.len())
    }
}
