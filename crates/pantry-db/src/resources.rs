//! Shopping-list resource repository implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};

use pantry_core::{
    clamp_quantity, CategoryId, Error, NewResource, Resource, ResourcePatch, ResourceRepository,
    ResourceView, Result,
};

fn resource_from_row(row: &PgRow) -> Resource {
    Resource {
        id: row.get("id"),
        project_id: row.get("project_id"),
        name: row.get("name"),
        quantity: row.get("quantity"),
        purchased: row.get("purchased"),
        category_id: row.get::<Option<i64>, _>("category_id").map(CategoryId),
    }
}

/// PostgreSQL implementation of ResourceRepository.
#[derive(Clone)]
pub struct PgResourceRepository {
    pool: Pool<Postgres>,
}

impl PgResourceRepository {
    /// Create a new PgResourceRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceRepository for PgResourceRepository {
    async fn insert_resource(&self, resource: NewResource) -> Result<Resource> {
        let row = sqlx::query(
            "INSERT INTO resources (project_id, name, quantity, purchased, category_id)
             VALUES ($1, $2, $3, FALSE, $4)
             RETURNING id, project_id, name, quantity, purchased, category_id",
        )
        .bind(resource.project_id)
        .bind(&resource.name)
        .bind(clamp_quantity(resource.quantity))
        .bind(resource.category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(resource_from_row(&row))
    }

    async fn update_resource(
        &self,
        project_id: i64,
        resource_id: i64,
        patch: &ResourcePatch,
    ) -> Result<Option<Resource>> {
        // COALESCE keeps columns the patch leaves untouched.
        let row = sqlx::query(
            "UPDATE resources
             SET purchased = COALESCE($3, purchased),
                 quantity = COALESCE($4, quantity),
                 category_id = COALESCE($5, category_id)
             WHERE id = $1 AND project_id = $2
             RETURNING id, project_id, name, quantity, purchased, category_id",
        )
        .bind(resource_id)
        .bind(project_id)
        .bind(patch.purchased)
        .bind(patch.quantity.map(clamp_quantity))
        .bind(patch.category_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(resource_from_row))
    }

    async fn list_resources(&self, project_id: i64) -> Result<Vec<ResourceView>> {
        let rows = sqlx::query(
            "SELECT r.id, r.project_id, r.name, r.quantity, r.purchased, r.category_id,
                    c.name AS category
             FROM resources r
             LEFT JOIN resource_categories c ON c.id = r.category_id
             WHERE r.project_id = $1
             ORDER BY r.id",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .iter()
            .map(|row| ResourceView {
                resource: resource_from_row(row),
                category: row.get("category"),
            })
            .collect())
    }
}
