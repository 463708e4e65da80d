//! Shopping-list item flows that drive categorization.
//!
//! New items are categorized before insertion; manual category changes are
//! fed back as corrections. Categorization never fails these writes.

use std::sync::Arc;

use tracing::{debug, instrument};

use pantry_core::{
    Error, NewResource, Resource, ResourcePatch, ResourceRepository, ResourceView, Result,
};

use crate::categorizer::Categorizer;

/// Result of [`ItemService::update_resource`].
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The patch was applied.
    Updated(Resource),
    /// The patch was empty; nothing was written.
    Unchanged,
    /// No resource with that id exists in the project.
    NotFound,
}

/// Adds and edits shopping-list resources.
#[derive(Clone)]
pub struct ItemService {
    resources: Arc<dyn ResourceRepository>,
    categorizer: Arc<Categorizer>,
}

impl ItemService {
    pub fn new(resources: Arc<dyn ResourceRepository>, categorizer: Arc<Categorizer>) -> Self {
        Self {
            resources,
            categorizer,
        }
    }

    /// Add an item to a project's shopping list, categorizing it first.
    ///
    /// Fails with [`Error::InvalidInput`] for a blank name. Quantities below
    /// one are stored as one.
    #[instrument(
        skip(self, name),
        fields(subsystem = "categorize", component = "items", op = "add_resource")
    )]
    pub async fn add_resource(
        &self,
        project_id: i64,
        name: &str,
        quantity: i32,
    ) -> Result<Resource> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput(
                "Resource name cannot be empty".to_string(),
            ));
        }

        let category_id = self.categorizer.resolve_category_id(name).await;
        let resource = self
            .resources
            .insert_resource(NewResource {
                project_id,
                name: name.to_string(),
                quantity,
                category_id,
            })
            .await?;

        debug!(
            resource_id = resource.id,
            category_id = ?resource.category_id,
            "Resource added"
        );
        Ok(resource)
    }

    /// Apply a patch to a resource.
    ///
    /// Setting a category records a correction for the resource's name.
    #[instrument(
        skip(self, patch),
        fields(subsystem = "categorize", component = "items", op = "update_resource")
    )]
    pub async fn update_resource(
        &self,
        project_id: i64,
        resource_id: i64,
        patch: ResourcePatch,
    ) -> Result<UpdateOutcome> {
        if patch.is_empty() {
            return Ok(UpdateOutcome::Unchanged);
        }

        let Some(resource) = self
            .resources
            .update_resource(project_id, resource_id, &patch)
            .await?
        else {
            return Ok(UpdateOutcome::NotFound);
        };

        if let Some(category_id) = patch.category_id {
            self.categorizer
                .record_correction(&resource.name, category_id)
                .await;
        }
        Ok(UpdateOutcome::Updated(resource))
    }

    /// A project's resources with category names attached.
    pub async fn list_resources(&self, project_id: i64) -> Result<Vec<ResourceView>> {
        self.resources.list_resources(project_id).await
    }
}
