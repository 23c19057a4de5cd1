//! Read access to tags and ingredients, plus the seed import used by the
//! `load-data` binary.

use std::sync::Arc;

use tracing::info;

use super::ports::{IngredientRepository, TagRepository};
use super::{Error, Ingredient, IngredientId, NewIngredient, NewTag, Tag, TagId};

/// Rows written by [`CatalogueService::import`]; rows already present are
/// not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub tags: u64,
    pub ingredients: u64,
}

/// Read access to tags and ingredients, plus seed import.
#[derive(Clone)]
pub struct CatalogueService {
    tags: Arc<dyn TagRepository>,
    ingredients: Arc<dyn IngredientRepository>,
}

impl CatalogueService {
    /// Build the service from the catalogue repositories.
    pub fn new(tags: Arc<dyn TagRepository>, ingredients: Arc<dyn IngredientRepository>) -> Self {
        Self { tags, ingredients }
    }

    /// All tags ordered by name.
    pub async fn list_tags(&self) -> Result<Vec<Tag>, Error> {
        Ok(self.tags.list().await?)
    }

    /// One tag; 404 when missing.
    pub async fn get_tag(&self, id: TagId) -> Result<Tag, Error> {
        self.tags
            .find(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("tag {id} not found")))
    }

    /// Case-insensitive prefix search; a blank query lists everything.
    pub async fn search_ingredients(&self, name: Option<&str>) -> Result<Vec<Ingredient>, Error> {
        let prefix = name.map(str::trim).unwrap_or_default();
        Ok(self.ingredients.search(prefix).await?)
    }

    /// One ingredient; 404 when missing.
    pub async fn get_ingredient(&self, id: IngredientId) -> Result<Ingredient, Error> {
        self.ingredients
            .find(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("ingredient {id} not found")))
    }

    /// Insert seed tags and ingredients, skipping existing ones.
    pub async fn import(
        &self,
        tags: &[NewTag],
        ingredients: &[NewIngredient],
    ) -> Result<ImportSummary, Error> {
        let summary = ImportSummary {
            tags: self.tags.insert_missing(tags).await?,
            ingredients: self.ingredients.insert_missing(ingredients).await?,
        };
        info!(
            tags = summary.tags,
            ingredients = summary.ingredients,
            "catalogue import finished"
        );
        Ok(summary)
    }
}
