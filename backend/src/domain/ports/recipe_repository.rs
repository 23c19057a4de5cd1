//! Port for recipe persistence.
//!
//! Read methods take the viewer so adapters can fill in the per-user flags
//! (`is_favorited`, `is_in_shopping_cart`, the author's `is_subscribed`) in
//! the same round trip.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use super::PersistenceError;
use crate::domain::{
    NewRecipe, Recipe, RecipeChanges, RecipeFilter, RecipeId, RecipeSummary, UserId,
};

/// Who owns a recipe and where its picture lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeOwnership {
    pub author: UserId,
    pub image: String,
}

/// Recipe reads and writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Newest first. Mark constraints in `filter` apply to `viewer`.
    async fn list(
        &self,
        filter: &RecipeFilter,
        viewer: Option<UserId>,
        page: &PageRequest,
    ) -> Result<Page<Recipe>, PersistenceError>;

    async fn find(
        &self,
        id: RecipeId,
        viewer: Option<UserId>,
    ) -> Result<Option<Recipe>, PersistenceError>;

    async fn find_summary(&self, id: RecipeId) -> Result<Option<RecipeSummary>, PersistenceError>;

    async fn author_of(&self, id: RecipeId) -> Result<Option<RecipeOwnership>, PersistenceError>;

    /// Insert the recipe with its tag and ingredient links atomically.
    async fn create(&self, author: UserId, recipe: &NewRecipe) -> Result<RecipeId, PersistenceError>;

    /// Apply changes atomically; `false` when the recipe does not exist.
    async fn update(&self, id: RecipeId, changes: &RecipeChanges) -> Result<bool, PersistenceError>;

    async fn delete(&self, id: RecipeId) -> Result<bool, PersistenceError>;

    /// Newest first, at most `limit` entries when given.
    async fn summaries_by_author(
        &self,
        author: UserId,
        limit: Option<u32>,
    ) -> Result<Vec<RecipeSummary>, PersistenceError>;

    async fn count_by_author(&self, author: UserId) -> Result<u64, PersistenceError>;
}
