//! Port for ingredient reads and bulk import.

use async_trait::async_trait;

use super::PersistenceError;
use crate::domain::{Ingredient, IngredientId, NewIngredient};

/// Ingredient catalogue reads and bulk import.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IngredientRepository: Send + Sync {
    /// Ingredients whose name starts with `name_prefix`, ignoring case,
    /// ordered by name. An empty prefix returns everything.
    async fn search(&self, name_prefix: &str) -> Result<Vec<Ingredient>, PersistenceError>;

    async fn find(&self, id: IngredientId) -> Result<Option<Ingredient>, PersistenceError>;

    async fn find_many(&self, ids: &[IngredientId]) -> Result<Vec<Ingredient>, PersistenceError>;

    /// Insert ingredients whose `(name, unit)` pair is not stored yet.
    async fn insert_missing(
        &self,
        ingredients: &[NewIngredient],
    ) -> Result<u64, PersistenceError>;
}
