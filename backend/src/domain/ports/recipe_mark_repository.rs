//! Port for the favourite and shopping-cart relations.

use async_trait::async_trait;

use super::PersistenceError;
use crate::domain::{MarkKind, RecipeId, UserId};

/// Favourite and shopping-cart rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeMarkRepository: Send + Sync {
    /// Get-or-create; `true` only when a new row was written. A concurrent
    /// insert of the same pair counts as already present.
    async fn add(
        &self,
        kind: MarkKind,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<bool, PersistenceError>;

    /// `true` when a row was removed.
    async fn remove(
        &self,
        kind: MarkKind,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<bool, PersistenceError>;
}
