//! PostgreSQL-backed favourites and shopping-cart relations.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PersistenceError, RecipeMarkRepository};
use crate::domain::{MarkKind, RecipeId, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::pool::DbPool;
use super::schema::{favorites, shopping_carts};

/// Diesel-backed implementation of the recipe mark port.
///
/// Both relations share the `(user_id, recipe_id)` primary key, so a
/// concurrent duplicate insert is absorbed by `ON CONFLICT DO NOTHING`.
#[derive(Clone)]
pub struct DieselRecipeMarkRepository {
    pool: DbPool,
}

impl DieselRecipeMarkRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipeMarkRepository for DieselRecipeMarkRepository {
    async fn add(
        &self,
        kind: MarkKind,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted = match kind {
            MarkKind::Favorite => {
                diesel::insert_into(favorites::table)
                    .values((
                        favorites::user_id.eq(user.get()),
                        favorites::recipe_id.eq(recipe.get()),
                    ))
                    .on_conflict_do_nothing()
                    .execute(&mut conn)
                    .await
            }
            MarkKind::ShoppingCart => {
                diesel::insert_into(shopping_carts::table)
                    .values((
                        shopping_carts::user_id.eq(user.get()),
                        shopping_carts::recipe_id.eq(recipe.get()),
                    ))
                    .on_conflict_do_nothing()
                    .execute(&mut conn)
                    .await
            }
        }
        .map_err(map_diesel_error)?;
        Ok(inserted > 0)
    }

    async fn remove(
        &self,
        kind: MarkKind,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = match kind {
            MarkKind::Favorite => {
                diesel::delete(favorites::table.find((user.get(), recipe.get())))
                    .execute(&mut conn)
                    .await
            }
            MarkKind::ShoppingCart => {
                diesel::delete(shopping_carts::table.find((user.get(), recipe.get())))
                    .execute(&mut conn)
                    .await
            }
        }
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
