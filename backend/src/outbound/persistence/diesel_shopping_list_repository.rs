//! PostgreSQL-backed shopping-list aggregation.

use async_trait::async_trait;
use diesel::dsl::sum;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PersistenceError, ShoppingListRepository};
use crate::domain::{ShoppingListLine, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::pool::DbPool;
use super::schema::{ingredients, recipe_ingredients, shopping_carts};

/// Sums ingredient amounts over every recipe in a user's cart.
#[derive(Clone)]
pub struct DieselShoppingListRepository {
    pool: DbPool,
}

impl DieselShoppingListRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShoppingListRepository for DieselShoppingListRepository {
    async fn aggregate(&self, user: UserId) -> Result<Vec<ShoppingListLine>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(String, String, Option<i64>)> = shopping_carts::table
            .inner_join(
                recipe_ingredients::table
                    .on(recipe_ingredients::recipe_id.eq(shopping_carts::recipe_id)),
            )
            .inner_join(ingredients::table.on(ingredients::id.eq(recipe_ingredients::ingredient_id)))
            .filter(shopping_carts::user_id.eq(user.get()))
            .group_by((ingredients::name, ingredients::measurement_unit))
            .select((
                ingredients::name,
                ingredients::measurement_unit,
                sum(recipe_ingredients::amount),
            ))
            .order_by((ingredients::name, ingredients::measurement_unit))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(name, measurement_unit, total)| ShoppingListLine {
                name,
                measurement_unit,
                total_amount: total.unwrap_or_default(),
            })
            .collect())
    }
}
