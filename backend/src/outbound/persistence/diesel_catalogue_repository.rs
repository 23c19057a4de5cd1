//! PostgreSQL-backed tag and ingredient repositories.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{IngredientRepository, PersistenceError, TagRepository};
use crate::domain::{Ingredient, IngredientId, NewIngredient, NewTag, Tag, TagId};

use super::diesel_error_mapping::{collect_rows, map_diesel_error, map_pool_error};
use super::models::{IngredientRow, NewIngredientRow, NewTagRow, TagRow};
use super::pool::DbPool;
use super::row_mapping::{row_to_ingredient, row_to_tag};
use super::schema::{ingredients, tags};

/// Escape `LIKE` metacharacters so user input only ever matches literally.
pub(crate) fn like_prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for ch in prefix.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Diesel-backed implementation of the tag port.
#[derive(Clone)]
pub struct DieselTagRepository {
    pool: DbPool,
}

impl DieselTagRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TagRepository for DieselTagRepository {
    async fn list(&self) -> Result<Vec<Tag>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<TagRow> = tags::table
            .select(TagRow::as_select())
            .order_by((tags::name, tags::id))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows.into_iter().map(row_to_tag))
    }

    async fn find(&self, id: TagId) -> Result<Option<Tag>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TagRow> = tags::table
            .find(id.get())
            .select(TagRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(collect_rows(row.into_iter().map(row_to_tag))?.pop())
    }

    async fn find_many(&self, ids: &[TagId]) -> Result<Vec<Tag>, PersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let rows: Vec<TagRow> = tags::table
            .filter(tags::id.eq_any(raw))
            .select(TagRow::as_select())
            .order_by((tags::name, tags::id))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows.into_iter().map(row_to_tag))
    }

    async fn insert_missing(&self, new_tags: &[NewTag]) -> Result<u64, PersistenceError> {
        if new_tags.is_empty() {
            return Ok(0);
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<NewTagRow<'_>> = new_tags
            .iter()
            .map(|tag| NewTagRow {
                name: tag.name.as_str(),
                color: tag.color.as_ref(),
                slug: tag.slug.as_ref(),
            })
            .collect();
        let inserted = diesel::insert_into(tags::table)
            .values(&rows)
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted as u64)
    }
}

/// Diesel-backed implementation of the ingredient port.
#[derive(Clone)]
pub struct DieselIngredientRepository {
    pool: DbPool,
}

impl DieselIngredientRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IngredientRepository for DieselIngredientRepository {
    async fn search(&self, name_prefix: &str) -> Result<Vec<Ingredient>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = ingredients::table
            .select(IngredientRow::as_select())
            .order_by((ingredients::name, ingredients::measurement_unit))
            .into_boxed();
        if !name_prefix.is_empty() {
            query = query.filter(ingredients::name.ilike(like_prefix_pattern(name_prefix)));
        }
        let rows: Vec<IngredientRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_ingredient).collect())
    }

    async fn find(&self, id: IngredientId) -> Result<Option<Ingredient>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<IngredientRow> = ingredients::table
            .find(id.get())
            .select(IngredientRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_ingredient))
    }

    async fn find_many(&self, ids: &[IngredientId]) -> Result<Vec<Ingredient>, PersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let rows: Vec<IngredientRow> = ingredients::table
            .filter(ingredients::id.eq_any(raw))
            .select(IngredientRow::as_select())
            .order_by(ingredients::name)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_ingredient).collect())
    }

    async fn insert_missing(
        &self,
        new_ingredients: &[NewIngredient],
    ) -> Result<u64, PersistenceError> {
        if new_ingredients.is_empty() {
            return Ok(0);
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut inserted = 0_u64;
        // Postgres caps bind parameters per statement; the seed file is large.
        for chunk in new_ingredients.chunks(1_000) {
            let rows: Vec<NewIngredientRow<'_>> = chunk
                .iter()
                .map(|ingredient| NewIngredientRow {
                    name: ingredient.name.as_str(),
                    measurement_unit: ingredient.measurement_unit.as_str(),
                })
                .collect();
            let written = diesel::insert_into(ingredients::table)
                .values(&rows)
                .on_conflict_do_nothing()
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            inserted += written as u64;
        }
        Ok(inserted)
    }
}
