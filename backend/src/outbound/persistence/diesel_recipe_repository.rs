//! PostgreSQL-backed recipe repository.
//!
//! Reads load the page of recipe rows first and then hydrate authors, tags,
//! ingredients and the viewer's flags with one query each, keyed by the
//! recipe ids on the page.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageRequest};

use crate::domain::ports::{PersistenceError, RecipeOwnership, RecipeRepository};
use crate::domain::{
    Amount, AuthorRef, IngredientAmount, NewRecipe, Recipe, RecipeChanges, RecipeFilter,
    RecipeId, RecipeIngredient, RecipeSummary, Tag, TagId, User, UserId, UserProfile,
};

use super::diesel_error_mapping::{collect_rows, count_to_u64, map_diesel_error, map_pool_error};
use super::models::{
    IngredientRow, NewRecipeRow, RecipeIngredientRow, RecipeRow, RecipeSummaryRow, RecipeTagRow,
    RecipeUpdate, TagRow, UserRow,
};
use super::pool::DbPool;
use super::row_mapping::{
    offset_to_i64, row_to_cooking_time, row_to_ingredient, row_to_summary, row_to_tag,
    row_to_user,
};
use super::schema::{
    favorites, ingredients, recipe_ingredients, recipe_tags, recipes, shopping_carts,
    subscriptions, tags, users,
};

/// Diesel-backed implementation of the recipe port.
#[derive(Clone)]
pub struct DieselRecipeRepository {
    pool: DbPool,
}

impl DieselRecipeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn invalid_row(message: String) -> PersistenceError {
    PersistenceError::query(format!("invalid stored row: {message}"))
}

/// Build the filtered, unordered recipe query.
///
/// Boxed queries cannot be cloned, so the count and the page each call this.
fn filtered_recipes<'a>(
    filter: &'a RecipeFilter,
    viewer: Option<UserId>,
) -> recipes::BoxedQuery<'a, Pg> {
    let mut query = recipes::table.into_boxed();

    match &filter.author {
        Some(AuthorRef::Id(id)) => {
            query = query.filter(recipes::author_id.eq(id.get()));
        }
        Some(AuthorRef::Email(email)) => {
            query = query.filter(
                recipes::author_id.eq_any(
                    users::table
                        .filter(users::email.eq(email.as_ref()))
                        .select(users::id),
                ),
            );
        }
        None => {}
    }

    if !filter.tags.is_empty() {
        query = query.filter(
            recipes::id.eq_any(
                recipe_tags::table
                    .inner_join(tags::table)
                    .filter(tags::slug.eq_any(&filter.tags))
                    .select(recipe_tags::recipe_id),
            ),
        );
    }

    if let Some(viewer) = viewer {
        let favorited = favorites::table
            .filter(favorites::user_id.eq(viewer.get()))
            .select(favorites::recipe_id);
        query = match filter.is_favorited {
            Some(true) => query.filter(recipes::id.eq_any(favorited)),
            Some(false) => query.filter(recipes::id.ne_all(favorited)),
            None => query,
        };
        let in_cart = shopping_carts::table
            .filter(shopping_carts::user_id.eq(viewer.get()))
            .select(shopping_carts::recipe_id);
        query = match filter.is_in_shopping_cart {
            Some(true) => query.filter(recipes::id.eq_any(in_cart)),
            Some(false) => query.filter(recipes::id.ne_all(in_cart)),
            None => query,
        };
    }

    query
}

/// Attach authors, tags, ingredients and viewer flags to recipe rows,
/// preserving the row order.
async fn hydrate(
    conn: &mut AsyncPgConnection,
    rows: Vec<RecipeRow>,
    viewer: Option<UserId>,
) -> Result<Vec<Recipe>, PersistenceError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let recipe_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let mut author_ids: Vec<i64> = rows.iter().map(|row| row.author_id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();

    let author_rows: Vec<UserRow> = users::table
        .filter(users::id.eq_any(&author_ids))
        .select(UserRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    let authors: HashMap<i64, User> = collect_rows(author_rows.into_iter().map(row_to_user))?
        .into_iter()
        .map(|user| (user.id.get(), user))
        .collect();

    let tag_rows: Vec<(i64, TagRow)> = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq_any(&recipe_ids))
        .select((recipe_tags::recipe_id, TagRow::as_select()))
        .order_by((tags::name, tags::id))
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    let mut tags_by_recipe: HashMap<i64, Vec<Tag>> = HashMap::new();
    for (recipe_id, row) in tag_rows {
        let tag = row_to_tag(row).map_err(invalid_row)?;
        tags_by_recipe.entry(recipe_id).or_default().push(tag);
    }

    let ingredient_rows: Vec<(i64, i32, IngredientRow)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(&recipe_ids))
        .select((
            recipe_ingredients::recipe_id,
            recipe_ingredients::amount,
            IngredientRow::as_select(),
        ))
        .order_by((ingredients::name, ingredients::id))
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    let mut ingredients_by_recipe: HashMap<i64, Vec<RecipeIngredient>> = HashMap::new();
    for (recipe_id, amount, row) in ingredient_rows {
        ingredients_by_recipe
            .entry(recipe_id)
            .or_default()
            .push(RecipeIngredient {
                ingredient: row_to_ingredient(row),
                amount: Amount::from_stored(amount),
            });
    }

    let (subscribed, favorited, in_cart) = match viewer {
        Some(viewer) => (
            viewer_subscriptions(conn, viewer, &author_ids).await?,
            viewer_favorites(conn, viewer, &recipe_ids).await?,
            viewer_cart(conn, viewer, &recipe_ids).await?,
        ),
        None => (HashSet::new(), HashSet::new(), HashSet::new()),
    };

    rows.into_iter()
        .map(|row| {
            let user = authors
                .get(&row.author_id)
                .cloned()
                .ok_or_else(|| invalid_row(format!("recipe {} has no author", row.id)))?;
            Ok(Recipe {
                id: RecipeId::new(row.id),
                author: UserProfile {
                    is_subscribed: subscribed.contains(&row.author_id),
                    user,
                },
                name: row.name,
                text: row.text,
                image: row.image,
                cooking_time: row_to_cooking_time(row.cooking_time).map_err(invalid_row)?,
                pub_date: row.pub_date,
                tags: tags_by_recipe.remove(&row.id).unwrap_or_default(),
                ingredients: ingredients_by_recipe.remove(&row.id).unwrap_or_default(),
                is_favorited: favorited.contains(&row.id),
                is_in_shopping_cart: in_cart.contains(&row.id),
            })
        })
        .collect()
}

async fn viewer_subscriptions(
    conn: &mut AsyncPgConnection,
    viewer: UserId,
    author_ids: &[i64],
) -> Result<HashSet<i64>, PersistenceError> {
    let ids: Vec<i64> = subscriptions::table
        .filter(subscriptions::subscriber_id.eq(viewer.get()))
        .filter(subscriptions::author_id.eq_any(author_ids))
        .select(subscriptions::author_id)
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    Ok(ids.into_iter().collect())
}

async fn viewer_favorites(
    conn: &mut AsyncPgConnection,
    viewer: UserId,
    recipe_ids: &[i64],
) -> Result<HashSet<i64>, PersistenceError> {
    let ids: Vec<i64> = favorites::table
        .filter(favorites::user_id.eq(viewer.get()))
        .filter(favorites::recipe_id.eq_any(recipe_ids))
        .select(favorites::recipe_id)
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    Ok(ids.into_iter().collect())
}

async fn viewer_cart(
    conn: &mut AsyncPgConnection,
    viewer: UserId,
    recipe_ids: &[i64],
) -> Result<HashSet<i64>, PersistenceError> {
    let ids: Vec<i64> = shopping_carts::table
        .filter(shopping_carts::user_id.eq(viewer.get()))
        .filter(shopping_carts::recipe_id.eq_any(recipe_ids))
        .select(shopping_carts::recipe_id)
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    Ok(ids.into_iter().collect())
}

fn tag_rows(recipe_id: i64, tags: &[TagId]) -> Vec<RecipeTagRow> {
    tags.iter()
        .map(|tag| RecipeTagRow {
            recipe_id,
            tag_id: tag.get(),
        })
        .collect()
}

fn ingredient_rows(recipe_id: i64, items: &[IngredientAmount]) -> Vec<RecipeIngredientRow> {
    items
        .iter()
        .map(|item| RecipeIngredientRow {
            recipe_id,
            ingredient_id: item.ingredient.get(),
            amount: item.amount.get(),
        })
        .collect()
}

#[async_trait]
impl RecipeRepository for DieselRecipeRepository {
    async fn list(
        &self,
        filter: &RecipeFilter,
        viewer: Option<UserId>,
        page: &PageRequest,
    ) -> Result<Page<Recipe>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = filtered_recipes(filter, viewer)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<RecipeRow> = filtered_recipes(filter, viewer)
            .select(RecipeRow::as_select())
            .order_by((recipes::pub_date.desc(), recipes::id.desc()))
            .limit(i64::from(page.limit()))
            .offset(offset_to_i64(page.offset()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let items = hydrate(&mut conn, rows, viewer).await?;
        Ok(Page::new(items, count_to_u64(total)))
    }

    async fn find(
        &self,
        id: RecipeId,
        viewer: Option<UserId>,
    ) -> Result<Option<Recipe>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<RecipeRow> = recipes::table
            .find(id.get())
            .select(RecipeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let rows: Vec<RecipeRow> = row.into_iter().collect();
        Ok(hydrate(&mut conn, rows, viewer).await?.pop())
    }

    async fn find_summary(&self, id: RecipeId) -> Result<Option<RecipeSummary>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<RecipeSummaryRow> = recipes::table
            .find(id.get())
            .select(RecipeSummaryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| row_to_summary(row).map_err(invalid_row))
            .transpose()
    }

    async fn author_of(&self, id: RecipeId) -> Result<Option<RecipeOwnership>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<(i64, String)> = recipes::table
            .find(id.get())
            .select((recipes::author_id, recipes::image))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(|(author, image)| RecipeOwnership {
            author: UserId::new(author),
            image,
        }))
    }

    async fn create(&self, author: UserId, recipe: &NewRecipe) -> Result<RecipeId, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewRecipeRow {
            author_id: author.get(),
            name: recipe.name.as_str(),
            text: recipe.text.as_str(),
            image: recipe.image_path.as_str(),
            cooking_time: recipe.cooking_time.minutes(),
            pub_date: recipe.pub_date,
        };
        let id = conn
            .transaction(|conn| {
                async move {
                    let id: i64 = diesel::insert_into(recipes::table)
                        .values(&new_row)
                        .returning(recipes::id)
                        .get_result(conn)
                        .await?;
                    diesel::insert_into(recipe_tags::table)
                        .values(&tag_rows(id, &recipe.tags))
                        .execute(conn)
                        .await?;
                    diesel::insert_into(recipe_ingredients::table)
                        .values(&ingredient_rows(id, &recipe.ingredients))
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(id)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Ok(RecipeId::new(id))
    }

    async fn update(&self, id: RecipeId, changes: &RecipeChanges) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let recipe_id = id.get();
        let scalars = RecipeUpdate {
            name: changes.name.as_deref(),
            text: changes.text.as_deref(),
            image: changes.image_path.as_deref(),
            cooking_time: changes.cooking_time.map(|time| time.minutes()),
        };
        conn.transaction(|conn| {
            async move {
                // Lock the row so concurrent edits of the link tables serialise.
                let exists: Option<i64> = recipes::table
                    .find(recipe_id)
                    .select(recipes::id)
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;
                if exists.is_none() {
                    return Ok(false);
                }
                if !scalars.is_empty() {
                    diesel::update(recipes::table.find(recipe_id))
                        .set(&scalars)
                        .execute(conn)
                        .await?;
                }
                if let Some(tags) = &changes.tags {
                    diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe_id)))
                        .execute(conn)
                        .await?;
                    diesel::insert_into(recipe_tags::table)
                        .values(&tag_rows(recipe_id, tags))
                        .execute(conn)
                        .await?;
                }
                if let Some(items) = &changes.ingredients {
                    diesel::delete(
                        recipe_ingredients::table
                            .filter(recipe_ingredients::recipe_id.eq(recipe_id)),
                    )
                    .execute(conn)
                    .await?;
                    diesel::insert_into(recipe_ingredients::table)
                        .values(&ingredient_rows(recipe_id, items))
                        .execute(conn)
                        .await?;
                }
                Ok::<_, diesel::result::Error>(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn delete(&self, id: RecipeId) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(recipes::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn summaries_by_author(
        &self,
        author: UserId,
        limit: Option<u32>,
    ) -> Result<Vec<RecipeSummary>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = recipes::table
            .filter(recipes::author_id.eq(author.get()))
            .select(RecipeSummaryRow::as_select())
            .order_by((recipes::pub_date.desc(), recipes::id.desc()))
            .into_boxed();
        if let Some(limit) = limit {
            query = query.limit(i64::from(limit));
        }
        let rows: Vec<RecipeSummaryRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        collect_rows(rows.into_iter().map(row_to_summary))
    }

    async fn count_by_author(&self, author: UserId) -> Result<u64, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = recipes::table
            .filter(recipes::author_id.eq(author.get()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count_to_u64(total))
    }
}
