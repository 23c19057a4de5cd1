//! PostgreSQL-backed follow relation.

use std::collections::HashSet;

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};

use crate::domain::ports::{PersistenceError, SubscriptionRepository};
use crate::domain::{User, UserId};

use super::diesel_error_mapping::{collect_rows, count_to_u64, map_diesel_error, map_pool_error};
use super::models::UserRow;
use super::pool::DbPool;
use super::row_mapping::{offset_to_i64, row_to_user};
use super::schema::{subscriptions, users};

/// Diesel-backed implementation of the subscription port.
///
/// The table's CHECK constraint rejects self-subscriptions; the service
/// refuses them before they reach the database.
#[derive(Clone)]
pub struct DieselSubscriptionRepository {
    pool: DbPool,
}

impl DieselSubscriptionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for DieselSubscriptionRepository {
    async fn subscribe(&self, subscriber: UserId, author: UserId) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted = diesel::insert_into(subscriptions::table)
            .values((
                subscriptions::subscriber_id.eq(subscriber.get()),
                subscriptions::author_id.eq(author.get()),
            ))
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted > 0)
    }

    async fn unsubscribe(
        &self,
        subscriber: UserId,
        author: UserId,
    ) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(subscriptions::table.find((subscriber.get(), author.get())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn is_subscribed(
        &self,
        subscriber: UserId,
        author: UserId,
    ) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(
            subscriptions::table.find((subscriber.get(), author.get())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn subscribed_among(
        &self,
        subscriber: UserId,
        authors: &[UserId],
    ) -> Result<HashSet<UserId>, PersistenceError> {
        if authors.is_empty() {
            return Ok(HashSet::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let raw: Vec<i64> = authors.iter().map(|id| id.get()).collect();
        let ids: Vec<i64> = subscriptions::table
            .filter(subscriptions::subscriber_id.eq(subscriber.get()))
            .filter(subscriptions::author_id.eq_any(raw))
            .select(subscriptions::author_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(ids.into_iter().map(UserId::new).collect())
    }

    async fn list_authors(
        &self,
        subscriber: UserId,
        page: &PageRequest,
    ) -> Result<Page<User>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = subscriptions::table
            .filter(subscriptions::subscriber_id.eq(subscriber.get()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<UserRow> = users::table
            .inner_join(subscriptions::table.on(subscriptions::author_id.eq(users::id)))
            .filter(subscriptions::subscriber_id.eq(subscriber.get()))
            .select(UserRow::as_select())
            .order_by((users::email, users::id))
            .limit(i64::from(page.limit()))
            .offset(offset_to_i64(page.offset()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let items = collect_rows(rows.into_iter().map(row_to_user))?;
        Ok(Page::new(items, count_to_u64(total)))
    }
}
