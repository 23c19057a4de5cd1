//! PostgreSQL-backed API token store. Only SHA-256 digests are persisted.

use async_trait::async_trait;
use diesel::dsl::now;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AuthTokenRepository, PersistenceError};
use crate::domain::{TokenDigest, User, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewAuthTokenRow, UserRow};
use super::pool::DbPool;
use super::row_mapping::row_to_user;
use super::schema::{auth_tokens, users};

/// Diesel-backed implementation of the auth token port.
#[derive(Clone)]
pub struct DieselAuthTokenRepository {
    pool: DbPool,
}

impl DieselAuthTokenRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthTokenRepository for DieselAuthTokenRepository {
    async fn store(&self, user: UserId, digest: &TokenDigest) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // One token per user: a new login replaces the previous digest.
        diesel::insert_into(auth_tokens::table)
            .values(&NewAuthTokenRow {
                user_id: user.get(),
                key_digest: digest.as_str(),
            })
            .on_conflict(auth_tokens::user_id)
            .do_update()
            .set((
                auth_tokens::key_digest.eq(excluded(auth_tokens::key_digest)),
                auth_tokens::created_at.eq(now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find_user(&self, digest: &TokenDigest) -> Result<Option<User>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = auth_tokens::table
            .inner_join(users::table)
            .filter(auth_tokens::key_digest.eq(digest.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| {
            row_to_user(row).map_err(|message| {
                PersistenceError::query(format!("invalid user row: {message}"))
            })
        })
        .transpose()
    }

    async fn revoke(&self, user: UserId) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(auth_tokens::table.find(user.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
