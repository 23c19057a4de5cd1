//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};

use crate::domain::ports::{PersistenceError, UserCredentials, UserRepository};
use crate::domain::{Email, NewUserProfile, PasswordHash, User, UserId};

use super::diesel_error_mapping::{collect_rows, count_to_u64, map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserCredentialsRow, UserRow};
use super::pool::DbPool;
use super::row_mapping::{offset_to_i64, row_to_user};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn convert(row: UserRow) -> Result<User, PersistenceError> {
    row_to_user(row).map_err(|message| PersistenceError::query(format!("invalid user row: {message}")))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(
        &self,
        profile: &NewUserProfile,
        password_hash: &PasswordHash,
    ) -> Result<User, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewUserRow {
            email: profile.email.as_ref(),
            username: profile.username.as_ref(),
            first_name: profile.first_name.as_ref(),
            last_name: profile.last_name.as_ref(),
            password_hash: password_hash.as_str(),
        };
        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert(row)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(convert).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(convert).transpose()
    }

    async fn find_credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserCredentials>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserCredentialsRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserCredentialsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| {
            Ok(UserCredentials {
                user: convert(row.user)?,
                password_hash: PasswordHash::from_stored(row.password_hash),
            })
        })
        .transpose()
    }

    async fn find_password_hash(
        &self,
        id: UserId,
    ) -> Result<Option<PasswordHash>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let hash: Option<String> = users::table
            .find(id.get())
            .select(users::password_hash)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(hash.map(PasswordHash::from_stored))
    }

    async fn list(&self, page: &PageRequest) -> Result<Page<User>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<UserRow> = users::table
            .select(UserRow::as_select())
            .order_by(users::id)
            .limit(i64::from(page.limit()))
            .offset(offset_to_i64(page.offset()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let items = collect_rows(rows.into_iter().map(row_to_user))?;
        Ok(Page::new(items, count_to_u64(total)))
    }

    async fn set_password(
        &self,
        id: UserId,
        password_hash: &PasswordHash,
    ) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.find(id.get()))
            .set(users::password_hash.eq(password_hash.as_str()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }
}
