//! Port for account persistence.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use super::PersistenceError;
use crate::domain::{Email, NewUserProfile, PasswordHash, User, UserId};

/// A user together with their stored password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: PasswordHash,
}

/// User accounts and password hashes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account. A taken e-mail yields [`PersistenceError::Conflict`].
    async fn create(
        &self,
        profile: &NewUserProfile,
        password_hash: &PasswordHash,
    ) -> Result<User, PersistenceError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, PersistenceError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, PersistenceError>;

    async fn find_credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserCredentials>, PersistenceError>;

    async fn find_password_hash(
        &self,
        id: UserId,
    ) -> Result<Option<PasswordHash>, PersistenceError>;

    /// Users ordered by id.
    async fn list(&self, page: &PageRequest) -> Result<Page<User>, PersistenceError>;

    /// Replace the stored hash; returns `false` when the user does not exist.
    async fn set_password(
        &self,
        id: UserId,
        password_hash: &PasswordHash,
    ) -> Result<bool, PersistenceError>;
}
