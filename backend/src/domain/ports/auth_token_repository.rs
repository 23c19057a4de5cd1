//! Port for API token storage. Only digests are ever stored.

use async_trait::async_trait;

use super::PersistenceError;
use crate::domain::{TokenDigest, User, UserId};

/// Storage for API token digests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthTokenRepository: Send + Sync {
    /// Store the digest as the user's only token, replacing any previous one.
    async fn store(&self, user: UserId, digest: &TokenDigest) -> Result<(), PersistenceError>;

    /// Resolve a digest to its owner.
    async fn find_user(&self, digest: &TokenDigest) -> Result<Option<User>, PersistenceError>;

    /// Delete the user's token; `false` when none existed.
    async fn revoke(&self, user: UserId) -> Result<bool, PersistenceError>;
}
