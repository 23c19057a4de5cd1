//! Port for the follow relation.

use std::collections::HashSet;

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use super::PersistenceError;
use crate::domain::{User, UserId};

/// Follow relation between users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// `false` when the pair already existed.
    async fn subscribe(&self, subscriber: UserId, author: UserId) -> Result<bool, PersistenceError>;

    /// `true` when a row was removed.
    async fn unsubscribe(&self, subscriber: UserId, author: UserId)
    -> Result<bool, PersistenceError>;

    async fn is_subscribed(
        &self,
        subscriber: UserId,
        author: UserId,
    ) -> Result<bool, PersistenceError>;

    /// Subset of `authors` that `subscriber` follows.
    async fn subscribed_among(
        &self,
        subscriber: UserId,
        authors: &[UserId],
    ) -> Result<HashSet<UserId>, PersistenceError>;

    /// Followed authors ordered by e-mail.
    async fn list_authors(
        &self,
        subscriber: UserId,
        page: &PageRequest,
    ) -> Result<Page<User>, PersistenceError>;
}
