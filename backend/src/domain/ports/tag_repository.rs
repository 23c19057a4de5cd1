//! Port for tag reads and bulk import.

use async_trait::async_trait;

use super::PersistenceError;
use crate::domain::{NewTag, Tag, TagId};

/// Tag reads and bulk import.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// All tags ordered by name.
    async fn list(&self) -> Result<Vec<Tag>, PersistenceError>;

    async fn find(&self, id: TagId) -> Result<Option<Tag>, PersistenceError>;

    /// Tags whose ids are in `ids`; unknown ids are silently absent.
    async fn find_many(&self, ids: &[TagId]) -> Result<Vec<Tag>, PersistenceError>;

    /// Insert tags whose slug is not stored yet; returns how many were added.
    async fn insert_missing(&self, tags: &[NewTag]) -> Result<u64, PersistenceError>;
}
