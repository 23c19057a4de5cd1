//! Port for shopping-list aggregation.

use async_trait::async_trait;

use super::PersistenceError;
use crate::domain::{ShoppingListLine, UserId};

/// Cart aggregation query.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShoppingListRepository: Send + Sync {
    /// Sum ingredient amounts over every recipe in the user's cart, grouped by
    /// ingredient name and measurement unit.
    async fn aggregate(&self, user: UserId) -> Result<Vec<ShoppingListLine>, PersistenceError>;
}
