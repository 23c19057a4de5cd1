//! Shopping-list export.

use std::sync::Arc;

use tracing::debug;

use super::ports::{ShoppingListRenderer, ShoppingListRepository};
use super::{Error, ExportFormat, RenderedDocument, ShoppingList, UserId};

/// Builds and renders a user's shopping list.
#[derive(Clone)]
pub struct ShoppingListService {
    lines: Arc<dyn ShoppingListRepository>,
    renderer: Arc<dyn ShoppingListRenderer>,
}

impl ShoppingListService {
    /// `lines` aggregates the cart; `renderer` produces the download.
    pub fn new(
        lines: Arc<dyn ShoppingListRepository>,
        renderer: Arc<dyn ShoppingListRenderer>,
    ) -> Self {
        Self { lines, renderer }
    }

    /// Aggregate the user's cart and render it. An empty cart still yields a
    /// document with just the title.
    pub async fn download(
        &self,
        user: UserId,
        format: ExportFormat,
    ) -> Result<RenderedDocument, Error> {
        let list = ShoppingList::new(self.lines.aggregate(user).await?);
        debug!(user_id = %user, lines = list.lines().len(), ?format, "rendering shopping list");
        Ok(self.renderer.render(&list, format)?)
    }
}
