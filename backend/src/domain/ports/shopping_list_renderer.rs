//! Port for turning a shopping list into a downloadable file.

use super::define_port_error;
use crate::domain::{Error, ExportFormat, RenderedDocument, ShoppingList};

define_port_error! {
    /// Failures raised while rendering.
    pub enum RenderError {
        Encoding { message: String } => "failed to render shopping list: {message}",
    }
}

impl From<RenderError> for Error {
    fn from(value: RenderError) -> Self {
        Error::internal(value.to_string())
    }
}

/// Turns a shopping list into a downloadable document.
#[cfg_attr(test, mockall::automock)]
pub trait ShoppingListRenderer: Send + Sync {
    fn render(
        &self,
        list: &ShoppingList,
        format: ExportFormat,
    ) -> Result<RenderedDocument, RenderError>;
}
