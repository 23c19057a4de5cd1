//! Shopping-list exporters.
//!
//! [`ShoppingListDocuments`] dispatches on [`ExportFormat`] to the plain-text
//! or PDF writer. Both are pure functions over the aggregated list; the PDF
//! embeds a Unicode TrueType font.

mod pdf;
mod text;

use crate::domain::ports::{RenderError, ShoppingListRenderer};
use crate::domain::{ExportFormat, RenderedDocument, ShoppingList};

/// Base name of the downloaded file; the extension follows the format.
pub const SHOPPING_LIST_FILE_STEM: &str = "shopping_list";

/// Renderer supporting every [`ExportFormat`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ShoppingListDocuments;

impl ShoppingListRenderer for ShoppingListDocuments {
    fn render(
        &self,
        list: &ShoppingList,
        format: ExportFormat,
    ) -> Result<RenderedDocument, RenderError> {
        let (content_type, bytes) = match format {
            ExportFormat::Txt => ("text/plain; charset=utf-8", text::render(list)),
            ExportFormat::Pdf => ("application/pdf", pdf::render(list)?),
        };
        Ok(RenderedDocument {
            content_type,
            file_name: format!("{SHOPPING_LIST_FILE_STEM}.{}", format.extension()),
            bytes,
        })
    }
}
