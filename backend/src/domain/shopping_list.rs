//! Aggregated shopping list built from a user's cart.

use std::fmt;
use std::str::FromStr;

/// Title printed above the lines in every export format.
pub const SHOPPING_LIST_TITLE: &str = "Shopping list";

/// Total quantity of one ingredient across every recipe in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListLine {
    /// Ingredient name.
    pub name: String,
    /// Unit the amounts are expressed in.
    pub measurement_unit: String,
    /// Sum of the amounts across the cart.
    pub total_amount: i64,
}

impl fmt::Display for ShoppingListLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} {}",
            self.name, self.total_amount, self.measurement_unit
        )
    }
}

/// Lines ordered by ingredient name, then unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShoppingList {
    lines: Vec<ShoppingListLine>,
}

impl ShoppingList {
    /// Wrap lines, restoring the canonical order.
    pub fn new(mut lines: Vec<ShoppingListLine>) -> Self {
        lines.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.measurement_unit.cmp(&b.measurement_unit))
        });
        Self { lines }
    }

    /// Lines in name, then unit order.
    pub fn lines(&self) -> &[ShoppingListLine] {
        &self.lines
    }

    /// True when the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Download format selected with `?format=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Plain UTF-8 text.
    Txt,
    /// PDF document; the default.
    #[default]
    Pdf,
}

impl ExportFormat {
    /// File extension used in the download name.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Pdf => "pdf",
        }
    }
}

/// Raised for an unsupported `format` value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported format `{0}`; use pdf or txt")]
pub struct UnknownExportFormat(pub String);

impl FromStr for ExportFormat {
    type Err = UnknownExportFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" => Ok(Self::Txt),
            "pdf" => Ok(Self::Pdf),
            other => Err(UnknownExportFormat(other.to_owned())),
        }
    }
}

/// A rendered file ready to be sent as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub content_type: &'static str,
    pub file_name: String,
    pub bytes: Vec<u8>,
}
