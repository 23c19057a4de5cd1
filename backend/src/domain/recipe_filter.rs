//! Recipe list filtering and the favourite / shopping-cart relation selector.

use std::fmt;
use std::str::FromStr;

use super::user::{Email, UserId};

/// Which per-user recipe relation an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkKind {
    Favorite,
    ShoppingCart,
}

impl MarkKind {
    /// Human label used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Favorite => "favorites",
            Self::ShoppingCart => "shopping cart",
        }
    }
}

impl fmt::Display for MarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Author selector: numeric id or e-mail address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorRef {
    Id(UserId),
    Email(Email),
}

/// Raised when a filter query value cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{parameter} has an invalid value")]
pub struct FilterValueError {
    pub parameter: &'static str,
}

impl AuthorRef {
    /// Interpret an `author` query value.
    pub fn parse(raw: &str) -> Result<Self, FilterValueError> {
        let invalid = FilterValueError { parameter: "author" };
        let trimmed = raw.trim();
        if trimmed.contains('@') {
            return Email::new(trimmed).map(Self::Email).map_err(|_| invalid);
        }
        trimmed
            .parse::<i64>()
            .map(|id| Self::Id(UserId::new(id)))
            .map_err(|_| invalid)
    }
}

/// `1|true` or `0|false` flag from the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryFlag(bool);

impl QueryFlag {
    /// The parsed flag.
    pub fn get(self) -> bool {
        self.0
    }
}

impl FromStr for QueryFlag {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" => Ok(Self(true)),
            "0" | "false" => Ok(Self(false)),
            _ => Err(()),
        }
    }
}

/// Conjunction of optional recipe list constraints.
///
/// `tags` match when a recipe carries any of the slugs. The mark flags are
/// only meaningful for an authenticated viewer and are ignored otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub author: Option<AuthorRef>,
    pub tags: Vec<String>,
    pub is_favorited: Option<bool>,
    pub is_in_shopping_cart: Option<bool>,
}

impl RecipeFilter {
    /// Drop the viewer-dependent constraints for anonymous requests.
    pub fn for_viewer(mut self, viewer: Option<UserId>) -> Self {
        if viewer.is_none() {
            self.is_favorited = None;
            self.is_in_shopping_cart = None;
        }
        self
    }

    /// Required state of the given mark, if constrained.
    pub fn mark(&self, kind: MarkKind) -> Option<bool> {
        match kind {
            MarkKind::Favorite => self.is_favorited,
            MarkKind::ShoppingCart => self.is_in_shopping_cart,
        }
    }

    /// Build a filter from decoded query pairs.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::RecipeFilter;
    ///
    /// let pairs = [("tags", "lunch"), ("tags", "dinner"), ("is_favorited", "1")];
    /// let filter = RecipeFilter::from_query_pairs(pairs).expect("valid filter");
    /// assert_eq!(filter.tags, vec!["lunch", "dinner"]);
    /// assert_eq!(filter.is_favorited, Some(true));
    /// ```
    pub fn from_query_pairs<'a, I>(pairs: I) -> Result<Self, FilterValueError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut filter = Self::default();
        for (key, value) in pairs {
            match key {
                "author" if !value.trim().is_empty() => {
                    filter.author = Some(AuthorRef::parse(value)?);
                }
                "tags" if !value.trim().is_empty() => filter.tags.push(value.trim().to_owned()),
                "is_favorited" => {
                    filter.is_favorited = Some(parse_flag("is_favorited", value)?);
                }
                "is_in_shopping_cart" => {
                    filter.is_in_shopping_cart = Some(parse_flag("is_in_shopping_cart", value)?);
                }
                _ => {}
            }
        }
        Ok(filter)
    }
}

fn parse_flag(parameter: &'static str, value: &str) -> Result<bool, FilterValueError> {
    value
        .parse::<QueryFlag>()
        .map(QueryFlag::get)
        .map_err(|()| FilterValueError { parameter })
}
