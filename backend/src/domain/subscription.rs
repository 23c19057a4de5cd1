//! Follow relation between users.

use super::recipe::RecipeSummary;
use super::user::User;

/// An author the requester follows, with a preview of their recipes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribedAuthor {
    /// The followed user.
    pub author: User,
    /// Newest first, possibly truncated by `recipes_limit`.
    pub recipes: Vec<RecipeSummary>,
    /// Total number of recipes by the author, regardless of truncation.
    pub recipes_count: u64,
}

/// Optional cap on the recipe preview in subscription listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecipesLimit(Option<u32>);

impl RecipesLimit {
    /// No cap on the preview.
    pub const fn unlimited() -> Self {
        Self(None)
    }

    /// Keep at most `limit` recipes.
    pub const fn at_most(limit: u32) -> Self {
        Self(Some(limit))
    }

    /// Lenient parse: anything that is not a non-negative integer means
    /// "no limit".
    ///
    /// # Examples
    /// ```
    /// use backend::domain::RecipesLimit;
    ///
    /// assert_eq!(RecipesLimit::parse_lenient(Some("2")).get(), Some(2));
    /// assert_eq!(RecipesLimit::parse_lenient(Some("two")).get(), None);
    /// assert_eq!(RecipesLimit::parse_lenient(None).get(), None);
    /// ```
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        Self(raw.and_then(|value| value.trim().parse::<u32>().ok()))
    }

    /// The cap, if any.
    pub const fn get(self) -> Option<u32> {
        self.0
    }
}
