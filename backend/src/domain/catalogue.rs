//! Tags and ingredients: the read-mostly reference data recipes point at.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Longest accepted tag name, tag slug, ingredient name or unit.
pub const CATALOGUE_TEXT_MAX: usize = 200;

/// Validation failures for catalogue rows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogueValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("color must be a hex colour such as #E26C2D")]
    InvalidColor,
    #[error("slug may contain only latin letters, digits, hyphens and underscores")]
    InvalidSlug,
}

impl CatalogueValidationError {
    /// Payload field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field } | Self::TooLong { field, .. } => field,
            Self::InvalidColor => "color",
            Self::InvalidSlug => "slug",
        }
    }
}

fn bounded_text(field: &'static str, raw: &str) -> Result<String, CatalogueValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CatalogueValidationError::Empty { field });
    }
    if trimmed.chars().count() > CATALOGUE_TEXT_MAX {
        return Err(CatalogueValidationError::TooLong {
            field,
            max: CATALOGUE_TEXT_MAX,
        });
    }
    Ok(trimmed.to_owned())
}

macro_rules! catalogue_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw database id.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Raw database id.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

catalogue_id!(
    /// Database identifier of a tag.
    TagId
);
catalogue_id!(
    /// Database identifier of an ingredient.
    IngredientId
);

/// `#RRGGBB` colour, stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HexColor(String);

impl HexColor {
    /// Validate a `#RRGGBB` colour.
    pub fn new(raw: &str) -> Result<Self, CatalogueValidationError> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix('#')
            .ok_or(CatalogueValidationError::InvalidColor)?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CatalogueValidationError::InvalidColor);
        }
        Ok(Self(format!("#{}", digits.to_ascii_uppercase())))
    }
}

impl AsRef<str> for HexColor {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// URL-safe tag identifier used by the `tags` recipe filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagSlug(String);

impl TagSlug {
    /// Validate a slug of letters, digits, `-` and `_`.
    pub fn new(raw: &str) -> Result<Self, CatalogueValidationError> {
        let value = bounded_text("slug", raw)?;
        let allowed = value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !allowed {
            return Err(CatalogueValidationError::InvalidSlug);
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for TagSlug {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Recipe category such as "Breakfast".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub color: HexColor,
    pub slug: TagSlug,
}

/// Tag fields before the row exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTag {
    pub name: String,
    pub color: HexColor,
    pub slug: TagSlug,
}

impl NewTag {
    /// Validate raw tag fields.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::NewTag;
    ///
    /// let tag = NewTag::try_from_parts("Breakfast", "#e26c2d", "breakfast").expect("valid");
    /// assert_eq!(tag.color.as_ref(), "#E26C2D");
    /// ```
    pub fn try_from_parts(
        name: &str,
        color: &str,
        slug: &str,
    ) -> Result<Self, CatalogueValidationError> {
        Ok(Self {
            name: bounded_text("name", name)?,
            color: HexColor::new(color)?,
            slug: TagSlug::new(slug)?,
        })
    }
}

/// Ingredient with the unit its amounts are measured in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub measurement_unit: String,
}

/// Ingredient fields before the row exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIngredient {
    pub name: String,
    pub measurement_unit: String,
}

impl NewIngredient {
    /// Validate an ingredient row.
    pub fn try_from_parts(
        name: &str,
        measurement_unit: &str,
    ) -> Result<Self, CatalogueValidationError> {
        Ok(Self {
            name: bounded_text("name", name)?,
            measurement_unit: bounded_text("measurement_unit", measurement_unit)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("#49B64E", true)]
    #[case("#49b64e", true)]
    #[case("49B64E", false)]
    #[case("#49B64", false)]
    #[case("#49B64G", false)]
    fn colour_format(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(HexColor::new(raw).is_ok(), ok);
    }

    #[rstest]
    #[case("breakfast", true)]
    #[case("late_dinner-2", true)]
    #[case("завтрак", false)]
    #[case("with space", false)]
    #[case("", false)]
    fn slug_format(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(TagSlug::new(raw).is_ok(), ok);
    }

    #[rstest]
    fn ingredient_rejects_blank_unit() {
        let err = NewIngredient::try_from_parts("salt", " ").expect_err("blank unit");
        assert_eq!(err.field(), "measurement_unit");
    }

    #[rstest]
    fn ingredient_rejects_overlong_name() {
        let name = "x".repeat(CATALOGUE_TEXT_MAX + 1);
        let err = NewIngredient::try_from_parts(&name, "g").expect_err("too long");
        assert_eq!(
            err,
            CatalogueValidationError::TooLong {
                field: "name",
                max: CATALOGUE_TEXT_MAX
            }
        );
    }
}
