//! Recipe aggregate: validated write payloads and the read model.
//!
//! Create and update payloads arrive as [`RecipeFields`], a bag of optional
//! raw values. [`RecipeDraft::try_from_fields`] demands every field while
//! [`RecipePatch::try_from_fields`] validates only what was supplied. Both
//! report the first failing field through [`RecipeValidationError`].

use std::collections::HashSet;
use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalogue::{Ingredient, IngredientId, Tag, TagId};
use super::user::UserProfile;

/// Longest accepted recipe name, in characters.
pub const RECIPE_NAME_MAX: usize = 200;
/// Upper bound for cooking time in minutes.
pub const COOKING_TIME_MAX: i64 = 32_767;
/// Upper bound for an ingredient amount.
pub const AMOUNT_MAX: i64 = 32_767;
/// Largest decoded image accepted in a payload.
pub const IMAGE_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecipeValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{field} must not be empty")]
    Blank { field: &'static str },
    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("cooking_time must be between 1 and {max}")]
    CookingTimeOutOfRange { max: i64 },
    #[error("at least one ingredient is required")]
    NoIngredients,
    #[error("ingredient amount must be between 1 and {max}")]
    AmountOutOfRange { ingredient: IngredientId, max: i64 },
    #[error("ingredient {ingredient} is listed more than once")]
    DuplicateIngredient { ingredient: IngredientId },
    #[error("ingredient {ingredient} does not exist")]
    UnknownIngredient { ingredient: IngredientId },
    #[error("at least one tag is required")]
    NoTags,
    #[error("tag {tag} is listed more than once")]
    DuplicateTag { tag: TagId },
    #[error("tag {tag} does not exist")]
    UnknownTag { tag: TagId },
    #[error("image must be a base64 data URI of a png, jpeg, gif or webp picture")]
    InvalidImage,
    #[error("image must be at most {max} bytes")]
    ImageTooLarge { max: usize },
}

impl RecipeValidationError {
    /// Request field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing { field } | Self::Blank { field } => field,
            Self::NameTooLong { .. } => "name",
            Self::CookingTimeOutOfRange { .. } => "cooking_time",
            Self::NoIngredients
            | Self::AmountOutOfRange { .. }
            | Self::DuplicateIngredient { .. }
            | Self::UnknownIngredient { .. } => "ingredients",
            Self::NoTags | Self::DuplicateTag { .. } | Self::UnknownTag { .. } => "tags",
            Self::InvalidImage | Self::ImageTooLarge { .. } => "image",
        }
    }

    /// Machine-readable failure code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Missing { .. } => "required",
            Self::Blank { .. } | Self::NoIngredients | Self::NoTags => "blank",
            Self::NameTooLong { .. } | Self::ImageTooLarge { .. } => "max_length",
            Self::CookingTimeOutOfRange { .. } | Self::AmountOutOfRange { .. } => "out_of_range",
            Self::DuplicateIngredient { .. } | Self::DuplicateTag { .. } => "duplicate",
            Self::UnknownIngredient { .. } | Self::UnknownTag { .. } => "does_not_exist",
            Self::InvalidImage => "invalid_image",
        }
    }
}

/// Database identifier of a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(i64);

impl RecipeId {
    /// Wrap a raw database id.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw database id.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Minutes needed to cook, `1..=32767`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CookingTime(i16);

impl CookingTime {
    /// Validate a cooking time in minutes.
    ///
    /// # Errors
    /// [`RecipeValidationError::CookingTimeOutOfRange`] outside `1..=32767`.
    pub fn new(minutes: i64) -> Result<Self, RecipeValidationError> {
        if !(1..=COOKING_TIME_MAX).contains(&minutes) {
            return Err(RecipeValidationError::CookingTimeOutOfRange {
                max: COOKING_TIME_MAX,
            });
        }
        i16::try_from(minutes)
            .map(Self)
            .map_err(|_| RecipeValidationError::CookingTimeOutOfRange {
                max: COOKING_TIME_MAX,
            })
    }

    /// Minutes as stored.
    pub const fn minutes(self) -> i16 {
        self.0
    }
}

/// Quantity of one ingredient, `1..=32767` of its measurement unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(i32);

impl Amount {
    /// Validate an amount supplied for `ingredient`.
    ///
    /// # Errors
    /// [`RecipeValidationError::AmountOutOfRange`] outside `1..=32767`.
    pub fn new(ingredient: IngredientId, raw: i64) -> Result<Self, RecipeValidationError> {
        if !(1..=AMOUNT_MAX).contains(&raw) {
            return Err(RecipeValidationError::AmountOutOfRange {
                ingredient,
                max: AMOUNT_MAX,
            });
        }
        i32::try_from(raw)
            .map(Self)
            .map_err(|_| RecipeValidationError::AmountOutOfRange {
                ingredient,
                max: AMOUNT_MAX,
            })
    }

    /// Wrap an amount loaded from storage.
    pub const fn from_stored(raw: i32) -> Self {
        Self(raw)
    }

    /// Quantity in the ingredient's unit.
    pub const fn get(self) -> i32 {
        self.0
    }
}

/// Decoded picture extracted from a `data:image/<ext>;base64,<payload>` URI.
#[derive(Clone, PartialEq, Eq)]
pub struct RecipeImage {
    bytes: Vec<u8>,
    extension: &'static str,
}

impl fmt::Debug for RecipeImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecipeImage")
            .field("extension", &self.extension)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn image_extension(mime_subtype: &str) -> Option<&'static str> {
    match mime_subtype.to_ascii_lowercase().as_str() {
        "png" => Some("png"),
        "jpeg" | "jpg" => Some("jpg"),
        "gif" => Some("gif"),
        "webp" => Some("webp"),
        _ => None,
    }
}

fn magic_matches(extension: &str, bytes: &[u8]) -> bool {
    match extension {
        "png" => bytes.starts_with(b"\x89PNG\r\n\x1a\n"),
        "jpg" => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
        "gif" => bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a"),
        "webp" => bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP",
        _ => false,
    }
}

impl RecipeImage {
    /// Decode and sniff a data URI.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::RecipeImage;
    ///
    /// let gif = "data:image/gif;base64,R0lGODlhAQABAAAAACw=";
    /// let image = RecipeImage::from_data_uri(gif).expect("valid gif");
    /// assert_eq!(image.extension(), "gif");
    /// ```
    pub fn from_data_uri(raw: &str) -> Result<Self, RecipeValidationError> {
        let rest = raw
            .trim()
            .strip_prefix("data:image/")
            .ok_or(RecipeValidationError::InvalidImage)?;
        let (subtype, payload) = rest
            .split_once(";base64,")
            .ok_or(RecipeValidationError::InvalidImage)?;
        let extension = image_extension(subtype).ok_or(RecipeValidationError::InvalidImage)?;
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|_| RecipeValidationError::InvalidImage)?;
        if bytes.len() > IMAGE_MAX_BYTES {
            return Err(RecipeValidationError::ImageTooLarge {
                max: IMAGE_MAX_BYTES,
            });
        }
        if !magic_matches(extension, &bytes) {
            return Err(RecipeValidationError::InvalidImage);
        }
        Ok(Self { bytes, extension })
    }

    /// Decoded image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// File extension without the dot (`jpeg` is normalised to `jpg`).
    pub fn extension(&self) -> &'static str {
        self.extension
    }
}

/// One `{id, amount}` pair from a write payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientAmount {
    /// Referenced catalogue ingredient.
    pub ingredient: IngredientId,
    /// Validated quantity.
    pub amount: Amount,
}

/// Raw create/update values as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFields {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
    /// `(ingredient id, amount)` pairs.
    pub ingredients: Option<Vec<(i64, i64)>>,
    pub tags: Option<Vec<i64>>,
    pub image: Option<String>,
}

fn validate_name(raw: &str) -> Result<String, RecipeValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RecipeValidationError::Blank { field: "name" });
    }
    if trimmed.chars().count() > RECIPE_NAME_MAX {
        return Err(RecipeValidationError::NameTooLong {
            max: RECIPE_NAME_MAX,
        });
    }
    Ok(trimmed.to_owned())
}

fn validate_text(raw: &str) -> Result<String, RecipeValidationError> {
    if raw.trim().is_empty() {
        return Err(RecipeValidationError::Blank { field: "text" });
    }
    Ok(raw.to_owned())
}

fn validate_ingredients(raw: &[(i64, i64)]) -> Result<Vec<IngredientAmount>, RecipeValidationError> {
    if raw.is_empty() {
        return Err(RecipeValidationError::NoIngredients);
    }
    let mut seen = HashSet::with_capacity(raw.len());
    raw.iter()
        .map(|&(id, amount)| {
            let ingredient = IngredientId::new(id);
            if !seen.insert(ingredient) {
                return Err(RecipeValidationError::DuplicateIngredient { ingredient });
            }
            Ok(IngredientAmount {
                ingredient,
                amount: Amount::new(ingredient, amount)?,
            })
        })
        .collect()
}

fn validate_tags(raw: &[i64]) -> Result<Vec<TagId>, RecipeValidationError> {
    if raw.is_empty() {
        return Err(RecipeValidationError::NoTags);
    }
    let mut seen = HashSet::with_capacity(raw.len());
    raw.iter()
        .map(|&id| {
            let tag = TagId::new(id);
            if seen.insert(tag) {
                Ok(tag)
            } else {
                Err(RecipeValidationError::DuplicateTag { tag })
            }
        })
        .collect()
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, RecipeValidationError> {
    value.ok_or(RecipeValidationError::Missing { field })
}

/// Fully validated create payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    pub name: String,
    pub text: String,
    pub cooking_time: CookingTime,
    pub ingredients: Vec<IngredientAmount>,
    pub tags: Vec<TagId>,
    pub image: RecipeImage,
}

impl RecipeDraft {
    /// Validate a create payload; every field is required.
    pub fn try_from_fields(fields: RecipeFields) -> Result<Self, RecipeValidationError> {
        let ingredients = required(fields.ingredients, "ingredients")?;
        let tags = required(fields.tags, "tags")?;
        let image = required(fields.image, "image")?;
        let name = required(fields.name, "name")?;
        let text = required(fields.text, "text")?;
        let cooking_time = required(fields.cooking_time, "cooking_time")?;
        Ok(Self {
            ingredients: validate_ingredients(&ingredients)?,
            tags: validate_tags(&tags)?,
            image: RecipeImage::from_data_uri(&image)?,
            name: validate_name(&name)?,
            text: validate_text(&text)?,
            cooking_time: CookingTime::new(cooking_time)?,
        })
    }
}

/// Validated partial update. `None` leaves the stored value untouched;
/// supplied tag and ingredient lists replace the stored sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipePatch {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<CookingTime>,
    pub ingredients: Option<Vec<IngredientAmount>>,
    pub tags: Option<Vec<TagId>>,
    pub image: Option<RecipeImage>,
}

impl RecipePatch {
    /// Validate a full create payload.
    pub fn try_from_fields(fields: RecipeFields) -> Result<Self, RecipeValidationError> {
        Ok(Self {
            ingredients: fields
                .ingredients
                .as_deref()
                .map(validate_ingredients)
                .transpose()?,
            tags: fields.tags.as_deref().map(validate_tags).transpose()?,
            image: fields
                .image
                .as_deref()
                .map(RecipeImage::from_data_uri)
                .transpose()?,
            name: fields.name.as_deref().map(validate_name).transpose()?,
            text: fields.text.as_deref().map(validate_text).transpose()?,
            cooking_time: fields.cooking_time.map(CookingTime::new).transpose()?,
        })
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.text.is_none()
            && self.cooking_time.is_none()
            && self.ingredients.is_none()
            && self.tags.is_none()
            && self.image.is_none()
    }
}

/// Validated draft with the image already stored, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipe {
    pub name: String,
    pub text: String,
    pub cooking_time: CookingTime,
    pub ingredients: Vec<IngredientAmount>,
    pub tags: Vec<TagId>,
    pub image_path: String,
    pub pub_date: DateTime<Utc>,
}

/// Validated patch with any new image already stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeChanges {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<CookingTime>,
    pub ingredients: Option<Vec<IngredientAmount>>,
    pub tags: Option<Vec<TagId>>,
    pub image_path: Option<String>,
}

/// Ingredient line of a stored recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeIngredient {
    pub ingredient: Ingredient,
    pub amount: Amount,
}

/// Full recipe as seen by one requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: RecipeId,
    pub author: UserProfile,
    pub name: String,
    pub text: String,
    /// Storage path relative to the media root.
    pub image: String,
    pub cooking_time: CookingTime,
    pub pub_date: DateTime<Utc>,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<RecipeIngredient>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

impl Recipe {
    /// Short form used by marks and subscriptions.
    pub fn summary(&self) -> RecipeSummary {
        RecipeSummary {
            id: self.id,
            name: self.name.clone(),
            image: self.image.clone(),
            cooking_time: self.cooking_time,
        }
    }
}

/// Short form used by marks and subscription listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeSummary {
    pub id: RecipeId,
    pub name: String,
    pub image: String,
    pub cooking_time: CookingTime,
}
