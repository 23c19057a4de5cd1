//! Row-to-domain converters shared by several repositories.
//!
//! Stored rows passed the domain constructors on the way in, so a failure
//! here means the table was edited by hand; it is reported as a query error.

use crate::domain::{
    CookingTime, Email, HexColor, Ingredient, IngredientId, PersonName, RecipeId, RecipeSummary,
    Tag, TagId, TagSlug, User, UserId, Username,
};

use super::models::{IngredientRow, RecipeSummaryRow, TagRow, UserRow};

pub(crate) fn row_to_user(row: UserRow) -> Result<User, String> {
    Ok(User {
        id: UserId::new(row.id),
        email: Email::new(&row.email).map_err(|e| e.to_string())?,
        username: Username::new(row.username).map_err(|e| e.to_string())?,
        first_name: PersonName::new("first_name", row.first_name).map_err(|e| e.to_string())?,
        last_name: PersonName::new("last_name", row.last_name).map_err(|e| e.to_string())?,
    })
}

pub(crate) fn row_to_tag(row: TagRow) -> Result<Tag, String> {
    Ok(Tag {
        id: TagId::new(row.id),
        name: row.name,
        color: HexColor::new(&row.color).map_err(|e| e.to_string())?,
        slug: TagSlug::new(&row.slug).map_err(|e| e.to_string())?,
    })
}

pub(crate) fn row_to_ingredient(row: IngredientRow) -> Ingredient {
    Ingredient {
        id: IngredientId::new(row.id),
        name: row.name,
        measurement_unit: row.measurement_unit,
    }
}

pub(crate) fn row_to_cooking_time(raw: i16) -> Result<CookingTime, String> {
    CookingTime::new(i64::from(raw)).map_err(|e| e.to_string())
}

pub(crate) fn row_to_summary(row: RecipeSummaryRow) -> Result<RecipeSummary, String> {
    Ok(RecipeSummary {
        id: RecipeId::new(row.id),
        name: row.name,
        image: row.image,
        cooking_time: row_to_cooking_time(row.cooking_time)?,
    })
}

/// Convert a page offset into the signed value SQL `OFFSET` expects.
pub(crate) fn offset_to_i64(offset: u64) -> i64 {
    i64::try_from(offset).unwrap_or(i64::MAX)
}
