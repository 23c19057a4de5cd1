//! Wire representations shared by several handler modules.
//!
//! Field names are snake_case. Domain types stay free of serde derives for
//! the API shape; conversions here also resolve image paths to links.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Ingredient, Recipe, RecipeFields, RecipeIngredient, RecipeSummary, SubscribedAuthor, Tag,
    User, UserProfile,
};

use super::state::HttpState;

/// Public user representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "cook@example.com")]
    pub email: String,
    pub id: i64,
    #[schema(example = "cook")]
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether the requester follows this user.
    pub is_subscribed: bool,
}

impl UserResponse {
    /// Public fields of `user` plus the requester's follow flag.
    pub fn new(user: &User, is_subscribed: bool) -> Self {
        Self {
            email: user.email.to_string(),
            id: user.id.get(),
            username: user.username.as_ref().to_owned(),
            first_name: user.first_name.as_ref().to_owned(),
            last_name: user.last_name.as_ref().to_owned(),
            is_subscribed,
        }
    }
}

impl From<&UserProfile> for UserResponse {
    fn from(profile: &UserProfile) -> Self {
        Self::new(&profile.user, profile.is_subscribed)
    }
}

/// Representation returned right after registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreatedUserResponse {
    pub email: String,
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for CreatedUserResponse {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.to_string(),
            id: user.id.get(),
            username: user.username.as_ref().to_owned(),
            first_name: user.first_name.as_ref().to_owned(),
            last_name: user.last_name.as_ref().to_owned(),
        }
    }
}

/// Tag representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TagResponse {
    pub id: i64,
    #[schema(example = "Breakfast")]
    pub name: String,
    #[schema(example = "#E26C2D")]
    pub color: String,
    #[schema(example = "breakfast")]
    pub slug: String,
}

impl From<&Tag> for TagResponse {
    fn from(tag: &Tag) -> Self {
        Self {
            id: tag.id.get(),
            name: tag.name.clone(),
            color: tag.color.as_ref().to_owned(),
            slug: tag.slug.as_ref().to_owned(),
        }
    }
}

/// Ingredient representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IngredientResponse {
    pub id: i64,
    #[schema(example = "flour")]
    pub name: String,
    #[schema(example = "g")]
    pub measurement_unit: String,
}

impl From<&Ingredient> for IngredientResponse {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            id: ingredient.id.get(),
            name: ingredient.name.clone(),
            measurement_unit: ingredient.measurement_unit.clone(),
        }
    }
}

/// An ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecipeIngredientResponse {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl From<&RecipeIngredient> for RecipeIngredientResponse {
    fn from(line: &RecipeIngredient) -> Self {
        Self {
            id: line.ingredient.id.get(),
            name: line.ingredient.name.clone(),
            measurement_unit: line.ingredient.measurement_unit.clone(),
            amount: line.amount.get(),
        }
    }
}

/// Full recipe representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecipeResponse {
    pub id: i64,
    pub tags: Vec<TagResponse>,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    /// Link to the stored picture.
    pub image: String,
    pub text: String,
    /// Minutes.
    pub cooking_time: i16,
}

impl RecipeResponse {
    /// Full representation with an absolute image link.
    pub fn new(recipe: &Recipe, state: &HttpState) -> Self {
        Self {
            id: recipe.id.get(),
            tags: recipe.tags.iter().map(TagResponse::from).collect(),
            author: UserResponse::from(&recipe.author),
            ingredients: recipe
                .ingredients
                .iter()
                .map(RecipeIngredientResponse::from)
                .collect(),
            is_favorited: recipe.is_favorited,
            is_in_shopping_cart: recipe.is_in_shopping_cart,
            name: recipe.name.clone(),
            image: state.media_link(&recipe.image),
            text: recipe.text.clone(),
            cooking_time: recipe.cooking_time.minutes(),
        }
    }
}

/// Short recipe card used by marks and subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecipeSummaryResponse {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: i16,
}

impl RecipeSummaryResponse {
    /// Short representation with an absolute image link.
    pub fn new(summary: &RecipeSummary, state: &HttpState) -> Self {
        Self {
            id: summary.id.get(),
            name: summary.name.clone(),
            image: state.media_link(&summary.image),
            cooking_time: summary.cooking_time.minutes(),
        }
    }
}

/// A followed author with a preview of their recipes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubscribedAuthorResponse {
    #[serde(flatten)]
    pub author: UserResponse,
    pub recipes: Vec<RecipeSummaryResponse>,
    pub recipes_count: u64,
}

impl SubscribedAuthorResponse {
    /// Author fields with the recipe preview.
    pub fn new(followed: &SubscribedAuthor, state: &HttpState) -> Self {
        Self {
            author: UserResponse::new(&followed.author, true),
            recipes: followed
                .recipes
                .iter()
                .map(|summary| RecipeSummaryResponse::new(summary, state))
                .collect(),
            recipes_count: followed.recipes_count,
        }
    }
}

/// `{id, amount}` pair in a recipe payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IngredientAmountRequest {
    pub id: i64,
    pub amount: i64,
}

/// Body of `POST`, `PUT` and `PATCH /api/recipes/`.
///
/// Every field is optional at the wire level; creation requires them all
/// and updates apply only the supplied ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecipeRequest {
    pub ingredients: Option<Vec<IngredientAmountRequest>>,
    pub tags: Option<Vec<i64>>,
    /// `data:image/<type>;base64,<payload>`.
    #[schema(example = "data:image/png;base64,iVBORw0KGgo...")]
    pub image: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
}

impl From<RecipeRequest> for RecipeFields {
    fn from(value: RecipeRequest) -> Self {
        Self {
            name: value.name,
            text: value.text,
            cooking_time: value.cooking_time,
            ingredients: value
                .ingredients
                .map(|lines| lines.into_iter().map(|l| (l.id, l.amount)).collect()),
            tags: value.tags,
            image: value.image,
        }
    }
}
