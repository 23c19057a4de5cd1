//! Domain model and services.
//!
//! Entities validate their invariants in constructors; services orchestrate
//! driven ports (see [`ports`]) and return [`Error`] for anything a client
//! can observe.

pub mod account_service;
pub mod auth;
pub mod catalogue;
pub mod catalogue_service;
pub mod error;
pub mod ports;
pub mod recipe;
pub mod recipe_filter;
pub mod recipe_service;
pub mod shopping_list;
pub mod shopping_list_service;
pub mod subscription;
pub mod subscription_service;
pub mod trace_id;
pub mod user;

mod validation_errors;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use self::account_service::AccountService;
pub use self::auth::{
    AuthToken, CredentialsValidationError, LoginCredentials, NewPassword, PasswordHash,
    PasswordHashError, TokenDigest,
};
pub use self::catalogue::{
    CatalogueValidationError, HexColor, Ingredient, IngredientId, NewIngredient, NewTag, Tag,
    TagId, TagSlug,
};
pub use self::catalogue_service::{CatalogueService, ImportSummary};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::recipe::{
    Amount, CookingTime, IngredientAmount, NewRecipe, Recipe, RecipeChanges, RecipeDraft,
    RecipeFields, RecipeId, RecipeImage, RecipeIngredient, RecipePatch, RecipeSummary,
    RecipeValidationError,
};
pub use self::recipe_filter::{AuthorRef, FilterValueError, MarkKind, QueryFlag, RecipeFilter};
pub use self::recipe_service::{RecipeService, RecipeServicePorts};
pub use self::shopping_list::{
    ExportFormat, RenderedDocument, SHOPPING_LIST_TITLE, ShoppingList, ShoppingListLine,
    UnknownExportFormat,
};
pub use self::shopping_list_service::ShoppingListService;
pub use self::subscription::{RecipesLimit, SubscribedAuthor};
pub use self::subscription_service::SubscriptionService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Email, NewUserProfile, PersonName, User, UserId, UserProfile, UserValidationError, Username,
};
