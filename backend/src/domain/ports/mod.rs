//! Driven ports: the traits persistence, storage and rendering adapters
//! implement for the domain services.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_token_repository;
mod image_store;
mod ingredient_repository;
mod persistence_error;
mod recipe_mark_repository;
mod recipe_repository;
mod shopping_list_renderer;
mod shopping_list_repository;
mod subscription_repository;
mod tag_repository;
mod user_repository;

pub use auth_token_repository::AuthTokenRepository;
#[cfg(test)]
pub use auth_token_repository::MockAuthTokenRepository;
#[cfg(test)]
pub use image_store::MockImageStore;
pub use image_store::{ImageStore, ImageStoreError};
pub use ingredient_repository::IngredientRepository;
#[cfg(test)]
pub use ingredient_repository::MockIngredientRepository;
pub use persistence_error::PersistenceError;
#[cfg(test)]
pub use recipe_mark_repository::MockRecipeMarkRepository;
pub use recipe_mark_repository::RecipeMarkRepository;
#[cfg(test)]
pub use recipe_repository::MockRecipeRepository;
pub use recipe_repository::{RecipeOwnership, RecipeRepository};
#[cfg(test)]
pub use shopping_list_renderer::MockShoppingListRenderer;
pub use shopping_list_renderer::{RenderError, ShoppingListRenderer};
#[cfg(test)]
pub use shopping_list_repository::MockShoppingListRepository;
pub use shopping_list_repository::ShoppingListRepository;
#[cfg(test)]
pub use subscription_repository::MockSubscriptionRepository;
pub use subscription_repository::SubscriptionRepository;
#[cfg(test)]
pub use tag_repository::MockTagRepository;
pub use tag_repository::TagRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserCredentials, UserRepository};
