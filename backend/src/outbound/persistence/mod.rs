//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the driven repository ports, backed by
//! `diesel-async` with `bb8` connection pooling.
//!
//! - Repositories only translate between Diesel rows and domain types.
//! - Row structs (`models.rs`) and table definitions (`schema.rs`) never
//!   leave this module.
//! - Every failure is mapped to [`PersistenceError`](crate::domain::ports::PersistenceError).
//!
//! # Example
//!
//! ```ignore
//! use backend::outbound::persistence::{DbPool, DieselTagRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/foodgram")).await?;
//! let tags = DieselTagRepository::new(pool);
//! ```

mod diesel_auth_token_repository;
mod diesel_catalogue_repository;
mod diesel_error_mapping;
mod diesel_recipe_mark_repository;
mod diesel_recipe_repository;
mod diesel_shopping_list_repository;
mod diesel_subscription_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod row_mapping;
mod schema;

pub use diesel_auth_token_repository::DieselAuthTokenRepository;
pub use diesel_catalogue_repository::{DieselIngredientRepository, DieselTagRepository};
pub use diesel_recipe_mark_repository::DieselRecipeMarkRepository;
pub use diesel_recipe_repository::DieselRecipeRepository;
pub use diesel_shopping_list_repository::DieselShoppingListRepository;
pub use diesel_subscription_repository::DieselSubscriptionRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
