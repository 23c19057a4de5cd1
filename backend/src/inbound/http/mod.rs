//! HTTP inbound adapter exposing the REST endpoints under `/api`.

pub mod auth;
pub mod catalogue;
pub mod dto;
pub mod error;
pub mod health;
pub mod recipes;
pub mod schemas;
pub mod state;
pub mod subscriptions;
pub mod tokens;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every API handler on `cfg`.
///
/// Literal segments (`me`, `subscriptions`, `set_password`,
/// `download_shopping_cart`) are registered before the `{id}` routes that
/// would otherwise shadow them.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(tokens::login)
        .service(tokens::logout)
        .service(users::current_user)
        .service(users::set_password)
        .service(subscriptions::list_subscriptions)
        .service(users::list_users)
        .service(users::register)
        .service(users::get_user)
        .service(subscriptions::subscribe)
        .service(subscriptions::unsubscribe)
        .service(catalogue::list_tags)
        .service(catalogue::get_tag)
        .service(catalogue::list_ingredients)
        .service(catalogue::get_ingredient)
        .service(recipes::download_shopping_cart)
        .service(recipes::list_recipes)
        .service(recipes::create_recipe)
        .service(recipes::get_recipe)
        .service(recipes::put_recipe)
        .service(recipes::patch_recipe)
        .service(recipes::delete_recipe)
        .service(recipes::add_favorite)
        .service(recipes::remove_favorite)
        .service(recipes::add_to_shopping_cart)
        .service(recipes::remove_from_shopping_cart);
}

/// The `/api` scope with JSON and path extractor configuration applied.
pub fn api_scope() -> actix_web::Scope {
    web::scope("/api")
        .app_data(error::json_config())
        .app_data(error::path_config())
        .configure(configure_api)
}
