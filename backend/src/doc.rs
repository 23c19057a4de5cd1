//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every handler under `/api`, the health checks, the
//! request/response DTOs and the error envelope wrappers from
//! [`crate::inbound::http::schemas`]. The document backs Swagger UI in debug
//! builds and is printed by the `openapi-dump` binary.

use crate::inbound::http::dto::{
    CreatedUserResponse, IngredientAmountRequest, IngredientResponse, RecipeIngredientResponse,
    RecipeRequest, RecipeResponse, RecipeSummaryResponse, SubscribedAuthorResponse, TagResponse,
    UserResponse,
};
use crate::inbound::http::recipes::RecipePage;
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::subscriptions::SubscriptionPage;
use crate::inbound::http::tokens::{TokenLoginRequest, TokenResponse};
use crate::inbound::http::users::{RegisterRequest, SetPasswordRequest, UserPage};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the token security scheme in the generated document.
pub const TOKEN_SCHEME: &str = "Token";

/// Enrich the generated document with the token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            TOKEN_SCHEME,
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "`Token <auth_token>` as issued by POST /api/auth/token/login/.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Foodgram API",
        description = "Recipes, favourites, shopping lists and author subscriptions."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("Token" = [])),
    paths(
        crate::inbound::http::tokens::login,
        crate::inbound::http::tokens::logout,
        crate::inbound::http::users::register,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::set_password,
        crate::inbound::http::subscriptions::list_subscriptions,
        crate::inbound::http::subscriptions::subscribe,
        crate::inbound::http::subscriptions::unsubscribe,
        crate::inbound::http::catalogue::list_tags,
        crate::inbound::http::catalogue::get_tag,
        crate::inbound::http::catalogue::list_ingredients,
        crate::inbound::http::catalogue::get_ingredient,
        crate::inbound::http::recipes::list_recipes,
        crate::inbound::http::recipes::get_recipe,
        crate::inbound::http::recipes::create_recipe,
        crate::inbound::http::recipes::put_recipe,
        crate::inbound::http::recipes::patch_recipe,
        crate::inbound::http::recipes::delete_recipe,
        crate::inbound::http::recipes::add_favorite,
        crate::inbound::http::recipes::remove_favorite,
        crate::inbound::http::recipes::add_to_shopping_cart,
        crate::inbound::http::recipes::remove_from_shopping_cart,
        crate::inbound::http::recipes::download_shopping_cart,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        UserResponse,
        CreatedUserResponse,
        UserPage,
        RegisterRequest,
        SetPasswordRequest,
        TokenLoginRequest,
        TokenResponse,
        TagResponse,
        IngredientResponse,
        RecipeIngredientResponse,
        RecipeResponse,
        RecipeSummaryResponse,
        RecipePage,
        IngredientAmountRequest,
        RecipeRequest,
        SubscribedAuthorResponse,
        SubscriptionPage
    )),
    tags(
        (name = "auth", description = "Token login and logout"),
        (name = "users", description = "Accounts and profiles"),
        (name = "subscriptions", description = "Following authors"),
        (name = "catalogue", description = "Tags and ingredients"),
        (name = "recipes", description = "Recipes, favourites and the shopping cart"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated OpenAPI document.

    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    fn object_fields(schema: &RefOr<Schema>) -> Vec<String> {
        match schema {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    fn error_schema_has_envelope_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let fields = object_fields(schemas.get(ERROR_SCHEMA_NAME).expect("Error schema"));
        for field in ["code", "message", "traceId", "details"] {
            assert!(fields.iter().any(|f| f == field), "missing {field}");
        }
    }

    #[rstest]
    fn recipe_schema_carries_mark_flags() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let fields = object_fields(schemas.get("RecipeResponse").expect("RecipeResponse"));
        assert!(fields.iter().any(|f| f == "is_favorited"));
        assert!(fields.iter().any(|f| f == "is_in_shopping_cart"));
    }

    #[rstest]
    #[case("/api/recipes/")]
    #[case("/api/recipes/{id}/favorite/")]
    #[case("/api/recipes/download_shopping_cart/")]
    #[case("/api/users/{id}/subscribe/")]
    #[case("/api/auth/token/login/")]
    #[case("/health/ready")]
    fn documents_path(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn registers_token_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key(TOKEN_SCHEME));
    }
}
