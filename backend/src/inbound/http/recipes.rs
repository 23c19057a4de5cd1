//! Recipe endpoints, including the favourite and shopping-cart toggles and
//! the shopping-list download.
//!
//! ```text
//! GET /api/recipes/?author=3&tags=lunch&tags=dinner&is_favorited=1&page=2
//! POST /api/recipes/ {"ingredients":[{"id":1,"amount":10}],"tags":[1],...}
//! POST /api/recipes/5/favorite/
//! GET /api/recipes/download_shopping_cart/?format=txt
//! ```

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, put, web};
use pagination::Paginated;
use utoipa::ToSchema;

use crate::domain::{ExportFormat, MarkKind, RecipeDraft, RecipeFields, RecipeFilter, RecipeId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{Authenticated, Viewer};
use crate::inbound::http::dto::{RecipeRequest, RecipeResponse, RecipeSummaryResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{QueryPairs, request_url};

/// Paginated recipe list, documented for OpenAPI.
#[derive(ToSchema)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct RecipePage {
    count: u64,
    next: Option<String>,
    previous: Option<String>,
    results: Vec<RecipeResponse>,
}

/// Newest-first recipe list with optional filters.
#[utoipa::path(
    get,
    path = "/api/recipes/",
    params(
        ("author" = Option<String>, Query, description = "Author id or e-mail"),
        ("tags" = Option<Vec<String>>, Query, description = "Tag slugs; repeat to match any of several"),
        ("is_favorited" = Option<String>, Query, description = "1/true or 0/false; ignored for anonymous requests"),
        ("is_in_shopping_cart" = Option<String>, Query, description = "1/true or 0/false; ignored for anonymous requests"),
        ("page" = Option<u32>, Query, description = "One-based page number"),
        ("limit" = Option<u32>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Recipes", body = RecipePage),
        (status = 400, description = "Invalid filter or pagination", body = ErrorSchema),
        (status = 401, description = "Invalid token", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "listRecipes",
    security([])
)]
#[get("/recipes/")]
pub async fn list_recipes(
    state: web::Data<HttpState>,
    viewer: Viewer,
    req: HttpRequest,
) -> ApiResult<web::Json<Paginated<RecipeResponse>>> {
    let query = QueryPairs::from_request(&req);
    let filter = RecipeFilter::from_query_pairs(query.iter())?;
    let page = state.page_request(query.first("page"), query.first("limit"))?;
    let recipes = state.recipes.list(filter, viewer.id(), &page).await?;
    Ok(web::Json(Paginated::from_page(
        recipes.map(|recipe| RecipeResponse::new(&recipe, &state)),
        &page,
        &request_url(&req)?,
    )))
}

/// One recipe; anonymous access allowed.
#[utoipa::path(
    get,
    path = "/api/recipes/{id}/",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe", body = RecipeResponse),
        (status = 401, description = "Invalid token", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "getRecipe",
    security([])
)]
#[get("/recipes/{id}/")]
pub async fn get_recipe(
    state: web::Data<HttpState>,
    viewer: Viewer,
    path: web::Path<i64>,
) -> ApiResult<web::Json<RecipeResponse>> {
    let recipe = state
        .recipes
        .get(RecipeId::new(path.into_inner()), viewer.id())
        .await?;
    Ok(web::Json(RecipeResponse::new(&recipe, &state)))
}

/// Publish a recipe. Every field is required.
#[utoipa::path(
    post,
    path = "/api/recipes/",
    request_body = RecipeRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "createRecipe"
)]
#[post("/recipes/")]
pub async fn create_recipe(
    state: web::Data<HttpState>,
    author: Authenticated,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<HttpResponse> {
    let draft = RecipeDraft::try_from_fields(RecipeFields::from(payload.into_inner()))?;
    let recipe = state.recipes.create(author.id(), draft).await?;
    Ok(HttpResponse::Created().json(RecipeResponse::new(&recipe, &state)))
}

async fn apply_update(
    state: &HttpState,
    editor: &Authenticated,
    id: i64,
    payload: RecipeRequest,
) -> ApiResult<web::Json<RecipeResponse>> {
    let recipe = state
        .recipes
        .update(editor.id(), RecipeId::new(id), RecipeFields::from(payload))
        .await?;
    Ok(web::Json(RecipeResponse::new(&recipe, state)))
}

/// Update a recipe. Supplied tags and ingredients replace the stored sets.
#[utoipa::path(
    patch,
    path = "/api/recipes/{id}/",
    params(("id" = i64, Path, description = "Recipe id")),
    request_body = RecipeRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the author", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "patchRecipe"
)]
#[patch("/recipes/{id}/")]
pub async fn patch_recipe(
    state: web::Data<HttpState>,
    editor: Authenticated,
    path: web::Path<i64>,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<web::Json<RecipeResponse>> {
    apply_update(&state, &editor, path.into_inner(), payload.into_inner()).await
}

/// Same semantics as `PATCH`: omitted fields keep their values.
#[utoipa::path(
    put,
    path = "/api/recipes/{id}/",
    params(("id" = i64, Path, description = "Recipe id")),
    request_body = RecipeRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the author", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "putRecipe"
)]
#[put("/recipes/{id}/")]
pub async fn put_recipe(
    state: web::Data<HttpState>,
    editor: Authenticated,
    path: web::Path<i64>,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<web::Json<RecipeResponse>> {
    apply_update(&state, &editor, path.into_inner(), payload.into_inner()).await
}

/// Delete a recipe and its picture; author only.
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the author", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "deleteRecipe"
)]
#[delete("/recipes/{id}/")]
pub async fn delete_recipe(
    state: web::Data<HttpState>,
    editor: Authenticated,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .recipes
        .delete(editor.id(), RecipeId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn add_mark(
    state: &HttpState,
    kind: MarkKind,
    user: &Authenticated,
    id: i64,
) -> ApiResult<HttpResponse> {
    let summary = state
        .recipes
        .add_mark(kind, user.id(), RecipeId::new(id))
        .await?;
    Ok(HttpResponse::Created().json(RecipeSummaryResponse::new(&summary, state)))
}

async fn remove_mark(
    state: &HttpState,
    kind: MarkKind,
    user: &Authenticated,
    id: i64,
) -> ApiResult<HttpResponse> {
    state
        .recipes
        .remove_mark(kind, user.id(), RecipeId::new(id))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Add to favourites. Repeating the call returns 201 again without a
/// duplicate row.
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/favorite/",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 201, description = "Recipe is a favourite", body = RecipeSummaryResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Recipe not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "addFavorite"
)]
#[post("/recipes/{id}/favorite/")]
pub async fn add_favorite(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    add_mark(&state, MarkKind::Favorite, &user, path.into_inner()).await
}

/// Remove a recipe from the requester's favourites.
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/favorite/",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Removed from favourites"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Recipe missing or not a favourite", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "removeFavorite"
)]
#[delete("/recipes/{id}/favorite/")]
pub async fn remove_favorite(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    remove_mark(&state, MarkKind::Favorite, &user, path.into_inner()).await
}

/// Add a recipe to the requester's shopping cart.
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/shopping_cart/",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 201, description = "Recipe is in the cart", body = RecipeSummaryResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Recipe not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "addToShoppingCart"
)]
#[post("/recipes/{id}/shopping_cart/")]
pub async fn add_to_shopping_cart(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    add_mark(&state, MarkKind::ShoppingCart, &user, path.into_inner()).await
}

/// Remove a recipe from the requester's shopping cart.
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/shopping_cart/",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Removed from the cart"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Recipe missing or not in the cart", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "removeFromShoppingCart"
)]
#[delete("/recipes/{id}/shopping_cart/")]
pub async fn remove_from_shopping_cart(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    remove_mark(&state, MarkKind::ShoppingCart, &user, path.into_inner()).await
}

/// Aggregated ingredients of every recipe in the cart, as a file.
#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart/",
    params(("format" = Option<String>, Query, description = "pdf (default) or txt")),
    responses(
        (status = 200, description = "Shopping list attachment", content_type = "application/pdf"),
        (status = 400, description = "Unsupported format", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "downloadShoppingCart"
)]
#[get("/recipes/download_shopping_cart/")]
pub async fn download_shopping_cart(
    state: web::Data<HttpState>,
    user: Authenticated,
    req: HttpRequest,
) -> ApiResult<HttpResponse> {
    let format = match QueryPairs::from_request(&req).first("format") {
        Some(raw) if !raw.trim().is_empty() => raw.parse::<ExportFormat>()?,
        _ => ExportFormat::default(),
    };
    let document = state.shopping_list.download(user.id(), format).await?;
    Ok(HttpResponse::Ok()
        .content_type(document.content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(document.file_name)],
        })
        .body(document.bytes))
}

#[cfg(test)]
#[path = "recipes_tests.rs"]
mod tests;
