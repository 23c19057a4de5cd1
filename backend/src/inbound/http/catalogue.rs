//! Read-only tag and ingredient endpoints. Neither list is paginated.

use actix_web::{HttpRequest, get, web};

use crate::domain::{IngredientId, TagId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{IngredientResponse, TagResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::QueryPairs;

/// All tags.
#[utoipa::path(
    get,
    path = "/api/tags/",
    responses((status = 200, description = "All tags ordered by name", body = [TagResponse])),
    tags = ["catalogue"],
    operation_id = "listTags",
    security([])
)]
#[get("/tags/")]
pub async fn list_tags(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<TagResponse>>> {
    let tags = state.catalogue.list_tags().await?;
    Ok(web::Json(tags.iter().map(TagResponse::from).collect()))
}

/// One tag by id.
#[utoipa::path(
    get,
    path = "/api/tags/{id}/",
    params(("id" = i64, Path, description = "Tag id")),
    responses(
        (status = 200, description = "Tag", body = TagResponse),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "getTag",
    security([])
)]
#[get("/tags/{id}/")]
pub async fn get_tag(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<TagResponse>> {
    let tag = state.catalogue.get_tag(TagId::new(path.into_inner())).await?;
    Ok(web::Json(TagResponse::from(&tag)))
}

/// Ingredients whose name starts with `name`, ignoring case.
#[utoipa::path(
    get,
    path = "/api/ingredients/",
    params(("name" = Option<String>, Query, description = "Case-insensitive name prefix")),
    responses((status = 200, description = "Matching ingredients", body = [IngredientResponse])),
    tags = ["catalogue"],
    operation_id = "listIngredients",
    security([])
)]
#[get("/ingredients/")]
pub async fn list_ingredients(
    state: web::Data<HttpState>,
    req: HttpRequest,
) -> ApiResult<web::Json<Vec<IngredientResponse>>> {
    let query = QueryPairs::from_request(&req);
    let found = state.catalogue.search_ingredients(query.first("name")).await?;
    Ok(web::Json(found.iter().map(IngredientResponse::from).collect()))
}

/// One ingredient by id.
#[utoipa::path(
    get,
    path = "/api/ingredients/{id}/",
    params(("id" = i64, Path, description = "Ingredient id")),
    responses(
        (status = 200, description = "Ingredient", body = IngredientResponse),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "getIngredient",
    security([])
)]
#[get("/ingredients/{id}/")]
pub async fn get_ingredient(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<IngredientResponse>> {
    let ingredient = state
        .catalogue
        .get_ingredient(IngredientId::new(path.into_inner()))
        .await?;
    Ok(web::Json(IngredientResponse::from(&ingredient)))
}
