//! Following authors.
//!
//! ```text
//! POST /api/users/7/subscribe/?recipes_limit=3
//! DELETE /api/users/7/subscribe/
//! GET /api/users/subscriptions/?page=1&limit=6&recipes_limit=3
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, post, web};
use pagination::Paginated;
use utoipa::ToSchema;

use crate::domain::{RecipesLimit, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::dto::SubscribedAuthorResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{QueryPairs, request_url};

const RECIPES_LIMIT: &str = "recipes_limit";

/// Paginated list of followed authors, documented for OpenAPI.
#[derive(ToSchema)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct SubscriptionPage {
    count: u64,
    next: Option<String>,
    previous: Option<String>,
    results: Vec<SubscribedAuthorResponse>,
}

/// Authors the requester follows, ordered by e-mail.
#[utoipa::path(
    get,
    path = "/api/users/subscriptions/",
    params(
        ("page" = Option<u32>, Query, description = "One-based page number"),
        ("limit" = Option<u32>, Query, description = "Page size"),
        ("recipes_limit" = Option<u32>, Query, description = "Cap on each author's recipe preview")
    ),
    responses(
        (status = 200, description = "Followed authors", body = SubscriptionPage),
        (status = 400, description = "Invalid pagination", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "listSubscriptions"
)]
#[get("/users/subscriptions/")]
pub async fn list_subscriptions(
    state: web::Data<HttpState>,
    requester: Authenticated,
    req: HttpRequest,
) -> ApiResult<web::Json<Paginated<SubscribedAuthorResponse>>> {
    let query = QueryPairs::from_request(&req);
    let page = state.page_request(query.first("page"), query.first("limit"))?;
    let limit = RecipesLimit::parse_lenient(query.first(RECIPES_LIMIT));
    let authors = state
        .subscriptions
        .list(requester.id(), &page, limit)
        .await?;
    Ok(web::Json(Paginated::from_page(
        authors.map(|followed| SubscribedAuthorResponse::new(&followed, &state)),
        &page,
        &request_url(&req)?,
    )))
}

/// Follow an author.
#[utoipa::path(
    post,
    path = "/api/users/{id}/subscribe/",
    params(
        ("id" = i64, Path, description = "Author id"),
        ("recipes_limit" = Option<u32>, Query, description = "Cap on the recipe preview")
    ),
    responses(
        (status = 201, description = "Subscribed", body = SubscribedAuthorResponse),
        (status = 400, description = "Self or duplicate subscription", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Author not found", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "subscribe"
)]
#[post("/users/{id}/subscribe/")]
pub async fn subscribe(
    state: web::Data<HttpState>,
    requester: Authenticated,
    path: web::Path<i64>,
    req: HttpRequest,
) -> ApiResult<HttpResponse> {
    let limit = RecipesLimit::parse_lenient(QueryPairs::from_request(&req).first(RECIPES_LIMIT));
    let followed = state
        .subscriptions
        .subscribe(requester.id(), UserId::new(path.into_inner()), limit)
        .await?;
    Ok(HttpResponse::Created().json(SubscribedAuthorResponse::new(&followed, &state)))
}

/// Stop following an author.
#[utoipa::path(
    delete,
    path = "/api/users/{id}/subscribe/",
    params(("id" = i64, Path, description = "Author id")),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Author or subscription not found", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "unsubscribe"
)]
#[delete("/users/{id}/subscribe/")]
pub async fn unsubscribe(
    state: web::Data<HttpState>,
    requester: Authenticated,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .subscriptions
        .unsubscribe(requester.id(), UserId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
