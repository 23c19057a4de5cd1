//! Account endpoints.
//!
//! ```text
//! POST /api/users/ {"email":"cook@example.com","username":"cook",...}
//! GET /api/users/?page=2&limit=10
//! GET /api/users/me/
//! ```

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use pagination::Paginated;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{NewPassword, NewUserProfile, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{Authenticated, Viewer};
use crate::inbound::http::dto::{CreatedUserResponse, UserResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, QueryPairs, request_url, required};

/// Registration body for `POST /api/users/`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "cook@example.com")]
    pub email: Option<String>,
    #[schema(example = "cook")]
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
}

/// Body for `POST /api/users/set_password/`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct SetPasswordRequest {
    pub new_password: Option<String>,
    pub current_password: Option<String>,
}

/// Paginated user list, documented for OpenAPI.
#[derive(ToSchema)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct UserPage {
    count: u64,
    next: Option<String>,
    previous: Option<String>,
    results: Vec<UserResponse>,
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/users/",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = CreatedUserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "registerUser",
    security([])
)]
#[post("/users/")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        email,
        username,
        first_name,
        last_name,
        password,
    } = payload.into_inner();
    let profile = NewUserProfile::try_from_parts(
        &required(email, FieldName::new("email"))?,
        &required(username, FieldName::new("username"))?,
        &required(first_name, FieldName::new("first_name"))?,
        &required(last_name, FieldName::new("last_name"))?,
    )?;
    let password = NewPassword::new(&required(password, FieldName::new("password"))?)?;
    let user = state.accounts.register(profile, password).await?;
    Ok(HttpResponse::Created().json(CreatedUserResponse::from(&user)))
}

/// List users, ordered by id.
#[utoipa::path(
    get,
    path = "/api/users/",
    params(
        ("page" = Option<u32>, Query, description = "One-based page number"),
        ("limit" = Option<u32>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Users", body = UserPage),
        (status = 400, description = "Invalid pagination", body = ErrorSchema),
        (status = 401, description = "Invalid token", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users/")]
pub async fn list_users(
    state: web::Data<HttpState>,
    viewer: Viewer,
    req: HttpRequest,
) -> ApiResult<web::Json<Paginated<UserResponse>>> {
    let query = QueryPairs::from_request(&req);
    let page = state.page_request(query.first("page"), query.first("limit"))?;
    let users = state.accounts.list_users(viewer.id(), &page).await?;
    Ok(web::Json(Paginated::from_page(
        users.map(|profile| UserResponse::from(&profile)),
        &page,
        &request_url(&req)?,
    )))
}

/// The requester's own profile.
#[utoipa::path(
    get,
    path = "/api/users/me/",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me/")]
pub async fn current_user(
    state: web::Data<HttpState>,
    requester: Authenticated,
) -> ApiResult<web::Json<UserResponse>> {
    let profile = state.accounts.current_user(requester.id()).await?;
    Ok(web::Json(UserResponse::from(&profile)))
}

/// A single user profile.
#[utoipa::path(
    get,
    path = "/api/users/{id}/",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 401, description = "Invalid token", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}/")]
pub async fn get_user(
    state: web::Data<HttpState>,
    viewer: Viewer,
    path: web::Path<i64>,
) -> ApiResult<web::Json<UserResponse>> {
    let id = UserId::new(path.into_inner());
    let profile = state.accounts.get_user(viewer.id(), id).await?;
    Ok(web::Json(UserResponse::from(&profile)))
}

/// Change the requester's password.
#[utoipa::path(
    post,
    path = "/api/users/set_password/",
    request_body = SetPasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "setPassword"
)]
#[post("/users/set_password/")]
pub async fn set_password(
    state: web::Data<HttpState>,
    requester: Authenticated,
    payload: web::Json<SetPasswordRequest>,
) -> ApiResult<HttpResponse> {
    let SetPasswordRequest {
        new_password,
        current_password,
    } = payload.into_inner();
    let current = required(current_password, FieldName::new("current_password"))?;
    let new_password = NewPassword::new(&required(new_password, FieldName::new("new_password"))?)
        .map_err(|err| err.into_error("new_password"))?;
    state
        .accounts
        .set_password(requester.id(), &current, new_password)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
