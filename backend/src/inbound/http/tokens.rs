//! Token login and logout.
//!
//! ```text
//! POST /api/auth/token/login/ {"email":"cook@example.com","password":"..."}
//! POST /api/auth/token/logout/
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::LoginCredentials;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, required};

/// Login request body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct TokenLoginRequest {
    #[schema(example = "cook@example.com")]
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Issued token. Send it back as `Authorization: Token <auth_token>`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TokenResponse {
    pub auth_token: String,
}

/// Exchange credentials for a token, replacing any previous one.
#[utoipa::path(
    post,
    path = "/api/auth/token/login/",
    request_body = TokenLoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "tokenLogin",
    security([])
)]
#[post("/auth/token/login/")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<TokenLoginRequest>,
) -> ApiResult<web::Json<TokenResponse>> {
    let TokenLoginRequest { email, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(
        &required(email, FieldName::new("email"))?,
        &required(password, FieldName::new("password"))?,
    )?;
    let token = state.accounts.issue_token(credentials).await?;
    Ok(web::Json(TokenResponse {
        auth_token: token.expose().to_owned(),
    }))
}

/// Revoke the requester's token.
#[utoipa::path(
    post,
    path = "/api/auth/token/logout/",
    responses(
        (status = 204, description = "Token revoked"),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "tokenLogout"
)]
#[post("/auth/token/logout/")]
pub async fn logout(
    state: web::Data<HttpState>,
    requester: Authenticated,
) -> ApiResult<HttpResponse> {
    state.accounts.revoke_token(requester.id()).await?;
    Ok(HttpResponse::NoContent().finish())
}
