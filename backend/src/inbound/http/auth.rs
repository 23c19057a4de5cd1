//! Token authentication extractors.
//!
//! Clients send `Authorization: Token <key>`. Handlers take [`Viewer`] when
//! anonymous access is allowed and [`Authenticated`] when it is not, so the
//! credential checks stay out of the request/response mapping.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::domain::{Error, User, UserId};

use super::state::HttpState;

const TOKEN_SCHEME: &str = "token";

/// Extract the raw key from an `Authorization` header value.
///
/// `Ok(None)` means the header uses another scheme and is ignored.
fn token_key(header: &str) -> Result<Option<&str>, Error> {
    let mut parts = header.split_whitespace();
    let Some(scheme) = parts.next() else {
        return Ok(None);
    };
    if !scheme.eq_ignore_ascii_case(TOKEN_SCHEME) {
        return Ok(None);
    }
    match (parts.next(), parts.next()) {
        (Some(key), None) => Ok(Some(key)),
        (None, _) => Err(Error::unauthorized(
            "invalid token header: no credentials provided",
        )),
        (Some(_), Some(_)) => Err(Error::unauthorized(
            "invalid token header: token string should not contain spaces",
        )),
    }
}

async fn resolve(req: HttpRequest) -> Result<Option<User>, Error> {
    let Some(value) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };
    let header = value
        .to_str()
        .map_err(|_| Error::unauthorized("invalid token header: not valid text"))?;
    let Some(key) = token_key(header)? else {
        return Ok(None);
    };
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    let user = state.accounts.authenticate_token(key).await?;
    debug!(user_id = %user.id, "request authenticated");
    Ok(Some(user))
}

/// The requester, possibly anonymous.
#[derive(Debug, Clone, Default)]
pub struct Viewer(Option<User>);

impl Viewer {
    /// A requester without credentials.
    pub fn anonymous() -> Self {
        Self(None)
    }

    /// The authenticated user, if any.
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    /// Id of the authenticated user, if any.
    pub fn id(&self) -> Option<UserId> {
        self.0.as_ref().map(|user| user.id)
    }

    /// Require an authenticated user or return `401 Unauthorized`.
    pub fn require(self) -> Result<User, Error> {
        self.0
            .ok_or_else(|| Error::unauthorized("authentication credentials were not provided"))
    }
}

impl FromRequest for Viewer {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { resolve(req).await.map(Viewer) })
    }
}

/// An authenticated requester; anonymous requests are rejected with 401.
#[derive(Debug, Clone)]
pub struct Authenticated(pub User);

impl Authenticated {
    /// Id of the authenticated user.
    pub fn id(&self) -> UserId {
        self.0.id
    }
}

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { resolve(req).await.map(Viewer)?.require().map(Authenticated) })
    }
}
