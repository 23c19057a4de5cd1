//! Registration, token login and profile reads.

use std::sync::Arc;

use pagination::{Page, PageRequest};
use tracing::{debug, info};

use super::ports::{AuthTokenRepository, PersistenceError, SubscriptionRepository, UserRepository};
use super::validation_errors::field_error;
use super::{
    AuthToken, Error, LoginCredentials, NewPassword, NewUserProfile, PasswordHash, TokenDigest,
    User, UserId, UserProfile,
};

const BAD_CREDENTIALS: &str = "unable to log in with the provided credentials";

/// Account use-cases over the user, token and subscription ports.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn AuthTokenRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
}

async fn hash_password(password: NewPassword) -> Result<PasswordHash, Error> {
    tokio::task::spawn_blocking(move || PasswordHash::create(&password))
        .await
        .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
        .map_err(|err| Error::internal(err.to_string()))
}

async fn verify_password(hash: PasswordHash, candidate: String) -> Result<bool, Error> {
    tokio::task::spawn_blocking(move || hash.verify(&candidate))
        .await
        .map_err(|err| Error::internal(format!("password verification task failed: {err}")))
}

fn email_taken() -> Error {
    field_error("email", "unique", "a user with this email already exists")
}

impl AccountService {
    /// Build the service from the user, token and clock ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn AuthTokenRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
    ) -> Self {
        Self {
            users,
            tokens,
            subscriptions,
        }
    }

    /// Create an account. Duplicate e-mail addresses are rejected with 400.
    pub async fn register(
        &self,
        profile: NewUserProfile,
        password: NewPassword,
    ) -> Result<User, Error> {
        if self.users.find_by_email(&profile.email).await?.is_some() {
            return Err(email_taken());
        }
        let hash = hash_password(password).await?;
        let user = self
            .users
            .create(&profile, &hash)
            .await
            .map_err(|err| match err {
                PersistenceError::Conflict { .. } => email_taken(),
                other => other.into(),
            })?;
        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Check credentials and issue a fresh token, replacing any previous one.
    pub async fn issue_token(&self, credentials: LoginCredentials) -> Result<AuthToken, Error> {
        let Some(stored) = self
            .users
            .find_credentials_by_email(credentials.email())
            .await?
        else {
            debug!("login attempt for unknown email");
            return Err(field_error("non_field_errors", "invalid_credentials", BAD_CREDENTIALS));
        };
        if !verify_password(stored.password_hash, credentials.password().to_owned()).await? {
            debug!(user_id = %stored.user.id, "login attempt with wrong password");
            return Err(field_error("non_field_errors", "invalid_credentials", BAD_CREDENTIALS));
        }
        let token = AuthToken::generate();
        self.tokens.store(stored.user.id, &token.digest()).await?;
        info!(user_id = %stored.user.id, "token issued");
        Ok(token)
    }

    /// Log out: revoke every token issued to `user`.
    pub async fn revoke_token(&self, user: UserId) -> Result<(), Error> {
        self.tokens.revoke(user).await?;
        info!(user_id = %user, "token revoked");
        Ok(())
    }

    /// Resolve a raw `Authorization: Token` value to its owner.
    pub async fn authenticate_token(&self, raw: &str) -> Result<User, Error> {
        self.tokens
            .find_user(&TokenDigest::of(raw))
            .await?
            .ok_or_else(|| Error::unauthorized("invalid token"))
    }

    /// Profile of the authenticated user.
    pub async fn current_user(&self, id: UserId) -> Result<UserProfile, Error> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::unauthorized("user no longer exists"))?;
        Ok(UserProfile {
            user,
            is_subscribed: false,
        })
    }

    /// One user, with `is_subscribed` computed for `viewer`.
    pub async fn get_user(&self, viewer: Option<UserId>, id: UserId) -> Result<UserProfile, Error> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))?;
        let mut profiles = self.profiles(viewer, vec![user]).await?;
        profiles
            .pop()
            .ok_or_else(|| Error::internal("profile lookup lost a user"))
    }

    /// Page of users, with `is_subscribed` computed for `viewer`.
    pub async fn list_users(
        &self,
        viewer: Option<UserId>,
        page: &PageRequest,
    ) -> Result<Page<UserProfile>, Error> {
        let users = self.users.list(page).await?;
        let total = users.total;
        let profiles = self.profiles(viewer, users.items).await?;
        Ok(Page::new(profiles, total))
    }

    /// Change the password after checking the current one.
    pub async fn set_password(
        &self,
        user: UserId,
        current_password: &str,
        new_password: NewPassword,
    ) -> Result<(), Error> {
        let stored = self
            .users
            .find_password_hash(user)
            .await?
            .ok_or_else(|| Error::unauthorized("user no longer exists"))?;
        if !verify_password(stored, current_password.to_owned()).await? {
            return Err(field_error(
                "current_password",
                "invalid_password",
                "current password is incorrect",
            ));
        }
        let hash = hash_password(new_password).await?;
        if !self.users.set_password(user, &hash).await? {
            return Err(Error::unauthorized("user no longer exists"));
        }
        info!(user_id = %user, "password changed");
        Ok(())
    }

    /// Attach `is_subscribed` for `viewer` to each user.
    pub(crate) async fn profiles(
        &self,
        viewer: Option<UserId>,
        users: Vec<User>,
    ) -> Result<Vec<UserProfile>, Error> {
        let followed = match viewer {
            Some(viewer) if !users.is_empty() => {
                let ids: Vec<UserId> = users.iter().map(|user| user.id).collect();
                self.subscriptions.subscribed_among(viewer, &ids).await?
            }
            _ => Default::default(),
        };
        Ok(users
            .into_iter()
            .map(|user| UserProfile {
                is_subscribed: followed.contains(&user.id),
                user,
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
