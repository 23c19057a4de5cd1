//! Tests for the account service.

use std::collections::HashSet;
use std::sync::Arc;

use mockall::predicate::eq;
use pagination::{Page, PageRequest};
use rstest::rstest;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{
    MockAuthTokenRepository, MockSubscriptionRepository, MockUserRepository, UserCredentials,
};
use crate::domain::test_fixtures::user;

fn service(
    users: MockUserRepository,
    tokens: MockAuthTokenRepository,
    subscriptions: MockSubscriptionRepository,
) -> AccountService {
    AccountService::new(Arc::new(users), Arc::new(tokens), Arc::new(subscriptions))
}

fn profile() -> NewUserProfile {
    NewUserProfile::try_from_parts("cook1@example.com", "cook1", "Ivan", "Petrov")
        .expect("valid profile")
}

fn stored_hash(password: &str) -> PasswordHash {
    PasswordHash::create(&NewPassword::new(password).expect("valid password")).expect("hash")
}

#[tokio::test]
async fn register_creates_user_with_hashed_password() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().times(1).return_once(|_| Ok(None));
    users
        .expect_create()
        .withf(|profile, hash| {
            profile.email.as_ref() == "cook1@example.com" && hash.verify("s3cret-pass")
        })
        .times(1)
        .return_once(|_, _| Ok(user(1)));

    let svc = service(
        users,
        MockAuthTokenRepository::new(),
        MockSubscriptionRepository::new(),
    );
    let created = svc
        .register(profile(), NewPassword::new("s3cret-pass").expect("valid"))
        .await
        .expect("registration succeeds");
    assert_eq!(created.id, UserId::new(1));
}

#[tokio::test]
async fn register_rejects_taken_email() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(Some(user(1))));
    users.expect_create().never();

    let svc = service(
        users,
        MockAuthTokenRepository::new(),
        MockSubscriptionRepository::new(),
    );
    let err = svc
        .register(profile(), NewPassword::new("s3cret-pass").expect("valid"))
        .await
        .expect_err("duplicate email");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.details().and_then(|d| d.get("field")), Some(&"email".into()));
}

#[tokio::test]
async fn register_maps_unique_violation_race() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().times(1).return_once(|_| Ok(None));
    users
        .expect_create()
        .times(1)
        .return_once(|_, _| Err(PersistenceError::conflict("users_email_key")));

    let svc = service(
        users,
        MockAuthTokenRepository::new(),
        MockSubscriptionRepository::new(),
    );
    let err = svc
        .register(profile(), NewPassword::new("s3cret-pass").expect("valid"))
        .await
        .expect_err("conflict");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn issue_token_stores_digest_of_returned_token() {
    let hash = stored_hash("s3cret-pass");
    let mut users = MockUserRepository::new();
    users
        .expect_find_credentials_by_email()
        .times(1)
        .return_once(move |_| {
            Ok(Some(UserCredentials {
                user: user(7),
                password_hash: hash,
            }))
        });
    let stored = Arc::new(std::sync::Mutex::new(None));
    let sink = Arc::clone(&stored);
    let mut tokens = MockAuthTokenRepository::new();
    tokens
        .expect_store()
        .with(eq(UserId::new(7)), mockall::predicate::always())
        .times(1)
        .returning(move |_, digest| {
            *sink.lock().expect("lock") = Some(digest.clone());
            Ok(())
        });

    let svc = service(users, tokens, MockSubscriptionRepository::new());
    let creds = LoginCredentials::try_from_parts("cook7@example.com", "s3cret-pass").expect("creds");
    let token = svc.issue_token(creds).await.expect("login succeeds");
    let digest = stored.lock().expect("lock").clone();
    assert_eq!(digest, Some(TokenDigest::of(token.expose())));
}

#[rstest]
#[case::unknown_email(None)]
#[case::wrong_password(Some("other-pass"))]
#[tokio::test]
async fn issue_token_rejects_bad_credentials(#[case] stored_password: Option<&'static str>) {
    let mut users = MockUserRepository::new();
    users
        .expect_find_credentials_by_email()
        .times(1)
        .return_once(move |_| {
            Ok(stored_password.map(|password| UserCredentials {
                user: user(7),
                password_hash: stored_hash(password),
            }))
        });
    let mut tokens = MockAuthTokenRepository::new();
    tokens.expect_store().never();

    let svc = service(users, tokens, MockSubscriptionRepository::new());
    let creds = LoginCredentials::try_from_parts("cook7@example.com", "s3cret-pass").expect("creds");
    let err = svc.issue_token(creds).await.expect_err("rejected");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn authenticate_token_rejects_unknown_digest() {
    let mut tokens = MockAuthTokenRepository::new();
    tokens.expect_find_user().times(1).return_once(|_| Ok(None));

    let svc = service(
        MockUserRepository::new(),
        tokens,
        MockSubscriptionRepository::new(),
    );
    let err = svc.authenticate_token("deadbeef").await.expect_err("unknown");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn list_users_flags_followed_authors() {
    let mut users = MockUserRepository::new();
    users
        .expect_list()
        .times(1)
        .return_once(|_| Ok(Page::new(vec![user(2), user(3)], 2)));
    let mut subscriptions = MockSubscriptionRepository::new();
    subscriptions
        .expect_subscribed_among()
        .withf(|viewer, ids| *viewer == UserId::new(1) && ids.len() == 2)
        .times(1)
        .return_once(|_, _| Ok(HashSet::from([UserId::new(3)])));

    let svc = service(users, MockAuthTokenRepository::new(), subscriptions);
    let page = PageRequest::new(1, 6, 100).expect("page");
    let listed = svc
        .list_users(Some(UserId::new(1)), &page)
        .await
        .expect("list succeeds");
    let flags: Vec<bool> = listed.items.iter().map(|p| p.is_subscribed).collect();
    assert_eq!(flags, vec![false, true]);
}

#[tokio::test]
async fn anonymous_listing_skips_subscription_lookup() {
    let mut users = MockUserRepository::new();
    users
        .expect_list()
        .times(1)
        .return_once(|_| Ok(Page::new(vec![user(2)], 1)));
    let mut subscriptions = MockSubscriptionRepository::new();
    subscriptions.expect_subscribed_among().never();

    let svc = service(users, MockAuthTokenRepository::new(), subscriptions);
    let page = PageRequest::new(1, 6, 100).expect("page");
    let listed = svc.list_users(None, &page).await.expect("list succeeds");
    assert!(!listed.items[0].is_subscribed);
}

#[tokio::test]
async fn get_user_returns_not_found() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().times(1).return_once(|_| Ok(None));

    let svc = service(
        users,
        MockAuthTokenRepository::new(),
        MockSubscriptionRepository::new(),
    );
    let err = svc
        .get_user(None, UserId::new(99))
        .await
        .expect_err("missing user");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn set_password_requires_current_password() {
    let hash = stored_hash("old-password");
    let mut users = MockUserRepository::new();
    users
        .expect_find_password_hash()
        .times(1)
        .return_once(move |_| Ok(Some(hash)));
    users.expect_set_password().never();

    let svc = service(
        users,
        MockAuthTokenRepository::new(),
        MockSubscriptionRepository::new(),
    );
    let err = svc
        .set_password(
            UserId::new(1),
            "wrong-password",
            NewPassword::new("new-password").expect("valid"),
        )
        .await
        .expect_err("wrong current password");
    assert_eq!(
        err.details().and_then(|d| d.get("field")),
        Some(&"current_password".into())
    );
}

#[tokio::test]
async fn set_password_stores_new_hash() {
    let hash = stored_hash("old-password");
    let mut users = MockUserRepository::new();
    users
        .expect_find_password_hash()
        .times(1)
        .return_once(move |_| Ok(Some(hash)));
    users
        .expect_set_password()
        .withf(|id, hash| *id == UserId::new(1) && hash.verify("new-password"))
        .times(1)
        .return_once(|_, _| Ok(true));

    let svc = service(
        users,
        MockAuthTokenRepository::new(),
        MockSubscriptionRepository::new(),
    );
    svc.set_password(
        UserId::new(1),
        "old-password",
        NewPassword::new("new-password").expect("valid"),
    )
    .await
    .expect("password changed");
}
