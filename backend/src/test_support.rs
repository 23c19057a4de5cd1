//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is compiled for tests and behind the
//! `test-support` feature.

pub mod cap_fs {
    //! Capability-safe filesystem helpers for tests.
    //!
    //! The backend avoids direct `std::fs` calls. These helpers provide the
    //! few read/write/existence operations test suites need on top of
    //! `cap_std::fs::Dir`.

    use std::ffi::OsString;
    use std::io;
    use std::path::Path;

    use cap_std::{ambient_authority, fs::Dir};

    /// Write bytes to a file through `cap_std`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use backend::test_support::cap_fs::{path_exists, write_file};
    ///
    /// let path = std::env::temp_dir().join("cap-fs-write-example.csv");
    /// write_file(&path, b"salt,g\n")?;
    /// assert!(path_exists(&path));
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn write_file(path: &Path, contents: &[u8]) -> io::Result<()> {
        let (parent, file_name) = parent_and_file_name(path)?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
        directory.write(Path::new(&file_name), contents)
    }

    /// Read a whole file through `cap_std`.
    pub fn read_file(path: &Path) -> io::Result<Vec<u8>> {
        let (parent, file_name) = parent_and_file_name(path)?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
        directory.read(Path::new(&file_name))
    }

    /// Return true when `path` exists, false when it does not.
    pub fn path_exists(path: &Path) -> bool {
        let Ok((parent, file_name)) = parent_and_file_name(path) else {
            return false;
        };
        let Ok(directory) = Dir::open_ambient_dir(parent, ambient_authority()) else {
            return false;
        };
        directory.exists(Path::new(&file_name))
    }

    fn parent_and_file_name(path: &Path) -> io::Result<(&Path, OsString)> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "path must include a file or directory name",
            )
        })?;
        Ok((parent, file_name.to_os_string()))
    }
}

mod in_memory;

pub use in_memory::InMemoryStore;

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{
    AccountService, CatalogueService, Ingredient, LoginCredentials, NewIngredient, NewPassword,
    NewTag, NewUserProfile, RecipeService, RecipeServicePorts, ShoppingListService,
    SubscriptionService, Tag, User,
};
use crate::inbound::http::api_scope;
use crate::inbound::http::state::{HttpSettings, HttpState, HttpStatePorts};
use crate::middleware::Trace;
use crate::outbound::document::ShoppingListDocuments;

/// Password used by [`register_with_token`].
pub const TEST_PASSWORD: &str = "correct-horse-7";

/// Clock frozen at 2024-06-01T09:30:00Z.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedClock;

impl FixedClock {
    /// The frozen instant.
    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0)
            .single()
            .unwrap_or_default()
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        Self::now().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        Self::now()
    }
}

/// Wire the real services over a fresh [`InMemoryStore`].
pub fn in_memory_ports(store: &InMemoryStore, clock: Arc<dyn Clock>) -> HttpStatePorts {
    let shared = Arc::new(store.clone());
    HttpStatePorts {
        accounts: AccountService::new(shared.clone(), shared.clone(), shared.clone()),
        catalogue: CatalogueService::new(shared.clone(), shared.clone()),
        recipes: RecipeService::new(
            RecipeServicePorts {
                recipes: shared.clone(),
                marks: shared.clone(),
                tags: shared.clone(),
                ingredients: shared.clone(),
                images: shared.clone(),
            },
            clock,
        ),
        subscriptions: SubscriptionService::new(shared.clone(), shared.clone(), shared.clone()),
        shopping_list: ShoppingListService::new(shared, Arc::new(ShoppingListDocuments)),
    }
}

/// HTTP state backed by an in-memory store with default settings.
pub fn in_memory_http_state() -> (HttpState, InMemoryStore) {
    let store = InMemoryStore::new();
    let ports = in_memory_ports(&store, Arc::new(FixedClock));
    (HttpState::new(ports, HttpSettings::default()), store)
}

/// App serving the `/api` scope over `state`, wrapped in [`Trace`].
pub fn api_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .service(api_scope())
}

/// Register a user with [`TEST_PASSWORD`] and log them in.
///
/// Panics on failure; intended for test set-up only.
pub async fn register_with_token(state: &HttpState, email: &str) -> (User, String) {
    let local = email.split('@').next().unwrap_or("cook");
    let profile = NewUserProfile::try_from_parts(email, local, "Test", "Cook")
        .unwrap_or_else(|err| panic!("fixture profile: {err}"));
    let password =
        NewPassword::new(TEST_PASSWORD).unwrap_or_else(|err| panic!("fixture password: {err}"));
    let user = state
        .accounts
        .register(profile, password)
        .await
        .unwrap_or_else(|err| panic!("register {email}: {err}"));
    let credentials = LoginCredentials::try_from_parts(email, TEST_PASSWORD)
        .unwrap_or_else(|err| panic!("fixture credentials: {err}"));
    let token = state
        .accounts
        .issue_token(credentials)
        .await
        .unwrap_or_else(|err| panic!("login {email}: {err}"));
    (user, token.expose().to_owned())
}

/// Seed a tag; panics on invalid input.
pub fn seed_tag(store: &InMemoryStore, name: &str, color: &str, slug: &str) -> Tag {
    let tag = NewTag::try_from_parts(name, color, slug)
        .unwrap_or_else(|err| panic!("fixture tag: {err}"));
    store
        .insert_tag(tag)
        .unwrap_or_else(|err| panic!("seed tag: {err}"))
}

/// Seed an ingredient; panics on invalid input.
pub fn seed_ingredient(store: &InMemoryStore, name: &str, unit: &str) -> Ingredient {
    let ingredient = NewIngredient::try_from_parts(name, unit)
        .unwrap_or_else(|err| panic!("fixture ingredient: {err}"));
    store
        .insert_ingredient(ingredient)
        .unwrap_or_else(|err| panic!("seed ingredient: {err}"))
}

/// One-pixel GIF accepted as a recipe image.
pub const GIF_DATA_URI: &str = "data:image/gif;base64,R0lGODlhAQABAAAAACw=";
