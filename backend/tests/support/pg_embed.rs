//! Embedded PostgreSQL harness for the Diesel repository suites.
//!
//! Each suite gets its own migrated temporary database on a freshly
//! bootstrapped cluster. Set `SKIP_TEST_CLUSTER=1` to skip the suites where
//! the cluster cannot start; otherwise a setup failure panics so CI breakage
//! is not masked.
//!
//! `pg-embed-setup-unpriv` defaults to `/var/tmp` for its installation and
//! data directories. When `PG_RUNTIME_DIR` or `PG_DATA_DIR` is missing, both
//! are pointed at unique directories under the target directory for the
//! duration of the bootstrap.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use backend::domain::ports::{
    IngredientRepository, RecipeRepository, TagRepository, UserRepository,
};
use backend::domain::{
    Amount, CookingTime, Ingredient, IngredientAmount, NewIngredient, NewPassword, NewRecipe,
    NewTag, NewUserProfile, PasswordHash, RecipeId, Tag, User,
};
use backend::outbound::persistence::{
    DbPool, DieselIngredientRepository, DieselRecipeRepository, DieselTagRepository,
    DieselUserRepository, PoolConfig, run_pending_migrations,
};
use chrono::{DateTime, TimeZone, Utc};
use pg_embedded_setup_unpriv::{TemporaryDatabase, TestCluster};
use tokio::runtime::Runtime;
use uuid::Uuid;

static PG_EMBED_BOOTSTRAP_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Maximum number of retry attempts for transient network errors.
const MAX_RETRIES: u32 = 3;

/// Base delay between retry attempts (doubles with each retry).
const RETRY_DELAY_MS: u64 = 500;

const SEED_PASSWORD: &str = "correct-horse-7";

fn pg_embed_target_dir() -> PathBuf {
    if let Some(target_dir) = std::env::var_os("CARGO_TARGET_DIR") {
        return PathBuf::from(target_dir).join("pg-embed");
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("target")
        .join("pg-embed")
}

fn create_unique_pg_embed_dirs() -> Result<(PathBuf, PathBuf), std::io::Error> {
    let unique = format!("bootstrap-{}-{}", std::process::id(), Uuid::new_v4());
    let base = pg_embed_target_dir().join(unique);
    let runtime_dir = base.join("install");
    let data_dir = base.join("data");

    std::fs::create_dir_all(&runtime_dir)?;
    std::fs::create_dir_all(&data_dir)?;

    Ok((runtime_dir, data_dir))
}

/// Returns true if the error message suggests a transient network issue.
fn is_transient_error(err: &str) -> bool {
    let transient_patterns = [
        "error decoding response body",
        "connection reset",
        "connection refused",
        "timed out",
        "temporarily unavailable",
        "dns error",
    ];

    let err_lower = err.to_lowercase();
    transient_patterns
        .iter()
        .any(|pattern| err_lower.contains(pattern))
}

/// Bootstraps a [`TestCluster`], retrying transient download failures.
pub fn test_cluster() -> Result<TestCluster, String> {
    let _bootstrap_guard = PG_EMBED_BOOTSTRAP_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let needs_override =
        std::env::var_os("PG_RUNTIME_DIR").is_none() || std::env::var_os("PG_DATA_DIR").is_none();

    let _env_guard = if needs_override {
        let (runtime_dir, data_dir) =
            create_unique_pg_embed_dirs().map_err(|err| err.to_string())?;
        Some(env_lock::lock_env([
            ("PG_RUNTIME_DIR", Some(runtime_dir.to_string_lossy().into_owned())),
            ("PG_DATA_DIR", Some(data_dir.to_string_lossy().into_owned())),
        ]))
    } else {
        None
    };

    let mut last_error = String::new();
    for attempt in 0..=MAX_RETRIES {
        match TestCluster::new() {
            Ok(cluster) => return Ok(cluster),
            Err(err) => {
                last_error = format!("{err:?}");
                if attempt < MAX_RETRIES && is_transient_error(&last_error) {
                    let delay = Duration::from_millis(RETRY_DELAY_MS * (1 << attempt));
                    eprintln!(
                        "pg-embed: transient error on attempt {}/{}, retrying in {delay:?}: {last_error}",
                        attempt + 1,
                        MAX_RETRIES + 1,
                    );
                    std::thread::sleep(delay);
                } else {
                    break;
                }
            }
        }
    }

    Err(last_error)
}

/// Returns true when `SKIP_TEST_CLUSTER` is "1", "true" or "yes".
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Prints a skip marker and returns `None` when skipping is allowed, panics
/// otherwise.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Migrated temporary database plus the runtime driving its pool.
///
/// Field order matters: the database is dropped before its cluster.
pub struct TestDatabase {
    /// Tokio runtime reused for every async call in a test.
    pub runtime: Runtime,
    pub pool: DbPool,
    _database: TemporaryDatabase,
    _cluster: TestCluster,
}

impl TestDatabase {
    /// Start a cluster, create a uniquely named database and migrate it.
    pub fn provision(prefix: &str) -> Result<Self, String> {
        let runtime = Runtime::new().map_err(|err| err.to_string())?;
        let cluster = test_cluster()?;
        let name = format!("{prefix}_{}", Uuid::new_v4().simple());
        let database = cluster
            .temporary_database(name.as_str())
            .map_err(|err| format!("{err:?}"))?;
        let url = database.url().to_string();

        runtime
            .block_on(run_pending_migrations(&url))
            .map_err(|err| err.to_string())?;
        let config = PoolConfig::new(&url)
            .with_max_size(2)
            .with_min_idle(Some(1));
        let pool = runtime
            .block_on(DbPool::new(config))
            .map_err(|err| err.to_string())?;

        Ok(Self {
            runtime,
            pool,
            _database: database,
            _cluster: cluster,
        })
    }

    /// Register an account with a fixed password.
    pub fn seed_user(&self, email: &str) -> User {
        let local = email.split('@').next().unwrap_or("cook");
        let profile =
            NewUserProfile::try_from_parts(email, local, "Test", "Cook").expect("valid profile");
        let password = NewPassword::new(SEED_PASSWORD).expect("valid password");
        let hash = PasswordHash::create(&password).expect("hash password");
        let users = DieselUserRepository::new(self.pool.clone());
        self.runtime
            .block_on(users.create(&profile, &hash))
            .expect("insert user")
    }

    pub fn seed_tag(&self, name: &str, color: &str, slug: &str) -> Tag {
        let tag = NewTag::try_from_parts(name, color, slug).expect("valid tag");
        let tags = DieselTagRepository::new(self.pool.clone());
        self.runtime.block_on(async {
            tags.insert_missing(&[tag]).await.expect("insert tag");
            tags.list()
                .await
                .expect("list tags")
                .into_iter()
                .find(|stored| stored.slug.as_ref() == slug)
                .expect("tag stored")
        })
    }

    pub fn seed_ingredient(&self, name: &str, unit: &str) -> Ingredient {
        let ingredient = NewIngredient::try_from_parts(name, unit).expect("valid ingredient");
        let ingredients = DieselIngredientRepository::new(self.pool.clone());
        self.runtime.block_on(async {
            ingredients
                .insert_missing(&[ingredient])
                .await
                .expect("insert ingredient");
            ingredients
                .search(name)
                .await
                .expect("search ingredients")
                .into_iter()
                .find(|stored| stored.name == name && stored.measurement_unit == unit)
                .expect("ingredient stored")
        })
    }

    /// Insert a recipe published `minute` minutes after a fixed epoch, so
    /// later seeds sort first.
    pub fn seed_recipe(
        &self,
        author: &User,
        name: &str,
        minute: u32,
        ingredients: &[(&Ingredient, i64)],
        tags: &[&Tag],
    ) -> RecipeId {
        let recipe = NewRecipe {
            name: name.to_owned(),
            text: "Mix and cook.".to_owned(),
            cooking_time: CookingTime::new(15).expect("valid cooking time"),
            ingredients: ingredients
                .iter()
                .map(|(ingredient, amount)| IngredientAmount {
                    ingredient: ingredient.id,
                    amount: Amount::new(ingredient.id, *amount).expect("valid amount"),
                })
                .collect(),
            tags: tags.iter().map(|tag| tag.id).collect(),
            image_path: format!("recipes/images/{name}.gif"),
            pub_date: published_at(minute),
        };
        let recipes = DieselRecipeRepository::new(self.pool.clone());
        self.runtime
            .block_on(recipes.create(author.id, &recipe))
            .expect("insert recipe")
    }
}

fn published_at(minute: u32) -> DateTime<Utc> {
    let base = Utc
        .with_ymd_and_hms(2024, 6, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp");
    base + chrono::Duration::minutes(i64::from(minute))
}
