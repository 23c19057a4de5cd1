//! Builders wiring the Diesel repositories and local adapters into
//! [`HttpState`].

use std::sync::Arc;

use mockable::DefaultClock;

use backend::domain::{
    AccountService, CatalogueService, RecipeService, RecipeServicePorts, ShoppingListService,
    SubscriptionService,
};
use backend::inbound::http::state::{HttpState, HttpStatePorts};
use backend::outbound::document::ShoppingListDocuments;
use backend::outbound::media::FilesystemImageStore;
use backend::outbound::persistence::{
    DbPool, DieselAuthTokenRepository, DieselIngredientRepository, DieselRecipeMarkRepository,
    DieselRecipeRepository, DieselShoppingListRepository, DieselSubscriptionRepository,
    DieselTagRepository, DieselUserRepository,
};

use super::ServerConfig;

/// Repository adapters sharing one pool.
struct Repositories {
    users: Arc<DieselUserRepository>,
    subscriptions: Arc<DieselSubscriptionRepository>,
    recipes: Arc<DieselRecipeRepository>,
    tags: Arc<DieselTagRepository>,
    ingredients: Arc<DieselIngredientRepository>,
}

impl Repositories {
    fn new(pool: &DbPool) -> Self {
        Self {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            subscriptions: Arc::new(DieselSubscriptionRepository::new(pool.clone())),
            recipes: Arc::new(DieselRecipeRepository::new(pool.clone())),
            tags: Arc::new(DieselTagRepository::new(pool.clone())),
            ingredients: Arc::new(DieselIngredientRepository::new(pool.clone())),
        }
    }
}

fn build_ports(pool: &DbPool, images: FilesystemImageStore) -> HttpStatePorts {
    let repos = Repositories::new(pool);
    HttpStatePorts {
        accounts: AccountService::new(
            repos.users.clone(),
            Arc::new(DieselAuthTokenRepository::new(pool.clone())),
            repos.subscriptions.clone(),
        ),
        catalogue: CatalogueService::new(repos.tags.clone(), repos.ingredients.clone()),
        recipes: RecipeService::new(
            RecipeServicePorts {
                recipes: repos.recipes.clone(),
                marks: Arc::new(DieselRecipeMarkRepository::new(pool.clone())),
                tags: repos.tags,
                ingredients: repos.ingredients,
                images: Arc::new(images),
            },
            Arc::new(DefaultClock),
        ),
        subscriptions: SubscriptionService::new(repos.users, repos.subscriptions, repos.recipes),
        shopping_list: ShoppingListService::new(
            Arc::new(DieselShoppingListRepository::new(pool.clone())),
            Arc::new(ShoppingListDocuments),
        ),
    }
}

/// Build the handler state for a configured server.
///
/// # Errors
/// Fails when the media root cannot be created or opened.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let images = FilesystemImageStore::open(&config.media_root)?;
    Ok(HttpState::new(
        build_ports(&config.db_pool, images),
        config.http.clone(),
    ))
}
