//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O.

use pagination::{PageRequest, PageRequestError};
use serde_json::json;

use crate::domain::{
    AccountService, CatalogueService, Error, RecipeService, ShoppingListService,
    SubscriptionService,
};

/// Default number of rows per page when `limit` is absent.
pub const DEFAULT_PAGE_SIZE: u32 = 6;
/// Largest accepted `limit`.
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;
/// Prefix joined with stored image paths.
pub const DEFAULT_MEDIA_URL: &str = "/media/";

/// Parameter object bundling the domain services used by handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: AccountService,
    pub catalogue: CatalogueService,
    pub recipes: RecipeService,
    pub subscriptions: SubscriptionService,
    pub shopping_list: ShoppingListService,
}

/// Presentation settings resolved at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub media_url: String,
    pub page_size: u32,
    pub max_page_size: u32,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            media_url: DEFAULT_MEDIA_URL.to_owned(),
            page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: AccountService,
    pub catalogue: CatalogueService,
    pub recipes: RecipeService,
    pub subscriptions: SubscriptionService,
    pub shopping_list: ShoppingListService,
    pub settings: HttpSettings,
}

impl HttpState {
    /// Assemble the state from services and settings.
    pub fn new(ports: HttpStatePorts, settings: HttpSettings) -> Self {
        let HttpStatePorts {
            accounts,
            catalogue,
            recipes,
            subscriptions,
            shopping_list,
        } = ports;
        Self {
            accounts,
            catalogue,
            recipes,
            subscriptions,
            shopping_list,
            settings,
        }
    }

    /// Validate `page` and `limit` against the configured sizes.
    pub fn page_request(&self, page: Option<&str>, limit: Option<&str>) -> Result<PageRequest, Error> {
        PageRequest::parse(
            page,
            limit,
            self.settings.page_size,
            self.settings.max_page_size,
        )
        .map_err(page_error)
    }

    /// Public link for a stored image path, e.g. `/media/recipes/images/a.png`.
    pub fn media_link(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.settings.media_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn page_error(err: PageRequestError) -> Error {
    let field = match err {
        PageRequestError::InvalidPage => "page",
        PageRequestError::InvalidLimit { .. } => "limit",
    };
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": field,
        "code": "invalid",
    }))
}
