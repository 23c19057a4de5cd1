//! Server settings loaded via OrthoConfig and the configuration handed to
//! [`super::create_server`].

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use ortho_config::OrthoConfig;
use serde::Deserialize;

use backend::inbound::http::state::{
    DEFAULT_MAX_PAGE_SIZE, DEFAULT_MEDIA_URL, DEFAULT_PAGE_SIZE, HttpSettings,
};
use backend::outbound::persistence::DbPool;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MEDIA_ROOT: &str = "media";

/// Settings layered from CLI flags, `FOODGRAM_*` variables and config files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FOODGRAM")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string; the server refuses to start without it.
    pub database_url: Option<String>,
    /// Directory holding uploaded recipe images.
    pub media_root: Option<PathBuf>,
    /// Public prefix under which the reverse proxy serves `media_root`.
    pub media_url: Option<String>,
    /// Page size used when a request omits `limit`.
    pub page_size: Option<u32>,
    /// Largest accepted `limit`.
    pub max_page_size: Option<u32>,
    /// Apply pending migrations before accepting traffic. Defaults to on.
    pub run_migrations: Option<bool>,
}

/// Invalid or missing settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("database_url is required (set FOODGRAM_DATABASE_URL)")]
    MissingDatabaseUrl,
    #[error("bind_addr `{value}` is not a socket address: {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("page_size must be between 1 and max_page_size ({max})")]
    PageSize { max: u32 },
}

impl ServerSettings {
    /// Listen address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// PostgreSQL URL; required and non-blank.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// Whether pending migrations run at start-up; on unless disabled.
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    /// Directory recipe images are written under.
    pub fn media_root(&self) -> &Path {
        self.media_root
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_MEDIA_ROOT))
    }

    /// Settings the HTTP handlers read, validated against each other.
    pub fn http_settings(&self) -> Result<HttpSettings, SettingsError> {
        let max_page_size = self.max_page_size.unwrap_or(DEFAULT_MAX_PAGE_SIZE);
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 || page_size > max_page_size {
            return Err(SettingsError::PageSize { max: max_page_size });
        }
        Ok(HttpSettings {
            media_url: self
                .media_url
                .clone()
                .unwrap_or_else(|| DEFAULT_MEDIA_URL.to_owned()),
            page_size,
            max_page_size,
        })
    }
}

/// Everything the composition root needs to start serving.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) media_root: PathBuf,
    pub(crate) http: HttpSettings,
}

impl ServerConfig {
    /// Config with default handler settings.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, db_pool: DbPool, media_root: PathBuf) -> Self {
        Self {
            bind_addr,
            db_pool,
            media_root,
            http: HttpSettings::default(),
        }
    }

    /// Override the handler settings.
    #[must_use]
    pub fn with_http_settings(mut self, http: HttpSettings) -> Self {
        self.http = http;
        self
    }

    /// Address the server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
