//! Client configuration

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use rusty_money::iso::{self, Currency};
use thiserror::Error;

use crate::{
    gateway::{GatewayError, HttpCartGateway},
    storage::{FileStore, KeyValueStore},
};

/// Errors raised while resolving configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The currency code is not an ISO 4217 code.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Storefront client configuration
#[derive(Debug, Clone, Parser)]
#[command(name = "stemcart", about = "STEM storefront cart client", long_about = None)]
pub struct ClientConfig {
    /// Catalog API base URL
    #[arg(long, env = "CATALOG_API_URL", default_value = "http://localhost:8080/api")]
    pub api_url: String,

    /// Catalog API request timeout in seconds
    #[arg(long, env = "CATALOG_API_TIMEOUT_SECS", default_value_t = 10_u64)]
    pub api_timeout_secs: u64,

    /// ISO 4217 code prices are expressed in
    #[arg(long, env = "CART_CURRENCY", default_value = "USD")]
    pub currency: String,

    /// Directory holding favourites and the auth token
    #[arg(long, env = "STORE_DIR", default_value = ".stemcart")]
    pub store_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Cart lines requested per page
    #[arg(long, env = "CART_PAGE_SIZE", default_value_t = 10_u32)]
    pub page_size: u32,
}

impl ClientConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// The configured currency.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is not a known ISO 4217 code.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        let code = self.currency.trim().to_ascii_uppercase();

        iso::find(&code).ok_or(ConfigError::UnknownCurrency(code))
    }

    /// Request timeout for the catalog API.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }

    /// File-backed store rooted at the configured directory.
    #[must_use]
    pub fn file_store(&self) -> FileStore {
        FileStore::new(&self.store_dir)
    }

    /// HTTP gateway for the configured API, reading its token from `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn http_gateway<S: KeyValueStore>(
        &self,
        store: Arc<S>,
    ) -> Result<HttpCartGateway<S>, GatewayError> {
        HttpCartGateway::new(&self.api_url, self.timeout(), store)
    }
}
