//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `VITRINE_BASE_URL` - Origin of the storefront backend
//!
//! ## Optional
//! - `VITRINE_UNDO_WINDOW_SECS` - Undo window for explicit deletes (default: 7)
//! - `VITRINE_CSRF_COOKIE` - Name of the readable anti-forgery cookie
//!   (default: csrftoken)

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::remote::{Endpoint, EndpointTemplate};

/// Default undo window for explicit deletes, in seconds.
pub const DEFAULT_UNDO_WINDOW_SECS: u64 = 7;

/// Default name of the readable anti-forgery cookie.
pub const DEFAULT_CSRF_COOKIE: &str = "csrftoken";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin of the storefront backend; endpoints are resolved against it.
    pub base_url: Url,
    /// How long an explicit delete stays reversible.
    pub undo_window: Duration,
    /// Name of the cookie the anti-forgery token is read from.
    pub csrf_cookie: String,
    /// Remote endpoint paths.
    pub endpoints: EndpointConfig,
}

/// Remote endpoint paths, relative to the base URL.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Add a variant to the cart.
    pub cart_add: Endpoint,
    /// Update one cart line; `{id}` is the line key.
    pub cart_update: EndpointTemplate,
    /// Remove one cart line; `{id}` is the line key.
    pub cart_remove: EndpointTemplate,
    /// Reverse a removal given a server undo token.
    pub cart_undo: Endpoint,
    /// Toggle one wishlist entry; `{id}` is the product key.
    pub wishlist_toggle: EndpointTemplate,
    /// Move the whole wishlist into the cart.
    pub wishlist_bulk: Endpoint,
    /// Apply or clear a promo code.
    pub promo: Endpoint,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            cart_add: Endpoint::new("/cart/items/"),
            cart_update: EndpointTemplate::new("/cart/items/{id}/update/"),
            cart_remove: EndpointTemplate::new("/cart/items/{id}/remove/"),
            cart_undo: Endpoint::new("/cart/undo/"),
            wishlist_toggle: EndpointTemplate::new("/wishlist/{id}/toggle/"),
            wishlist_bulk: Endpoint::new("/wishlist/move-all/"),
            promo: Endpoint::new("/checkout/promo/"),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = get_required_env("VITRINE_BASE_URL")?
            .parse::<Url>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("VITRINE_BASE_URL".to_owned(), e.to_string())
            })?;

        let undo_window_secs = get_env_or_default(
            "VITRINE_UNDO_WINDOW_SECS",
            &DEFAULT_UNDO_WINDOW_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("VITRINE_UNDO_WINDOW_SECS".to_owned(), e.to_string())
        })?;

        let csrf_cookie = get_env_or_default("VITRINE_CSRF_COOKIE", DEFAULT_CSRF_COOKIE);

        Ok(Self {
            base_url,
            undo_window: Duration::from_secs(undo_window_secs),
            csrf_cookie,
            endpoints: EndpointConfig::default(),
        })
    }

    /// Build a configuration directly, for tests and embedded hosts.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not a valid URL.
    pub fn for_base_url(base_url: &str) -> Result<Self, ConfigError> {
        let base_url = base_url.parse::<Url>().map_err(|e| {
            ConfigError::InvalidEnvVar("base_url".to_owned(), e.to_string())
        })?;
        Ok(Self {
            base_url,
            undo_window: Duration::from_secs(DEFAULT_UNDO_WINDOW_SECS),
            csrf_cookie: DEFAULT_CSRF_COOKIE.to_owned(),
            endpoints: EndpointConfig::default(),
        })
    }
}

/// Get a required environment variable.
fn get_required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_owned()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}
