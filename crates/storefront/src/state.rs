//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::{ApiError, HolycatClient};
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the backend client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: HolycatClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let api = HolycatClient::new(&config.api, config.product_cache_ttl)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, api }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the HolyCat backend client.
    #[must_use]
    pub fn api(&self) -> &HolycatClient {
        &self.inner.api
    }
}
