//! Application state shared across handlers.

use std::sync::Arc;

use crate::cart::CartStore;
use crate::cart::storage::CartStorage;
use crate::config::StorefrontConfig;
use crate::shopify::StorefrontClient;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; owns the Shopify client and the process-wide
/// cart store for the process lifetime.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    storefront: StorefrontClient,
    cart: CartStore,
}

impl AppState {
    /// Create the application state: build the Shopify client and hydrate
    /// the cart store from durable storage.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let storefront = StorefrontClient::new(&config.shopify);
        let storage = CartStorage::new(config.cart_state_dir.clone());
        let cart = CartStore::hydrate(storefront.clone(), storage);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                storefront,
                cart,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Shopify Storefront API client.
    #[must_use]
    pub fn storefront(&self) -> &StorefrontClient {
        &self.inner.storefront
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }
}
