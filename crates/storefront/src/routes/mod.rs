//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Catalog
//! GET  /collections            - Collection listing
//! GET  /collections/{handle}   - Collection detail
//! GET  /products/{handle}      - Product detail
//! GET  /search?q=term          - Search results
//!
//! # Cart
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart
//! POST /cart/update            - Update quantity (0 removes the line)
//! POST /cart/remove            - Remove item
//! POST /cart/clear             - Empty cart and discard checkout
//!
//! # Checkout
//! GET  /checkout               - Redirect to the hosted Shopify checkout
//! ```

pub mod cart;
pub mod collections;
pub mod home;
pub mod products;
pub mod search;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the collection routes router.
pub fn collection_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(collections::index))
        .route("/{handle}", get(collections::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Product routes
        .route("/products/{handle}", get(products::show))
        // Collection routes
        .nest("/collections", collection_routes())
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout redirect
        .route("/checkout", get(cart::checkout))
        // Search
        .route("/search", get(search::show))
}
