//! Shopify Storefront API client.
//!
//! # Architecture
//!
//! - Hand-authored GraphQL documents sent over `reqwest`, parsed through the
//!   `graphql_client` request/response envelope
//! - Shopify is source of truth for catalog data - no local sync, no caching
//! - Stateless: no retries, no backoff - errors propagate to the caller
//!
//! # Example
//!
//! ```rust,ignore
//! use marigold_storefront::shopify::StorefrontClient;
//!
//! let client = StorefrontClient::new(&config.shopify);
//!
//! // Get a product
//! let product = client.get_product_by_handle("my-product").await?;
//!
//! // Create a checkout from cart lines
//! let checkout = client.create_checkout(vec![CheckoutLineItem {
//!     variant_id: product.variants[0].id.clone(),
//!     quantity: 1,
//! }]).await?;
//! ```

mod storefront;
pub mod types;

pub use storefront::StorefrontClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with the Shopify Storefront API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify. Never retried here - callers decide.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// User error from mutation (e.g., invalid variant id).
    #[error("User error: {0}")]
    UserError(String),

    /// Pagination loop exceeded the page cap without a final page.
    #[error("Pagination exceeded {0} pages")]
    PaginationLimit(usize),
}

/// A GraphQL error returned by the Shopify API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Path to the error in the response, dot-joined for display.
    pub path: Vec<String>,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .map(|e| {
            if e.path.is_empty() {
                e.message.clone()
            } else {
                format!("{} (path: {})", e.message, e.path.join("."))
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}
