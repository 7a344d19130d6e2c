//! Shared fixtures and helpers for Marigold integration tests.
//!
//! Tests stand up a `wiremock` server per test and point a
//! [`StorefrontClient`] at it, so no real network traffic is made. Mocks
//! match on the GraphQL `operationName`, which the client sends with every
//! document.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::Path;

use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::MockServer;

use marigold_core::{CurrencyCode, Price};
use marigold_storefront::cart::storage::CartStorage;
use marigold_storefront::cart::{CartStore, NewCartLine};
use marigold_storefront::shopify::StorefrontClient;

/// Path the mock GraphQL endpoint is served under.
pub const GRAPHQL_PATH: &str = "/api/2024-04/graphql.json";

/// Builds a `StorefrontClient` against a mock server's URI.
#[must_use]
pub fn test_client(server_uri: &str) -> StorefrontClient {
    StorefrontClient::with_endpoint(
        format!("{server_uri}{GRAPHQL_PATH}"),
        SecretString::from("shpat_test_token_0123456789"),
    )
}

/// Wraps response data in the GraphQL envelope.
#[must_use]
pub fn graphql_data(data: Value) -> Value {
    json!({ "data": data })
}

/// A product summary node as returned by list reads.
#[must_use]
pub fn product_node(id: &str, title: &str, handle: &str, amount: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "handle": handle,
        "description": format!("{title} description"),
        "priceRange": {
            "minVariantPrice": { "amount": amount, "currencyCode": "INR" }
        },
        "images": {
            "edges": [
                { "node": { "url": format!("https://cdn.shopify.com/{handle}.png"), "altText": title } }
            ]
        }
    })
}

/// A collection node as returned by the collection list read.
#[must_use]
pub fn collection_node(id: &str, title: &str, handle: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "handle": handle,
        "image": { "url": format!("https://cdn.shopify.com/{handle}.png"), "altText": title }
    })
}

/// One page of a paginated connection.
#[must_use]
pub fn connection_page(nodes: Vec<Value>, has_next_page: bool, end_cursor: Option<&str>) -> Value {
    json!({
        "edges": nodes.into_iter().map(|node| json!({ "node": node })).collect::<Vec<_>>(),
        "pageInfo": {
            "hasNextPage": has_next_page,
            "endCursor": end_cursor
        }
    })
}

/// A checkout as returned by the checkout mutations.
#[must_use]
pub fn checkout_json(id: &str) -> Value {
    json!({
        "id": format!("gid://shopify/Checkout/{id}"),
        "webUrl": format!("https://marigold.myshopify.com/checkouts/{id}")
    })
}

/// A successful `checkoutCreate` response body.
#[must_use]
pub fn checkout_create_response(id: &str) -> Value {
    graphql_data(json!({
        "checkoutCreate": {
            "checkout": checkout_json(id),
            "checkoutUserErrors": []
        }
    }))
}

/// A successful `checkoutLineItemsReplace` response body.
#[must_use]
pub fn checkout_replace_response(id: &str) -> Value {
    graphql_data(json!({
        "checkoutLineItemsReplace": {
            "checkout": checkout_json(id),
            "userErrors": []
        }
    }))
}

/// A cart store backed by a mock server and a temporary state directory.
#[must_use]
pub fn test_store(server_uri: &str, state_dir: &Path) -> CartStore {
    CartStore::hydrate(test_client(server_uri), CartStorage::new(state_dir))
}

/// A cart line input priced at 199.00 INR per unit.
#[must_use]
pub fn new_line(variant_id: &str, quantity: u32) -> NewCartLine {
    NewCartLine {
        variant_id: variant_id.to_string(),
        title: format!("Product {variant_id}"),
        handle: format!("product-{variant_id}"),
        image_url: None,
        unit_price: Price::new(Decimal::new(19900, 2), CurrencyCode::INR),
        quantity,
    }
}

/// The parsed bodies of every request the server received for an operation.
///
/// # Panics
///
/// Panics if the server was started with request recording disabled.
pub async fn requests_for(server: &MockServer, operation: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .expect("request recording is enabled by default")
        .iter()
        .filter_map(|request| serde_json::from_slice::<Value>(&request.body).ok())
        .filter(|body| body["operationName"] == operation)
        .collect()
}
