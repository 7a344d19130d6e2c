//! Shopify Storefront API client implementation.
//!
//! Sends hand-authored GraphQL documents with `reqwest` and parses responses
//! through the `graphql_client` envelope. The client is stateless: no
//! caching, no retries, no backoff; every error propagates to the caller.

mod conversions;
pub mod queries;

use std::sync::Arc;

use graphql_client::{QueryBody, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::config::ShopifyConfig;
use crate::shopify::ShopifyError;
use crate::shopify::types::{
    Checkout, CheckoutLineItem, Collection, CollectionSummary, Page, Product, ProductSummary,
};

use conversions::{
    convert_checkout, convert_collection, convert_page, convert_product, convert_product_summary,
    join_user_errors,
};
use queries::{
    CHECKOUT_CREATE_MUTATION, CHECKOUT_LINE_ITEMS_REPLACE_MUTATION, COLLECTION_PRODUCTS_QUERY,
    COLLECTIONS_QUERY, CheckoutCreateData, CheckoutCreateInput, CheckoutCreateVariables,
    CheckoutReplaceData, CheckoutReplaceVariables, CollectionProductsData,
    CollectionProductsVariables, CollectionsData, CursorVariables, FEATURED_PRODUCTS_QUERY,
    FirstVariables, HandleVariables, PRODUCT_BY_HANDLE_QUERY, ProductByHandleData, ProductsData,
    SEARCH_PRODUCTS_QUERY, SearchVariables,
};

/// Access token header for the Storefront API.
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Storefront-Access-Token";

/// Page size for cursor-forward accumulation loops.
const PAGE_SIZE: i64 = 50;

/// Upper bound on pages an accumulation loop will fetch. A server that never
/// reports a final page must not pin the handler in the loop forever.
const MAX_PAGES: usize = 50;

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
///
/// Provides typed access to products, collections, search, and checkout
/// mutations. Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: SecretString,
}

impl StorefrontClient {
    /// Create a new Storefront API client from configuration.
    #[must_use]
    pub fn new(config: &ShopifyConfig) -> Self {
        Self::with_endpoint(config.endpoint(), config.access_token.clone())
    }

    /// Create a client against an explicit endpoint.
    ///
    /// Integration tests use this to point the client at a local mock server.
    #[must_use]
    pub fn with_endpoint(endpoint: impl Into<String>, access_token: SecretString) -> Self {
        Self {
            inner: Arc::new(StorefrontClientInner {
                client: reqwest::Client::new(),
                endpoint: endpoint.into(),
                access_token,
            }),
        }
    }

    /// Execute a GraphQL document.
    async fn execute<V, D>(
        &self,
        operation_name: &'static str,
        query: &'static str,
        variables: V,
    ) -> Result<D, ShopifyError>
    where
        V: Serialize,
        D: DeserializeOwned,
    {
        let request_body = QueryBody {
            variables,
            query,
            operation_name,
        };

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header(ACCESS_TOKEN_HEADER, self.inner.access_token.expose_secret())
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Storefront API returned non-success status"
            );
            return Err(ShopifyError::GraphQL(vec![super::GraphQLError {
                message: format!(
                    "HTTP {status}: {}",
                    response_text.chars().take(200).collect::<String>()
                ),
                path: vec![],
            }]));
        }

        let response: Response<D> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse Storefront GraphQL response"
                );
                return Err(ShopifyError::Parse(e));
            }
        };

        // Check for GraphQL errors
        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(errors = ?errors, "GraphQL errors in response");

            return Err(ShopifyError::GraphQL(
                errors
                    .into_iter()
                    .map(|e| super::GraphQLError {
                        message: e.message,
                        path: e.path.map_or_else(Vec::new, |p| {
                            p.into_iter()
                                .map(|fragment| match fragment {
                                    graphql_client::PathFragment::Key(s) => s,
                                    graphql_client::PathFragment::Index(i) => i.to_string(),
                                })
                                .collect()
                        }),
                    })
                    .collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                body = %response_text.chars().take(500).collect::<String>(),
                "Storefront GraphQL response has no data and no errors"
            );
            ShopifyError::GraphQL(vec![super::GraphQLError {
                message: "No data in response".to_string(),
                path: vec![],
            }])
        })
    }

    // =========================================================================
    // Read Operations
    // =========================================================================

    /// Get the unfiltered product list shown on the home page.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_featured_products(
        &self,
        first: i64,
    ) -> Result<Vec<ProductSummary>, ShopifyError> {
        let data = self
            .execute::<_, ProductsData>(
                "FeaturedProducts",
                FEATURED_PRODUCTS_QUERY,
                FirstVariables { first },
            )
            .await?;

        Ok(convert_page(data.products, convert_product_summary).items)
    }

    /// Get one page of the collection list.
    ///
    /// `after` is the opaque cursor from the previous page, `None` for the
    /// first page.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_collections_page(
        &self,
        first: i64,
        after: Option<String>,
    ) -> Result<Page<CollectionSummary>, ShopifyError> {
        let data = self
            .execute::<_, CollectionsData>(
                "Collections",
                COLLECTIONS_QUERY,
                CursorVariables { first, after },
            )
            .await?;

        Ok(convert_page(data.collections, convert_collection))
    }

    /// Get every collection, accumulating pages in order.
    ///
    /// Pages are fetched strictly sequentially because each cursor depends on
    /// the previous response. All-or-nothing: a failed page discards earlier
    /// pages and propagates the error.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails, or `PaginationLimit` if
    /// the server keeps reporting further pages past the cap.
    #[instrument(skip(self))]
    pub async fn get_collections(&self) -> Result<Vec<CollectionSummary>, ShopifyError> {
        let mut collections = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > MAX_PAGES {
                return Err(ShopifyError::PaginationLimit(MAX_PAGES));
            }

            let page = self.get_collections_page(PAGE_SIZE, cursor).await?;
            collections.extend(page.items);

            if !page.has_next_page {
                break;
            }
            cursor = page.end_cursor;
        }

        Ok(collections)
    }

    /// Get one page of products within a collection, plus the collection
    /// title.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the collection handle is unknown, or an error if
    /// the API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_collection_products_page(
        &self,
        handle: &str,
        first: i64,
        after: Option<String>,
    ) -> Result<(String, Page<ProductSummary>), ShopifyError> {
        let data = self
            .execute::<_, CollectionProductsData>(
                "CollectionProducts",
                COLLECTION_PRODUCTS_QUERY,
                CollectionProductsVariables {
                    handle: handle.to_string(),
                    first,
                    after,
                },
            )
            .await?;

        let collection = data
            .collection
            .ok_or_else(|| ShopifyError::NotFound(format!("Collection not found: {handle}")))?;

        Ok((
            collection.title,
            convert_page(collection.products, convert_product_summary),
        ))
    }

    /// Get a collection with all of its products, accumulating pages in
    /// order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the collection handle is unknown, an error if
    /// any page request fails, or `PaginationLimit` past the page cap.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_collection_products(&self, handle: &str) -> Result<Collection, ShopifyError> {
        let mut products = Vec::new();
        let mut title = String::new();
        let mut cursor: Option<String> = None;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > MAX_PAGES {
                return Err(ShopifyError::PaginationLimit(MAX_PAGES));
            }

            let (page_title, page) = self
                .get_collection_products_page(handle, PAGE_SIZE, cursor)
                .await?;
            title = page_title;
            products.extend(page.items);

            if !page.has_next_page {
                break;
            }
            cursor = page.end_cursor;
        }

        Ok(Collection { title, products })
    }

    /// Get a product by its handle.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product handle is unknown, or an error if
    /// the API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_product_by_handle(&self, handle: &str) -> Result<Product, ShopifyError> {
        let data = self
            .execute::<_, ProductByHandleData>(
                "ProductByHandle",
                PRODUCT_BY_HANDLE_QUERY,
                HandleVariables {
                    handle: handle.to_string(),
                },
            )
            .await?;

        let product = data
            .product
            .ok_or_else(|| ShopifyError::NotFound(format!("Product not found: {handle}")))?;

        Ok(convert_product(product))
    }

    /// Search products by term.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn search_products(
        &self,
        term: &str,
        first: i64,
    ) -> Result<Vec<ProductSummary>, ShopifyError> {
        let data = self
            .execute::<_, ProductsData>(
                "SearchProducts",
                SEARCH_PRODUCTS_QUERY,
                SearchVariables {
                    query: term.to_string(),
                    first,
                },
            )
            .await?;

        Ok(convert_page(data.products, convert_product_summary).items)
    }

    // =========================================================================
    // Checkout Mutations
    // =========================================================================

    /// Create a new checkout with the given line items.
    ///
    /// # Errors
    ///
    /// Returns `UserError` if Shopify rejects the input, or an error if the
    /// API request fails.
    #[instrument(skip(self, line_items))]
    pub async fn create_checkout(
        &self,
        line_items: Vec<CheckoutLineItem>,
    ) -> Result<Checkout, ShopifyError> {
        let data = self
            .execute::<_, CheckoutCreateData>(
                "CheckoutCreate",
                CHECKOUT_CREATE_MUTATION,
                CheckoutCreateVariables {
                    input: CheckoutCreateInput { line_items },
                },
            )
            .await?;

        if let Some(payload) = data.checkout_create {
            if !payload.checkout_user_errors.is_empty() {
                return Err(ShopifyError::UserError(join_user_errors(
                    &payload.checkout_user_errors,
                )));
            }

            if let Some(checkout) = payload.checkout {
                return Ok(convert_checkout(checkout));
            }
        }

        Err(ShopifyError::GraphQL(vec![super::GraphQLError {
            message: "Failed to create checkout".to_string(),
            path: vec![],
        }]))
    }

    /// Replace the full line-item set of an existing checkout.
    ///
    /// This is always a full replace, never a delta: the caller rebuilds the
    /// set from its local cart so the remote side mirrors it.
    ///
    /// # Errors
    ///
    /// Returns `UserError` if Shopify rejects the input, or an error if the
    /// API request fails.
    #[instrument(skip(self, line_items), fields(checkout_id = %checkout_id))]
    pub async fn replace_checkout_line_items(
        &self,
        checkout_id: &str,
        line_items: Vec<CheckoutLineItem>,
    ) -> Result<Checkout, ShopifyError> {
        let data = self
            .execute::<_, CheckoutReplaceData>(
                "CheckoutLineItemsReplace",
                CHECKOUT_LINE_ITEMS_REPLACE_MUTATION,
                CheckoutReplaceVariables {
                    checkout_id: checkout_id.to_string(),
                    line_items,
                },
            )
            .await?;

        if let Some(payload) = data.checkout_line_items_replace {
            if !payload.user_errors.is_empty() {
                return Err(ShopifyError::UserError(join_user_errors(
                    &payload.user_errors,
                )));
            }

            if let Some(checkout) = payload.checkout {
                return Ok(convert_checkout(checkout));
            }
        }

        Err(ShopifyError::GraphQL(vec![super::GraphQLError {
            message: "Failed to replace checkout line items".to_string(),
            path: vec![],
        }]))
    }
}
