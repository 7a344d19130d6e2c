//! GraphQL documents and wire shapes for the Shopify Storefront API.
//!
//! Documents are hand-authored constants; responses are serde-typed and
//! parsed through [`graphql_client::Response`]. Only the fields the
//! storefront renders are requested.

use serde::{Deserialize, Serialize};

use crate::shopify::types::CheckoutLineItem;

// =============================================================================
// Documents
// =============================================================================

/// Unfiltered product list for the home page.
pub const FEATURED_PRODUCTS_QUERY: &str = r"
query FeaturedProducts($first: Int!) {
  products(first: $first) {
    edges {
      node {
        id
        title
        handle
        description
        priceRange {
          minVariantPrice {
            amount
            currencyCode
          }
        }
        images(first: 1) {
          edges {
            node {
              url
              altText
            }
          }
        }
      }
    }
  }
}
";

/// One page of the collection list.
pub const COLLECTIONS_QUERY: &str = r"
query Collections($first: Int!, $after: String) {
  collections(first: $first, after: $after) {
    edges {
      node {
        id
        title
        handle
        image {
          url
          altText
        }
      }
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}
";

/// One page of products within a collection, plus the collection title.
pub const COLLECTION_PRODUCTS_QUERY: &str = r"
query CollectionProducts($handle: String!, $first: Int!, $after: String) {
  collection(handle: $handle) {
    title
    products(first: $first, after: $after) {
      edges {
        node {
          id
          title
          handle
          description
          priceRange {
            minVariantPrice {
              amount
              currencyCode
            }
          }
          images(first: 1) {
            edges {
              node {
                url
                altText
              }
            }
          }
        }
      }
      pageInfo {
        hasNextPage
        endCursor
      }
    }
  }
}
";

/// Full product detail: options, variants, images.
pub const PRODUCT_BY_HANDLE_QUERY: &str = r"
query ProductByHandle($handle: String!) {
  product(handle: $handle) {
    id
    title
    handle
    description
    descriptionHtml
    productType
    options {
      id
      name
      values
    }
    variants(first: 100) {
      edges {
        node {
          id
          title
          price {
            amount
            currencyCode
          }
          availableForSale
          selectedOptions {
            name
            value
          }
        }
      }
    }
    images(first: 10) {
      edges {
        node {
          url
          altText
        }
      }
    }
  }
}
";

/// Product search by term.
pub const SEARCH_PRODUCTS_QUERY: &str = r"
query SearchProducts($query: String!, $first: Int!) {
  products(first: $first, query: $query) {
    edges {
      node {
        id
        title
        handle
        description
        priceRange {
          minVariantPrice {
            amount
            currencyCode
          }
        }
        images(first: 1) {
          edges {
            node {
              url
              altText
            }
          }
        }
      }
    }
  }
}
";

/// Create a checkout with an initial line-item set.
pub const CHECKOUT_CREATE_MUTATION: &str = r"
mutation CheckoutCreate($input: CheckoutCreateInput!) {
  checkoutCreate(input: $input) {
    checkout {
      id
      webUrl
    }
    checkoutUserErrors {
      code
      field
      message
    }
  }
}
";

/// Replace the full line-item set of an existing checkout.
pub const CHECKOUT_LINE_ITEMS_REPLACE_MUTATION: &str = r"
mutation CheckoutLineItemsReplace($checkoutId: ID!, $lineItems: [CheckoutLineItemInput!]!) {
  checkoutLineItemsReplace(checkoutId: $checkoutId, lineItems: $lineItems) {
    checkout {
      id
      webUrl
    }
    userErrors {
      field
      message
    }
  }
}
";

// =============================================================================
// Variables
// =============================================================================

#[derive(Debug, Serialize)]
pub struct FirstVariables {
    pub first: i64,
}

#[derive(Debug, Serialize)]
pub struct CursorVariables {
    pub first: i64,
    pub after: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CollectionProductsVariables {
    pub handle: String,
    pub first: i64,
    pub after: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HandleVariables {
    pub handle: String,
}

#[derive(Debug, Serialize)]
pub struct SearchVariables {
    pub query: String,
    pub first: i64,
}

#[derive(Debug, Serialize)]
pub struct CheckoutCreateVariables {
    pub input: CheckoutCreateInput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutCreateInput {
    pub line_items: Vec<CheckoutLineItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReplaceVariables {
    pub checkout_id: String,
    pub line_items: Vec<CheckoutLineItem>,
}

// =============================================================================
// Wire Shapes
// =============================================================================

/// Relay-style connection wrapper.
///
/// `pageInfo` defaults to "no next page" for documents that do not request it
/// (nested image connections, the featured-products read).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
    #[serde(default)]
    pub page_info: WirePageInfo,
}

#[derive(Debug, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WirePageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMoney {
    pub amount: String,
    pub currency_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireImage {
    pub url: String,
    pub alt_text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePriceRange {
    pub min_variant_price: WireMoney,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireProductSummary {
    pub id: String,
    pub title: String,
    pub handle: String,
    #[serde(default)]
    pub description: String,
    pub price_range: WirePriceRange,
    pub images: Connection<WireImage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireProductOption {
    pub id: String,
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSelectedOption {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireVariant {
    pub id: String,
    pub title: String,
    pub price: WireMoney,
    pub available_for_sale: bool,
    pub selected_options: Vec<WireSelectedOption>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireProduct {
    pub id: String,
    pub title: String,
    pub handle: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_html: String,
    #[serde(default)]
    pub product_type: String,
    pub options: Vec<WireProductOption>,
    pub variants: Connection<WireVariant>,
    pub images: Connection<WireImage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCollection {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub image: Option<WireImage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCollectionProducts {
    pub title: String,
    pub products: Connection<WireProductSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCheckout {
    pub id: String,
    pub web_url: String,
}

#[derive(Debug, Deserialize)]
pub struct WireUserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

// =============================================================================
// Response Data Roots
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ProductsData {
    pub products: Connection<WireProductSummary>,
}

#[derive(Debug, Deserialize)]
pub struct CollectionsData {
    pub collections: Connection<WireCollection>,
}

#[derive(Debug, Deserialize)]
pub struct CollectionProductsData {
    pub collection: Option<WireCollectionProducts>,
}

#[derive(Debug, Deserialize)]
pub struct ProductByHandleData {
    pub product: Option<WireProduct>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutCreateData {
    pub checkout_create: Option<CheckoutCreatePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutCreatePayload {
    pub checkout: Option<WireCheckout>,
    #[serde(default)]
    pub checkout_user_errors: Vec<WireUserError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReplaceData {
    pub checkout_line_items_replace: Option<CheckoutReplacePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReplacePayload {
    pub checkout: Option<WireCheckout>,
    #[serde(default)]
    pub user_errors: Vec<WireUserError>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_page_info_defaults_when_absent() {
        // The featured-products document does not request pageInfo
        let json = r#"{"edges": [{"node": {"url": "https://cdn/x.png", "altText": null}}]}"#;
        let conn: Connection<WireImage> = serde_json::from_str(json).unwrap();
        assert!(!conn.page_info.has_next_page);
        assert!(conn.page_info.end_cursor.is_none());
        assert_eq!(conn.edges.len(), 1);
    }

    #[test]
    fn test_checkout_line_item_serializes_camel_case() {
        let item = CheckoutLineItem {
            variant_id: "gid://shopify/ProductVariant/1".to_string(),
            quantity: 2,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["variantId"], "gid://shopify/ProductVariant/1");
        assert_eq!(json["quantity"], 2);
    }

    #[test]
    fn test_checkout_create_payload_with_user_errors() {
        let json = r#"{
            "checkout": null,
            "checkoutUserErrors": [
                {"code": "INVALID", "field": ["lineItems", "0", "variantId"], "message": "Variant is invalid"}
            ]
        }"#;
        let payload: CheckoutCreatePayload = serde_json::from_str(json).unwrap();
        assert!(payload.checkout.is_none());
        assert_eq!(payload.checkout_user_errors.len(), 1);
        assert_eq!(
            payload.checkout_user_errors.first().unwrap().message,
            "Variant is invalid"
        );
    }
}
