//! Domain types for the Shopify Storefront API.
//!
//! These types provide a clean, ergonomic API separate from the raw wire
//! shapes in `storefront::queries`.

use serde::{Deserialize, Serialize};

// =============================================================================
// Money and Image Types
// =============================================================================

/// Monetary amount with currency code, as the API reports it.
///
/// The amount stays a string here to preserve precision; the cart parses it
/// into a `marigold_core::Price` at the point it takes ownership of a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Decimal amount as string (preserves precision).
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency_code: String,
}

/// Product or collection image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
}

// =============================================================================
// Product Types
// =============================================================================

/// Selected option on a product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Option name (e.g., "Size", "Color").
    pub name: String,
    /// Selected value (e.g., "Large", "Blue").
    pub value: String,
}

/// Product option definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductOption {
    /// Option ID.
    pub id: String,
    /// Option name (e.g., "Size").
    pub name: String,
    /// Available values (e.g., `["Small", "Medium", "Large"]`).
    pub values: Vec<String>,
}

/// A product variant (specific combination of options).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Variant ID (opaque Shopify gid).
    pub id: String,
    /// Variant title (combination of option values).
    pub title: String,
    /// Whether this variant is available for sale.
    pub available_for_sale: bool,
    /// Current price.
    pub price: Money,
    /// Selected options for this variant.
    pub selected_options: Vec<SelectedOption>,
}

/// A product summary, as returned by list reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSummary {
    /// Product ID.
    pub id: String,
    /// URL handle.
    pub handle: String,
    /// Product title.
    pub title: String,
    /// Plain text description.
    pub description: String,
    /// Minimum price among all variants.
    pub min_price: Money,
    /// First product image, if any.
    pub featured_image: Option<Image>,
}

/// A full product, as returned by the detail read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: String,
    /// URL handle.
    pub handle: String,
    /// Product title.
    pub title: String,
    /// Plain text description.
    pub description: String,
    /// HTML description.
    pub description_html: String,
    /// Product type/category.
    pub product_type: String,
    /// Option definitions (name + available values).
    pub options: Vec<ProductOption>,
    /// All variants.
    pub variants: Vec<ProductVariant>,
    /// Product images.
    pub images: Vec<Image>,
}

// =============================================================================
// Collection Types
// =============================================================================

/// A collection summary, as returned by the collection list read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSummary {
    /// Collection ID.
    pub id: String,
    /// URL handle.
    pub handle: String,
    /// Collection title.
    pub title: String,
    /// Collection image, if any.
    pub image: Option<Image>,
}

/// A collection with its full product list (all pages accumulated).
#[derive(Debug, Clone)]
pub struct Collection {
    /// Collection title.
    pub title: String,
    /// Products in the collection, in collection order.
    pub products: Vec<ProductSummary>,
}

// =============================================================================
// Pagination
// =============================================================================

/// One page of a cursor-forward paginated read.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Items on this page, in order.
    pub items: Vec<T>,
    /// Whether the server reports more pages after this one.
    pub has_next_page: bool,
    /// Opaque cursor to pass as `after` for the next page.
    pub end_cursor: Option<String>,
}

// =============================================================================
// Checkout Types
// =============================================================================

/// A remote checkout: the only state the upstream is authoritative for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkout {
    /// Opaque checkout ID, issued by Shopify on creation.
    pub id: String,
    /// Externally hosted checkout page URL.
    pub web_url: String,
}

/// A line item as pushed to the remote checkout.
///
/// This is the projection `(variant_id, quantity)` of a local cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLineItem {
    /// Variant to purchase.
    pub variant_id: String,
    /// Positive quantity.
    pub quantity: i64,
}
