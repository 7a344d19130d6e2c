//! Product route handlers.
//!
//! The product detail page resolves the active variant server-side: option
//! selections arrive as query parameters named after the options, and the
//! currently selected variant travels in the `variant` parameter so an
//! unmatched combination retains it.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use marigold_core::{CurrencyCode, Price};
use rust_decimal::Decimal;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::shopify::types::{Money, Product, ProductSummary, ProductVariant};
use crate::state::AppState;

// =============================================================================
// Display Types
// =============================================================================

/// Image display data for templates.
#[derive(Clone)]
pub struct ImageView {
    pub url: String,
    pub alt: String,
}

/// Product card display data for listing templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub handle: String,
    pub title: String,
    pub price: String,
    pub image: Option<ImageView>,
}

/// One selectable value of a product option.
#[derive(Clone)]
pub struct OptionValueView {
    pub value: String,
    pub selected: bool,
    /// Product-page URL selecting this value while keeping the rest of the
    /// current selection.
    pub url: String,
}

/// A product option with its values.
#[derive(Clone)]
pub struct OptionView {
    pub name: String,
    pub values: Vec<OptionValueView>,
}

/// The active variant as displayed on the detail page.
#[derive(Clone)]
pub struct VariantView {
    pub id: String,
    pub title: String,
    pub price: String,
    pub available: bool,
}

// =============================================================================
// Type Conversions
// =============================================================================

/// Format an API money value as a display price.
pub fn format_price(money: &Money) -> String {
    let currency = money
        .currency_code
        .parse::<CurrencyCode>()
        .unwrap_or_default();
    money.amount.parse::<Decimal>().map_or_else(
        |_| format!("{}{}", currency.symbol(), money.amount),
        |amount| Price::new(amount, currency).to_string(),
    )
}

impl From<&ProductSummary> for ProductCardView {
    fn from(product: &ProductSummary) -> Self {
        Self {
            handle: product.handle.clone(),
            title: product.title.clone(),
            price: format_price(&product.min_price),
            image: product.featured_image.as_ref().map(|img| ImageView {
                url: img.url.clone(),
                alt: img.alt_text.clone().unwrap_or_default(),
            }),
        }
    }
}

// =============================================================================
// Option Selection
// =============================================================================

/// Build the per-option selection map: the first listed value of each option
/// by default, overridden by query parameters named after the options.
fn build_selection(product: &Product, params: &HashMap<String, String>) -> Vec<(String, String)> {
    product
        .options
        .iter()
        .filter_map(|option| {
            let value = params
                .get(&option.name)
                .cloned()
                .or_else(|| option.values.first().cloned())?;
            Some((option.name.clone(), value))
        })
        .collect()
}

/// Find the variant whose full option set exactly matches the selection.
///
/// With no exact match the previously selected variant is retained; no
/// variant is force-selected. The first variant is the initial default.
fn resolve_variant<'a>(
    variants: &'a [ProductVariant],
    selection: &[(String, String)],
    previous_id: Option<&str>,
) -> Option<&'a ProductVariant> {
    let selected_value = |name: &str| {
        selection
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    };

    variants
        .iter()
        .find(|variant| {
            variant
                .selected_options
                .iter()
                .all(|option| selected_value(&option.name) == Some(option.value.as_str()))
        })
        .or_else(|| previous_id.and_then(|id| variants.iter().find(|v| v.id == id)))
        .or_else(|| variants.first())
}

/// Product-page URL for the selection with one option switched to `value`.
fn option_url(
    handle: &str,
    selection: &[(String, String)],
    option_name: &str,
    value: &str,
    variant_id: Option<&str>,
) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    for (name, selected) in selection {
        if name == option_name {
            query.append_pair(name, value);
        } else {
            query.append_pair(name, selected);
        }
    }
    if let Some(id) = variant_id {
        query.append_pair("variant", id);
    }
    format!("/products/{handle}?{}", query.finish())
}

// =============================================================================
// Templates
// =============================================================================

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub handle: String,
    pub title: String,
    pub description_html: String,
    pub product_type: String,
    pub images: Vec<ImageView>,
    pub options: Vec<OptionView>,
    pub selected_variant: Option<VariantView>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display product detail page.
#[instrument(skip(state, params))]
pub async fn show(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<ProductShowTemplate> {
    let product = state.storefront().get_product_by_handle(&handle).await?;

    let selection = build_selection(&product, &params);
    let previous = params.get("variant").map(String::as_str);
    let selected = resolve_variant(&product.variants, &selection, previous);
    let selected_id = selected.map(|v| v.id.as_str());

    let options = product
        .options
        .iter()
        .map(|option| OptionView {
            name: option.name.clone(),
            values: option
                .values
                .iter()
                .map(|value| OptionValueView {
                    value: value.clone(),
                    selected: selection
                        .iter()
                        .any(|(n, v)| n == &option.name && v == value),
                    url: option_url(&handle, &selection, &option.name, value, selected_id),
                })
                .collect(),
        })
        .collect();

    let images = product
        .images
        .iter()
        .map(|img| ImageView {
            url: img.url.clone(),
            alt: img.alt_text.clone().unwrap_or_else(|| product.title.clone()),
        })
        .collect();

    Ok(ProductShowTemplate {
        handle: product.handle,
        title: product.title,
        description_html: product.description_html,
        product_type: product.product_type,
        images,
        options,
        selected_variant: selected.map(|variant| VariantView {
            id: variant.id.clone(),
            title: variant.title.clone(),
            price: format_price(&variant.price),
            available: variant.available_for_sale,
        }),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::shopify::types::SelectedOption;

    fn variant(id: &str, options: &[(&str, &str)]) -> ProductVariant {
        ProductVariant {
            id: id.to_string(),
            title: options
                .iter()
                .map(|(_, v)| *v)
                .collect::<Vec<_>>()
                .join(" / "),
            available_for_sale: true,
            price: Money {
                amount: "10.00".to_string(),
                currency_code: "USD".to_string(),
            },
            selected_options: options
                .iter()
                .map(|(name, value)| SelectedOption {
                    name: (*name).to_string(),
                    value: (*value).to_string(),
                })
                .collect(),
        }
    }

    fn color_size_variants() -> Vec<ProductVariant> {
        vec![
            variant("V1", &[("Color", "Red"), ("Size", "M")]),
            variant("V2", &[("Color", "Red"), ("Size", "L")]),
        ]
    }

    fn selection(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(n, v)| ((*n).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_exact_match_selects_variant() {
        let variants = color_size_variants();
        let resolved = resolve_variant(
            &variants,
            &selection(&[("Color", "Red"), ("Size", "L")]),
            Some("V1"),
        );
        assert_eq!(resolved.unwrap().id, "V2");
    }

    #[test]
    fn test_no_match_retains_previous_variant() {
        let variants = color_size_variants();
        let resolved = resolve_variant(
            &variants,
            &selection(&[("Color", "Blue"), ("Size", "M")]),
            Some("V2"),
        );
        assert_eq!(resolved.unwrap().id, "V2");
    }

    #[test]
    fn test_initial_load_defaults_to_first_variant() {
        let variants = color_size_variants();
        let resolved = resolve_variant(
            &variants,
            &selection(&[("Color", "Blue"), ("Size", "XS")]),
            None,
        );
        assert_eq!(resolved.unwrap().id, "V1");
    }

    #[test]
    fn test_no_variants_resolves_none() {
        assert!(resolve_variant(&[], &selection(&[]), None).is_none());
    }

    #[test]
    fn test_build_selection_defaults_to_first_values() {
        let product = Product {
            id: "P1".to_string(),
            handle: "vest".to_string(),
            title: "Vest".to_string(),
            description: String::new(),
            description_html: String::new(),
            product_type: String::new(),
            options: vec![
                crate::shopify::types::ProductOption {
                    id: "O1".to_string(),
                    name: "Color".to_string(),
                    values: vec!["Red".to_string(), "Blue".to_string()],
                },
                crate::shopify::types::ProductOption {
                    id: "O2".to_string(),
                    name: "Size".to_string(),
                    values: vec!["M".to_string(), "L".to_string()],
                },
            ],
            variants: color_size_variants(),
            images: vec![],
        };

        let defaults = build_selection(&product, &HashMap::new());
        assert_eq!(defaults, selection(&[("Color", "Red"), ("Size", "M")]));

        let mut params = HashMap::new();
        params.insert("Size".to_string(), "L".to_string());
        let overridden = build_selection(&product, &params);
        assert_eq!(overridden, selection(&[("Color", "Red"), ("Size", "L")]));
    }

    #[test]
    fn test_option_url_switches_one_option() {
        let url = option_url(
            "vest",
            &selection(&[("Color", "Red"), ("Size", "M")]),
            "Size",
            "L",
            Some("V1"),
        );
        assert_eq!(url, "/products/vest?Color=Red&Size=L&variant=V1");
    }

    #[test]
    fn test_option_url_encodes_values() {
        let url = option_url(
            "vest",
            &selection(&[("Color", "Navy Blue")]),
            "Color",
            "Navy Blue",
            None,
        );
        assert_eq!(url, "/products/vest?Color=Navy+Blue");
    }

    #[test]
    fn test_format_price() {
        let money = Money {
            amount: "199.00".to_string(),
            currency_code: "INR".to_string(),
        };
        assert_eq!(format_price(&money), "\u{20b9}199.00");

        let malformed = Money {
            amount: "not-a-number".to_string(),
            currency_code: "USD".to_string(),
        };
        assert_eq!(format_price(&malformed), "$not-a-number");
    }
}
