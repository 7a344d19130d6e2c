//! Wire-to-domain conversion functions.

use crate::shopify::types::{
    Checkout, CollectionSummary, Image, Money, Page, Product, ProductOption, ProductSummary,
    ProductVariant, SelectedOption,
};

use super::queries::{
    Connection, WireCheckout, WireCollection, WireImage, WireMoney, WireProduct,
    WireProductSummary, WireUserError, WireVariant,
};

pub fn convert_money(money: WireMoney) -> Money {
    Money {
        amount: money.amount,
        currency_code: money.currency_code,
    }
}

pub fn convert_image(image: WireImage) -> Image {
    Image {
        url: image.url,
        alt_text: image.alt_text,
    }
}

/// Convert a connection into a [`Page`], mapping each node.
pub fn convert_page<T, U>(connection: Connection<T>, convert: impl Fn(T) -> U) -> Page<U> {
    Page {
        items: connection
            .edges
            .into_iter()
            .map(|edge| convert(edge.node))
            .collect(),
        has_next_page: connection.page_info.has_next_page,
        end_cursor: connection.page_info.end_cursor,
    }
}

pub fn convert_product_summary(product: WireProductSummary) -> ProductSummary {
    ProductSummary {
        id: product.id,
        handle: product.handle,
        title: product.title,
        description: product.description,
        min_price: convert_money(product.price_range.min_variant_price),
        featured_image: product
            .images
            .edges
            .into_iter()
            .next()
            .map(|edge| convert_image(edge.node)),
    }
}

fn convert_variant(variant: WireVariant) -> ProductVariant {
    ProductVariant {
        id: variant.id,
        title: variant.title,
        available_for_sale: variant.available_for_sale,
        price: convert_money(variant.price),
        selected_options: variant
            .selected_options
            .into_iter()
            .map(|option| SelectedOption {
                name: option.name,
                value: option.value,
            })
            .collect(),
    }
}

pub fn convert_product(product: WireProduct) -> Product {
    Product {
        id: product.id,
        handle: product.handle,
        title: product.title,
        description: product.description,
        description_html: product.description_html,
        product_type: product.product_type,
        options: product
            .options
            .into_iter()
            .map(|option| ProductOption {
                id: option.id,
                name: option.name,
                values: option.values,
            })
            .collect(),
        variants: product
            .variants
            .edges
            .into_iter()
            .map(|edge| convert_variant(edge.node))
            .collect(),
        images: product
            .images
            .edges
            .into_iter()
            .map(|edge| convert_image(edge.node))
            .collect(),
    }
}

pub fn convert_collection(collection: WireCollection) -> CollectionSummary {
    CollectionSummary {
        id: collection.id,
        handle: collection.handle,
        title: collection.title,
        image: collection.image.map(convert_image),
    }
}

pub fn convert_checkout(checkout: WireCheckout) -> Checkout {
    Checkout {
        id: checkout.id,
        web_url: checkout.web_url,
    }
}

/// Join mutation user errors into a single display message.
pub fn join_user_errors(errors: &[WireUserError]) -> String {
    errors
        .iter()
        .map(|e| match &e.field {
            Some(field) if !field.is_empty() => format!("{} ({})", e.message, field.join(".")),
            _ => e.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_product_summary_takes_first_image() {
        let json = r#"{
            "id": "gid://shopify/Product/1",
            "title": "Cotton Vest",
            "handle": "cotton-vest",
            "description": "Soft cotton vest",
            "priceRange": {"minVariantPrice": {"amount": "199.00", "currencyCode": "INR"}},
            "images": {"edges": [
                {"node": {"url": "https://cdn/a.png", "altText": "front"}},
                {"node": {"url": "https://cdn/b.png", "altText": "back"}}
            ]}
        }"#;
        let wire: WireProductSummary = serde_json::from_str(json).unwrap();
        let summary = convert_product_summary(wire);
        assert_eq!(summary.handle, "cotton-vest");
        assert_eq!(summary.min_price.amount, "199.00");
        assert_eq!(summary.featured_image.unwrap().url, "https://cdn/a.png");
    }

    #[test]
    fn test_convert_page_preserves_order_and_cursor() {
        let json = r#"{
            "edges": [{"node": {"url": "https://cdn/1.png", "altText": null}},
                      {"node": {"url": "https://cdn/2.png", "altText": null}}],
            "pageInfo": {"hasNextPage": true, "endCursor": "abc"}
        }"#;
        let conn: Connection<WireImage> = serde_json::from_str(json).unwrap();
        let page = convert_page(conn, convert_image);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items.first().unwrap().url, "https://cdn/1.png");
        assert!(page.has_next_page);
        assert_eq!(page.end_cursor.as_deref(), Some("abc"));
    }

    #[test]
    fn test_join_user_errors_with_field_path() {
        let errors = vec![
            WireUserError {
                field: Some(vec!["lineItems".to_string(), "0".to_string()]),
                message: "Variant is invalid".to_string(),
            },
            WireUserError {
                field: None,
                message: "Checkout is locked".to_string(),
            },
        ];
        assert_eq!(
            join_user_errors(&errors),
            "Variant is invalid (lineItems.0); Checkout is locked"
        );
    }
}
