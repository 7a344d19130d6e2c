//! Cart route handlers.
//!
//! Mutations run through the [`CartStore`] and redirect back to the cart
//! page. Store-level sync failures are logged by the store and never surface
//! here (the cart page retries them via `reconcile` on its next render).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use marigold_core::Price;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use crate::cart::{CartSnapshot, CartStore, NewCartLine};
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

use super::products::ImageView;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image: Option<ImageView>,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
    pub has_checkout: bool,
}

impl From<&CartSnapshot> for CartView {
    fn from(snapshot: &CartSnapshot) -> Self {
        Self {
            items: snapshot
                .lines
                .iter()
                .map(|line| CartItemView {
                    id: line.id.clone(),
                    handle: line.handle.clone(),
                    title: line.title.clone(),
                    quantity: line.quantity,
                    price: line.unit_price.to_string(),
                    line_price: line.line_price().to_string(),
                    image: line.image_url.as_ref().map(|url| ImageView {
                        url: url.clone(),
                        alt: line.title.clone(),
                    }),
                })
                .collect(),
            subtotal: snapshot.subtotal().to_string(),
            item_count: snapshot.total_quantity(),
            has_checkout: snapshot.checkout.is_some(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub handle: String,
    pub variant_id: String,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub line_id: String,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub line_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Display cart page.
///
/// Retries a stale remote push first so the checkout link reflects the local
/// cart whenever the upstream has recovered.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> CartShowTemplate {
    let store: &CartStore = state.cart();
    store.reconcile().await;
    let snapshot = store.snapshot().await;

    CartShowTemplate {
        cart: CartView::from(&snapshot),
    }
}

/// Add item to cart.
///
/// The cart line is composed server-side from the product read so a form
/// cannot invent titles or prices.
#[instrument(skip(state, form), fields(handle = %form.handle, variant_id = %form.variant_id))]
pub async fn add(
    State(state): State<AppState>,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect> {
    let quantity = form.quantity.unwrap_or(1).max(1);

    let product = state
        .storefront()
        .get_product_by_handle(&form.handle)
        .await?;

    let variant = product
        .variants
        .iter()
        .find(|v| v.id == form.variant_id)
        .ok_or_else(|| AppError::BadRequest("Unknown product variant".to_string()))?;

    let unit_price = Price::new(
        variant.price.amount.parse::<Decimal>().unwrap_or_default(),
        variant.price.currency_code.parse().unwrap_or_default(),
    );

    state
        .cart()
        .add_item(NewCartLine {
            variant_id: variant.id.clone(),
            title: product.title.clone(),
            handle: product.handle.clone(),
            image_url: product.images.first().map(|img| img.url.clone()),
            unit_price,
            quantity,
        })
        .await;

    Ok(Redirect::to("/cart"))
}

/// Update cart item quantity. Quantity zero removes the line.
#[instrument(skip(state, form), fields(line_id = %form.line_id, quantity = form.quantity))]
pub async fn update(State(state): State<AppState>, Form(form): Form<UpdateCartForm>) -> Redirect {
    state
        .cart()
        .update_quantity(&form.line_id, form.quantity)
        .await;
    Redirect::to("/cart")
}

/// Remove item from cart.
#[instrument(skip(state, form), fields(line_id = %form.line_id))]
pub async fn remove(
    State(state): State<AppState>,
    Form(form): Form<RemoveFromCartForm>,
) -> Redirect {
    state.cart().remove_item(&form.line_id).await;
    Redirect::to("/cart")
}

/// Empty the cart and discard the checkout.
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> Redirect {
    state.cart().clear().await;
    Redirect::to("/cart")
}

/// Redirect to the externally hosted checkout page.
#[instrument(skip(state))]
pub async fn checkout(State(state): State<AppState>) -> Response {
    let snapshot = state.cart().snapshot().await;

    let Some(remote) = snapshot.checkout else {
        return Redirect::to("/cart").into_response();
    };

    // The URL comes from the upstream API; refuse to redirect anywhere that
    // does not parse as an absolute http(s) URL.
    match url::Url::parse(&remote.web_url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {
            Redirect::to(remote.web_url.as_str()).into_response()
        }
        _ => {
            tracing::error!(web_url = %remote.web_url, "Checkout URL is not a valid http(s) URL");
            Redirect::to("/cart").into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::CartLine;
    use marigold_core::CurrencyCode;

    #[test]
    fn test_cart_view_from_snapshot() {
        let snapshot = CartSnapshot {
            lines: vec![CartLine {
                id: "V1".to_string(),
                variant_id: "V1".to_string(),
                title: "Cotton Vest".to_string(),
                handle: "cotton-vest".to_string(),
                image_url: Some("https://cdn/vest.png".to_string()),
                unit_price: Price::new(Decimal::new(19900, 2), CurrencyCode::INR),
                quantity: 3,
            }],
            checkout: None,
            dirty: false,
        };

        let view = CartView::from(&snapshot);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.subtotal, "\u{20b9}597.00");
        let item = view.items.first().unwrap();
        assert_eq!(item.price, "\u{20b9}199.00");
        assert_eq!(item.line_price, "\u{20b9}597.00");
        assert!(!view.has_checkout);
    }
}
