//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::state::AppState;

pub use super::collections::CollectionCardView;
pub use super::products::{ImageView, ProductCardView};

/// Number of featured products on the home page.
const FEATURED_PRODUCT_COUNT: i64 = 12;

/// Number of collections shown on the home page.
const HOME_COLLECTION_COUNT: usize = 4;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub featured_products: Vec<ProductCardView>,
    pub collections: Vec<CollectionCardView>,
}

/// Display the home page.
///
/// The two reads are independent, so they run in parallel.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<HomeTemplate> {
    let (featured, collections) = tokio::join!(
        state.storefront().get_featured_products(FEATURED_PRODUCT_COUNT),
        state.storefront().get_collections(),
    );

    let featured_products = featured?.iter().map(ProductCardView::from).collect();
    let mut collections: Vec<CollectionCardView> =
        collections?.iter().map(CollectionCardView::from).collect();
    collections.truncate(HOME_COLLECTION_COUNT);

    Ok(HomeTemplate {
        featured_products,
        collections,
    })
}
