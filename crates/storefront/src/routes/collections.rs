//! Collection route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::shopify::types::CollectionSummary;
use crate::state::AppState;

pub use super::products::{ImageView, ProductCardView};

/// Collection card display data for templates.
#[derive(Clone)]
pub struct CollectionCardView {
    pub handle: String,
    pub title: String,
    pub image: Option<ImageView>,
}

impl From<&CollectionSummary> for CollectionCardView {
    fn from(collection: &CollectionSummary) -> Self {
        Self {
            handle: collection.handle.clone(),
            title: collection.title.clone(),
            image: collection.image.as_ref().map(|img| ImageView {
                url: img.url.clone(),
                alt: img.alt_text.clone().unwrap_or_default(),
            }),
        }
    }
}

/// Collection listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "collections/index.html")]
pub struct CollectionsIndexTemplate {
    pub collections: Vec<CollectionCardView>,
}

/// Collection detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "collections/show.html")]
pub struct CollectionShowTemplate {
    pub title: String,
    pub products: Vec<ProductCardView>,
}

/// Display collection listing page.
///
/// Accumulates every page of the collection list before rendering.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<CollectionsIndexTemplate> {
    let collections = state.storefront().get_collections().await?;

    Ok(CollectionsIndexTemplate {
        collections: collections.iter().map(CollectionCardView::from).collect(),
    })
}

/// Display collection detail page.
///
/// An unknown handle surfaces as the dedicated not-found state.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<CollectionShowTemplate> {
    let collection = state.storefront().get_collection_products(&handle).await?;

    Ok(CollectionShowTemplate {
        title: collection.title,
        products: collection.products.iter().map(ProductCardView::from).collect(),
    })
}
