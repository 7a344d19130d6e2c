//! Search route handler.
//!
//! Search is delegated to the upstream `products(query:)` read; there is no
//! local index. The search term arrives as the `q` query-string parameter.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::state::AppState;

pub use super::products::ProductCardView;

/// Number of results per search.
const SEARCH_RESULT_COUNT: i64 = 20;

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Search results page template.
#[derive(Template, WebTemplate)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    /// The search term as typed, echoed into the results headline.
    pub query: String,
    pub products: Vec<ProductCardView>,
    /// False when no term was supplied; the page shows the prompt state.
    pub searched: bool,
}

/// Display search results.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<SearchTemplate> {
    let query = params.q.unwrap_or_default();

    if query.trim().is_empty() {
        return Ok(SearchTemplate {
            query,
            products: Vec::new(),
            searched: false,
        });
    }

    let results = state
        .storefront()
        .search_products(&query, SEARCH_RESULT_COUNT)
        .await?;

    Ok(SearchTemplate {
        products: results.iter().map(ProductCardView::from).collect(),
        query,
        searched: true,
    })
}
