//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All read-path route handlers return
//! `Result<T, AppError>`.
//!
//! Unknown handles render a dedicated not-found page; upstream API failures
//! render a generic error page without internal details. Cart write-path
//! failures never reach this type; the store logs them and keeps going.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::filters;
use crate::shopify::ShopifyError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error page template.
#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
struct ErrorTemplate {
    heading: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // A NotFound from the API is a content state, not a failure
        let this = match self {
            Self::Shopify(ShopifyError::NotFound(message)) => Self::NotFound(message),
            other => other,
        };

        // Capture server errors to Sentry
        if matches!(this, Self::Internal(_) | Self::Shopify(_)) {
            let event_id = sentry::capture_error(&this);
            tracing::error!(
                error = %this,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &this {
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Shopify(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let (heading, message) = match &this {
            Self::Internal(_) => (
                "Something went wrong",
                "Internal server error. Please try again later.".to_string(),
            ),
            Self::Shopify(_) => (
                "Something went wrong",
                "We could not reach the store right now. Please try again later.".to_string(),
            ),
            Self::NotFound(_) => (
                "Not found",
                "The page you're looking for doesn't exist.".to_string(),
            ),
            Self::BadRequest(message) => ("Bad request", message.clone()),
        };

        (status, ErrorTemplate { heading, message }).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Shopify(ShopifyError::RateLimited(1))),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_upstream_not_found_maps_to_404() {
        let err = AppError::Shopify(ShopifyError::NotFound("collection: summer".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
