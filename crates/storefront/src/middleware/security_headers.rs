//! Security headers middleware.
//!
//! Adds restrictive security headers to all responses. The image source
//! allowance covers the Shopify CDN, where all catalog images live.

use axum::{
    extract::Request,
    http::{
        HeaderValue,
        header::{
            CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

/// Add security headers to all responses.
///
/// Headers applied:
/// - `X-Frame-Options: DENY` - Prevent clickjacking
/// - `X-Content-Type-Options: nosniff` - Prevent MIME sniffing
/// - `Referrer-Policy: same-origin`
/// - `Content-Security-Policy` - self, plus the Shopify CDN for images
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(REFERRER_POLICY, HeaderValue::from_static("same-origin"));
    headers.insert(
        CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(
            "default-src 'none'; \
             script-src 'self'; \
             style-src 'self' 'unsafe-inline'; \
             img-src 'self' https://cdn.shopify.com; \
             connect-src 'self'; \
             form-action 'self'; \
             base-uri 'self'; \
             frame-ancestors 'none'",
        ),
    );

    response
}
