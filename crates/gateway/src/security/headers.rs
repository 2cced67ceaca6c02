//! Security Headers Middleware
//!
//! Adds baseline security headers to every response leaving the gateway.
//! Headers already set by the page renderer or backend are left untouched.

use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Request, Response},
    middleware::Next,
};

/// Defaults applied when the upstream did not set the header
const DEFAULT_HEADERS: &[(&str, &str)] = &[
    // Prevent clickjacking; tenant pages are never framed cross-origin
    ("X-Frame-Options", "SAMEORIGIN"),
    // Prevent MIME type sniffing
    ("X-Content-Type-Options", "nosniff"),
    // Control referrer information leakage
    ("Referrer-Policy", "strict-origin-when-cross-origin"),
    // Disable unused browser features
    ("Permissions-Policy", "camera=(), microphone=(), geolocation=()"),
    // Enforce HTTPS connections
    ("Strict-Transport-Security", "max-age=63072000; includeSubDomains"),
];

fn insert_missing(headers: &mut HeaderMap) {
    for (name, value) in DEFAULT_HEADERS {
        if !headers.contains_key(*name) {
            headers.insert(*name, HeaderValue::from_static(*value));
        }
    }
}

/// Middleware that adds security headers to all responses
pub async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let mut response = next.run(request).await;
    insert_missing(response.headers_mut());
    response
}
