//! Shared helpers for forwarding requests to upstream services

use std::time::Duration;

use axum::http::{header, HeaderMap, HeaderName, Uri};

/// Headers that describe a single hop and must not be forwarded
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Tenant id passed to upstreams
pub const TENANT_ID_HEADER: &str = "x-tenant-id";

/// Original Host passed to upstreams
pub const FORWARDED_HOST_HEADER: &str = "x-forwarded-host";

/// Request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request path before the tenant prefix was added
pub const ORIGINAL_PATH_HEADER: &str = "x-original-path";

/// Host the client addressed: the `Host` header, else the URI authority (HTTP/2)
pub fn request_host<'a>(headers: &'a HeaderMap, uri: &'a Uri) -> Option<&'a str> {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()))
}

/// Remove hop-by-hop headers, including any named by `Connection`
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
}

/// Headers for a request forwarded upstream
///
/// `Host` is dropped so the client sets the upstream's own host.
pub fn request_headers(incoming: &HeaderMap) -> HeaderMap {
    let mut headers = incoming.clone();
    strip_hop_by_hop(&mut headers);
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);
    headers
}

/// Headers for a response relayed back to the client
pub fn response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = upstream.clone();
    strip_hop_by_hop(&mut headers);
    headers
}

/// Pooled HTTP client shared by all upstream calls
pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(32)
        // Redirects belong to the browser, not the gateway
        .redirect(reqwest::redirect::Policy::none())
        .build()
}
