//! Tenant Gateway Middleware
//!
//! Single pass per request:
//! 1. resolve the tenant from the Host header
//! 2. authorize the original path against the session cookie
//! 3. redirect, or rewrite the path into the tenant namespace
//!
//! The middleware must wrap the router from the outside so the rewritten URI
//! is the one that gets routed.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::Uri,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use super::policy::{AuthDecision, RouteAuthorizer};
use super::rewrite::rewrite;
use crate::error::GatewayError;
use crate::tenant::{ResolvedTenant, TenantResolver};
use crate::upstream;

/// Paths never gated or rewritten (API, framework assets, probes)
const PASSTHROUGH_PREFIXES: &[&str] = &["/api", "/_next/static", "/_next/image", "/health"];

/// Exact paths never gated or rewritten
const PASSTHROUGH_PATHS: &[&str] = &["/favicon.ico"];

/// The request path before tenant rewriting, stored in request extensions
///
/// Only present on rewritten requests.
#[derive(Debug, Clone)]
pub struct OriginalPath(pub String);

/// State needed by the gateway middleware
#[derive(Clone)]
pub struct GatewayState {
    pub resolver: TenantResolver,
    pub authorizer: RouteAuthorizer,
    pub auth_cookie_name: Arc<str>,
    /// When false, paths are forwarded without a tenant prefix
    pub tenant_rewrite: bool,
}

/// Whether the path bypasses authorization and rewriting
pub fn is_passthrough_path(path: &str) -> bool {
    PASSTHROUGH_PATHS.contains(&path)
        || PASSTHROUGH_PREFIXES.iter().any(|prefix| {
            path == *prefix
                || path
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
}

/// Middleware that resolves the tenant, gates the route and rewrites the path
pub async fn tenant_gateway(
    State(gateway): State<GatewayState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let host = upstream::request_host(request.headers(), request.uri()).unwrap_or_default();
    let tenant = gateway.resolver.resolve(host);
    let path = request.uri().path().to_owned();

    request
        .extensions_mut()
        .insert(ResolvedTenant(Arc::clone(&tenant)));

    if is_passthrough_path(&path) {
        return next.run(request).await;
    }

    // An empty cookie value counts as no session
    let has_auth_cookie = jar
        .get(&gateway.auth_cookie_name)
        .is_some_and(|cookie| !cookie.value().is_empty());

    if let AuthDecision::Redirect(location) = gateway.authorizer.authorize(&path, has_auth_cookie) {
        tracing::debug!(
            tenant = %tenant.id,
            path = %path,
            location = %location,
            "Redirecting request"
        );
        return Redirect::temporary(&location).into_response();
    }

    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| path.clone());
    let target = gateway.tenant_rewrite.then_some(tenant.as_ref());
    let rewritten = rewrite(&path_and_query, target);

    match rewritten.parse::<Uri>() {
        Ok(uri) => *request.uri_mut() = uri,
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Rewritten path is not a valid URI");
            return GatewayError::BadRequest("Invalid request path".to_string()).into_response();
        }
    }

    tracing::debug!(
        tenant = %tenant.id,
        path = %path,
        rewritten = %rewritten,
        "Rewriting request"
    );

    request.extensions_mut().insert(OriginalPath(path));
    next.run(request).await
}
