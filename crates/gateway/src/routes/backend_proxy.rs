//! Backend API proxy
//!
//! `/api/backend/{path}` is relayed to `{BACKEND_API_URL}/{path}` with the
//! session's bearer token. Refreshed tokens are written back as cookies; an
//! expired session clears them.

use axum::{
    body::Body,
    extract::{Request, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;

use crate::backend::{BackendRequest, SessionUpdate};
use crate::error::{GatewayError, GatewayResult};
use crate::state::AppState;

/// Mount point of the proxy
pub const BACKEND_PREFIX: &str = "/api/backend";

/// Path and query relative to the backend base URL
fn backend_path(path: &str, query: Option<&str>) -> String {
    let rest = match path.strip_prefix(BACKEND_PREFIX) {
        Some(rest) if !rest.is_empty() => rest,
        _ => "/",
    };
    match query {
        Some(query) => format!("{rest}?{query}"),
        None => rest.to_string(),
    }
}

/// Relay a request to the backend API on behalf of the browser session
pub async fn proxy(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
) -> GatewayResult<(CookieJar, Response)> {
    let (parts, body) = request.into_parts();

    let body = axum::body::to_bytes(body, state.config.max_body_bytes)
        .await
        .map_err(|e| {
            tracing::debug!(error = %e, "Failed to read request body");
            GatewayError::PayloadTooLarge
        })?;

    let backend_request = BackendRequest {
        method: parts.method,
        path_and_query: backend_path(parts.uri.path(), parts.uri.query()),
        headers: parts.headers,
        body,
    };

    let session = state.session_cookies.read(&jar);
    let outcome = state.backend.send(&backend_request, &session).await?;

    let jar = match outcome.session {
        SessionUpdate::Unchanged => jar,
        SessionUpdate::Refreshed(tokens) => state.session_cookies.store(jar, &tokens),
        SessionUpdate::Expired => {
            let jar = state.session_cookies.clear(jar);
            return Ok((jar, GatewayError::SessionExpired.into_response()));
        }
    };

    let mut response = Response::new(Body::from(outcome.response.body));
    *response.status_mut() = outcome.response.status;
    *response.headers_mut() = outcome.response.headers;

    Ok((jar, response))
}
