//! Gateway routes

pub mod backend_proxy;
pub mod health;
pub mod render;
pub mod tenant;

use axum::{
    middleware,
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{routing::tenant_gateway, security::security_headers_middleware, state::AppState};

/// Create the full gateway application
///
/// The tenant gateway runs outside the router so path rewrites are routed.
pub fn create_router(state: AppState) -> Router {
    // Health check routes (at root level for infrastructure monitoring)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    // Not nested: the backend proxy needs the full request path
    let api_routes = Router::new()
        .route("/api/tenant", get(tenant::current_tenant))
        .route("/api/backend/*path", any(backend_proxy::proxy));

    // Anything else is a (rewritten) page request for the renderer
    let routes = Router::new()
        .merge(health_routes)
        .merge(api_routes)
        .fallback(render::forward)
        .with_state(state.clone());

    Router::new()
        .fallback_service(routes)
        .layer(middleware::from_fn_with_state(
            state.gateway_state(),
            tenant_gateway,
        ))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
}
