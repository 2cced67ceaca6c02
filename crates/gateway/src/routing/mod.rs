//! Request routing for tenant-scoped pages
//!
//! This module decides, per request, whether to redirect (login gating) or to
//! rewrite the path into the tenant's page namespace:
//! - `/dashboard` without a session -> `/login?redirect=/dashboard`
//! - `/login` with a session -> `/dashboard`
//! - `/termos` on consulta.acme.com.br -> `/acme/termos`

mod middleware;
mod policy;
mod rewrite;

pub use middleware::{is_passthrough_path, tenant_gateway, GatewayState, OriginalPath};
pub use policy::{AuthDecision, RouteAuthorizer, AUTH_ROUTES, DASHBOARD_PATH, LOGIN_PATH, PUBLIC_ROUTES};
pub use rewrite::rewrite;
