//! Route authorization
//!
//! Classifies a path as public and/or auth-only and decides whether the
//! request must be redirected. Only the presence of the session cookie is
//! considered; token validity is the backend's concern.

/// Paths servable without a session (exact or sub-path match)
pub const PUBLIC_ROUTES: &[&str] = &[
    "/",
    "/login",
    "/register",
    "/forgot-password",
    "/termos",
    "/politica-de-privacidade",
    "/lgpd",
    "/sobre",
    "/cookies",
];

/// Paths a signed-in user is bounced away from (plain prefix match)
pub const AUTH_ROUTES: &[&str] = &["/login", "/register"];

/// Landing page for signed-in users
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Login page for anonymous users
pub const LOGIN_PATH: &str = "/login";

/// Outcome of authorizing a request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    /// Redirect the client to this location
    Redirect(String),
    /// Serve the request
    Continue,
}

/// Stateless per-request route gate
#[derive(Debug, Clone, Copy)]
pub struct RouteAuthorizer {
    public_routes: &'static [&'static str],
    auth_routes: &'static [&'static str],
}

impl Default for RouteAuthorizer {
    fn default() -> Self {
        Self::new(PUBLIC_ROUTES, AUTH_ROUTES)
    }
}

impl RouteAuthorizer {
    pub fn new(public_routes: &'static [&'static str], auth_routes: &'static [&'static str]) -> Self {
        Self {
            public_routes,
            auth_routes,
        }
    }

    /// Whether the path equals, or sits under, a public route
    pub fn is_public_route(&self, path: &str) -> bool {
        self.public_routes.iter().any(|route| {
            path == *route
                || path
                    .strip_prefix(route)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// Whether the path starts with an auth route
    pub fn is_auth_route(&self, path: &str) -> bool {
        self.auth_routes.iter().any(|route| path.starts_with(route))
    }

    /// Decide between redirect and pass-through for the original request path
    ///
    /// Signed-in users on auth routes go to the dashboard; this wins over the
    /// public-route check. Anonymous users on non-public routes go to login
    /// with the original path as `redirect`.
    pub fn authorize(&self, path: &str, has_auth_cookie: bool) -> AuthDecision {
        if self.is_auth_route(path) && has_auth_cookie {
            return AuthDecision::Redirect(DASHBOARD_PATH.to_string());
        }

        if !self.is_public_route(path) && !has_auth_cookie {
            return AuthDecision::Redirect(format!("{LOGIN_PATH}?redirect={path}"));
        }

        AuthDecision::Continue
    }
}
