//! Shared application state

use std::sync::Arc;
use std::time::Duration;

use crate::backend::{BackendClient, SessionCookies};
use crate::config::Config;
use crate::routing::{GatewayState, RouteAuthorizer};
use crate::tenant::TenantResolver;
use crate::upstream;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub resolver: TenantResolver,
    pub authorizer: RouteAuthorizer,
    pub http: reqwest::Client,
    pub backend: BackendClient,
    pub session_cookies: SessionCookies,
}

impl AppState {
    /// Build state from configuration; parses the tenant list once
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let http = upstream::http_client(Duration::from_millis(config.upstream_timeout_ms))?;
        let resolver = TenantResolver::from_config(config.tenants_config.as_deref());
        let backend = BackendClient::new(http.clone(), config.backend_api_url.clone());
        let session_cookies = SessionCookies::new(
            &config.auth_cookie_name,
            &config.refresh_cookie_name,
            config.secure_cookies,
        );

        Ok(Self {
            config: Arc::new(config),
            resolver,
            authorizer: RouteAuthorizer::default(),
            http,
            backend,
            session_cookies,
        })
    }

    /// State for the tenant gateway middleware
    pub fn gateway_state(&self) -> GatewayState {
        GatewayState {
            resolver: self.resolver.clone(),
            authorizer: self.authorizer,
            auth_cookie_name: Arc::from(self.session_cookies.access_name()),
            tenant_rewrite: self.config.tenant_rewrite,
        }
    }
}
