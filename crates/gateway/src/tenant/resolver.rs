//! Host-to-Tenant Resolution
//!
//! Resolves incoming Host headers to tenant configurations.
//! The tenant list is read from `TENANTS_CONFIG` once at startup; a missing or
//! malformed value degrades to the built-in default tenant and is never
//! reported to callers.

use std::sync::Arc;

use candle_shared::{strip_port, TenantConfig};

/// The tenant a request was resolved to, stored in request extensions
#[derive(Debug, Clone)]
pub struct ResolvedTenant(pub Arc<TenantConfig>);

/// Host resolver over an immutable tenant list
#[derive(Debug, Clone)]
pub struct TenantResolver {
    tenants: Arc<[Arc<TenantConfig>]>,
    default_tenant: Arc<TenantConfig>,
}

impl TenantResolver {
    /// Create a resolver over an explicit tenant list
    pub fn new(tenants: Vec<TenantConfig>) -> Self {
        Self {
            tenants: tenants.into_iter().map(Arc::new).collect(),
            default_tenant: Arc::new(TenantConfig::default_tenant()),
        }
    }

    /// Create a resolver from the raw `TENANTS_CONFIG` value
    ///
    /// Absence or a parse failure yields a list holding only the default tenant.
    pub fn from_config(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            tracing::info!("TENANTS_CONFIG not set, serving default tenant only");
            return Self::new(vec![TenantConfig::default_tenant()]);
        };

        match TenantConfig::parse_list(raw) {
            Ok(tenants) => {
                for issue in TenantConfig::check_list(&tenants) {
                    tracing::warn!(issue = %issue, "Tenant configuration problem");
                }
                tracing::info!(
                    tenants = tenants.len(),
                    ids = ?tenants.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
                    "Loaded tenant configuration"
                );
                Self::new(tenants)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse TENANTS_CONFIG, falling back to default tenant");
                Self::new(vec![TenantConfig::default_tenant()])
            }
        }
    }

    /// Resolve a host header to a tenant
    ///
    /// Returns the first tenant whose domain equals the host without its port
    /// or the raw host; the default tenant when none match. Domains compare
    /// ASCII case-insensitively, as DNS names do.
    pub fn resolve(&self, host: &str) -> Arc<TenantConfig> {
        let raw_host = host.trim();
        let hostname = strip_port(raw_host);

        self.tenants
            .iter()
            .find(|tenant| tenant.serves(hostname, raw_host))
            .cloned()
            .unwrap_or_else(|| {
                tracing::trace!(host = %raw_host, "No tenant matched host, using default");
                Arc::clone(&self.default_tenant)
            })
    }

    /// Number of configured tenants
    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }

    /// The fallback tenant
    pub fn default_tenant(&self) -> &Arc<TenantConfig> {
        &self.default_tenant
    }
}
