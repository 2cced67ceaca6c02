//! Common types used across Candle

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TenantConfigError, TenantIssue};

// =============================================================================
// ID Wrappers
// =============================================================================

/// Tenant ID wrapper
///
/// Tenant ids double as the first path segment of tenant-scoped pages,
/// e.g. `/candle/dashboard`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id can be used verbatim as one URL path segment
    pub fn is_path_segment(&self) -> bool {
        let id = self.as_str();
        !id.is_empty()
            && id != "."
            && id != ".."
            && id
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~'))
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for TenantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// =============================================================================
// Tenant Types
// =============================================================================

/// Id of the tenant used when no configured domain matches
pub const DEFAULT_TENANT_ID: &str = "candle";

/// Domain of the default tenant
pub const DEFAULT_TENANT_DOMAIN: &str = "localhost";

/// Brand colors applied to a tenant's pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantColors {
    pub primary: String,
    pub primary_foreground: String,
}

impl Default for TenantColors {
    fn default() -> Self {
        Self {
            primary: "#f97316".to_string(),
            primary_foreground: "#ffffff".to_string(),
        }
    }
}

/// A tenant (brand) sharing the application under its own domain and path namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantConfig {
    pub id: TenantId,
    pub domain: String,
    pub name: String,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub favicon_url: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub colors: TenantColors,
}

impl TenantConfig {
    /// The built-in tenant served when configuration is absent or no domain matches
    pub fn default_tenant() -> Self {
        Self {
            id: TenantId::from(DEFAULT_TENANT_ID),
            domain: DEFAULT_TENANT_DOMAIN.to_string(),
            name: "Candle".to_string(),
            logo_url: "/logo.svg".to_string(),
            favicon_url: "/favicon.ico".to_string(),
            contact_email: "contato@candle.com.br".to_string(),
            colors: TenantColors::default(),
        }
    }

    /// Parse a JSON array of tenant records
    pub fn parse_list(json: &str) -> Result<Vec<TenantConfig>, TenantConfigError> {
        let value: serde_json::Value = serde_json::from_str(json)?;

        let kind = match &value {
            serde_json::Value::Array(_) => None,
            serde_json::Value::Null => Some("null"),
            serde_json::Value::Bool(_) => Some("boolean"),
            serde_json::Value::Number(_) => Some("number"),
            serde_json::Value::String(_) => Some("string"),
            serde_json::Value::Object(_) => Some("object"),
        };
        if let Some(kind) = kind {
            return Err(TenantConfigError::NotAnArray(kind));
        }

        Ok(serde_json::from_value(value)?)
    }

    /// Whether this tenant is served on the given host.
    ///
    /// `hostname` is the host with its port stripped, `raw_host` the header as received.
    /// Host names compare case-insensitively.
    pub fn serves(&self, hostname: &str, raw_host: &str) -> bool {
        self.domain.eq_ignore_ascii_case(hostname) || self.domain.eq_ignore_ascii_case(raw_host)
    }

    /// Whether an earlier tenant in the list answers every host this one serves
    pub fn shadowed_by(&self, earlier: &TenantConfig) -> bool {
        earlier.serves(strip_port(&self.domain), &self.domain)
    }

    /// Find ids that cannot be served and tenants that can never be resolved
    pub fn check_list(tenants: &[TenantConfig]) -> Vec<TenantIssue> {
        let mut issues = Vec::new();

        for (index, tenant) in tenants.iter().enumerate() {
            let earlier = &tenants[..index];

            if !tenant.id.is_path_segment() {
                issues.push(TenantIssue::InvalidId(tenant.id.to_string()));
            }
            if earlier.iter().any(|other| other.id == tenant.id) {
                issues.push(TenantIssue::DuplicateId(tenant.id.to_string()));
            }
            if let Some(other) = earlier.iter().find(|other| tenant.shadowed_by(other)) {
                issues.push(TenantIssue::Shadowed {
                    id: tenant.id.to_string(),
                    domain: tenant.domain.clone(),
                    by: other.id.to_string(),
                });
            }
        }

        issues
    }
}

/// Remove a trailing `:port` from a host header value
///
/// Bracketed IPv6 literals keep their brackets: `[::1]:3000` -> `[::1]`.
pub fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }

    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}
