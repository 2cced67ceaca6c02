//! Error types for Candle

use thiserror::Error;

/// Errors raised while reading a tenant list from its JSON source.
#[derive(Debug, Error)]
pub enum TenantConfigError {
    #[error("Tenant configuration is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Tenant configuration must be a JSON array, found {0}")]
    NotAnArray(&'static str),
}

/// Problems in a tenant list that parses but misbehaves when served.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TenantIssue {
    #[error("Tenant id '{0}' is not a single URL path segment")]
    InvalidId(String),

    #[error("Duplicate tenant id '{0}'")]
    DuplicateId(String),

    #[error("Domain '{domain}' of tenant '{id}' is already served by tenant '{by}'; '{id}' is unreachable")]
    Shadowed { id: String, domain: String, by: String },
}

impl TenantIssue {
    /// Issues that break every page request of the tenant
    pub fn is_fatal(&self) -> bool {
        matches!(self, TenantIssue::InvalidId(_))
    }
}
