//! Gateway configuration

use std::env;
use std::net::SocketAddr;

use url::Url;

/// Log output format selected by `LOG_FORMAT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Gateway configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_address: SocketAddr,

    // Tenancy
    pub tenants_config: Option<String>,
    pub tenant_rewrite: bool,

    // Upstreams
    pub renderer_url: Url,
    pub backend_api_url: Url,
    pub upstream_timeout_ms: u64,
    pub max_body_bytes: usize,

    // Session cookies
    pub auth_cookie_name: String,
    pub refresh_cookie_name: String,
    pub secure_cookies: bool,

    // Logging
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_address = env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Ok(Self {
            // Server
            bind_address: bind_address
                .parse()
                .map_err(|_| ConfigError::InvalidBindAddress(bind_address))?,

            // Tenancy
            tenants_config: env::var("TENANTS_CONFIG").ok().filter(|v| !v.trim().is_empty()),
            tenant_rewrite: env::var("TENANT_REWRITE")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),

            // Upstreams
            renderer_url: parse_url(
                "RENDERER_URL",
                env::var("RENDERER_URL").unwrap_or_else(|_| "http://localhost:3001".to_string()),
            )?,
            backend_api_url: parse_url(
                "BACKEND_API_URL",
                env::var("BACKEND_API_URL").unwrap_or_else(|_| "http://localhost:8080".to_string()),
            )?,
            upstream_timeout_ms: env::var("UPSTREAM_TIMEOUT_MS")
                .unwrap_or_else(|_| "30000".to_string())
                .parse()
                .unwrap_or(30000),
            max_body_bytes: env::var("MAX_BODY_BYTES")
                .unwrap_or_else(|_| "10485760".to_string()) // 10MB default
                .parse()
                .unwrap_or(10_485_760),

            // Session cookies
            auth_cookie_name: env::var("AUTH_COOKIE_NAME")
                .unwrap_or_else(|_| "accessToken".to_string()),
            refresh_cookie_name: env::var("REFRESH_COOKIE_NAME")
                .unwrap_or_else(|_| "refreshToken".to_string()),
            secure_cookies: env::var("SECURE_COOKIES")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),

            // Logging
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
        })
    }
}

/// Upstream base URLs must be absolute http(s) URLs
fn parse_url(var: &'static str, value: String) -> Result<Url, ConfigError> {
    let url = Url::parse(&value).map_err(|_| ConfigError::InvalidUrl(var, value.clone()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl(var, value));
    }
    Ok(url)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),
    #[error("Invalid URL in {0}: {1}")]
    InvalidUrl(&'static str, String),
}
