//! Candle Edge Gateway Library
//!
//! This crate contains the multi-tenant edge gateway that sits in front of
//! the Candle page renderer and backend API.

pub mod backend;
pub mod config;
pub mod error;
pub mod routes;
pub mod routing;
pub mod security;
pub mod state;
pub mod tenant;
pub mod upstream;

pub use config::Config;
pub use error::{GatewayError, GatewayResult};
pub use routing::{AuthDecision, RouteAuthorizer};
pub use state::AppState;
pub use tenant::{ResolvedTenant, TenantResolver};
