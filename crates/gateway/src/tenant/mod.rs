//! Host-based tenant resolution
//!
//! Every request is served on behalf of exactly one tenant, picked from the
//! `Host` header:
//! - Configured domains: consulta.acme.com.br -> tenant `acme`
//! - Anything else: the built-in default tenant

mod resolver;

pub use resolver::{ResolvedTenant, TenantResolver};
