//! Response hardening applied at the edge

mod headers;

pub use headers::security_headers_middleware;
