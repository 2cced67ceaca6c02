//! Backend API access on behalf of the browser session
//!
//! The browser never sees bearer tokens. Session tokens live in HttpOnly
//! cookies; the gateway turns the access-token cookie into an
//! `Authorization` header and refreshes it once when the backend answers 401.

mod client;
mod refresh;
mod session;

pub use client::{
    BackendClient, BackendError, BackendOutcome, BackendRequest, BackendResponse, SessionUpdate,
};
pub use refresh::{RefreshGuard, RefreshResult, TokenPair};
pub use session::{SessionCookies, SessionTokens};
