//! Backend API Client
//!
//! Forwards buffered requests to the backend API with the session's bearer
//! token. A 401 triggers one refresh (coalesced through [`RefreshGuard`]) and
//! one retry with the new token.

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use url::Url;

use super::refresh::{RefreshGuard, RefreshResult, TokenPair};
use super::session::SessionTokens;
use crate::upstream;

/// Backend endpoint that exchanges a refresh token for new tokens
const REFRESH_PATH: &str = "/auth/refresh";

/// Error type for backend client operations
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid backend path: {0}")]
    InvalidPath(String),
}

/// A request buffered so it can be replayed after a refresh
#[derive(Debug, Clone)]
pub struct BackendRequest {
    pub method: Method,
    /// Path and query relative to the backend base URL, starting with `/`
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// What happened to the session while serving a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    Unchanged,
    /// Tokens were refreshed; the caller should persist them
    Refreshed(TokenPair),
    /// Refresh was rejected; the caller should drop the session
    Expired,
}

#[derive(Debug, Clone)]
pub struct BackendOutcome {
    pub response: BackendResponse,
    pub session: SessionUpdate,
}

/// Client for the backend API
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
    refresh_guard: Arc<RefreshGuard>,
}

impl BackendClient {
    pub fn new(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            refresh_guard: Arc::new(RefreshGuard::new()),
        }
    }

    /// Send a request on behalf of a session, refreshing once on 401
    pub async fn send(
        &self,
        request: &BackendRequest,
        session: &SessionTokens,
    ) -> Result<BackendOutcome, BackendError> {
        let response = self
            .execute(request, session.access_token.as_deref())
            .await?;

        if response.status != StatusCode::UNAUTHORIZED {
            return Ok(BackendOutcome {
                response,
                session: SessionUpdate::Unchanged,
            });
        }

        let Some(refresh_token) = session.refresh_token.as_deref() else {
            return Ok(BackendOutcome {
                response,
                session: SessionUpdate::Unchanged,
            });
        };

        let refreshed = self
            .refresh_guard
            .run(refresh_token, || self.refresh_tokens(refresh_token))
            .await;

        match refreshed {
            Ok(tokens) => {
                tracing::debug!(path = %request.path_and_query, "Access token refreshed, retrying request");
                let retried = self.execute(request, Some(&tokens.access_token)).await?;
                Ok(BackendOutcome {
                    response: retried,
                    session: SessionUpdate::Refreshed(tokens),
                })
            }
            Err(reason) => {
                tracing::info!(reason = %reason, "Token refresh failed, session expired");
                Ok(BackendOutcome {
                    response,
                    session: SessionUpdate::Expired,
                })
            }
        }
    }

    /// Perform a single request without any retry
    async fn execute(
        &self,
        request: &BackendRequest,
        access_token: Option<&str>,
    ) -> Result<BackendResponse, BackendError> {
        let url = self.url(&request.path_and_query)?;

        let mut headers = upstream::request_headers(&request.headers);
        // Browser cookies and credentials never reach the backend
        headers.remove(header::COOKIE);
        headers.remove(header::AUTHORIZATION);
        if let Some(token) = access_token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
                headers.insert(header::AUTHORIZATION, value);
            }
        }

        let response = self
            .http
            .request(request.method.clone(), url)
            .headers(headers)
            .body(request.body.clone())
            .send()
            .await?;

        let status = response.status();
        let headers = upstream::response_headers(response.headers());
        let body = response.bytes().await?;

        Ok(BackendResponse {
            status,
            headers,
            body,
        })
    }

    /// Exchange a refresh token for a new token pair
    async fn refresh_tokens(&self, refresh_token: &str) -> RefreshResult {
        let url = self.url(REFRESH_PATH).map_err(|e| e.to_string())?;

        let response = self
            .http
            .post(url)
            .json(&serde_json::json!({ "refreshToken": refresh_token }))
            .send()
            .await
            .map_err(|e| format!("refresh request failed: {e}"))?;

        if !response.status().is_success() {
            return Err(format!("refresh rejected with status {}", response.status()));
        }

        response
            .json::<TokenPair>()
            .await
            .map_err(|e| format!("invalid refresh response: {e}"))
    }

    /// Join a path onto the backend base URL, keeping any base path prefix
    ///
    /// The joined URL never leaves the base path: dot segments (plain or
    /// percent-encoded) are rejected.
    fn url(&self, path_and_query: &str) -> Result<Url, BackendError> {
        let invalid = || BackendError::InvalidPath(path_and_query.to_string());

        if !path_and_query.starts_with('/') || path_and_query.starts_with("//") {
            return Err(invalid());
        }

        let path = path_and_query
            .split_once('?')
            .map_or(path_and_query, |(path, _)| path);
        if path.split('/').any(is_dot_segment) {
            return Err(invalid());
        }

        let base_path = self.base_url.path().trim_end_matches('/');
        let base = self.base_url.as_str().trim_end_matches('/');
        let url = Url::parse(&format!("{base}{path_and_query}")).map_err(|_| invalid())?;

        if url.origin() != self.base_url.origin() || !url.path().starts_with(base_path) {
            return Err(invalid());
        }
        Ok(url)
    }
}

/// `.` or `..`, including percent-encoded forms such as `%2e%2E`
fn is_dot_segment(segment: &str) -> bool {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    decoded == "." || decoded == ".."
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(server: &mockito::Server) -> BackendClient {
        BackendClient::new(reqwest::Client::new(), Url::parse(&server.url()).unwrap())
    }

    fn get(path: &str) -> BackendRequest {
        BackendRequest {
            method: Method::GET,
            path_and_query: path.to_string(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    fn session(access: &str, refresh: Option<&str>) -> SessionTokens {
        SessionTokens {
            access_token: Some(access.to_string()),
            refresh_token: refresh.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_injects_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/users/me")
            .match_header("authorization", "Bearer good")
            .with_status(200)
            .with_body(r#"{"name":"Ana"}"#)
            .create_async()
            .await;

        let outcome = client(&server)
            .send(&get("/users/me"), &session("good", Some("r1")))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(outcome.response.status, StatusCode::OK);
        assert_eq!(outcome.response.body.as_ref(), br#"{"name":"Ana"}"#);
        assert_eq!(outcome.session, SessionUpdate::Unchanged);
    }

    #[tokio::test]
    async fn test_refreshes_once_and_retries() {
        let mut server = mockito::Server::new_async().await;
        let stale = server
            .mock("GET", "/wallet/balance")
            .match_header("authorization", "Bearer stale")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;
        let refresh = server
            .mock("POST", "/auth/refresh")
            .match_body(Matcher::Json(serde_json::json!({ "refreshToken": "r1" })))
            .with_status(200)
            .with_body(r#"{"accessToken":"fresh","refreshToken":"r2"}"#)
            .expect(1)
            .create_async()
            .await;
        let fresh = server
            .mock("GET", "/wallet/balance")
            .match_header("authorization", "Bearer fresh")
            .with_status(200)
            .with_body(r#"{"balance":150}"#)
            .expect(1)
            .create_async()
            .await;

        let outcome = client(&server)
            .send(&get("/wallet/balance"), &session("stale", Some("r1")))
            .await
            .unwrap();

        stale.assert_async().await;
        refresh.assert_async().await;
        fresh.assert_async().await;
        assert_eq!(outcome.response.status, StatusCode::OK);
        assert_eq!(
            outcome.session,
            SessionUpdate::Refreshed(TokenPair {
                access_token: "fresh".to_string(),
                refresh_token: Some("r2".to_string()),
            })
        );
    }

    #[tokio::test]
    async fn test_rejected_refresh_expires_session() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/me")
            .with_status(401)
            .create_async()
            .await;
        server
            .mock("POST", "/auth/refresh")
            .with_status(401)
            .create_async()
            .await;

        let outcome = client(&server)
            .send(&get("/users/me"), &session("stale", Some("revoked")))
            .await
            .unwrap();

        assert_eq!(outcome.response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(outcome.session, SessionUpdate::Expired);
    }

    #[tokio::test]
    async fn test_401_without_refresh_token_passes_through() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/me")
            .with_status(401)
            .create_async()
            .await;
        let refresh = server
            .mock("POST", "/auth/refresh")
            .expect(0)
            .create_async()
            .await;

        let outcome = client(&server)
            .send(&get("/users/me"), &session("stale", None))
            .await
            .unwrap();

        refresh.assert_async().await;
        assert_eq!(outcome.response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(outcome.session, SessionUpdate::Unchanged);
    }

    #[tokio::test]
    async fn test_browser_cookies_are_not_forwarded() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/users/me")
            .match_header("cookie", Matcher::Missing)
            .with_status(200)
            .create_async()
            .await;

        let mut request = get("/users/me");
        request.headers.insert(
            header::COOKIE,
            HeaderValue::from_static("accessToken=good; refreshToken=r1"),
        );
        client(&server)
            .send(&request, &session("good", Some("r1")))
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[test]
    fn test_url_keeps_base_path() {
        let client = BackendClient::new(
            reqwest::Client::new(),
            Url::parse("https://api.candle.com.br/v1/").unwrap(),
        );
        assert_eq!(
            client.url("/consultas?page=2").unwrap().as_str(),
            "https://api.candle.com.br/v1/consultas?page=2"
        );
        assert!(matches!(client.url("consultas"), Err(BackendError::InvalidPath(_))));
        assert!(matches!(client.url("//evil.test/x"), Err(BackendError::InvalidPath(_))));
    }

    #[test]
    fn test_url_rejects_dot_segments() {
        let client = BackendClient::new(
            reqwest::Client::new(),
            Url::parse("https://api.candle.com.br/v1/").unwrap(),
        );
        for path in [
            "/../admin/users",
            "/consultas/../../admin",
            "/./consultas",
            "/%2e%2e/admin",
            "/%2E./admin",
            "/.%2E/admin?x=1",
        ] {
            assert!(
                matches!(client.url(path), Err(BackendError::InvalidPath(_))),
                "{path} should be rejected"
            );
        }

        // Dots inside a segment or in the query are fine
        assert_eq!(
            client.url("/files/report..pdf?next=../x").unwrap().as_str(),
            "https://api.candle.com.br/v1/files/report..pdf?next=../x"
        );
    }
}
