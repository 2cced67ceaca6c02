//! Page renderer forwarding
//!
//! Every request the router does not handle itself goes to the page renderer,
//! already rewritten to the tenant's path namespace by the gateway middleware.

use axum::{
    body::{Body, HttpBody},
    extract::{Request, State},
    http::{header, HeaderValue},
    response::Response,
};
use uuid::Uuid;

use crate::error::{GatewayError, GatewayResult};
use crate::routing::OriginalPath;
use crate::state::AppState;
use crate::tenant::ResolvedTenant;
use crate::upstream::{
    self, FORWARDED_HOST_HEADER, ORIGINAL_PATH_HEADER, REQUEST_ID_HEADER, TENANT_ID_HEADER,
};

/// Forward the (rewritten) request to the page renderer, streaming both bodies
pub async fn forward(State(state): State<AppState>, request: Request) -> GatewayResult<Response> {
    let (parts, body) = request.into_parts();

    let tenant = parts
        .extensions
        .get::<ResolvedTenant>()
        .map(|t| t.0.clone())
        .unwrap_or_else(|| state.resolver.default_tenant().clone());

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = format!(
        "{}{}",
        state.config.renderer_url.as_str().trim_end_matches('/'),
        path_and_query
    );

    let mut headers = upstream::request_headers(&parts.headers);
    let tenant_id = HeaderValue::from_str(tenant.id.as_str())
        .map_err(|_| GatewayError::BadRequest("Tenant id is not a valid header value".to_string()))?;
    headers.insert(TENANT_ID_HEADER, tenant_id);
    if let Some(host) = upstream::request_host(&parts.headers, &parts.uri) {
        if let Ok(value) = HeaderValue::from_str(host) {
            headers.insert(FORWARDED_HOST_HEADER, value);
        }
    }
    if let Some(OriginalPath(path)) = parts.extensions.get::<OriginalPath>() {
        if let Ok(value) = HeaderValue::from_str(path) {
            headers.insert(ORIGINAL_PATH_HEADER, value);
        }
    }
    if !headers.contains_key(REQUEST_ID_HEADER) {
        if let Ok(value) = HeaderValue::from_str(&Uuid::new_v4().to_string()) {
            headers.insert(REQUEST_ID_HEADER, value);
        }
    }

    tracing::debug!(tenant = %tenant.id, url = %url, "Forwarding to renderer");

    let mut builder = state.http.request(parts.method, &url);
    if !body.is_end_stream() {
        if let Some(length) = parts.headers.get(header::CONTENT_LENGTH) {
            headers.insert(header::CONTENT_LENGTH, length.clone());
        }
        builder = builder.body(reqwest::Body::wrap_stream(body.into_data_stream()));
    }

    let rendered = builder.headers(headers).send().await?;

    let status = rendered.status();
    let headers = upstream::response_headers(rendered.headers());

    let mut response = Response::new(Body::from_stream(rendered.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;

    Ok(response)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::{Config, LogFormat};
    use axum::http::{Request, StatusCode};
    use mockito::Matcher;
    use url::Url;

    fn config(renderer_url: &str) -> Config {
        Config {
            bind_address: "127.0.0.1:0".parse().unwrap(),
            tenants_config: None,
            tenant_rewrite: true,
            renderer_url: Url::parse(renderer_url).unwrap(),
            backend_api_url: Url::parse("http://127.0.0.1:9").unwrap(),
            upstream_timeout_ms: 5000,
            max_body_bytes: 1024,
            auth_cookie_name: "accessToken".to_string(),
            refresh_cookie_name: "refreshToken".to_string(),
            secure_cookies: false,
            log_format: LogFormat::Text,
        }
    }

    #[tokio::test]
    async fn test_forwards_with_tenant_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/candle/termos")
            .match_query(Matcher::UrlEncoded("v".into(), "2".into()))
            .match_header("x-tenant-id", "candle")
            .match_header("x-forwarded-host", "localhost:3000")
            .match_header("x-request-id", Matcher::Any)
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<h1>Termos</h1>")
            .create_async()
            .await;

        let state = AppState::new(config(&server.url())).unwrap();
        let request = Request::builder()
            .uri("/candle/termos?v=2")
            .header(header::HOST, "localhost:3000")
            .body(Body::empty())
            .unwrap();

        let response = forward(State(state), request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("content-type").unwrap(), "text/html");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body.as_ref(), b"<h1>Termos</h1>");
    }

    #[tokio::test]
    async fn test_large_body_is_streamed_through() {
        let mut server = mockito::Server::new_async().await;
        let payload = "x".repeat(64 * 1024);
        let mock = server
            .mock("POST", "/candle/contato")
            .match_body(payload.as_str())
            .with_status(303)
            .with_header("location", "/candle/obrigado")
            .create_async()
            .await;

        // Well above max_body_bytes, which only bounds backend proxy bodies
        let state = AppState::new(config(&server.url())).unwrap();
        let request = Request::builder()
            .method("POST")
            .uri("/candle/contato")
            .body(Body::from(payload.clone()))
            .unwrap();

        let response = forward(State(state), request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/candle/obrigado");
    }

    #[tokio::test]
    async fn test_forwarded_host_falls_back_to_uri_authority() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/candle/sobre")
            .match_header("x-forwarded-host", "consulta.acme.com.br")
            .match_header("x-original-path", "/sobre")
            .with_status(200)
            .create_async()
            .await;

        let state = AppState::new(config(&server.url())).unwrap();
        // HTTP/2 requests carry the host in the URI instead of a Host header
        let mut request = Request::builder()
            .uri("https://consulta.acme.com.br/candle/sobre")
            .body(Body::empty())
            .unwrap();
        request
            .extensions_mut()
            .insert(OriginalPath("/sobre".to_string()));

        let response = forward(State(state), request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unreachable_renderer_is_bad_gateway() {
        // Port 9 (discard) is not listening in the test environment
        let state = AppState::new(config("http://127.0.0.1:9")).unwrap();
        let request = Request::builder()
            .uri("/candle/")
            .body(Body::empty())
            .unwrap();

        let result = forward(State(state), request).await;
        assert!(matches!(result, Err(GatewayError::BadGateway(_))));
    }
}
