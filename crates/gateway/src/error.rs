//! Gateway error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::backend::BackendError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    // Session errors
    #[error("Session expired")]
    SessionExpired,

    // Request errors
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Request body too large")]
    PayloadTooLarge,

    // Upstream errors
    #[error("Upstream unavailable: {0}")]
    BadGateway(String),
    #[error("Upstream timed out")]
    GatewayTimeout,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            GatewayError::SessionExpired => (StatusCode::UNAUTHORIZED, "SESSION_EXPIRED", self.to_string()),
            GatewayError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            GatewayError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", self.to_string()),
            // Upstream details stay in the logs
            GatewayError::BadGateway(_) => (StatusCode::BAD_GATEWAY, "BAD_GATEWAY", "Upstream unavailable".to_string()),
            GatewayError::GatewayTimeout => (StatusCode::GATEWAY_TIMEOUT, "GATEWAY_TIMEOUT", self.to_string()),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("Upstream request failed: {:?}", err);
        if err.is_timeout() {
            GatewayError::GatewayTimeout
        } else {
            GatewayError::BadGateway(err.to_string())
        }
    }
}

impl From<BackendError> for GatewayError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Http(e) => e.into(),
            BackendError::InvalidPath(path) => GatewayError::BadRequest(format!("Invalid backend path: {path}")),
        }
    }
}

/// Result type alias for gateway handlers
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = GatewayError::SessionExpired.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "SESSION_EXPIRED");
    }

    #[test]
    fn test_bad_gateway_hides_upstream_detail() {
        let response = GatewayError::BadGateway("connect refused 10.0.0.4:3001".to_string())
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
