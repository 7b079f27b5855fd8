use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Every way a publish can fail, from key import to the final commit.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("no private key loaded, import a .pem key first")]
    MissingCredential,

    #[error("private key is not a usable RSA PEM: {0}")]
    InvalidKeyFormat(String),

    #[error("failed to sign app JWT: {0}")]
    Signing(String),

    #[error("GitHub rejected the credentials: {0}")]
    Unauthorized(String),

    #[error("GitHub App is missing the required permission: {0}")]
    Forbidden(String),

    #[error("not found on GitHub: {0}")]
    NotFound(String),

    #[error("remote file changed since it was read, reload and retry: {0}")]
    Conflict(String),

    #[error("content is too large for the contents API: {0}")]
    PayloadTooLarge(String),

    #[error("invalid content: {0}")]
    Validation(String),

    #[error("network error talking to GitHub: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected GitHub response ({status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("failed to decode GitHub response: {0}")]
    Decode(String),

    #[error("a publish is already in progress")]
    PublishInProgress,
}

impl PublishError {
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(body),
            StatusCode::FORBIDDEN => Self::Forbidden(body),
            StatusCode::NOT_FOUND => Self::NotFound(body),
            StatusCode::CONFLICT => Self::Conflict(body),
            StatusCode::PAYLOAD_TOO_LARGE => Self::PayloadTooLarge(body),
            StatusCode::UNPROCESSABLE_ENTITY => Self::Validation(body),
            _ => Self::Upstream {
                status: status.as_u16(),
                body,
            },
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Upstream { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }

    /// True when the request never reached the server, so repeating a
    /// non-idempotent write cannot double-apply.
    pub fn is_connect_failure(&self) -> bool {
        matches!(self, Self::Network(e) if e.is_connect())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::InvalidKeyFormat(_) => "invalid_key_format",
            Self::Signing(_) => "signing_error",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::Validation(_) => "validation_error",
            Self::Network(_) => "network_error",
            Self::Upstream { .. } => "upstream_error",
            Self::Decode(_) => "decode_error",
            Self::PublishInProgress => "publish_in_progress",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingCredential | Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidKeyFormat(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Network(_) | Self::Upstream { .. } | Self::Decode(_) => StatusCode::BAD_GATEWAY,
            Self::PublishInProgress => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for PublishError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}
