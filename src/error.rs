use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use std::fmt;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum RosterError {
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("HTTP protocol error: {0}")]
    Http(#[from] axum::http::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("password hashing error: {0}")]
    PasswordHash(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("remote call failed: {0}")]
    RemoteCall(RemoteFailure),

    #[error("bulk create rejected with status {0}")]
    ReplayRejected(StatusCode),
}

impl IntoResponse for RosterError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            RosterError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "INVALID_REQUEST".to_string(),
                    message,
                },
            ),
            RosterError::Json(e) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "INVALID_REQUEST".to_string(),
                    message: e.to_string(),
                },
            ),
            RosterError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ApiErrorBody {
                    code: "UNAUTHORIZED".to_string(),
                    message: "Authentication failed.".to_string(),
                },
            ),
            RosterError::Reqwest(_) | RosterError::UrlParse(_) | RosterError::RemoteCall(_) => (
                StatusCode::BAD_GATEWAY,
                ApiErrorBody {
                    code: "BAD_GATEWAY".to_string(),
                    message: "Upstream service is unavailable.".to_string(),
                },
            ),
            RosterError::Database(_)
            | RosterError::Io(_)
            | RosterError::Http(_)
            | RosterError::PasswordHash(_)
            | RosterError::Config(_)
            | RosterError::ReplayRejected(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                },
            ),
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

/// Outcome of a failed call against the legacy service: a human-readable
/// message, the HTTP status code when one was received, and the underlying
/// error text. Displayed as its JSON encoding so operators see one
/// copy-pastable object.
#[derive(Debug, Clone, Serialize)]
pub struct RemoteFailure {
    pub message: String,
    pub code: Option<u16>,
    pub error: String,
}

impl RemoteFailure {
    pub fn transport(message: &str, err: &reqwest::Error) -> Self {
        Self {
            message: message.to_string(),
            code: err.status().map(|s| s.as_u16()),
            error: err.to_string(),
        }
    }

    pub fn status(message: &str, code: u16, error: String) -> Self {
        Self {
            message: message.to_string(),
            code: Some(code),
            error,
        }
    }
}

impl fmt::Display for RemoteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{self:?}"),
        }
    }
}
