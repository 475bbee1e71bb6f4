// src/error.rs
//! Error types shared by the places client, the search loop and the HTTP front.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failure of a single call to the upstream places API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection, TLS or timeout problem (or building the HTTP client).
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The upstream answered with a non-2xx HTTP status.
    #[error("upstream answered with HTTP {0}")]
    HttpStatus(reqwest::StatusCode),
    /// HTTP 200, but the JSON envelope reported a failure status.
    #[error("upstream reported status {status}: {message}")]
    Status { status: String, message: String },
    /// The body was not the JSON we expected.
    #[error("malformed upstream body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors surfaced by the HTTP handlers. Bodies are plain text.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Invalid request method")]
    MethodNotAllowed,
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("credential unavailable: {0}")]
    Credential(anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Upstream(_) | ApiError::Credential(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::BadRequest(msg) => format!("Bad request: {msg}"),
            ApiError::MethodNotAllowed => {
                return (status, [(header::ALLOW, "POST")], self.to_string()).into_response();
            }
            ApiError::Upstream(e) => {
                tracing::warn!(error = %e, "search aborted by upstream failure");
                "Error fetching places".to_string()
            }
            ApiError::Credential(e) => {
                tracing::error!(error = ?e, "could not read places API key");
                "Error fetching places".to_string()
            }
        };
        (status, body).into_response()
    }
}
