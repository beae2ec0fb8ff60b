//! Authentication error types.

use axum::http::StatusCode;
use thiserror::Error;

/// Failure talking to the auth service. Always absorbed by the gate.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("auth service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("auth service responded with {0}")]
    Status(StatusCode),
    #[error("invalid profile body: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("invalid backend url: {0}")]
    Url(#[from] url::ParseError),
}

impl UpstreamError {
    /// Whether the auth service explicitly rejected the credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status(StatusCode::UNAUTHORIZED))
    }
}

/// Errors loading a role permission table at startup.
#[derive(Debug, Error)]
pub enum PermissionsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid permissions json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("role {role}: path prefix {prefix:?} must start with '/' and not end with '/'")]
    InvalidPrefix { role: String, prefix: String },
}
