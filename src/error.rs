//! Error types.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;

/// Error enumerates the possible proxy error states.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when a legacy request can't be decoded into its parameters.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// Returned when the [`/ringout.asp` endpoint][crate::api#ringoutasp-get-post] receives a
    /// `cmd` outside of the supported set.
    #[error("invalid command \"{0}\"")]
    InvalidCommand(String),

    /// Returned when the platform rejects the password grant for the legacy credentials, or the
    /// grant request could not be made at all.
    #[error("authorization failed: {0}")]
    AuthorizationFailed(String),

    /// Returned when the platform answers an API call with a 4xx status.
    #[error("REST API Response: {0}")]
    DownstreamClientError(u16),

    /// Returned when the platform answers an API call with a 5xx status, or an unexpected
    /// redirect.
    #[error("REST API Response: {0}")]
    DownstreamServerError(u16),

    /// Returned when the platform could not be reached, or its response body could not be read.
    #[error("platform request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Returned when a platform payload can't be re-encoded for the legacy client.
    #[error("failed to encode response: {0}")]
    Serialization(serde_json::Error),

    /// Returned when a `multipart/form-data` body is truncated or otherwise invalid.
    #[error("invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),

    /// Returned when required configuration is missing or can't be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when a [`Config`][crate::config::Config] file contains invalid JSON.
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),
}

impl Error {
    /// The HTTP status a legacy client sees for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MalformedRequest(_)
            | Error::InvalidCommand(_)
            | Error::DownstreamClientError(_)
            | Error::Multipart(_) => StatusCode::BAD_REQUEST,
            Error::AuthorizationFailed(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Classify a non-2xx platform status. Redirects are never followed and count as
    /// server-side failures.
    #[must_use]
    pub fn from_downstream_status(status: u16) -> Self {
        match status {
            400..=499 => Error::DownstreamClientError(status),
            _ => Error::DownstreamServerError(status),
        }
    }
}
