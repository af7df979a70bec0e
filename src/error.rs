//! Error types and HTTP mapping for `PvCast`

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Main error type for the `PvCast` gateway
#[derive(Error, Debug)]
pub enum PvcastError {
    /// Coordinates missing, not numeric or out of range
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// The forecast provider did not answer within the configured timeout
    #[error("Upstream timeout: {message}")]
    UpstreamTimeout { message: String },

    /// Connection failure or non-success status from the forecast provider
    #[error("Upstream unreachable: {message}")]
    UpstreamUnreachable { message: String },

    /// The provider answered with a body that is not JSON
    #[error("Upstream malformed: {message}")]
    UpstreamMalformed { message: String },

    /// The provider answered with JSON lacking the daily forecast data
    #[error("Upstream incomplete: {message}")]
    UpstreamIncomplete { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl PvcastError {
    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new upstream timeout error
    pub fn upstream_timeout<S: Into<String>>(message: S) -> Self {
        Self::UpstreamTimeout {
            message: message.into(),
        }
    }

    /// Create a new upstream unreachable error
    pub fn upstream_unreachable<S: Into<String>>(message: S) -> Self {
        Self::UpstreamUnreachable {
            message: message.into(),
        }
    }

    /// Create a new upstream malformed error
    pub fn upstream_malformed<S: Into<String>>(message: S) -> Self {
        Self::UpstreamMalformed {
            message: message.into(),
        }
    }

    /// Create a new upstream incomplete error
    pub fn upstream_incomplete<S: Into<String>>(message: S) -> Self {
        Self::UpstreamIncomplete {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Name what the rejected request was after, e.g. `forecast` or `summary`.
    /// Only invalid input carries this; other errors pass through unchanged.
    #[must_use]
    pub fn fetching(self, subject: &str) -> Self {
        match self {
            Self::InvalidInput { message } => Self::InvalidInput {
                message: format!("cannot fetch {subject}: {message}"),
            },
            other => other,
        }
    }

    /// HTTP status reported to the client for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            PvcastError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            PvcastError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            PvcastError::UpstreamUnreachable { .. } => StatusCode::BAD_GATEWAY,
            PvcastError::UpstreamMalformed { .. }
            | PvcastError::UpstreamIncomplete { .. }
            | PvcastError::Config { .. }
            | PvcastError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            PvcastError::InvalidInput { message } => {
                format!("Invalid coordinates, {message}")
            }
            PvcastError::UpstreamTimeout { .. } => {
                "Weather API did not respond in time (timeout)".to_string()
            }
            PvcastError::UpstreamUnreachable { message } => {
                format!("Connection to weather API failed: {message}")
            }
            PvcastError::UpstreamMalformed { .. } => {
                "Invalid data format received from weather API".to_string()
            }
            PvcastError::UpstreamIncomplete { message } => {
                format!("Weather API response is missing forecast data: {message}")
            }
            PvcastError::Config { .. } => {
                "Server configuration error. Please contact the operator.".to_string()
            }
            PvcastError::Io { .. } => "Internal I/O failure".to_string(),
        }
    }
}

impl IntoResponse for PvcastError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = %status, "request failed");
        } else {
            tracing::warn!(error = %self, status = %status, "request rejected");
        }

        (status, Json(json!({ "detail": self.user_message() }))).into_response()
    }
}
