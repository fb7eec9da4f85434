//! Error types for the Valentine card service.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors produced by the submission endpoint.
///
/// Each variant maps to a fixed status code and a fixed public message.
/// The `Display` output carries the detail and is only ever logged.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Invalid response value")]
    InvalidInput,

    #[error("Missing env vars: {}", missing.join(", "))]
    MisconfiguredEnvironment { missing: Vec<String> },

    #[error("Notification sink failed: {0}")]
    DeliveryFailed(#[from] SinkError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl NotifyError {
    /// HTTP status reported to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::MisconfiguredEnvironment { .. } | Self::DeliveryFailed(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The message placed in the JSON error body.
    ///
    /// Missing variable names are the only detail that crosses the boundary.
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidInput => "Invalid response value".to_string(),
            Self::MisconfiguredEnvironment { .. } => self.to_string(),
            Self::DeliveryFailed(_) => "Failed to send notification".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            Self::MethodNotAllowed => "Method not allowed".to_string(),
        }
    }
}

impl IntoResponse for NotifyError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(serde_json::json!({ "error": self.public_message() })),
        )
            .into_response()
    }
}

/// Errors reported by a notification sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Request to {provider} failed: {reason}")]
    Request { provider: String, reason: String },

    #[error("{provider} rejected the message with status {status}: {body}")]
    Rejected {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

/// Errors seen by the card client when posting a response.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Submission request failed: {0}")]
    Request(String),

    #[error("Submission endpoint returned status {0}")]
    Status(u16),
}
