//! Notification data types.

use serde::{Deserialize, Serialize};

use crate::error::NotifyError;

/// The recipient's answer to the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseValue {
    #[serde(rename = "YES")]
    Yes,
    #[serde(rename = "NO")]
    No,
}

impl ResponseValue {
    /// Wire literal, exactly as accepted by the endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "YES",
            Self::No => "NO",
        }
    }

    /// Parse a wire literal. Matching is case-sensitive.
    pub fn from_literal(s: &str) -> Option<Self> {
        match s {
            "YES" => Some(Self::Yes),
            "NO" => Some(Self::No),
            _ => None,
        }
    }

    /// Parse a raw submission body of the form `{"response": "YES" | "NO"}`.
    ///
    /// Malformed JSON, a missing field, a non-string value and an unknown
    /// literal are all the same client error.
    pub fn from_request_body(body: &[u8]) -> Result<Self, NotifyError> {
        let value: serde_json::Value =
            serde_json::from_slice(body).map_err(|_| NotifyError::InvalidInput)?;

        value
            .get("response")
            .and_then(|v| v.as_str())
            .and_then(Self::from_literal)
            .ok_or(NotifyError::InvalidInput)
    }
}

impl std::fmt::Display for ResponseValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rendered notification, ready for a sink. Never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPayload {
    pub subject: String,
    pub html_body: String,
    pub recipient: String,
    pub sender: String,
}

/// Successful delivery acknowledgment returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAck {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_id: Option<String>,
    /// Echo of the submitted value; logged, not serialized.
    #[serde(skip)]
    pub response: ResponseValue,
}

impl SubmitAck {
    pub fn delivered(response: ResponseValue, email_id: Option<String>) -> Self {
        Self {
            success: true,
            email_id,
            response,
        }
    }
}
