//! Notification sinks, where rendered notifications are delivered.
//!
//! The only production sink is the Resend transactional email API
//! (<https://resend.com/docs/api-reference/emails/send-email>).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::model::NotificationPayload;
use crate::config::NotifyConfig;
use crate::error::SinkError;

/// Request timeout for the email API.
const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of a successful hand-off to a sink.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Opaque identifier assigned by the sink, if it returned one.
    pub id: Option<String>,
}

/// An external service that delivers a notification.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Deliver a single notification. No retries.
    async fn send(&self, payload: &NotificationPayload) -> Result<Delivery, SinkError>;
}

/// Builds a sink for one request's configuration.
///
/// Credentials are only known per request, so sinks are not long-lived.
pub trait SinkFactory: Send + Sync {
    fn sink_for(&self, config: &NotifyConfig) -> Arc<dyn NotificationSink>;
}

/// Resend HTTP API sink.
pub struct ResendSink {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl ResendSink {
    pub fn new(client: reqwest::Client, api_key: SecretString, base_url: impl Into<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.into(),
        }
    }

    fn emails_url(&self) -> String {
        format!("{}/emails", self.base_url)
    }

    fn request_failed(reason: impl ToString) -> SinkError {
        SinkError::Request {
            provider: "resend".into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ResendSendResponse {
    id: Option<String>,
}

#[async_trait]
impl NotificationSink for ResendSink {
    fn name(&self) -> &str {
        "resend"
    }

    async fn send(&self, payload: &NotificationPayload) -> Result<Delivery, SinkError> {
        let body = serde_json::json!({
            "from": payload.sender,
            "to": [payload.recipient],
            "subject": payload.subject,
            "html": payload.html_body,
        });

        let resp = self
            .client
            .post(self.emails_url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(Self::request_failed)?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(SinkError::Rejected {
                provider: "resend".into(),
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: ResendSendResponse =
            resp.json().await.map_err(|e| SinkError::InvalidResponse {
                provider: "resend".into(),
                reason: e.to_string(),
            })?;

        Ok(Delivery { id: parsed.id })
    }
}

/// Produces [`ResendSink`]s sharing one HTTP connection pool.
pub struct ResendSinkFactory {
    client: reqwest::Client,
}

impl ResendSinkFactory {
    pub fn new() -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(ResendSink::request_failed)?;
        Ok(Self { client })
    }
}

impl SinkFactory for ResendSinkFactory {
    fn sink_for(&self, config: &NotifyConfig) -> Arc<dyn NotificationSink> {
        Arc::new(ResendSink::new(
            self.client.clone(),
            config.api_key.clone(),
            config.api_base_url.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_url_joins_base() {
        let sink = ResendSink::new(
            reqwest::Client::new(),
            SecretString::from("re_test"),
            "https://api.resend.com",
        );
        assert_eq!(sink.emails_url(), "https://api.resend.com/emails");
        assert_eq!(sink.name(), "resend");
    }

    #[test]
    fn send_response_id_is_optional() {
        let parsed: ResendSendResponse = serde_json::from_str(r#"{"id":"abc123"}"#).unwrap();
        assert_eq!(parsed.id.as_deref(), Some("abc123"));
        let parsed: ResendSendResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.id.is_none());
    }
}
