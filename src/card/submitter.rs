//! Posting the chosen answer to the submission endpoint.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::SubmitError;
use crate::notifier::ResponseValue;
use crate::notifier::routes::SUBMIT_PATH;

/// Sends a card answer somewhere.
#[async_trait]
pub trait ResponseSubmitter: Send + Sync {
    /// Submit once. Returns the delivery id reported by the server, if any.
    async fn submit(&self, response: ResponseValue) -> Result<Option<String>, SubmitError>;
}

/// Submits to the HTTP endpoint of a running server.
pub struct HttpSubmitter {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitReply {
    email_id: Option<String>,
}

impl HttpSubmitter {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), SUBMIT_PATH),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ResponseSubmitter for HttpSubmitter {
    async fn submit(&self, response: ResponseValue) -> Result<Option<String>, SubmitError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "response": response }))
            .send()
            .await
            .map_err(|e| SubmitError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SubmitError::Status(status.as_u16()));
        }

        let reply: SubmitReply = resp
            .json()
            .await
            .map_err(|e| SubmitError::Request(e.to_string()))?;
        Ok(reply.email_id)
    }
}
