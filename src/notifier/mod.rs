//! Notifier: validates a response, renders it and hands it to a sink.
//!
//! Stateless: configuration is read and a sink is built on every call.
//! Nothing is retried, queued or deduplicated.

pub mod model;
pub mod routes;
pub mod sink;
pub mod template;

pub use model::{NotificationPayload, ResponseValue, SubmitAck};
pub use routes::{NotifierRouteState, notifier_routes};
pub use sink::{Delivery, NotificationSink, ResendSink, ResendSinkFactory, SinkFactory};

use std::sync::Arc;

use tracing::{error, info};

use crate::config::NotifyConfig;
use crate::error::NotifyError;

/// Variable lookup used for per-request configuration.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Build the payload for a response under the given configuration.
pub fn render_payload(
    response: ResponseValue,
    config: &NotifyConfig,
    sent_at: chrono::NaiveDateTime,
) -> NotificationPayload {
    NotificationPayload {
        subject: template::render_subject(response),
        html_body: template::render_html(response, sent_at),
        recipient: config.recipient.clone(),
        sender: config.sender.clone(),
    }
}

/// The submission operation.
#[derive(Clone)]
pub struct Notifier {
    sinks: Arc<dyn SinkFactory>,
    env: EnvLookup,
}

impl Notifier {
    /// Notifier that reads the process environment on every request.
    pub fn from_env(sinks: Arc<dyn SinkFactory>) -> Self {
        Self::new(sinks, Arc::new(|key: &str| std::env::var(key).ok()))
    }

    pub fn new(sinks: Arc<dyn SinkFactory>, env: EnvLookup) -> Self {
        Self { sinks, env }
    }

    /// Validate a raw request body and submit it.
    pub async fn submit_body(&self, body: &[u8]) -> Result<SubmitAck, NotifyError> {
        let response = ResponseValue::from_request_body(body)?;
        self.submit(response).await
    }

    /// Render and deliver one notification for `response`.
    pub async fn submit(&self, response: ResponseValue) -> Result<SubmitAck, NotifyError> {
        let config = NotifyConfig::from_lookup(|key| (self.env)(key))?;

        let payload = render_payload(response, &config, chrono::Local::now().naive_local());
        let sink = self.sinks.sink_for(&config);
        let sink_name = sink.name().to_string();

        // Delivery runs on its own task so a panicking sink surfaces as an
        // internal error instead of tearing down the connection.
        let delivery = tokio::spawn(async move { sink.send(&payload).await })
            .await
            .map_err(|e| NotifyError::Internal(format!("{sink_name} task failed: {e}")))?;

        match delivery {
            Ok(delivery) => {
                info!(
                    sink = %sink_name,
                    email_id = delivery.id.as_deref().unwrap_or("-"),
                    response = %response,
                    "Notification sent"
                );
                Ok(SubmitAck::delivered(response, delivery.id))
            }
            Err(e) => {
                error!(sink = %sink_name, response = %response, error = %e, "Notification delivery failed");
                Err(NotifyError::DeliveryFailed(e))
            }
        }
    }
}
