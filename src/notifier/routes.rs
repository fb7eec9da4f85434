//! HTTP endpoints for response submission.

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tracing::{error, warn};

use super::Notifier;
use crate::error::NotifyError;

/// Path of the submission endpoint.
pub const SUBMIT_PATH: &str = "/api/submit-response";

/// Shared state for notifier routes.
#[derive(Clone)]
pub struct NotifierRouteState {
    pub notifier: Notifier,
}

/// Build the notifier routes.
pub fn notifier_routes(state: NotifierRouteState) -> Router {
    Router::new()
        .route(
            SUBMIT_PATH,
            post(submit_response).fallback(method_not_allowed),
        )
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "valentine-card"
    }))
}

/// POST /api/submit-response
///
/// The body is parsed here rather than by the `Json` extractor so that every
/// shape of bad input gets the same 400 body.
async fn submit_response(State(state): State<NotifierRouteState>, body: Bytes) -> Response {
    match state.notifier.submit_body(&body).await {
        Ok(ack) => Json(ack).into_response(),
        Err(e) => {
            match &e {
                NotifyError::InvalidInput => {
                    warn!(body_len = body.len(), "Rejected submission with invalid response value")
                }
                other => error!(error = %other, "Submission failed"),
            }
            e.into_response()
        }
    }
}

async fn method_not_allowed() -> Response {
    warn!(path = SUBMIT_PATH, "Non-POST request to submission endpoint");
    NotifyError::MethodNotAllowed.into_response()
}
