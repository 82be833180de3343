//! HTTP endpoints for the review webhook.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, error, info_span};
use uuid::Uuid;

use super::handler::ReviewHandler;
use super::model::WebhookEvent;
use crate::error::{DeliveryError, FeedbackError, LlmError, WebhookError};

/// Shared state for webhook routes.
#[derive(Clone)]
pub struct WebhookState {
    pub handler: Arc<ReviewHandler>,
}

/// `{"message": "..."}` status body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatusMessage {
    pub message: String,
}

impl StatusMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Build the webhook router.
pub fn webhook_routes(state: WebhookState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/post_tagged", post(post_tagged))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /
async fn root() -> Json<StatusMessage> {
    Json(StatusMessage::new("Post review webhook is running"))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "post-review"
    }))
}

/// POST /post_tagged
///
/// Body is a Ghost post webhook. Malformed bodies are rejected by the
/// `Json` extractor before the pipeline runs.
async fn post_tagged(
    State(state): State<WebhookState>,
    Json(event): Json<WebhookEvent>,
) -> Result<Json<StatusMessage>, WebhookError> {
    let span = info_span!(
        "post_tagged",
        request_id = %Uuid::new_v4(),
        post_id = %event.post.current.id
    );
    let outcome = state.handler.handle(&event).instrument(span).await?;
    Ok(Json(StatusMessage::new(outcome.message())))
}

impl WebhookError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingAuthor { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            WebhookError::Feedback(FeedbackError::Llm(LlmError::Timeout { .. }))
            | WebhookError::Delivery(DeliveryError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            WebhookError::Feedback(_) | WebhookError::Delivery(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        error!(status = status.as_u16(), error = %self, "Review webhook failed");
        (
            status,
            Json(serde_json::json!({"error": self.to_string()})),
        )
            .into_response()
    }
}
