//! Error types for post-review.

use std::time::Duration;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} timed out after {timeout:?}")]
    Timeout { provider: String, timeout: Duration },
}

/// Errors producing or evaluating feedback.
#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("Malformed completion: {reason}")]
    MalformedCompletion { reason: String },

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

/// Outbound mail errors. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Invalid {field} address: {reason}")]
    InvalidAddress { field: &'static str, reason: String },

    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("SMTP relay error: {0}")]
    Relay(String),

    #[error("SMTP send failed: {0}")]
    Send(String),

    #[error("SMTP send timed out after {0:?}")]
    Timeout(Duration),
}

/// Webhook pipeline errors, surfaced to the webhook caller.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Post {post_id} has no authors")]
    MissingAuthor { post_id: String },

    #[error(transparent)]
    Feedback(#[from] FeedbackError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}
