//! Ghost post webhook: payload model, review pipeline and HTTP routes.

pub mod handler;
pub mod model;
pub mod routes;

pub use handler::{ReviewHandler, ReviewOutcome};
pub use model::{Author, Post, PostData, REVIEW_TAG, Tag, WebhookEvent};
pub use routes::{StatusMessage, WebhookState, webhook_routes};
