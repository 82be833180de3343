//! Outbound mail: the `MailDispatcher` trait and its SMTP implementation.

pub mod smtp;

pub use smtp::{MailConfig, SmtpDispatcher};

use async_trait::async_trait;

use crate::error::DeliveryError;

/// Sends a single plain-text email.
#[async_trait]
pub trait MailDispatcher: Send + Sync {
    async fn send(&self, subject: &str, body: &str, recipient: &str) -> Result<(), DeliveryError>;
}
