//! SMTP dispatcher via lettre.
//!
//! Each send builds its own transport and drops it when done, so no relay
//! connection outlives a single message.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::{ExposeSecret, SecretString};

use super::MailDispatcher;
use crate::config::{env_or, env_parse, env_required, env_secs};
use crate::error::{ConfigError, DeliveryError};

/// Port that uses implicit TLS; every other port negotiates STARTTLS.
const IMPLICIT_TLS_PORT: u16 = 465;

// ── Configuration ───────────────────────────────────────────────────

/// SMTP relay configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: SecretString,
    pub from_address: String,
    /// Upper bound on one complete send, connect through QUIT.
    pub timeout: Duration,
}

impl MailConfig {
    /// Build config from environment variables.
    ///
    /// `EMAIL_ADDRESS` and `EMAIL_PASSWORD` are required; the relay defaults
    /// to Gmail submission on port 587.
    pub fn from_env() -> Result<Self, ConfigError> {
        let username = env_required("EMAIL_ADDRESS")?;
        let password = env_required("EMAIL_PASSWORD")?;
        let from_address = env_or("EMAIL_FROM_ADDRESS", &username);

        Ok(Self {
            smtp_host: env_or("SMTP_HOST", "smtp.gmail.com"),
            smtp_port: env_parse("SMTP_PORT", 587)?,
            username,
            password: SecretString::from(password),
            from_address,
            timeout: env_secs("SMTP_TIMEOUT_SECS", 30)?,
        })
    }
}

// ── Dispatcher ──────────────────────────────────────────────────────

pub struct SmtpDispatcher {
    config: MailConfig,
}

impl SmtpDispatcher {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl MailDispatcher for SmtpDispatcher {
    async fn send(&self, subject: &str, body: &str, recipient: &str) -> Result<(), DeliveryError> {
        let message = build_message(&self.config.from_address, recipient, subject, body)?;
        let config = self.config.clone();
        let timeout = config.timeout;

        // lettre's SmtpTransport is blocking.
        let task = tokio::task::spawn_blocking(move || send_blocking(&config, &message));
        let result = match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(DeliveryError::Send(format!("SMTP task failed: {e}"))),
            Err(_) => {
                tracing::warn!(to = recipient, "SMTP send timed out");
                Err(DeliveryError::Timeout(timeout))
            }
        };
        result?;

        tracing::info!("Email sent to {recipient}");
        Ok(())
    }
}

/// Build a plain-text message.
pub fn build_message(
    from: &str,
    to: &str,
    subject: &str,
    body: &str,
) -> Result<Message, DeliveryError> {
    let from: Mailbox = from.parse().map_err(|e| DeliveryError::InvalidAddress {
        field: "from",
        reason: format!("{e}"),
    })?;
    let to: Mailbox = to.parse().map_err(|e| DeliveryError::InvalidAddress {
        field: "to",
        reason: format!("{e}"),
    })?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())
        .map_err(|e| DeliveryError::Build(e.to_string()))
}

fn send_blocking(config: &MailConfig, message: &Message) -> Result<(), DeliveryError> {
    let creds = Credentials::new(
        config.username.clone(),
        config.password.expose_secret().to_string(),
    );

    let builder = if config.smtp_port == IMPLICIT_TLS_PORT {
        SmtpTransport::relay(&config.smtp_host)
    } else {
        SmtpTransport::starttls_relay(&config.smtp_host)
    }
    .map_err(|e| DeliveryError::Relay(e.to_string()))?;

    let transport = builder
        .port(config.smtp_port)
        .credentials(creds)
        .timeout(Some(config.timeout))
        .build();

    // Auth failures, refused connections and rejected recipients all
    // surface here.
    transport
        .send(message)
        .map_err(|e| DeliveryError::Send(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MailConfig {
        MailConfig {
            smtp_host: "smtp.invalid".into(),
            smtp_port: 587,
            username: "editor@example.com".into(),
            password: SecretString::from("hunter2"),
            from_address: "editor@example.com".into(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn build_message_sets_headers_and_body() {
        let message = build_message(
            "editor@example.com",
            "alice@example.com",
            "Feedback on Your Recent Post on AI in Healthcare",
            "Hi Alice,\n\nThanks!",
        )
        .unwrap();

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("From: editor@example.com"));
        assert!(raw.contains("To: alice@example.com"));
        assert!(raw.contains("Subject: Feedback on Your Recent Post on AI in Healthcare"));
        assert!(raw.contains("Content-Type: text/plain; charset=utf-8"));
        assert!(raw.contains("Hi Alice,"));
    }

    #[test]
    fn build_message_rejects_bad_recipient() {
        let err = build_message("editor@example.com", "not an address", "s", "b").unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidAddress { field: "to", .. }));
    }

    #[test]
    fn build_message_rejects_bad_sender() {
        let err = build_message("", "alice@example.com", "s", "b").unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidAddress { field: "from", .. }));
    }

    #[tokio::test]
    async fn send_rejects_bad_recipient_before_connecting() {
        let dispatcher = SmtpDispatcher::new(config());
        let err = dispatcher.send("s", "b", "nobody").await.unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidAddress { field: "to", .. }));
    }

    #[test]
    fn config_debug_hides_password() {
        let debug = format!("{:?}", config());
        assert!(!debug.contains("hunter2"));
    }
}
