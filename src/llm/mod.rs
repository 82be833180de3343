//! LLM integration for post-review.
//!
//! Supports:
//! - **OpenAI**: Direct API access via rig-core (default)
//! - **Anthropic**: Direct API access via rig-core
//!
//! Uses the rig-core crate for HTTP transport and the `RigAdapter` to bridge
//! rig's `CompletionModel` trait to our `LlmProvider` trait. Every provider
//! returned by [`create_provider`] is wrapped in a [`TimeoutProvider`].

pub mod provider;
mod rig_adapter;
pub mod timeout;

pub use provider::*;
pub use rig_adapter::RigAdapter;
pub use timeout::TimeoutProvider;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use rig::client::CompletionClient;
use secrecy::ExposeSecret;

use crate::config::{env_or, env_parse, env_required, env_secs};
use crate::error::{ConfigError, LlmError};

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAi,
    Anthropic,
}

impl LlmBackend {
    /// Environment variable holding this backend's API key.
    pub fn api_key_var(self) -> &'static str {
        match self {
            LlmBackend::OpenAi => "OPENAI_API_KEY",
            LlmBackend::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            LlmBackend::OpenAi => "gpt-3.5-turbo",
            LlmBackend::Anthropic => "claude-3-5-haiku-latest",
        }
    }
}

impl FromStr for LlmBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(LlmBackend::OpenAi),
            "anthropic" => Ok(LlmBackend::Anthropic),
            other => Err(format!("unknown backend '{other}' (expected openai or anthropic)")),
        }
    }
}

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_key: secrecy::SecretString,
    pub model: String,
    /// Sampling temperature for feedback generation.
    pub temperature: f32,
    pub max_tokens: u32,
    /// Upper bound on a single completion call.
    pub timeout: Duration,
}

impl LlmConfig {
    /// Build config from environment variables.
    ///
    /// `LLM_BACKEND` selects the provider (default `openai`); its API key
    /// variable is required.
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend = env_parse("LLM_BACKEND", LlmBackend::OpenAi)?;
        let api_key = env_required(backend.api_key_var())?;
        let temperature: f32 = env_parse("LLM_TEMPERATURE", 0.7)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::InvalidValue {
                key: "LLM_TEMPERATURE".to_string(),
                message: format!("{temperature} is outside 0.0..=2.0"),
            });
        }

        Ok(Self {
            backend,
            api_key: secrecy::SecretString::from(api_key),
            model: env_or("LLM_MODEL", backend.default_model()),
            temperature,
            max_tokens: env_parse("LLM_MAX_TOKENS", 1024)?,
            timeout: env_secs("LLM_TIMEOUT_SECS", 60)?,
        })
    }
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let provider = match config.backend {
        LlmBackend::OpenAi => create_openai_provider(config)?,
        LlmBackend::Anthropic => create_anthropic_provider(config)?,
    };
    Ok(Arc::new(TimeoutProvider::new(provider, config.timeout)))
}

fn create_openai_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    use rig::providers::openai;

    let client: rig::client::Client<openai::client::OpenAIResponsesExt> =
        openai::Client::new(config.api_key.expose_secret()).map_err(|e| {
            LlmError::RequestFailed {
                provider: "openai".to_string(),
                reason: format!("Failed to create OpenAI client: {}", e),
            }
        })?;

    let model = client.completion_model(&config.model);
    tracing::info!("Using OpenAI (model: {})", config.model);
    Ok(Arc::new(RigAdapter::new(model, &config.model, "openai")))
}

fn create_anthropic_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    use rig::providers::anthropic;

    let client: rig::client::Client<anthropic::client::AnthropicExt> =
        anthropic::Client::new(config.api_key.expose_secret()).map_err(|e| {
            LlmError::RequestFailed {
                provider: "anthropic".to_string(),
                reason: format!("Failed to create Anthropic client: {}", e),
            }
        })?;

    let model = client.completion_model(&config.model);
    tracing::info!("Using Anthropic (model: {})", config.model);
    Ok(Arc::new(RigAdapter::new(model, &config.model, "anthropic")))
}
