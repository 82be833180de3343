//! Bridges rig's `CompletionModel` to our `LlmProvider` trait.

use std::fmt::Display;

use async_trait::async_trait;
use rig::agent::AgentBuilder;
use rig::completion::{CompletionModel, Prompt};
use tracing::debug;

use crate::error::LlmError;
use crate::llm::provider::{CompletionRequest, CompletionResponse, LlmProvider};

/// `LlmProvider` backed by any rig completion model.
///
/// Builds a single-turn agent per request from the request's preamble,
/// temperature and max tokens.
pub struct RigAdapter<M> {
    model: M,
    model_name: String,
    provider: &'static str,
}

impl<M: CompletionModel> RigAdapter<M> {
    pub fn new(model: M, model_name: &str, provider: &'static str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
            provider,
        }
    }
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + 'static,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let mut builder = AgentBuilder::new(self.model.clone());
        if let Some(preamble) = request.preamble() {
            builder = builder.preamble(&preamble);
        }
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(f64::from(temperature));
        }
        if let Some(max_tokens) = request.max_tokens {
            builder = builder.max_tokens(u64::from(max_tokens));
        }
        let agent = builder.build();

        let prompt = request.prompt();
        debug!(
            provider = self.provider,
            model = %self.model_name,
            prompt_chars = prompt.len(),
            "Sending completion request"
        );

        let content = agent
            .prompt(prompt)
            .await
            .map_err(|e| request_failed(self.provider, e))?;

        Ok(CompletionResponse { content })
    }
}

fn request_failed(provider: &str, error: impl Display) -> LlmError {
    LlmError::RequestFailed {
        provider: provider.to_string(),
        reason: error.to_string(),
    }
}
