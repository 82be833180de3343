//! LLM self-review of a generated feedback email.
//!
//! Diagnostic only: the report is returned as raw text and never gates
//! dispatch.

use std::sync::Arc;

use tracing::info;

use crate::error::FeedbackError;
use crate::llm::provider::{ChatMessage, CompletionRequest, LlmProvider};

use super::prompts::{EVALUATOR_PREAMBLE, feedback_evaluation_prompt};

pub struct FeedbackEvaluator {
    llm: Arc<dyn LlmProvider>,
    temperature: f32,
}

impl FeedbackEvaluator {
    pub fn new(llm: Arc<dyn LlmProvider>, temperature: f32) -> Self {
        Self { llm, temperature }
    }

    /// Grade a feedback email. The completion is passed through unparsed.
    pub async fn evaluate(&self, email_body: &str) -> Result<String, FeedbackError> {
        info!(
            chars = email_body.len(),
            model = self.llm.model_name(),
            "Evaluating feedback email"
        );

        let request = CompletionRequest::new(vec![
            ChatMessage::system(EVALUATOR_PREAMBLE),
            ChatMessage::user(feedback_evaluation_prompt(email_body)),
        ])
        .with_temperature(self.temperature);

        let response = self.llm.complete(request).await?;
        Ok(response.content)
    }
}
