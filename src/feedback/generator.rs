//! Asks the LLM to critique a post and renders the feedback email.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::FeedbackError;
use crate::llm::provider::{ChatMessage, CompletionRequest, LlmProvider};

use super::prompts::{
    IMPROVEMENTS_MARKER, STRENGTHS_MARKER, feedback_email_body, feedback_generation_prompt,
    feedback_subject,
};

/// Configuration for feedback generation.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Sampling temperature.
    pub temperature: f32,
    /// Max tokens for the LLM response.
    pub max_tokens: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

/// A rendered feedback email. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFeedback {
    pub subject: String,
    pub body: String,
}

/// The two halves of a generation completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackSections {
    pub highlights: String,
    pub recommendations: String,
}

/// Generates editorial feedback emails using an LLM.
pub struct FeedbackGenerator {
    llm: Arc<dyn LlmProvider>,
    config: GeneratorConfig,
}

impl FeedbackGenerator {
    pub fn new(llm: Arc<dyn LlmProvider>, config: GeneratorConfig) -> Self {
        Self { llm, config }
    }

    /// Critique an article and render the feedback email for its author.
    pub async fn generate(
        &self,
        author_name: &str,
        article_plaintext: &str,
        post_title: &str,
    ) -> Result<GeneratedFeedback, FeedbackError> {
        info!(
            author = author_name,
            title = post_title,
            model = self.llm.model_name(),
            "Generating feedback"
        );

        let prompt = feedback_generation_prompt(author_name, article_plaintext, post_title);
        let request = CompletionRequest::new(vec![ChatMessage::user(prompt)])
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens);

        let response = self.llm.complete(request).await?;
        debug!(chars = response.content.len(), "Received feedback completion");

        let sections = split_completion(&response.content).inspect_err(|e| {
            warn!(
                error = %e,
                response = %response.content,
                "Feedback completion is malformed"
            );
        })?;

        Ok(GeneratedFeedback {
            subject: feedback_subject(post_title),
            body: feedback_email_body(
                author_name,
                post_title,
                &sections.highlights,
                &sections.recommendations,
            ),
        })
    }
}

/// Split a generation completion into highlights and recommendations.
///
/// The text before the first `Improvement Areas:` (minus a leading
/// `Strengths:` label) is the highlights section; the text after it is the
/// recommendations section. Both must be non-empty.
pub fn split_completion(completion: &str) -> Result<FeedbackSections, FeedbackError> {
    let Some((before, after)) = completion.split_once(IMPROVEMENTS_MARKER) else {
        return Err(FeedbackError::MalformedCompletion {
            reason: format!("missing '{IMPROVEMENTS_MARKER}' section"),
        });
    };

    let before = before.trim();
    let highlights = before.strip_prefix(STRENGTHS_MARKER).unwrap_or(before).trim();
    let recommendations = after.trim();

    if highlights.is_empty() {
        return Err(FeedbackError::MalformedCompletion {
            reason: "strengths section is empty".to_string(),
        });
    }
    if recommendations.is_empty() {
        return Err(FeedbackError::MalformedCompletion {
            reason: "improvement section is empty".to_string(),
        });
    }

    Ok(FeedbackSections {
        highlights: highlights.to_string(),
        recommendations: recommendations.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::LlmError;
    use crate::llm::provider::CompletionResponse;

    /// Replays a fixed completion and records the requests it saw.
    struct MockFeedbackLlm {
        response: String,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl MockFeedbackLlm {
        fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for MockFeedbackLlm {
        fn model_name(&self) -> &str {
            "mock-feedback"
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            self.requests.lock().unwrap().push(request);
            Ok(CompletionResponse {
                content: self.response.clone(),
            })
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl LlmProvider for FailingLlm {
        fn model_name(&self) -> &str {
            "failing"
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            Err(LlmError::RequestFailed {
                provider: "failing".into(),
                reason: "connection refused".into(),
            })
        }
    }

    const WELL_FORMED: &str = "Strengths:\n- Clear structure\n- Good examples\n\n\
                               Improvement Areas:\n- Cite sources\n- Shorter intro";

    #[test]
    fn split_basic_completion() {
        let sections = split_completion("Strengths:\n- A\n\nImprovement Areas:\n- B").unwrap();
        assert_eq!(sections.highlights, "- A");
        assert_eq!(sections.recommendations, "- B");
    }

    #[test]
    fn split_tolerates_missing_strengths_label() {
        let sections = split_completion("  - A\nImprovement Areas:  - B  \n").unwrap();
        assert_eq!(sections.highlights, "- A");
        assert_eq!(sections.recommendations, "- B");
    }

    #[test]
    fn split_keeps_text_after_first_marker() {
        let sections =
            split_completion("Strengths:\n- A\nImprovement Areas:\n- B\nImprovement Areas:\n- C")
                .unwrap();
        assert_eq!(sections.recommendations, "- B\nImprovement Areas:\n- C");
    }

    #[test]
    fn split_without_marker_is_malformed() {
        let err = split_completion("Strengths:\n- A\n- B").unwrap_err();
        assert!(matches!(err, FeedbackError::MalformedCompletion { .. }));
    }

    #[test]
    fn split_with_empty_section_is_malformed() {
        assert!(matches!(
            split_completion("Strengths:\n\nImprovement Areas:\n- B"),
            Err(FeedbackError::MalformedCompletion { .. })
        ));
        assert!(matches!(
            split_completion("Strengths:\n- A\nImprovement Areas:\n   "),
            Err(FeedbackError::MalformedCompletion { .. })
        ));
    }

    #[tokio::test]
    async fn generate_renders_subject_and_body() {
        let llm = Arc::new(MockFeedbackLlm::new(WELL_FORMED));
        let generator = FeedbackGenerator::new(llm.clone(), GeneratorConfig::default());

        let feedback = generator
            .generate("Alice", "Article body", "AI in Healthcare")
            .await
            .unwrap();

        assert!(!feedback.subject.is_empty());
        assert!(feedback.subject.contains("AI in Healthcare"));
        assert!(feedback.body.starts_with("Hi Alice,"));
        assert!(feedback.body.contains("- Clear structure\n- Good examples"));
        assert!(feedback.body.contains("- Cite sources\n- Shorter intro"));
        assert!(!feedback.body.contains(STRENGTHS_MARKER));
        assert!(!feedback.body.contains(IMPROVEMENTS_MARKER));
    }

    #[tokio::test]
    async fn generate_sends_one_sampled_request() {
        let llm = Arc::new(MockFeedbackLlm::new(WELL_FORMED));
        let generator = FeedbackGenerator::new(llm.clone(), GeneratorConfig::default());
        generator
            .generate("Alice", "Article body", "AI in Healthcare")
            .await
            .unwrap();

        let requests = llm.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].temperature, Some(0.7));
        assert!(requests[0].preamble().is_none());
        let prompt = requests[0].prompt();
        assert!(prompt.contains("by Alice on the topic 'AI in Healthcare'"));
        assert!(prompt.contains("Article body"));
    }

    #[tokio::test]
    async fn generate_fails_on_malformed_completion() {
        let llm = Arc::new(MockFeedbackLlm::new("Looks great, no notes!"));
        let generator = FeedbackGenerator::new(llm, GeneratorConfig::default());
        let err = generator
            .generate("Alice", "Article body", "AI in Healthcare")
            .await
            .unwrap_err();
        assert!(matches!(err, FeedbackError::MalformedCompletion { .. }));
    }

    #[tokio::test]
    async fn generate_propagates_llm_failure() {
        let generator = FeedbackGenerator::new(Arc::new(FailingLlm), GeneratorConfig::default());
        let err = generator.generate("Alice", "Body", "Title").await.unwrap_err();
        assert!(matches!(err, FeedbackError::Llm(LlmError::RequestFailed { .. })));
    }
}
