//! Review pipeline for a single webhook event.
//!
//! Flow:
//! 1. Tag filter (no `#review` tag → no-op)
//! 2. Feedback generation for the primary author
//! 3. Mail dispatch to the primary author
//!
//! Every step runs sequentially; nothing is retried and nothing is stored.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::WebhookError;
use crate::feedback::FeedbackGenerator;
use crate::mail::MailDispatcher;

use super::model::WebhookEvent;

/// Terminal result of a successful invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// The post is not tagged for review; nothing was generated or sent.
    NoReviewTag,
    /// Feedback was generated and sent to `recipient`.
    EmailSent { recipient: String },
}

impl ReviewOutcome {
    /// Status message returned to the webhook caller.
    pub fn message(&self) -> &'static str {
        match self {
            ReviewOutcome::NoReviewTag => "No review tag found",
            ReviewOutcome::EmailSent { .. } => "Email sent",
        }
    }
}

/// Composes the generator and dispatcher into the review pipeline.
pub struct ReviewHandler {
    generator: Arc<FeedbackGenerator>,
    dispatcher: Arc<dyn MailDispatcher>,
}

impl ReviewHandler {
    pub fn new(generator: Arc<FeedbackGenerator>, dispatcher: Arc<dyn MailDispatcher>) -> Self {
        Self {
            generator,
            dispatcher,
        }
    }

    pub async fn handle(&self, event: &WebhookEvent) -> Result<ReviewOutcome, WebhookError> {
        let post = &event.post.current;

        if !post.is_marked_for_review() {
            debug!(
                post_id = %post.id,
                tags = ?post.tags.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
                "Post not tagged for review"
            );
            return Ok(ReviewOutcome::NoReviewTag);
        }

        let Some(author) = post.primary_author() else {
            warn!(post_id = %post.id, "Review requested for post without authors");
            return Err(WebhookError::MissingAuthor {
                post_id: post.id.clone(),
            });
        };

        info!(
            post_id = %post.id,
            title = %post.title,
            author = %author.name,
            "Post tagged for review"
        );

        let feedback = self
            .generator
            .generate(&author.name, &post.plaintext, &post.title)
            .await?;

        self.dispatcher
            .send(&feedback.subject, &feedback.body, &author.email)
            .await?;

        info!(post_id = %post.id, to = %author.email, "Feedback email sent");
        Ok(ReviewOutcome::EmailSent {
            recipient: author.email.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::{DeliveryError, FeedbackError, LlmError};
    use crate::feedback::GeneratorConfig;
    use crate::llm::provider::{CompletionRequest, CompletionResponse, LlmProvider};

    type CallLog = Arc<Mutex<Vec<String>>>;

    struct LoggingLlm {
        response: String,
        log: CallLog,
    }

    #[async_trait]
    impl LlmProvider for LoggingLlm {
        fn model_name(&self) -> &str {
            "mock"
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            self.log.lock().unwrap().push("generate".into());
            Ok(CompletionResponse {
                content: self.response.clone(),
            })
        }
    }

    struct LoggingDispatcher {
        log: CallLog,
        fail: bool,
    }

    #[async_trait]
    impl MailDispatcher for LoggingDispatcher {
        async fn send(
            &self,
            subject: &str,
            _body: &str,
            recipient: &str,
        ) -> Result<(), DeliveryError> {
            self.log
                .lock()
                .unwrap()
                .push(format!("send:{recipient}:{subject}"));
            if self.fail {
                Err(DeliveryError::Send("550 mailbox unavailable".into()))
            } else {
                Ok(())
            }
        }
    }

    fn handler(completion: &str, fail_send: bool) -> (ReviewHandler, CallLog) {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let llm = Arc::new(LoggingLlm {
            response: completion.to_string(),
            log: Arc::clone(&log),
        });
        let generator = Arc::new(FeedbackGenerator::new(llm, GeneratorConfig::default()));
        let dispatcher = Arc::new(LoggingDispatcher {
            log: Arc::clone(&log),
            fail: fail_send,
        });
        (ReviewHandler::new(generator, dispatcher), log)
    }

    fn event(tags: &[&str], with_author: bool) -> WebhookEvent {
        let authors = if with_author {
            serde_json::json!([{"id": "a1", "name": "Alice", "email": "alice@example.com"}])
        } else {
            serde_json::json!([])
        };
        let tags: Vec<_> = tags
            .iter()
            .enumerate()
            .map(|(i, name)| serde_json::json!({"id": format!("t{i}"), "name": name}))
            .collect();
        serde_json::from_value(serde_json::json!({
            "post": {
                "current": {
                    "id": "p1",
                    "title": "AI in Healthcare",
                    "html": "<p>...</p>",
                    "plaintext": "...",
                    "authors": authors,
                    "tags": tags
                }
            }
        }))
        .unwrap()
    }

    const COMPLETION: &str = "Strengths:\n- A\n\nImprovement Areas:\n- B";

    #[tokio::test]
    async fn untagged_post_is_a_no_op() {
        let (handler, log) = handler(COMPLETION, false);
        let outcome = handler
            .handle(&event(&["announcement"], true))
            .await
            .unwrap();
        assert_eq!(outcome, ReviewOutcome::NoReviewTag);
        assert_eq!(outcome.message(), "No review tag found");
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn tagged_post_generates_then_sends_once() {
        let (handler, log) = handler(COMPLETION, false);
        let outcome = handler
            .handle(&event(&["news", "#review"], true))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ReviewOutcome::EmailSent {
                recipient: "alice@example.com".into()
            }
        );
        assert_eq!(outcome.message(), "Email sent");
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "generate".to_string(),
                "send:alice@example.com:Feedback on Your Recent Post on AI in Healthcare"
                    .to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn tagged_post_without_authors_is_a_precondition_error() {
        let (handler, log) = handler(COMPLETION, false);
        let err = handler.handle(&event(&["#review"], false)).await.unwrap_err();
        assert!(matches!(err, WebhookError::MissingAuthor { ref post_id } if post_id == "p1"));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_completion_skips_dispatch() {
        let (handler, log) = handler("Nice post!", false);
        let err = handler.handle(&event(&["#review"], true)).await.unwrap_err();
        assert!(matches!(
            err,
            WebhookError::Feedback(FeedbackError::MalformedCompletion { .. })
        ));
        assert_eq!(*log.lock().unwrap(), vec!["generate".to_string()]);
    }

    #[tokio::test]
    async fn delivery_failure_propagates() {
        let (handler, log) = handler(COMPLETION, true);
        let err = handler.handle(&event(&["#review"], true)).await.unwrap_err();
        assert!(matches!(err, WebhookError::Delivery(DeliveryError::Send(_))));
        assert_eq!(log.lock().unwrap().len(), 2);
    }
}
