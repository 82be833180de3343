//! Editorial feedback generation and self-evaluation over an LLM.

pub mod evaluator;
pub mod generator;
pub mod prompts;

pub use evaluator::FeedbackEvaluator;
pub use generator::{FeedbackGenerator, GeneratedFeedback, GeneratorConfig, split_completion};
