//! post-review: LLM editorial feedback for posts tagged `#review`.

pub mod config;
pub mod error;
pub mod feedback;
pub mod llm;
pub mod mail;
pub mod webhook;
