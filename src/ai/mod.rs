//! All AI/LLM functionality

pub mod client;
pub mod prompt;

// Re-export main types for convenience
pub use client::{DraftGenerator, LlmClient, estimate_tokens};
pub use prompt::build_prompt;
