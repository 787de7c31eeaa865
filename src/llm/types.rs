//! Generative-model request/response types
//!
//! Provider-independent shapes for a single-turn text prompt and its answer.

use std::time::Duration;

/// Single-turn prompt sent to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LLMRequest {
    pub prompt: String,
}

impl LLMRequest {
    pub fn prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// Response from the model
#[derive(Debug, Clone)]
pub struct LLMResponse {
    /// Text content of the response
    pub content: String,
    /// Time taken for the request
    pub response_time: Duration,
}

impl LLMResponse {
    pub fn text(content: impl Into<String>, response_time: Duration) -> Self {
        Self {
            content: content.into(),
            response_time,
        }
    }
}
