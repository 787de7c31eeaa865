//! Generative-model client abstraction layer
//!
//! This module provides a trait-based abstraction for talking to the model,
//! so the real `genai` client and the scripted mock are interchangeable.

mod client;
mod error;
mod genai;
mod mock;
mod types;

pub use client::LLMClient;
pub use error::BackendError;
pub use genai::GenAIClient;
pub use mock::{MockLLMClient, MockResponse};
pub use types::{LLMRequest, LLMResponse};
