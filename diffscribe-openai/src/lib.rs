//! OpenAI-compatible completion gateway for diffscribe.
//!
//! Implements [`diffscribe_core::CompletionGateway`] over the
//! `/chat/completions` endpoint of any OpenAI-compatible server. Retry
//! behavior is injected as a [`diffscribe_core::RetryPolicy`]; the client
//! itself only knows how to perform one HTTP exchange and classify its
//! failure.

mod client;
mod models;

pub use client::OpenAiClient;
pub use models::{ChatRequest, ChatResponse};

/// Model used when the caller does not configure one.
pub const DEFAULT_MODEL: &str = "gpt-4-32k";

/// Endpoint used when the caller does not configure one.
pub const DEFAULT_API_ENDPOINT: &str = "https://api.openai.com/v1";
