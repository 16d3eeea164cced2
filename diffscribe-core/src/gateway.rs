//! Boundary abstraction over the external chat-completion service.

use async_trait::async_trait;

use crate::types::ChatMessage;

/// Errors surfaced by a completion gateway implementation.
///
/// `RateLimited` is the only variant a [`crate::retry::RetryPolicy`] treats
/// as retryable by default; everything else propagates to the caller
/// immediately and aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// The service asked the caller to slow down (HTTP 429 equivalent).
    #[error("rate limited by the completion service")]
    RateLimited,

    /// The service answered with a non-success status.
    #[error("completion service error (status {status}): {message}")]
    Service { status: u16, message: String },

    /// The request never produced a response (connect failure, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response arrived but could not be decoded.
    #[error("invalid completion response: {0}")]
    InvalidResponse(String),
}

/// Result alias for gateway operations.
pub type Result<T> = std::result::Result<T, CompletionError>;

/// The external-model call seam.
///
/// Implementations send the role-tagged messages to the model and return
/// the in-order concatenation of all returned content fragments. The call
/// is the pipeline's only suspend point; implementations are expected to
/// apply their retry policy internally, so a returned error is final.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}
