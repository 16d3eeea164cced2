//! HTTP client implementing the completion gateway.

use std::time::Duration;

use async_trait::async_trait;
use diffscribe_core::{ChatMessage, CompletionError, CompletionGateway, RetryPolicy};

use crate::models::{ChatRequest, ChatResponse};

/// Gateway to an OpenAI-compatible chat-completions server.
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    retry: RetryPolicy,
}

impl OpenAiClient {
    /// Creates a client for `base_url` (e.g. `https://api.openai.com/v1`)
    /// with the default retry policy.
    ///
    /// The connect timeout is short; the completion timeout is generous
    /// because large-diff reviews legitimately take minutes.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|error| CompletionError::Transport(error.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            retry: RetryPolicy::default(),
        })
    }

    /// Replaces the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The configured model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// One HTTP exchange, with failures classified for the retry policy.
    async fn complete_once(&self, request: &ChatRequest) -> Result<String, CompletionError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|error| CompletionError::Transport(error.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CompletionError::RateLimited);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CompletionError::Service { status: status.as_u16(), message });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|error| CompletionError::InvalidResponse(error.to_string()))?;
        Ok(parsed.concatenated_text())
    }
}

#[async_trait]
impl CompletionGateway for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        let request = ChatRequest::new(&self.model, messages);
        let mut attempts_used = 0u32;
        loop {
            match self.complete_once(&request).await {
                Ok(text) => return Ok(text),
                Err(error) if self.retry.should_retry(&error, attempts_used) => {
                    attempts_used += 1;
                    let delay = self.retry.delay_for(attempts_used);
                    tracing::warn!(
                        attempt = attempts_used,
                        max = self.retry.max_retries(),
                        delay_ms = delay.as_millis() as u64,
                        "completion call rate limited, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn completion_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }]
        })
    }

    fn test_client(server: &MockServer) -> OpenAiClient {
        OpenAiClient::new(server.uri(), "test-key", "test-model")
            .unwrap()
            .with_retry_policy(RetryPolicy::fixed(3, Duration::ZERO))
    }

    #[tokio::test]
    async fn returns_response_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("hello")))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let text = client.complete(&[ChatMessage::user("hi")]).await.unwrap();
        assert_eq!(text, "hello");
    }

    #[tokio::test]
    async fn retries_rate_limits_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("made it")))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let text = client.complete(&[ChatMessage::user("hi")]).await.unwrap();
        assert_eq!(text, "made it");
    }

    #[tokio::test]
    async fn exhausted_retries_surface_the_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .expect(4)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let error = client.complete(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(error, CompletionError::RateLimited));
    }

    #[tokio::test]
    async fn non_rate_limit_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let error = client.complete(&[ChatMessage::user("hi")]).await.unwrap_err();
        match error {
            CompletionError::Service { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_an_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let error = client.complete(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(error, CompletionError::InvalidResponse(_)));
    }
}
