//! Wire types for the chat-completions endpoint.

use diffscribe_core::ChatMessage;
use serde::{Deserialize, Serialize};

/// Request body for `POST /chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: &[ChatMessage]) -> Self {
        Self {
            model: model.into(),
            messages: messages.iter().map(WireMessage::from).collect(),
        }
    }
}

/// One role-tagged message as the API expects it.
#[derive(Debug, Clone, Serialize)]
pub struct WireMessage {
    pub role: &'static str,
    pub content: String,
}

impl From<&ChatMessage> for WireMessage {
    fn from(message: &ChatMessage) -> Self {
        Self { role: message.role.as_str(), content: message.content.clone() }
    }
}

/// Response body of a successful completion call.
///
/// Only the fields this tool consumes are modeled; unknown fields are
/// ignored during deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

/// One generated choice.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The assistant message inside a choice.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: String,
}

impl ChatResponse {
    /// Concatenates every returned content fragment in order.
    pub fn concatenated_text(&self) -> String {
        self.choices.iter().map(|choice| choice.message.content.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_roles_in_order() {
        let request = ChatRequest::new(
            "test-model",
            &[ChatMessage::system("persona"), ChatMessage::user("diff")],
        );
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"model\":\"test-model\""));
        let system_at = json.find("\"role\":\"system\"").unwrap();
        let user_at = json.find("\"role\":\"user\"").unwrap();
        assert!(system_at < user_at);
    }

    #[test]
    fn response_text_concatenates_fragments_in_order() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[
                {"message":{"role":"assistant","content":"first "},"finish_reason":"length"},
                {"message":{"role":"assistant","content":"second"}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(response.concatenated_text(), "first second");
        assert_eq!(response.choices[0].finish_reason.as_deref(), Some("length"));
    }
}
