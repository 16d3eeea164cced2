//! Shared data types for the review pipeline.

use serde::Serialize;

/// Message roles accepted by the completion service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Instruction-level message (persona, task framing).
    System,
    /// Content-level message (the diff, the summary request).
    User,
}

impl Role {
    /// The wire name of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
        }
    }
}

/// A role-tagged message sent to the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// The finished review record for one changed file.
///
/// Immutable once constructed; the orchestrator collects these in
/// file-processing order. Serializes with PascalCase keys (`FileName`,
/// `Description`, `Comments`), which is also the JSON shape sent to the
/// final pull-request summarization call.
///
/// `comments` is empty when the model found nothing to flag; the
/// "looks good" sentinel is stripped during response parsing and never
/// stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileReviewResult {
    /// Repository-relative path of the reviewed file.
    pub file_name: String,
    /// Model-written description of the change, reconciled across segments.
    pub description: String,
    /// Concatenated review commentary, normalized (no-issue markers removed).
    pub comments: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_serializes_with_pascal_case_keys() {
        let result = FileReviewResult {
            file_name: "src/lib.rs".to_owned(),
            description: "Adds a helper".to_owned(),
            comments: String::new(),
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"FileName\":\"src/lib.rs\""));
        assert!(json.contains("\"Description\":\"Adds a helper\""));
        assert!(json.contains("\"Comments\":\"\""));
    }

    #[test]
    fn message_constructors_tag_roles() {
        assert_eq!(ChatMessage::system("a").role, Role::System);
        assert_eq!(ChatMessage::user("b").role, Role::User);
        assert_eq!(Role::System.as_str(), "system");
        assert_eq!(Role::User.as_str(), "user");
    }
}
