//! Request/response types for the Anthropic Messages API.
//!
//! Only the subset the generation flow uses: plain-text messages in, text
//! content blocks out. No tool use, no streaming.

use serde::{Deserialize, Serialize};

/// A chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// "user" or "assistant".
    pub role: String,
    /// Message text.
    pub content: String,
}

impl Message {
    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for the Messages API.
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// Model ID.
    pub model: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Conversation history.
    pub messages: Vec<Message>,
    /// Optional system prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

/// Response body from the Messages API.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// Content blocks.
    pub content: Vec<ContentBlock>,
    /// Why generation stopped, e.g. "end_turn" or "max_tokens".
    pub stop_reason: Option<String>,
    /// Token accounting.
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// Concatenate all text blocks into one blob.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|block| block.block_type == "text")
            .map(|block| block.text.as_deref().unwrap_or_default())
            .collect::<Vec<_>>()
            .join("")
    }
}

/// A single content block.
#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    /// Block type; only "text" blocks are expected here.
    #[serde(rename = "type")]
    pub block_type: String,
    /// Text payload for text blocks.
    pub text: Option<String>,
}

/// Token usage reported by the API.
#[derive(Debug, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt.
    pub input_tokens: u32,
    /// Tokens generated.
    pub output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text_concatenation() {
        let json = r#"{
            "content": [
                {"type": "text", "text": "<!DOCTYPE html>"},
                {"type": "text", "text": "<html></html>"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 20}
        }"#;
        let response: ChatResponse = serde_json::from_str(json).expect("deserialize");
        assert_eq!(response.text(), "<!DOCTYPE html><html></html>");
        assert_eq!(response.stop_reason.as_deref(), Some("end_turn"));
    }

    #[test]
    fn test_request_skips_absent_system() {
        let request = ChatRequest {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 4096,
            messages: vec![Message::user("hello")],
            system: None,
        };
        let json = serde_json::to_string(&request).expect("serialize");
        assert!(!json.contains("system"));
    }
}
