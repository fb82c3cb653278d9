//! Wire types for the Anthropic Messages API (tool-use subset).

use serde::{Deserialize, Serialize};

/// Request body for `POST /v1/messages`. Borrows everything; the caller owns
/// the conversation history and tool table across turns.
#[derive(Debug, Serialize)]
pub struct MessagesRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub system: &'a str,
    pub messages: &'a [Message],
    pub tools: &'a [ToolDefinition],
}

/// One conversation turn. Role is "user" or "assistant".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn user(content: Vec<ContentBlock>) -> Self {
        Self {
            role: "user".to_string(),
            content,
        }
    }

    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: "assistant".to_string(),
            content,
        }
    }
}

/// Content block inside a message, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn tool_result(tool_use_id: &str, content: String, is_error: bool) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.to_string(),
            content,
            is_error,
        }
    }
}

/// A tool the model is allowed to call. `input_schema` is a JSON Schema
/// object built with `serde_json::json!`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: serde_json::Value,
}

/// Response body of `POST /v1/messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    pub content: Vec<ContentBlock>,
    /// "tool_use" when the model wants tool results; "end_turn" otherwise.
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Usage,
}

impl MessagesResponse {
    /// True when the model stopped to wait for tool results.
    pub fn wants_tools(&self) -> bool {
        self.stop_reason.as_deref() == Some("tool_use")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_tool_result_blocks() {
        let msg = Message::user(vec![ContentBlock::tool_result(
            "toolu_01",
            "diff text".to_string(),
            false,
        )]);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"][0]["type"], "tool_result");
        assert_eq!(json["content"][0]["tool_use_id"], "toolu_01");
        // is_error=false is omitted from the wire.
        assert!(json["content"][0].get("is_error").is_none());

        let err = Message::user(vec![ContentBlock::tool_result(
            "toolu_02",
            "boom".to_string(),
            true,
        )]);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["content"][0]["is_error"], true);
    }

    #[test]
    fn deserializes_tool_use_response() {
        let body = serde_json::json!({
            "content": [
                {"type": "text", "text": "Let me fetch the diff."},
                {"type": "tool_use", "id": "toolu_01", "name": "get_diff",
                 "input": {"project": "g/r", "source_branch": "f", "target_branch": "main"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 100, "output_tokens": 20}
        });
        let resp: MessagesResponse = serde_json::from_value(body).unwrap();
        assert!(resp.wants_tools());
        assert_eq!(resp.content.len(), 2);
        match &resp.content[1] {
            ContentBlock::ToolUse { name, input, .. } => {
                assert_eq!(name, "get_diff");
                assert_eq!(input["project"], "g/r");
            }
            other => panic!("expected tool_use, got {other:?}"),
        }
        assert_eq!(resp.usage.output_tokens, 20);
    }

    #[test]
    fn end_turn_does_not_want_tools() {
        let body = serde_json::json!({
            "content": [{"type": "text", "text": "Done."}],
            "stop_reason": "end_turn"
        });
        let resp: MessagesResponse = serde_json::from_value(body).unwrap();
        assert!(!resp.wants_tools());
    }
}
