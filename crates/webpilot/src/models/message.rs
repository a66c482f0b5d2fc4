use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::content::TextContent;
use super::role::Role;
use super::tool::ToolCall;
use crate::errors::ToolResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub id: String,
    pub tool_call: ToolCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub id: String,
    pub tool_result: ToolResult<Value>,
}

impl ToolResponse {
    pub fn new<S: Into<String>>(id: S, tool_result: ToolResult<Value>) -> Self {
        Self {
            id: id.into(),
            tool_result,
        }
    }

    /// The outcome as the JSON document the model reads: the payload on success,
    /// `{"error": "..."}` on failure
    pub fn to_json(&self) -> Value {
        match &self.tool_result {
            Ok(value) => value.clone(),
            Err(e) => serde_json::json!({ "error": e.to_string() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
/// A block of content produced by the model
pub enum ContentBlock {
    Text(TextContent),
    ToolRequest(ToolRequest),
}

impl ContentBlock {
    pub fn text<S: Into<String>>(text: S) -> Self {
        ContentBlock::Text(TextContent::new(text))
    }

    pub fn tool_request<S: Into<String>>(id: S, tool_call: ToolCall) -> Self {
        ContentBlock::ToolRequest(ToolRequest {
            id: id.into(),
            tool_call,
        })
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text(text) => Some(&text.text),
            _ => None,
        }
    }

    pub fn as_tool_request(&self) -> Option<&ToolRequest> {
        match self {
            ContentBlock::ToolRequest(request) => Some(request),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// A message to or from an LLM. Each variant is one of the turn shapes a
/// conversation can hold.
pub enum Message {
    /// Plain text from the caller, such as the task
    User { created: i64, text: String },
    /// A model turn, kept verbatim
    Assistant {
        created: i64,
        content: Vec<ContentBlock>,
    },
    /// Outcomes for the tool requests of the preceding model turn
    ToolResults {
        created: i64,
        results: Vec<ToolResponse>,
    },
}

impl Message {
    /// Create a new user message with the current timestamp
    pub fn user<S: Into<String>>(text: S) -> Self {
        Message::User {
            created: Utc::now().timestamp(),
            text: text.into(),
        }
    }

    /// Create a new assistant message with the current timestamp
    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Message::Assistant {
            created: Utc::now().timestamp(),
            content,
        }
    }

    /// Create a new tool result message with the current timestamp
    pub fn tool_results(results: Vec<ToolResponse>) -> Self {
        Message::ToolResults {
            created: Utc::now().timestamp(),
            results,
        }
    }

    /// Tool results travel on the user side of the exchange
    pub fn role(&self) -> Role {
        match self {
            Message::User { .. } | Message::ToolResults { .. } => Role::User,
            Message::Assistant { .. } => Role::Assistant,
        }
    }

    /// The tool requests of a model turn, in the order they were made
    pub fn tool_requests(&self) -> Vec<&ToolRequest> {
        match self {
            Message::Assistant { content, .. } => content
                .iter()
                .filter_map(|block| block.as_tool_request())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// The first text block of a model turn, or the text of a user message
    pub fn first_text(&self) -> Option<&str> {
        match self {
            Message::User { text, .. } => Some(text),
            Message::Assistant { content, .. } => content.iter().find_map(|b| b.as_text()),
            Message::ToolResults { .. } => None,
        }
    }
}
