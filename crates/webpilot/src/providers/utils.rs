use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use std::collections::HashSet;
use tracing::warn;

use super::base::{Completion, StopReason, Usage};
use crate::models::content::ImageContent;
use crate::models::message::{ContentBlock, Message, ToolResponse};
use crate::models::tool::{Tool, ToolCall};

/// Convert internal Message format to Anthropic's messages API specification
pub fn messages_to_anthropic_spec(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|message| {
            let content = match message {
                Message::User { text, .. } => json!(text),
                Message::Assistant { content, .. } => {
                    let blocks: Vec<Value> = content
                        .iter()
                        .filter_map(|block| match block {
                            // The API rejects empty text blocks
                            ContentBlock::Text(text) if text.text.is_empty() => None,
                            ContentBlock::Text(text) => Some(json!({
                                "type": "text",
                                "text": text.text,
                            })),
                            ContentBlock::ToolRequest(request) => Some(json!({
                                "type": "tool_use",
                                "id": request.id,
                                "name": request.tool_call.name,
                                "input": request.tool_call.arguments,
                            })),
                        })
                        .collect();
                    json!(blocks)
                }
                Message::ToolResults { results, .. } => json!(results
                    .iter()
                    .map(tool_response_to_anthropic_spec)
                    .collect::<Vec<_>>()),
            };
            json!({
                "role": message.role(),
                "content": content,
            })
        })
        .collect()
}

/// A tool outcome as an Anthropic `tool_result` block.
///
/// Screenshots are sent as an image so the model can look at the page, other
/// outcomes as their JSON text.
pub fn tool_response_to_anthropic_spec(response: &ToolResponse) -> Value {
    match &response.tool_result {
        Ok(value) => match screenshot_image(value) {
            Some(image) => json!({
                "type": "tool_result",
                "tool_use_id": response.id,
                "content": [
                    convert_image(&image),
                    { "type": "text", "text": "Screenshot of the visible viewport." },
                ],
            }),
            None => json!({
                "type": "tool_result",
                "tool_use_id": response.id,
                "content": value.to_string(),
            }),
        },
        Err(_) => json!({
            "type": "tool_result",
            "tool_use_id": response.id,
            "content": response.to_json().to_string(),
            "is_error": true,
        }),
    }
}

/// The image inside a screenshot tool payload, if `value` is one
pub fn screenshot_image(value: &Value) -> Option<ImageContent> {
    let data = value.get("image_base64")?.as_str()?;
    let format = value.get("format")?.as_str()?;
    Some(ImageContent::new(data, format!("image/{}", format)))
}

/// Convert an image content into Anthropic's image block
pub fn convert_image(image: &ImageContent) -> Value {
    json!({
        "type": "image",
        "source": {
            "type": "base64",
            "media_type": image.mime_type,
            "data": image.data,
        }
    })
}

/// Convert internal Tool format to Anthropic's tool specification
pub fn tools_to_anthropic_spec(tools: &[Tool]) -> Result<Vec<Value>> {
    let mut tool_names = HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(anyhow!("Duplicate tool name: {}", tool.name));
        }

        result.push(json!({
            "name": tool.name,
            "description": tool.description,
            "input_schema": tool.input_schema,
        }));
    }

    Ok(result)
}

/// Convert Anthropic's messages API response to a Completion
pub fn anthropic_response_to_completion(response: &Value) -> Result<Completion> {
    let stop_reason = response
        .get("stop_reason")
        .and_then(|r| r.as_str())
        .map(StopReason::from_wire)
        .ok_or_else(|| anyhow!("Missing stop_reason in response from Anthropic API"))?;

    let blocks = response
        .get("content")
        .and_then(|c| c.as_array())
        .ok_or_else(|| anyhow!("Invalid response format from Anthropic API"))?;

    let mut content = Vec::new();
    for block in blocks {
        match block.get("type").and_then(|t| t.as_str()) {
            Some("text") => {
                let text = block.get("text").and_then(|t| t.as_str()).unwrap_or_default();
                content.push(ContentBlock::text(text));
            }
            Some("tool_use") => {
                let id = block
                    .get("id")
                    .and_then(|i| i.as_str())
                    .ok_or_else(|| anyhow!("tool_use block without an id"))?;
                let name = block
                    .get("name")
                    .and_then(|n| n.as_str())
                    .ok_or_else(|| anyhow!("tool_use block {} without a name", id))?;
                let input = block.get("input").cloned().unwrap_or_else(|| json!({}));
                content.push(ContentBlock::tool_request(id, ToolCall::new(name, input)));
            }
            other => {
                warn!(block_type = ?other, "skipping unsupported content block");
            }
        }
    }

    Ok(Completion {
        content,
        stop_reason,
        usage: get_usage(response),
    })
}

fn get_usage(response: &Value) -> Usage {
    let usage = response.get("usage");
    let count = |key: &str| {
        usage
            .and_then(|u| u.get(key))
            .and_then(|v| v.as_i64())
            .and_then(|v| i32::try_from(v).ok())
    };

    let input_tokens = count("input_tokens");
    let output_tokens = count("output_tokens");
    let total_tokens = match (input_tokens, output_tokens) {
        (Some(input), Some(output)) => input.checked_add(output),
        _ => None,
    };
    Usage::new(input_tokens, output_tokens, total_tokens)
}
