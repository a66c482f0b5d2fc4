//! The fixed set of browser tools advertised to the model on every call.
use lazy_static::lazy_static;
use serde_json::json;

use crate::models::tool::Tool;

pub const NAVIGATE: &str = "navigate";
pub const CLICK: &str = "click";
pub const FILL: &str = "fill";
pub const PRESS_KEY: &str = "press_key";
pub const GET_TEXT: &str = "get_text";
pub const SCREENSHOT: &str = "screenshot";

lazy_static! {
    static ref BROWSER_TOOLS: Vec<Tool> = vec![
        Tool::new(
            NAVIGATE,
            "Navigate the browser to a URL.",
            json!({
                "type": "object",
                "required": ["url"],
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "Full URL to navigate to, e.g. https://example.com"
                    }
                }
            }),
        ),
        Tool::new(
            CLICK,
            "Click an element. Tries the value as a CSS selector first, then as visible text.",
            json!({
                "type": "object",
                "required": ["selector"],
                "properties": {
                    "selector": {
                        "type": "string",
                        "description": "CSS selector or visible text of the element"
                    }
                }
            }),
        ),
        Tool::new(
            FILL,
            "Fill a text field, replacing its current value.",
            json!({
                "type": "object",
                "required": ["selector", "value"],
                "properties": {
                    "selector": {
                        "type": "string",
                        "description": "CSS selector of the input field"
                    },
                    "value": {
                        "type": "string",
                        "description": "The text to enter"
                    }
                }
            }),
        ),
        Tool::new(
            PRESS_KEY,
            "Press a key on the focused element, e.g. Enter, Tab, Escape.",
            json!({
                "type": "object",
                "required": ["key"],
                "properties": {
                    "key": {
                        "type": "string",
                        "description": "Key name such as \"Enter\", \"Tab\", \"ArrowDown\" or a single character"
                    }
                }
            }),
        ),
        Tool::new(
            GET_TEXT,
            "Read the text of the page or of one element (at most 3000 characters).",
            json!({
                "type": "object",
                "required": [],
                "properties": {
                    "selector": {
                        "type": "string",
                        "description": "Optional CSS selector; omit it to read the whole page body"
                    }
                }
            }),
        ),
        Tool::new(
            SCREENSHOT,
            "Take a screenshot of the visible part of the page. Returns a base64 encoded PNG.",
            json!({
                "type": "object",
                "required": [],
                "properties": {}
            }),
        ),
    ];
}

/// The browser tool declarations, always the same six in the same order
pub fn tools() -> &'static [Tool] {
    &BROWSER_TOOLS
}
