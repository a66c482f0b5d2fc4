use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use indoc::indoc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::errors::{ToolError, ToolResult};
use crate::models::tool::{Tool, ToolCall};
use crate::page::{Key, Page, PageError, UnknownKey};
use crate::registry;
use crate::systems::System;

/// Longest text `get_text` hands back, in characters
pub const MAX_TEXT_CHARS: usize = 3000;

/// Per-attempt limit for each of the two click strategies
pub const DEFAULT_CLICK_TIMEOUT: Duration = Duration::from_secs(5);

const INSTRUCTIONS: &str = indoc! {"
    The browser system drives a single page. Navigate first, then inspect the page
    with get_text or screenshot before acting on it. Selectors are CSS selectors;
    click also accepts the visible text of an element.
"};

#[derive(Deserialize)]
struct NavigateArgs {
    url: String,
}

#[derive(Deserialize)]
struct ClickArgs {
    selector: String,
}

#[derive(Deserialize)]
struct FillArgs {
    selector: String,
    value: String,
}

#[derive(Deserialize)]
struct PressKeyArgs {
    key: String,
}

#[derive(Deserialize)]
struct GetTextArgs {
    #[serde(default)]
    selector: Option<String>,
}

/// Executes the browser tools against a page
pub struct BrowserSystem {
    page: Arc<dyn Page>,
    click_timeout: Duration,
}

impl BrowserSystem {
    pub fn new(page: Arc<dyn Page>) -> Self {
        Self {
            page,
            click_timeout: DEFAULT_CLICK_TIMEOUT,
        }
    }

    pub fn with_click_timeout(mut self, click_timeout: Duration) -> Self {
        self.click_timeout = click_timeout;
        self
    }

    async fn navigate(&self, args: NavigateArgs) -> ToolResult<Value> {
        url::Url::parse(&args.url)
            .map_err(|e| ToolError::Navigation(format!("invalid URL '{}': {}", args.url, e)))?;

        let info = self
            .page
            .goto(&args.url)
            .await
            .map_err(|e| ToolError::Navigation(e.to_string()))?;

        Ok(json!({
            "success": true,
            "url": info.url,
            "title": info.title,
        }))
    }

    async fn click(&self, args: ClickArgs) -> ToolResult<Value> {
        let selector = args.selector;
        if let Err(css_err) = self.page.click(&selector, self.click_timeout).await {
            debug!(%selector, error = %css_err, "css click failed, falling back to text match");
            self.page
                .click_text(&selector, self.click_timeout)
                .await
                .map_err(|text_err| {
                    ToolError::ElementNotFound(format!(
                        "'{}' matched no clickable element as a selector ({}) or as visible text ({})",
                        selector, css_err, text_err
                    ))
                })?;
        }
        Ok(json!({ "success": true }))
    }

    async fn fill(&self, args: FillArgs) -> ToolResult<Value> {
        self.page
            .fill(&args.selector, &args.value)
            .await
            .map_err(|e| element_error(&args.selector, e))?;
        Ok(json!({ "success": true }))
    }

    async fn press_key(&self, args: PressKeyArgs) -> ToolResult<Value> {
        let key: Key = args
            .key
            .parse()
            .map_err(|e: UnknownKey| ToolError::InvalidParameters(e.to_string()))?;
        self.page
            .press_key(key)
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;
        Ok(json!({ "success": true }))
    }

    async fn get_text(&self, args: GetTextArgs) -> ToolResult<Value> {
        let text = match args.selector.as_deref().filter(|s| !s.is_empty()) {
            Some(selector) => self
                .page
                .inner_text(selector)
                .await
                .map_err(|e| element_error(selector, e))?,
            None => self
                .page
                .body_text()
                .await
                .map_err(|e| ToolError::Execution(e.to_string()))?,
        };
        Ok(json!({ "text": truncate_chars(&text, MAX_TEXT_CHARS) }))
    }

    async fn screenshot(&self) -> ToolResult<Value> {
        let png = self
            .page
            .screenshot()
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;
        Ok(json!({
            "image_base64": STANDARD.encode(png),
            "format": "png",
        }))
    }
}

#[async_trait]
impl System for BrowserSystem {
    fn name(&self) -> &str {
        "browser"
    }

    fn description(&self) -> &str {
        "Pilots a web browser page: navigation, clicks, typing, reading text and screenshots"
    }

    fn instructions(&self) -> &str {
        INSTRUCTIONS
    }

    fn tools(&self) -> &[Tool] {
        registry::tools()
    }

    async fn call(&self, tool_call: ToolCall) -> ToolResult<Value> {
        let ToolCall { name, arguments } = tool_call;
        match name.as_str() {
            registry::NAVIGATE => self.navigate(parse_args(&name, arguments)?).await,
            registry::CLICK => self.click(parse_args(&name, arguments)?).await,
            registry::FILL => self.fill(parse_args(&name, arguments)?).await,
            registry::PRESS_KEY => self.press_key(parse_args(&name, arguments)?).await,
            registry::GET_TEXT => self.get_text(parse_args(&name, arguments)?).await,
            registry::SCREENSHOT => self.screenshot().await,
            _ => Err(ToolError::UnknownTool(name)),
        }
    }
}

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> ToolResult<T> {
    // Models sometimes send no input at all for tools without parameters
    let arguments = if arguments.is_null() {
        json!({})
    } else {
        arguments
    };
    serde_json::from_value(arguments)
        .map_err(|e| ToolError::InvalidParameters(format!("{}: {}", tool, e)))
}

fn element_error(selector: &str, err: PageError) -> ToolError {
    match err {
        PageError::NotFound(_) | PageError::Timeout(_) => {
            ToolError::ElementNotFound(format!("'{}': {}", selector, err))
        }
        other => ToolError::Execution(other.to_string()),
    }
}

/// The first `max` characters of `text`, never splitting a character
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
