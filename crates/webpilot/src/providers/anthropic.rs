use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::base::{Completion, Provider};
use super::configs::{AnthropicProviderConfig, ANTHROPIC_API_VERSION};
use super::utils::{
    anthropic_response_to_completion, messages_to_anthropic_spec, tools_to_anthropic_spec,
};
use crate::models::message::Message;
use crate::models::tool::Tool;

pub struct AnthropicProvider {
    client: Client,
    config: AnthropicProviderConfig,
}

impl AnthropicProvider {
    pub fn new(config: AnthropicProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        let url = format!("{}/v1/messages", self.config.host.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 => {
                Err(anyhow!("Server error: {}", status))
            }
            status => {
                let error_text = response.text().await?;
                Err(anyhow!("Request failed: {} - {}", status, error_text))
            }
        }
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    async fn complete(
        &self,
        model: &str,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
        max_tokens: u32,
    ) -> Result<Completion> {
        let mut payload = json!({
            "model": model,
            "max_tokens": max_tokens,
            "messages": messages_to_anthropic_spec(messages),
        });

        if let Some(obj) = payload.as_object_mut() {
            if !system.is_empty() {
                obj.insert("system".to_string(), json!(system));
            }
            if !tools.is_empty() {
                obj.insert("tools".to_string(), json!(tools_to_anthropic_spec(tools)?));
            }
        }

        debug!(model, messages = messages.len(), "sending messages request");
        let response = self.post(payload).await?;
        anthropic_response_to_completion(&response)
    }
}
