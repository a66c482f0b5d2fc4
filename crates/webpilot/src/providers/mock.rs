use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;

use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::providers::base::{Completion, Provider};

/// A mock provider that returns pre-configured completions for testing.
/// Clones share their queue and request log.
#[derive(Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<Completion>>>,
    repeat: Option<Completion>,
    requests: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of completions
    pub fn new(responses: Vec<Completion>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            repeat: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A provider that answers every request with the same completion
    pub fn repeating(completion: Completion) -> Self {
        Self {
            repeat: Some(completion),
            ..Self::new(Vec::new())
        }
    }

    /// The messages sent with each request, in order
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        _model: &str,
        _system: &str,
        messages: &[Message],
        _tools: &[Tool],
        _max_tokens: u32,
    ) -> Result<Completion> {
        self.requests.lock().unwrap().push(messages.to_vec());

        if let Some(completion) = &self.repeat {
            return Ok(completion.clone());
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Err(anyhow!("MockProvider has no more responses"))
        } else {
            Ok(responses.remove(0))
        }
    }
}
