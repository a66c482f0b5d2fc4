use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use super::message::{ContentBlock, Message, ToolRequest, ToolResponse};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversationError {
    #[error("{0} message cannot follow the previous turn")]
    OutOfTurn(&'static str),

    #[error("tool result {0} does not answer a request from the previous turn")]
    UnexpectedToolResult(String),

    #[error("tool result {0} appears more than once")]
    DuplicateToolResult(String),

    #[error("tool request {0} has no tool result")]
    MissingToolResult(String),
}

/// The ordered, append-only transcript of one run.
///
/// Appends are checked so that every tool request of a model turn is answered
/// exactly once by the turn that directly follows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Start a conversation seeded with the task text
    pub fn new<S: Into<String>>(task: S) -> Self {
        Self {
            messages: vec![Message::user(task)],
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Tool requests from the last message that still need results
    pub fn pending_tool_requests(&self) -> Vec<&ToolRequest> {
        self.last().map(|m| m.tool_requests()).unwrap_or_default()
    }

    /// Append a model turn
    pub fn push_assistant(&mut self, content: Vec<ContentBlock>) -> Result<(), ConversationError> {
        self.push(Message::assistant(content))
    }

    /// Append the outcomes for the previous model turn
    pub fn push_tool_results(
        &mut self,
        results: Vec<ToolResponse>,
    ) -> Result<(), ConversationError> {
        self.push(Message::tool_results(results))
    }

    pub fn push(&mut self, message: Message) -> Result<(), ConversationError> {
        match &message {
            Message::User { .. } => {
                if !self.pending_tool_requests().is_empty() {
                    return Err(ConversationError::OutOfTurn("user"));
                }
            }
            Message::Assistant { .. } => {
                if matches!(self.last(), None | Some(Message::Assistant { .. })) {
                    return Err(ConversationError::OutOfTurn("assistant"));
                }
            }
            Message::ToolResults { results, .. } => {
                if !matches!(self.last(), Some(Message::Assistant { .. })) {
                    return Err(ConversationError::OutOfTurn("tool result"));
                }
                self.check_results(results)?;
            }
        }
        self.messages.push(message);
        Ok(())
    }

    fn check_results(&self, results: &[ToolResponse]) -> Result<(), ConversationError> {
        let requested: HashSet<&str> = self
            .pending_tool_requests()
            .iter()
            .map(|r| r.id.as_str())
            .collect();

        let mut answered = HashSet::new();
        for result in results {
            if !requested.contains(result.id.as_str()) {
                return Err(ConversationError::UnexpectedToolResult(result.id.clone()));
            }
            if !answered.insert(result.id.as_str()) {
                return Err(ConversationError::DuplicateToolResult(result.id.clone()));
            }
        }

        for request in self.pending_tool_requests() {
            if !answered.contains(request.id.as_str()) {
                return Err(ConversationError::MissingToolResult(request.id.clone()));
            }
        }
        Ok(())
    }
}
