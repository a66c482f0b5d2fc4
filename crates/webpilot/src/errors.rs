use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::conversation::ConversationError;

/// Failure of a single tool invocation. These are reported back to the model
/// as the invocation's outcome and never end a run.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Tool execution failed: {0}")]
    Execution(String),
}

pub type ToolResult<T> = Result<T, ToolError>;

/// Errors that terminate a run.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Agent reached the maximum number of iterations ({max_iterations}) without completing the task")]
    BudgetExceeded { max_iterations: usize },

    #[error("Unexpected stop reason from provider: {0}")]
    UnexpectedStop(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Conversation(#[from] ConversationError),
}

pub type AgentResult<T> = Result<T, AgentError>;
