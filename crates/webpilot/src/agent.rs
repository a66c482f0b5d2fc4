use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::browser::BrowserSystem;
use crate::errors::{AgentError, AgentResult};
use crate::models::conversation::Conversation;
use crate::models::message::{ToolRequest, ToolResponse};
use crate::page::Page;
use crate::prompt_template::{load_prompt, SYSTEM_PROMPT};
use crate::providers::base::{Provider, StopReason};
use crate::systems::System;

pub const DEFAULT_MAX_ITERATIONS: usize = 20;
pub const DEFAULT_MODEL: &str = "claude-opus-4-6";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Answer given when the model ends its turn without any text
pub const FALLBACK_ANSWER: &str = "Task completed (no text response).";

/// Settings for a single run
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Number of tool rounds allowed before the run is abandoned
    pub max_iterations: usize,
    pub model: String,
    pub max_tokens: u32,
    /// Language the final answer should be written in
    pub reply_language: Option<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            reply_language: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingModel,
    ExecutingTools,
    Done,
    Failed,
}

/// Progress of one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    pub task: String,
    pub iteration: usize,
    pub max_iterations: usize,
    pub model: String,
    pub phase: Phase,
}

impl RunState {
    fn new(task: &str, options: &RunOptions) -> Self {
        Self {
            task: task.to_string(),
            iteration: 0,
            max_iterations: options.max_iterations,
            model: options.model.clone(),
            phase: Phase::AwaitingModel,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
struct SystemInfo {
    name: String,
    description: String,
    instructions: String,
}

/// Agent integrates a foundational LLM with the browser it needs to pilot
pub struct Agent {
    provider: Box<dyn Provider>,
    system: Box<dyn System>,
}

impl Agent {
    /// Create an agent that drives `page` with the browser tools
    pub fn new(provider: Box<dyn Provider>, page: Arc<dyn Page>) -> Self {
        Self::with_system(provider, Box::new(BrowserSystem::new(page)))
    }

    pub fn with_system(provider: Box<dyn Provider>, system: Box<dyn System>) -> Self {
        Self { provider, system }
    }

    pub fn system_prompt(&self, options: &RunOptions) -> AgentResult<String> {
        let systems = vec![SystemInfo {
            name: self.system.name().to_string(),
            description: self.system.description().to_string(),
            instructions: self.system.instructions().to_string(),
        }];
        let context = json!({
            "tools": self.system.tools(),
            "systems": systems,
            "reply_language": options.reply_language,
        });
        load_prompt(SYSTEM_PROMPT, &context).map_err(|e| AgentError::Internal(e.to_string()))
    }

    /// Carry out `task` and return the model's final answer
    pub async fn run(&self, task: &str, options: &RunOptions) -> AgentResult<String> {
        let mut conversation = Conversation::new(task);
        self.run_conversation(&mut conversation, options).await
    }

    /// Like [`Agent::run`], appending every turn to `conversation` so the
    /// transcript is available afterwards. The conversation must hold only the
    /// task.
    pub async fn run_conversation(
        &self,
        conversation: &mut Conversation,
        options: &RunOptions,
    ) -> AgentResult<String> {
        let task = conversation
            .messages()
            .first()
            .and_then(|m| m.first_text())
            .unwrap_or_default()
            .to_string();
        let mut state = RunState::new(&task, options);

        let result = self.drive(&mut state, conversation, options).await;
        state.phase = if result.is_ok() {
            Phase::Done
        } else {
            Phase::Failed
        };
        debug!(
            iterations = state.iteration,
            phase = ?state.phase,
            messages = conversation.len(),
            "run finished"
        );
        result
    }

    async fn drive(
        &self,
        state: &mut RunState,
        conversation: &mut Conversation,
        options: &RunOptions,
    ) -> AgentResult<String> {
        let system_prompt = self.system_prompt(options)?;
        let tools = self.system.tools();

        loop {
            if state.iteration >= state.max_iterations {
                return Err(AgentError::BudgetExceeded {
                    max_iterations: state.max_iterations,
                });
            }

            state.phase = Phase::AwaitingModel;
            let completion = self
                .provider
                .complete(
                    &state.model,
                    &system_prompt,
                    conversation.messages(),
                    tools,
                    options.max_tokens,
                )
                .await
                .map_err(|e| AgentError::Provider(format!("{:#}", e)))?;

            debug!(
                iteration = state.iteration,
                stop_reason = completion.stop_reason.as_str(),
                input_tokens = ?completion.usage.input_tokens,
                output_tokens = ?completion.usage.output_tokens,
                "model turn"
            );

            let stop_reason = completion.stop_reason;
            conversation.push_assistant(completion.content)?;

            match stop_reason {
                StopReason::EndTurn => {
                    let answer = conversation
                        .last()
                        .and_then(|m| m.first_text())
                        .unwrap_or(FALLBACK_ANSWER);
                    return Ok(answer.to_string());
                }
                StopReason::ToolUse => {
                    let requests: Vec<ToolRequest> = conversation
                        .pending_tool_requests()
                        .into_iter()
                        .cloned()
                        .collect();
                    if requests.is_empty() {
                        return Err(AgentError::UnexpectedStop(
                            "tool_use without any tool requests".to_string(),
                        ));
                    }

                    state.phase = Phase::ExecutingTools;
                    let results = self.execute(requests).await;
                    conversation.push_tool_results(results)?;
                    state.iteration += 1;
                }
                StopReason::Other(reason) => return Err(AgentError::UnexpectedStop(reason)),
            }
        }
    }

    /// Run each request in order. Failures become outcomes, they never end the run.
    async fn execute(&self, requests: Vec<ToolRequest>) -> Vec<ToolResponse> {
        let mut results = Vec::with_capacity(requests.len());
        for ToolRequest { id, tool_call } in requests {
            info!(tool = %tool_call.name, input = %tool_call.arguments, "calling tool");
            let name = tool_call.name.clone();
            let outcome = self.system.call(tool_call).await;
            if let Err(e) = &outcome {
                warn!(tool = %name, error = %e, "tool failed");
            }
            results.push(ToolResponse::new(id, outcome));
        }
        results
    }
}
