use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::json;
use webpilot::agent::{Agent, RunOptions};
use webpilot::errors::AgentError;
use webpilot::models::conversation::Conversation;
use webpilot::models::message::{ContentBlock, Message};
use webpilot::models::tool::{Tool, ToolCall};
use webpilot::page::{Key, Page, PageError, PageInfo, PageResult};
use webpilot::providers::base::{Completion, Provider, StopReason};

/// A small to-do app: type into `#new-todo`, press Enter to add the item
#[derive(Default)]
struct TodoPage {
    draft: Mutex<String>,
    items: Mutex<Vec<String>>,
}

#[async_trait]
impl Page for TodoPage {
    async fn goto(&self, url: &str) -> PageResult<PageInfo> {
        Ok(PageInfo {
            url: url.to_string(),
            title: "Todos".to_string(),
        })
    }

    async fn click(&self, selector: &str, timeout: Duration) -> PageResult<()> {
        match selector {
            "#new-todo" => Ok(()),
            _ => Err(PageError::Timeout(timeout)),
        }
    }

    async fn click_text(&self, text: &str, _timeout: Duration) -> PageResult<()> {
        Err(PageError::NotFound(text.to_string()))
    }

    async fn fill(&self, selector: &str, value: &str) -> PageResult<()> {
        if selector != "#new-todo" {
            return Err(PageError::NotFound(selector.to_string()));
        }
        *self.draft.lock().unwrap() = value.to_string();
        Ok(())
    }

    async fn press_key(&self, key: Key) -> PageResult<()> {
        if key == Key::Enter {
            let draft = std::mem::take(&mut *self.draft.lock().unwrap());
            self.items.lock().unwrap().push(draft);
        }
        Ok(())
    }

    async fn inner_text(&self, selector: &str) -> PageResult<String> {
        match selector {
            "#todo-list" => Ok(self.items.lock().unwrap().join("\n")),
            _ => Err(PageError::NotFound(selector.to_string())),
        }
    }

    async fn body_text(&self) -> PageResult<String> {
        Ok(format!("Todos\n{}", self.items.lock().unwrap().join("\n")))
    }

    async fn screenshot(&self) -> PageResult<Vec<u8>> {
        Err(PageError::Capture("no display".to_string()))
    }
}

/// Replays completions in order and keeps the conversation each call saw
#[derive(Clone, Default)]
struct ScriptedProvider {
    script: Arc<Mutex<VecDeque<Completion>>>,
    seen: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl ScriptedProvider {
    fn new(script: Vec<Completion>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn complete(
        &self,
        _model: &str,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
        _max_tokens: u32,
    ) -> Result<Completion> {
        assert!(!system.is_empty());
        assert_eq!(tools.len(), 6);
        self.seen.lock().unwrap().push(messages.to_vec());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow!("script exhausted"))
    }
}

fn tool_turn(calls: &[(&str, &str, serde_json::Value)]) -> Completion {
    let content = calls
        .iter()
        .map(|(id, name, args)| ContentBlock::tool_request(*id, ToolCall::new(*name, args.clone())))
        .collect();
    Completion::new(content, StopReason::ToolUse)
}

#[tokio::test]
async fn test_add_todo_item() {
    let page = Arc::new(TodoPage::default());
    let provider = ScriptedProvider::new(vec![
        tool_turn(&[("t1", "navigate", json!({"url": "http://localhost:3000"}))]),
        tool_turn(&[
            ("t2", "fill", json!({"selector": "#new-todo", "value": "Buy milk"})),
            ("t3", "press_key", json!({"key": "Enter"})),
        ]),
        tool_turn(&[("t4", "get_text", json!({"selector": "#todo-list"}))]),
        Completion::new(
            vec![ContentBlock::text("Added \"Buy milk\" to the list.")],
            StopReason::EndTurn,
        ),
    ]);

    let agent = Agent::new(Box::new(provider.clone()), page.clone());
    let mut conversation = Conversation::new("Add 'Buy milk' to the todo list");
    let answer = agent
        .run_conversation(&mut conversation, &RunOptions::default())
        .await
        .unwrap();

    assert_eq!(answer, "Added \"Buy milk\" to the list.");
    assert_eq!(*page.items.lock().unwrap(), vec!["Buy milk".to_string()]);
    assert_eq!(conversation.len(), 8);

    let seen = provider.seen.lock().unwrap();
    assert_eq!(seen.len(), 4);
    match seen[3].last() {
        Some(Message::ToolResults { results, .. }) => {
            assert_eq!(results[0].id, "t4");
            assert_eq!(results[0].tool_result, Ok(json!({"text": "Buy milk"})));
        }
        other => panic!("expected tool results, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failures_reach_the_model() {
    let page = Arc::new(TodoPage::default());
    let provider = ScriptedProvider::new(vec![
        tool_turn(&[
            ("t1", "screenshot", json!({})),
            ("t2", "click", json!({"selector": "Delete all"})),
            ("t3", "press_key", json!({"key": "Hyper"})),
        ]),
        Completion::new(vec![ContentBlock::text("Could not do it")], StopReason::EndTurn),
    ]);

    let agent = Agent::new(Box::new(provider.clone()), page);
    let answer = agent
        .run("Delete everything", &RunOptions::default())
        .await
        .unwrap();
    assert_eq!(answer, "Could not do it");

    let seen = provider.seen.lock().unwrap();
    match seen[1].last() {
        Some(Message::ToolResults { results, .. }) => {
            let errors: Vec<String> = results
                .iter()
                .map(|r| r.to_json()["error"].as_str().unwrap_or_default().to_string())
                .collect();
            assert!(errors[0].starts_with("Tool execution failed"));
            assert!(errors[1].starts_with("Element not found"));
            assert_eq!(errors[2], "Invalid parameters: Unknown key: Hyper");
        }
        other => panic!("expected tool results, got {:?}", other),
    }
}

#[tokio::test]
async fn test_small_budget() {
    let page = Arc::new(TodoPage::default());
    let provider = ScriptedProvider::new(vec![
        tool_turn(&[("t1", "get_text", json!({}))]),
        tool_turn(&[("t2", "get_text", json!({}))]),
        tool_turn(&[("t3", "get_text", json!({}))]),
    ]);

    let agent = Agent::new(Box::new(provider.clone()), page);
    let options = RunOptions {
        max_iterations: 2,
        ..Default::default()
    };
    let err = agent.run("Keep reading", &options).await.unwrap_err();

    assert!(matches!(err, AgentError::BudgetExceeded { max_iterations: 2 }));
    assert_eq!(provider.seen.lock().unwrap().len(), 2);
}
