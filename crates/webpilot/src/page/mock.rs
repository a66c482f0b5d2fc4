use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{Key, Page, PageError, PageInfo, PageResult};

/// An in-memory page for testing, recording every call it receives
#[derive(Default)]
pub struct MockPage {
    elements: HashMap<String, String>,
    link_texts: Vec<String>,
    body: String,
    unreachable: HashSet<String>,
    redirects: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl MockPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// An element reachable by CSS selector, with its rendered text
    pub fn with_element(mut self, selector: &str, text: &str) -> Self {
        self.elements.insert(selector.to_string(), text.to_string());
        self
    }

    /// Visible text that can be clicked by text match
    pub fn with_link_text(mut self, text: &str) -> Self {
        self.link_texts.push(text.to_string());
        self
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    pub fn with_unreachable(mut self, url: &str) -> Self {
        self.unreachable.insert(url.to_string());
        self
    }

    pub fn with_redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Page for MockPage {
    async fn goto(&self, url: &str) -> PageResult<PageInfo> {
        self.record(format!("goto:{url}"));
        if self.unreachable.contains(url) {
            return Err(PageError::Navigation(format!(
                "net::ERR_NAME_NOT_RESOLVED at {url}"
            )));
        }
        let url = self.redirects.get(url).cloned().unwrap_or(url.to_string());
        Ok(PageInfo {
            url,
            title: "Mock Page".to_string(),
        })
    }

    async fn click(&self, selector: &str, timeout: Duration) -> PageResult<()> {
        self.record(format!("click:{selector}"));
        if self.elements.contains_key(selector) {
            Ok(())
        } else {
            Err(PageError::Timeout(timeout))
        }
    }

    async fn click_text(&self, text: &str, _timeout: Duration) -> PageResult<()> {
        self.record(format!("click_text:{text}"));
        let needle = text.to_lowercase();
        if self
            .link_texts
            .iter()
            .any(|t| t.to_lowercase().contains(&needle))
        {
            Ok(())
        } else {
            Err(PageError::NotFound(format!("text={text}")))
        }
    }

    async fn fill(&self, selector: &str, value: &str) -> PageResult<()> {
        self.record(format!("fill:{selector}={value}"));
        if self.elements.contains_key(selector) {
            Ok(())
        } else {
            Err(PageError::NotFound(selector.to_string()))
        }
    }

    async fn press_key(&self, key: Key) -> PageResult<()> {
        self.record(format!("press_key:{key:?}"));
        Ok(())
    }

    async fn inner_text(&self, selector: &str) -> PageResult<String> {
        self.record(format!("inner_text:{selector}"));
        self.elements
            .get(selector)
            .cloned()
            .ok_or_else(|| PageError::NotFound(selector.to_string()))
    }

    async fn body_text(&self) -> PageResult<String> {
        self.record("body_text".to_string());
        Ok(self.body.clone())
    }

    async fn screenshot(&self) -> PageResult<Vec<u8>> {
        self.record("screenshot".to_string());
        Ok(vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
    }
}
