use std::time::Duration;

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::page::{Key, Page, PageError, PageInfo, PageResult};

pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";

const TEXT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Settings for opening a WebDriver session
#[derive(Debug, Clone)]
pub struct WebDriverConfig {
    pub webdriver_url: String,
    pub headless: bool,
    pub window_size: (u32, u32),
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            headless: true,
            window_size: (1280, 720),
        }
    }
}

impl WebDriverConfig {
    /// Session capabilities. The eager load strategy makes navigation return at
    /// DOMContentLoaded instead of waiting for every resource.
    pub fn capabilities(&self) -> Map<String, Value> {
        let (width, height) = self.window_size;
        let mut args = vec![format!("--window-size={},{}", width, height)];
        if self.headless {
            args.push("--headless=new".to_string());
        }

        let caps = json!({
            "browserName": "chrome",
            "pageLoadStrategy": "eager",
            "goog:chromeOptions": { "args": args },
            "moz:firefoxOptions": {
                "args": if self.headless { vec!["-headless"] } else { Vec::new() }
            },
        });
        caps.as_object().cloned().unwrap_or_default()
    }
}

/// A page backed by a WebDriver session (chromedriver, geckodriver, selenium)
pub struct WebDriverPage {
    client: Client,
}

impl WebDriverPage {
    pub async fn connect(config: &WebDriverConfig) -> PageResult<Self> {
        let webdriver_url = config.webdriver_url.trim_end_matches('/');
        info!(%webdriver_url, headless = config.headless, "opening webdriver session");

        let mut builder = ClientBuilder::native();
        builder.capabilities(config.capabilities());
        let client = builder
            .connect(webdriver_url)
            .await
            .map_err(|e| {
                PageError::Session(format!(
                    "failed to connect to WebDriver at {}: {}",
                    webdriver_url, e
                ))
            })?;

        Ok(Self { client })
    }

    /// End the browser session
    pub async fn close(&self) -> PageResult<()> {
        self.client
            .clone()
            .close()
            .await
            .map_err(|e| PageError::Session(e.to_string()))
    }

    async fn find(&self, selector: &str) -> PageResult<Element> {
        self.client
            .find(Locator::Css(selector))
            .await
            .map_err(|e| classify(selector, e))
    }

    async fn click_locator(
        &self,
        locator: Locator<'_>,
        description: &str,
        timeout: Duration,
    ) -> PageResult<()> {
        let attempt = async {
            let element = self
                .client
                .wait()
                .at_most(timeout)
                .for_element(locator)
                .await?;
            element.click().await
        };

        match tokio::time::timeout(timeout, attempt).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(classify(description, e)),
            Err(_) => Err(PageError::Timeout(timeout)),
        }
    }

    /// Click the first displayed element matching `xpath`, polling until one
    /// shows up
    async fn click_first_visible(&self, xpath: &str, description: &str) -> PageResult<()> {
        loop {
            let candidates = self
                .client
                .find_all(Locator::XPath(xpath))
                .await
                .map_err(|e| classify(description, e))?;

            for element in candidates {
                // Detached or stale elements count as hidden
                if element.is_displayed().await.unwrap_or(false) {
                    return element
                        .click()
                        .await
                        .map_err(|e| classify(description, e));
                }
            }

            tokio::time::sleep(TEXT_POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl Page for WebDriverPage {
    async fn goto(&self, url: &str) -> PageResult<PageInfo> {
        self.client
            .goto(url)
            .await
            .map_err(|e| PageError::Navigation(format!("navigation to {} failed: {}", url, e)))?;

        let final_url = self
            .client
            .current_url()
            .await
            .map_err(|e| PageError::Navigation(e.to_string()))?;
        let title = self
            .client
            .title()
            .await
            .map_err(|e| PageError::Navigation(e.to_string()))?;

        debug!(url = %final_url, %title, "navigation finished");
        Ok(PageInfo {
            url: final_url.to_string(),
            title,
        })
    }

    async fn click(&self, selector: &str, timeout: Duration) -> PageResult<()> {
        self.click_locator(Locator::Css(selector), selector, timeout)
            .await
    }

    async fn click_text(&self, text: &str, timeout: Duration) -> PageResult<()> {
        let xpath = text_match_xpath(text);
        let description = format!("text={}", text);
        tokio::time::timeout(timeout, self.click_first_visible(&xpath, &description))
            .await
            .map_err(|_| PageError::Timeout(timeout))?
    }

    async fn fill(&self, selector: &str, value: &str) -> PageResult<()> {
        let element = self.find(selector).await?;
        element.clear().await.map_err(|e| classify(selector, e))?;
        element
            .send_keys(value)
            .await
            .map_err(|e| classify(selector, e))
    }

    async fn press_key(&self, key: Key) -> PageResult<()> {
        let active = self
            .client
            .active_element()
            .await
            .map_err(|e| PageError::Session(e.to_string()))?;
        active
            .send_keys(&key.webdriver_char().to_string())
            .await
            .map_err(|e| PageError::Session(e.to_string()))
    }

    async fn inner_text(&self, selector: &str) -> PageResult<String> {
        self.find(selector)
            .await?
            .text()
            .await
            .map_err(|e| classify(selector, e))
    }

    async fn body_text(&self) -> PageResult<String> {
        self.inner_text("body").await
    }

    async fn screenshot(&self) -> PageResult<Vec<u8>> {
        self.client
            .screenshot()
            .await
            .map_err(|e| PageError::Capture(e.to_string()))
    }
}

/// Missing elements are `NotFound`, anything else means the session itself is
/// in trouble
fn classify(description: &str, err: CmdError) -> PageError {
    match err {
        err @ CmdError::WaitTimeout => PageError::NotFound(format!("{} ({})", description, err)),
        err if err.is_no_such_element() => {
            PageError::NotFound(format!("{} ({})", description, err))
        }
        other => PageError::Session(format!("{}: {}", description, other)),
    }
}

/// Elements whose text never renders
const INVISIBLE: &str = "self::script or self::style or self::noscript or self::template";

/// XPath selecting the innermost elements whose visible text contains `text`,
/// ignoring case
pub fn text_match_xpath(text: &str) -> String {
    let needle = text.to_lowercase();
    let (upper, lower) = case_fold_tables(&needle);
    let folded = format!(
        "translate(normalize-space(.), {}, {})",
        xpath_literal(&upper),
        xpath_literal(&lower)
    );
    let hidden = INVISIBLE.replace("self::", "ancestor-or-self::");
    format!(
        "//body//*[not({hidden})][contains({folded}, {needle})][not(.//*[contains({folded}, {needle})])]",
        hidden = hidden,
        folded = folded,
        needle = xpath_literal(&needle)
    )
}

/// `translate()` tables mapping the uppercase form of each letter in a
/// lowercase needle back to that letter
fn case_fold_tables(needle: &str) -> (String, String) {
    let mut upper = String::new();
    let mut lower = String::new();
    for c in needle.chars() {
        let mut forms = c.to_uppercase();
        // Letters that uppercase to several chars (ß) cannot be folded by translate()
        if let (Some(u), None) = (forms.next(), forms.next()) {
            if u != c && !upper.contains(u) {
                upper.push(u);
                lower.push(c);
            }
        }
    }
    (upper, lower)
}

/// Quote a string as an XPath 1.0 literal, which has no escape syntax
fn xpath_literal(s: &str) -> String {
    if !s.contains('\'') {
        format!("'{}'", s)
    } else if !s.contains('"') {
        format!("\"{}\"", s)
    } else {
        let parts: Vec<String> = s.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}
