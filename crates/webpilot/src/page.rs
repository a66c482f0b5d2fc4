use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(test)]
pub mod mock;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PageError {
    #[error("{0}")]
    Navigation(String),

    #[error("no element matches {0}")]
    NotFound(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("screenshot capture failed: {0}")]
    Capture(String),

    #[error("browser session error: {0}")]
    Session(String),
}

pub type PageResult<T> = Result<T, PageError>;

/// Where the page ended up after a navigation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    pub url: String,
    pub title: String,
}

/// Primitive operations against a single browser page.
///
/// Implementations bind to one session and are used by one run at a time.
#[async_trait]
pub trait Page: Send + Sync {
    /// Load `url` and wait until the DOM is ready, not for the full load
    async fn goto(&self, url: &str) -> PageResult<PageInfo>;

    /// Click the first element matching a CSS selector
    async fn click(&self, selector: &str, timeout: Duration) -> PageResult<()>;

    /// Click the first element whose visible text contains `text`, ignoring case
    async fn click_text(&self, text: &str, timeout: Duration) -> PageResult<()>;

    /// Replace the value of the first element matching a CSS selector
    async fn fill(&self, selector: &str, value: &str) -> PageResult<()>;

    /// Send a key to whatever currently has focus
    async fn press_key(&self, key: Key) -> PageResult<()>;

    /// Rendered text of the first element matching a CSS selector
    async fn inner_text(&self, selector: &str) -> PageResult<String>;

    /// Rendered text of the document body
    async fn body_text(&self) -> PageResult<String>;

    /// PNG bytes of the visible viewport
    async fn screenshot(&self) -> PageResult<Vec<u8>>;
}

/// A key that can be pressed on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Tab,
    Escape,
    Backspace,
    Delete,
    Space,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
    Char(char),
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Unknown key: {0}")]
pub struct UnknownKey(pub String);

impl FromStr for Key {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if !c.is_control() {
                return Ok(if c == ' ' { Key::Space } else { Key::Char(c) });
            }
        }

        let key = match s.to_ascii_lowercase().as_str() {
            "enter" | "return" => Key::Enter,
            "tab" => Key::Tab,
            "escape" | "esc" => Key::Escape,
            "backspace" => Key::Backspace,
            "delete" | "del" => Key::Delete,
            "space" => Key::Space,
            "arrowup" | "up" => Key::ArrowUp,
            "arrowdown" | "down" => Key::ArrowDown,
            "arrowleft" | "left" => Key::ArrowLeft,
            "arrowright" | "right" => Key::ArrowRight,
            "home" => Key::Home,
            "end" => Key::End,
            "pageup" => Key::PageUp,
            "pagedown" => Key::PageDown,
            other => match other.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                Some(n @ 1..=12) => Key::F(n),
                _ => return Err(UnknownKey(s.to_string())),
            },
        };
        Ok(key)
    }
}

impl Key {
    /// The character WebDriver uses to encode this key in a key sequence
    pub fn webdriver_char(self) -> char {
        match self {
            Key::Backspace => '\u{E003}',
            Key::Tab => '\u{E004}',
            Key::Enter => '\u{E007}',
            Key::Escape => '\u{E00C}',
            Key::Space => '\u{E00D}',
            Key::PageUp => '\u{E00E}',
            Key::PageDown => '\u{E00F}',
            Key::End => '\u{E010}',
            Key::Home => '\u{E011}',
            Key::ArrowLeft => '\u{E012}',
            Key::ArrowUp => '\u{E013}',
            Key::ArrowRight => '\u{E014}',
            Key::ArrowDown => '\u{E015}',
            Key::Delete => '\u{E017}',
            // F1 is U+E031, the rest follow in order
            Key::F(n) => char::from_u32(0xE030 + u32::from(n)).unwrap_or('\u{E031}'),
            Key::Char(c) => c,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_keys() {
        assert_eq!("Enter".parse(), Ok(Key::Enter));
        assert_eq!("escape".parse(), Ok(Key::Escape));
        assert_eq!("ArrowDown".parse(), Ok(Key::ArrowDown));
        assert_eq!("F5".parse(), Ok(Key::F(5)));
        assert_eq!("a".parse(), Ok(Key::Char('a')));
        assert_eq!(" ".parse(), Ok(Key::Space));
    }

    #[test]
    fn test_unknown_keys() {
        assert_eq!(
            "Hyper".parse::<Key>(),
            Err(UnknownKey("Hyper".to_string()))
        );
        assert!("F13".parse::<Key>().is_err());
        assert!("".parse::<Key>().is_err());
    }

    #[test]
    fn test_webdriver_codepoints() {
        assert_eq!(Key::Enter.webdriver_char(), '\u{E007}');
        assert_eq!(Key::F(1).webdriver_char(), '\u{E031}');
        assert_eq!(Key::F(12).webdriver_char(), '\u{E03C}');
        assert_eq!(Key::Char('x').webdriver_char(), 'x');
    }
}
