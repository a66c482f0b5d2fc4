use crate::error::{to_env_var, ConfigError, ENV_PREFIX};
use config::{Config, Environment};
use serde::Deserialize;
use std::env;
use webpilot::agent::{RunOptions, DEFAULT_MAX_ITERATIONS, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use webpilot::providers::configs::{AnthropicProviderConfig, ANTHROPIC_HOST};
use webpilot::webdriver::{WebDriverConfig, DEFAULT_WEBDRIVER_URL};

#[derive(Debug, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_anthropic_host")]
    pub host: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl ProviderSettings {
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar {
                env_var: to_env_var("provider.api_key"),
            })
    }

    pub fn into_config(self) -> Result<AnthropicProviderConfig, ConfigError> {
        let api_key = self.api_key()?.to_string();
        Ok(AnthropicProviderConfig::new(self.host, api_key))
    }
}

#[derive(Debug, Deserialize)]
pub struct AgentSettings {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub reply_language: Option<String>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_iterations: default_max_iterations(),
            max_tokens: default_max_tokens(),
            reply_language: None,
        }
    }
}

impl AgentSettings {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            max_iterations: self.max_iterations,
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            reply_language: self.reply_language.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BrowserSettings {
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    #[serde(default = "default_headless")]
    pub headless: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
        }
    }
}

impl BrowserSettings {
    pub fn webdriver_config(&self) -> WebDriverConfig {
        WebDriverConfig {
            webdriver_url: self.webdriver_url.clone(),
            headless: self.headless,
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub provider: ProviderSettings,
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub browser: BrowserSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            // Provider defaults
            .set_default("provider.host", default_anthropic_host())?
            // Agent defaults
            .set_default("agent.model", default_model())?
            .set_default("agent.max_iterations", default_max_iterations() as u64)?
            .set_default("agent.max_tokens", default_max_tokens() as u64)?
            // Browser defaults
            .set_default("browser.webdriver_url", default_webdriver_url())?
            .set_default("browser.headless", default_headless())?;

        // The standard Anthropic variable, below anything set under our prefix
        if let Ok(api_key) = env::var("ANTHROPIC_API_KEY") {
            builder = builder.set_default("provider.api_key", api_key)?;
        }

        let config = builder
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Self = match config.try_deserialize() {
            Ok(settings) => settings,
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                let error_str = err.to_string();
                return match missing_field(&error_str) {
                    Some(field) => Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    }),
                    None => match &err {
                        config::ConfigError::NotFound(field) => Err(ConfigError::MissingEnvVar {
                            env_var: to_env_var(field),
                        }),
                        _ => Err(ConfigError::Other(err)),
                    },
                };
            }
        };

        settings.provider.api_key()?;
        Ok(settings)
    }
}

/// The field named by a serde "missing field `name`" message
fn missing_field(message: &str) -> Option<&str> {
    let rest = message.split("missing field `").nth(1)?;
    rest.split('`').next()
}

fn default_anthropic_host() -> String {
    ANTHROPIC_HOST.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_webdriver_url() -> String {
    DEFAULT_WEBDRIVER_URL.to_string()
}

fn default_headless() -> bool {
    true
}
