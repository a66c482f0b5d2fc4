use thiserror::Error;

/// Prefix for every environment variable the CLI reads
pub const ENV_PREFIX: &str = "WEBPILOT";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// The environment variable that sets a dotted config key, e.g.
/// `provider.api_key` is `WEBPILOT_PROVIDER__API_KEY`
pub fn to_env_var(field: &str) -> String {
    format!(
        "{}_{}",
        ENV_PREFIX,
        field.replace('.', "__").to_uppercase()
    )
}
