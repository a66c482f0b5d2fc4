use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod configuration;
mod error;

use configuration::Settings;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Carry out a task in the browser and print the answer
    Run {
        /// What to do, in plain language
        task: String,

        /// Model to use (can also be set via WEBPILOT_AGENT__MODEL)
        #[arg(short, long)]
        model: Option<String>,

        /// Tool rounds allowed before giving up
        #[arg(long)]
        max_iterations: Option<usize>,

        /// WebDriver endpoint (can also be set via WEBPILOT_BROWSER__WEBDRIVER_URL)
        #[arg(long)]
        webdriver_url: Option<String>,

        /// Run the browser without a window
        #[arg(long, num_args = 0..=1, default_missing_value = "true")]
        headless: Option<bool>,

        /// Language to answer in
        #[arg(short, long)]
        language: Option<String>,
    },

    /// List the tools the model can use
    Tools,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            task,
            model,
            max_iterations,
            webdriver_url,
            headless,
            language,
        } => {
            let mut settings = Settings::new()?;
            if let Some(model) = model {
                settings.agent.model = model;
            }
            if let Some(max_iterations) = max_iterations {
                settings.agent.max_iterations = max_iterations;
            }
            if let Some(language) = language {
                settings.agent.reply_language = Some(language);
            }
            if let Some(webdriver_url) = webdriver_url {
                settings.browser.webdriver_url = webdriver_url;
            }
            if let Some(headless) = headless {
                settings.browser.headless = headless;
            }
            commands::run::execute(&task, settings).await
        }
        Command::Tools => commands::tools::execute(),
    }
}
