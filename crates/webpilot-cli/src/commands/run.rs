use anyhow::Result;
use bat::PrettyPrinter;
use console::style;
use std::sync::Arc;
use tracing::warn;
use webpilot::agent::Agent;
use webpilot::providers::anthropic::AnthropicProvider;
use webpilot::webdriver::WebDriverPage;

use crate::configuration::Settings;

/// Run one task in a fresh browser session and print the answer
pub async fn execute(task: &str, settings: Settings) -> Result<()> {
    let options = settings.agent.run_options();
    let webdriver = settings.browser.webdriver_config();
    let provider = AnthropicProvider::new(settings.provider.into_config()?)?;

    let page = Arc::new(WebDriverPage::connect(&webdriver).await?);
    let agent = Agent::new(Box::new(provider), page.clone());

    println!(
        "{} {}",
        style("Task:").bold().cyan(),
        style(task).dim()
    );
    let result = agent.run(task, &options).await;

    if let Err(e) = page.close().await {
        warn!(error = %e, "failed to close the browser session");
    }

    let answer = result?;
    println!();
    render(&answer)
}

fn render(content: &str) -> Result<()> {
    PrettyPrinter::new()
        .input_from_bytes(content.as_bytes())
        .language("markdown")
        .print()?;
    println!();
    Ok(())
}
