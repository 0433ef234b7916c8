//! Single prompt execution command

use crate::config::CliConfigLoader;
use crate::output;
use anyhow::{bail, Result};
use serde_json::json;
use swarm_core::BotAgentBuilder;
use tracing::info;

/// Execute one prompt on a single bot
pub async fn run_command(prompt: String, config_loader: CliConfigLoader, json: bool) -> Result<()> {
    let config = config_loader.load().await?;
    info!("🤖 Using model: {}", config.model.name);
    info!("🌐 Using host: {}", config.ollama.host);

    let agent = BotAgentBuilder::new(0)
        .with_model(config.model.name.clone())
        .with_config(config.bot_config())
        .with_http_timeout(config.http_timeout())
        .build()?;

    let response = agent.execute(&prompt).await;
    let metrics = agent.metrics();

    if json {
        output::print_json(&json!({ "response": response, "metrics": metrics }))?;
    } else if let Some(text) = &response.response {
        println!("{}", text);
        println!();
        output::print_bot_metrics(&metrics);
    } else {
        println!("{}", output::format_response(&response));
        output::print_bot_metrics(&metrics);
    }

    if !response.success {
        bail!("Prompt failed: {}", response.summary());
    }
    Ok(())
}
