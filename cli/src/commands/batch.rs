//! Batch execution across a swarm

use crate::config::CliConfigLoader;
use crate::output;
use anyhow::{bail, Context, Result};
use serde_json::json;
use std::path::PathBuf;
use swarm_core::SwarmManager;
use tracing::info;

/// Run every prompt across `bots` bots and enforce the failure threshold
pub async fn batch_command(
    bots: usize,
    file: Option<PathBuf>,
    mut prompts: Vec<String>,
    config_loader: CliConfigLoader,
    json: bool,
) -> Result<()> {
    if let Some(path) = &file {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read prompt file: {}", path.display()))?;
        prompts.extend(parse_prompt_lines(&content));
    }
    if prompts.is_empty() {
        bail!("No prompts given; pass them as arguments or with --file");
    }

    let config = config_loader.load().await?;
    let mut manager = SwarmManager::new(config)?;
    let spawned = manager.spawn_swarm(bots).await;
    if spawned == 0 {
        bail!("No bots could be spawned");
    }

    info!("📦 Running {} prompts on {} bots", prompts.len(), spawned);
    let results = manager.execute_batch(&prompts).await?;
    let metrics = manager.metrics();
    let threshold = manager.check_failure_threshold(&results);

    if json {
        output::print_json(&json!({ "results": results, "metrics": metrics }))?;
    } else {
        for (prompt, result) in prompts.iter().zip(&results) {
            println!("{}", output::gray(&format!("> {}", output::truncate(prompt, 80))));
            println!("{}", output::format_response(result));
        }
        output::print_swarm_metrics(&metrics);
    }

    manager.shutdown();
    threshold?;
    Ok(())
}

/// One prompt per line; blank lines are skipped
fn parse_prompt_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prompt_lines_skips_blanks() {
        let prompts = parse_prompt_lines("What is 2+2?\n\n   \n  Summarize: AI  \r\nlast");
        assert_eq!(prompts, vec!["What is 2+2?", "Summarize: AI", "last"]);
        assert!(parse_prompt_lines("\n\n").is_empty());
    }
}
