//! Endpoint and bot health checks

use crate::config::CliConfigLoader;
use crate::output;
use anyhow::{bail, Context, Result};
use serde_json::json;
use swarm_core::{LlmClient, OllamaClient, SwarmManager};

/// Ping the inference server, then spawn `bots` bots and health-check each
pub async fn health_command(bots: usize, config_loader: CliConfigLoader, json: bool) -> Result<()> {
    let config = config_loader.load().await?;

    let client = OllamaClient::with_http_timeout(
        &config.bot_config(),
        config.model.name.clone(),
        Some(config.http_timeout()),
    )?;
    client
        .ping()
        .await
        .with_context(|| format!("Inference server unreachable at {}", config.ollama.host))?;
    if !json {
        println!("🌐 {} reachable at {}", output::green("Server"), config.ollama.host);
    }

    let mut manager = SwarmManager::new(config)?;
    let spawned = manager.spawn_swarm(bots).await;
    let checks = manager.health_check_all().await;
    let healthy = checks.iter().filter(|(_, ok)| *ok).count();

    if json {
        let entries: Vec<_> = checks
            .iter()
            .map(|(bot_id, ok)| json!({ "bot_id": bot_id, "healthy": ok }))
            .collect();
        output::print_json(&json!({
            "requested": bots,
            "spawned": spawned,
            "healthy": healthy,
            "bots": entries,
        }))?;
    } else {
        for (bot_id, ok) in &checks {
            let status = if *ok {
                output::green("healthy")
            } else {
                output::red("unhealthy")
            };
            println!("🩺 bot {:>3}: {}", bot_id, status);
        }
        println!("\n{}/{} bots healthy", healthy, bots);
    }

    manager.shutdown();

    if spawned != bots || healthy != spawned {
        bail!("Only {}/{} bots healthy", healthy, bots);
    }
    Ok(())
}
