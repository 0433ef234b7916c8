//! Timed stress test

use crate::config::CliConfigLoader;
use crate::output;
use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use swarm_core::SwarmManager;

/// Prompts cycled through during a stress run
pub const STRESS_PROMPTS: [&str; 4] = [
    "Explain async programming briefly.",
    "What is 2+2?",
    "Classify this sentiment: This is great!",
    "Summarize: AI is transforming software development.",
];

/// Keep `bots` bots busy for `duration_secs` seconds and report throughput
pub async fn stress_command(
    bots: usize,
    duration_secs: u64,
    config_loader: CliConfigLoader,
    json: bool,
) -> Result<()> {
    let config = config_loader.load().await?;
    let mut manager = SwarmManager::new(config)?;
    if manager.spawn_swarm(bots).await == 0 {
        bail!("No bots could be spawned");
    }

    let spinner = if json {
        ProgressBar::hidden()
    } else {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]") {
            spinner.set_style(style);
        }
        spinner.set_message(format!(
            "🔥 Stress testing {} bots for {}s",
            manager.len(),
            duration_secs
        ));
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    };

    let report = manager
        .run_stress_test(&STRESS_PROMPTS, Duration::from_secs(duration_secs))
        .await;
    spinner.finish_and_clear();
    let report = report?;

    if json {
        output::print_json(&report)?;
    } else {
        println!();
        println!("📈 Stress test results");
        println!("   Bots:         {}", report.bot_count);
        println!("   Iterations:   {}", report.iterations);
        println!("   Results:      {}", report.total_results);
        println!("   Successful:   {}", report.successful);
        println!("   Success rate: {}", output::rate_color(report.success_rate));
        println!("   Duration:     {:.1}s", report.duration_seconds);
        if report.duration_seconds > 0.0 {
            println!(
                "   Throughput:   {:.2} req/s",
                report.total_results as f64 / report.duration_seconds
            );
        }
    }

    manager.shutdown();
    Ok(())
}
