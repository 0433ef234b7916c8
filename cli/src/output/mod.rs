//! Terminal output helpers for the swarm CLI
//!
//! Human-readable output uses a few terminal colors; `--json` switches every
//! command to pretty-printed JSON on stdout.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use swarm_core::{BotMetrics, BotResponse, SwarmMetrics};

pub fn green(text: &str) -> String {
    text.green().to_string()
}

pub fn red(text: &str) -> String {
    text.red().to_string()
}

pub fn yellow(text: &str) -> String {
    text.yellow().to_string()
}

pub fn gray(text: &str) -> String {
    text.bright_black().to_string()
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Collapse whitespace and cut long text to `max` characters
pub fn truncate(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max).collect();
        format!("{}…", cut)
    }
}

/// One line per bot response
pub fn format_response(response: &BotResponse) -> String {
    let status = if response.success {
        green("✅")
    } else {
        red("❌")
    };
    format!(
        "{} bot {:>3} {} {}",
        status,
        response.bot_id,
        gray(&format!("({:.2}s)", response.response_time)),
        truncate(response.summary(), 100)
    )
}

pub fn print_bot_metrics(metrics: &BotMetrics) {
    println!(
        "📊 Bot {}: {} requests, {} ok, {} failed, {:.1}% success, avg {:.2}s",
        metrics.bot_id,
        metrics.total_requests,
        metrics.successful_requests,
        metrics.failed_requests,
        metrics.success_rate,
        metrics.avg_response_time
    );
}

pub fn print_swarm_metrics(metrics: &SwarmMetrics) {
    println!();
    println!("📊 Swarm '{}' metrics", metrics.name);
    println!("   Bots:         {}", metrics.total_bots);
    println!("   Requests:     {}", metrics.total_requests);
    println!("   Successful:   {}", metrics.successful_requests);
    println!("   Failed:       {}", metrics.failed_requests);
    println!(
        "   Success rate: {}",
        rate_color(metrics.aggregate_success_rate)
    );
}

/// Color a percentage by how healthy it looks
pub fn rate_color(rate: f64) -> String {
    let text = format!("{:.1}%", rate);
    if rate >= 95.0 {
        green(&text)
    } else if rate >= 80.0 {
        yellow(&text)
    } else {
        red(&text)
    }
}
