//! # swarm CLI
//!
//! Command-line interface for swarm - resilient LLM bots against an Ollama server.
//!
//! ## Usage
//!
//! - `swarm run "prompt"` - Execute a single prompt on one bot
//! - `swarm health --bots 4` - Check the server and a set of bots
//! - `swarm batch --bots 4 --file prompts.txt` - Spread prompts across a swarm
//! - `swarm stress --bots 12 --duration 60` - Timed stress test
//! - `swarm config` - Show the resolved configuration

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod output;

use commands::{batch_command, config_command, health_command, run_command, stress_command};
use config::CliConfigLoader;

/// swarm - resilient LLM bot swarms
#[derive(Parser)]
#[command(name = "swarm")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run, health-check and stress-test swarms of LLM bots")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file or directory path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Inference server URL override
    #[arg(long, global = true)]
    host: Option<String>,

    /// Model name override
    #[arg(long, global = true)]
    model: Option<String>,

    /// Per-call timeout override, in seconds
    #[arg(long, global = true)]
    timeout: Option<f64>,

    /// Retry count override
    #[arg(long, global = true)]
    max_retries: Option<u32>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a single prompt
    Run {
        /// The prompt to send
        prompt: String,
    },

    /// Check the server and bot health
    Health {
        /// Number of bots to spawn and check
        #[arg(short, long, default_value_t = 1)]
        bots: usize,
    },

    /// Run a batch of prompts across a swarm
    Batch {
        /// Number of bots to spawn
        #[arg(short, long, default_value_t = 4)]
        bots: usize,

        /// Read prompts from a file, one per line
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Prompts to run
        prompts: Vec<String>,
    },

    /// Keep a swarm busy for a fixed duration
    Stress {
        /// Number of bots to spawn
        #[arg(short, long, default_value_t = 12)]
        bots: usize,

        /// Test duration in seconds
        #[arg(short, long, default_value_t = 60)]
        duration: u64,
    },

    /// Show the resolved configuration
    Config,
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &Cli) -> CliConfigLoader {
    let mut loader = CliConfigLoader::new();

    if let Some(config_path) = &cli.config {
        loader = loader.with_config_override(config_path.clone());
    }

    if let Some(host) = &cli.host {
        loader = loader.with_host_override(host.clone());
    }

    if let Some(model) = &cli.model {
        loader = loader.with_model_override(model.clone());
    }

    if let Some(timeout) = cli.timeout {
        loader = loader.with_timeout_override(timeout);
    }

    if let Some(max_retries) = cli.max_retries {
        loader = loader.with_max_retries_override(max_retries);
    }

    loader
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    swarm_core::init_tracing_with_debug(cli.verbose);

    let config_loader = build_config_loader(&cli);
    let json = cli.json;

    match cli.command {
        Commands::Run { prompt } => run_command(prompt, config_loader, json).await,
        Commands::Health { bots } => health_command(bots, config_loader, json).await,
        Commands::Batch {
            bots,
            file,
            prompts,
        } => batch_command(bots, file, prompts, config_loader, json).await,
        Commands::Stress { bots, duration } => {
            stress_command(bots, duration, config_loader, json).await
        }
        Commands::Config => config_command(config_loader, json).await,
    }
}
