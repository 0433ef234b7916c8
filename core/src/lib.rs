//! # swarm Core
//!
//! Core library for swarm - resilient LLM bots and the orchestration around them.
//!
//! A [`BotAgent`] wraps a single LLM client with retries, timeouts and
//! counters. [`SwarmManager`] spawns and drives many of them, and
//! [`TaskRouter`] queues prioritized work in front of a set of bots.

// Core modules
pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod swarm;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use agent::{BotAgent, BotAgentBuilder, BotMetrics, BotResponse};
pub use config::{BotConfig, GenerationOptions, SwarmConfig};
pub use error::{Error, Result};
pub use llm::{LlmClient, OllamaClient};
pub use swarm::{Priority, Strategy, SwarmManager, SwarmMetrics, TaskRouter};

/// Current version of the swarm-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for the library
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

/// Initialize tracing with a specific debug mode
pub fn init_tracing_with_debug(debug: bool) {
    let filter = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}
