//! Minimal configuration module for swarm core
//!
//! Only exports pure data types. All loading logic is in CLI layer.

pub mod swarm;
pub mod types;

pub use swarm::{
    ErrorHandling, ModelSettings, OllamaSettings, SwarmConfig, SwarmSettings, TaskDistribution,
};
pub use types::{BotConfig, GenerationOptions, DEFAULT_HOST, DEFAULT_MODEL};
