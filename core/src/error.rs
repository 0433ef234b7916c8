//! Error types and handling for Swarm Core

use thiserror::Error;

/// Result type alias for Swarm operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Swarm Core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// LLM client errors
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Swarm orchestration errors
    #[error("Swarm error: {0}")]
    Swarm(#[from] SwarmError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, value: impl ToString) -> Self {
        ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// LLM client errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Model not found: {model}")]
    ModelNotFound { model: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Empty response from {provider}")]
    EmptyResponse { provider: String },
}

/// Swarm orchestration errors
#[derive(Error, Debug)]
pub enum SwarmError {
    #[error("No bots registered")]
    NoBots,

    #[error("Failed to spawn bot {bot_id}: {message}")]
    SpawnFailed { bot_id: u32, message: String },

    #[error("Only {healthy}/{total} bots healthy")]
    UnhealthyBots { healthy: usize, total: usize },

    #[error("Failure rate {rate:.1}% exceeds threshold {threshold:.1}%")]
    FailureThresholdExceeded { rate: f64, threshold: f64 },

    #[error("Task queue full (capacity {capacity})")]
    QueueFull { capacity: usize },

    #[error("No prompts to run")]
    NoPrompts,

    #[error("Only {spawned}/{requested} bots spawned")]
    PartialSpawn { spawned: usize, requested: usize },

    #[error("Invalid task priority: {value}")]
    InvalidPriority { value: u8 },
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Generic(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Generic(msg.to_string())
    }
}
