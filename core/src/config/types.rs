//! Bot configuration types
//!
//! Core only accepts fully resolved, validated configuration.
//! All discovery, loading, and merging happens in CLI layer.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default inference endpoint
pub const DEFAULT_HOST: &str = "http://localhost:11434";

/// Default model served by the inference endpoint
pub const DEFAULT_MODEL: &str = "gemma3:270m";

/// Sampling options sent with every chat request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    /// Context window size (`num_ctx`)
    pub context_length: u32,
    /// Temperature for sampling (0.0 to 2.0)
    pub temperature: f32,
    /// Top-k sampling parameter
    pub top_k: u32,
    /// Top-p sampling parameter (0.0 to 1.0)
    pub top_p: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            context_length: 2048,
            temperature: 0.7,
            top_k: 40,
            top_p: 0.9,
        }
    }
}

/// Configuration mapping accepted by a single bot agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Address of the inference endpoint
    pub host: String,
    /// Per-call timeout in seconds
    pub timeout_seconds: f64,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Base delay before the first retry, doubled for each further retry
    pub retry_delay_seconds: f64,
    /// Generation options
    pub generation: GenerationOptions,
    /// How long the server keeps the model loaded (e.g. "5m")
    pub keep_alive: Option<String>,
    /// Use the embeddings endpoint instead of chat
    pub embedding_only: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            timeout_seconds: 30.0,
            max_retries: 3,
            retry_delay_seconds: 2.0,
            generation: GenerationOptions::default(),
            keep_alive: None,
            embedding_only: false,
        }
    }
}

impl BotConfig {
    /// Set the endpoint host
    pub fn with_host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = host.into();
        self
    }

    /// Set the per-call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_seconds = timeout.as_secs_f64();
        self
    }

    /// Set retry count and base delay
    pub fn with_retry(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay_seconds = retry_delay.as_secs_f64();
        self
    }

    /// Set generation options
    pub fn with_generation(mut self, generation: GenerationOptions) -> Self {
        self.generation = generation;
        self
    }

    /// Per-call timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_seconds).unwrap_or(Duration::from_secs(30))
    }

    /// Base retry delay as a duration
    pub fn retry_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.retry_delay_seconds).unwrap_or(Duration::from_secs(2))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(ConfigError::MissingField {
                field: "host".to_string(),
            }
            .into());
        }

        if !self.host.starts_with("http://") && !self.host.starts_with("https://") {
            return Err(ConfigError::invalid("host", &self.host).into());
        }

        if !self.timeout_seconds.is_finite() || self.timeout_seconds <= 0.0 {
            return Err(ConfigError::invalid("timeout_seconds", self.timeout_seconds).into());
        }

        if !self.retry_delay_seconds.is_finite() || self.retry_delay_seconds < 0.0 {
            return Err(
                ConfigError::invalid("retry_delay_seconds", self.retry_delay_seconds).into(),
            );
        }

        let generation = &self.generation;
        if generation.context_length == 0 {
            return Err(ConfigError::invalid("context_length", 0).into());
        }

        if !(0.0..=2.0).contains(&generation.temperature) {
            return Err(ConfigError::invalid("temperature", generation.temperature).into());
        }

        if !(0.0..=1.0).contains(&generation.top_p) {
            return Err(ConfigError::invalid("top_p", generation.top_p).into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = BotConfig::default();
        assert_eq!(config.host, "http://localhost:11434");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay(), Duration::from_secs(2));
        assert_eq!(config.generation.context_length, 2048);
        assert_eq!(config.generation.temperature, 0.7);
        assert_eq!(config.generation.top_k, 40);
        assert_eq!(config.generation.top_p, 0.9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_mapping_fills_defaults() {
        let config: BotConfig =
            serde_json::from_str(r#"{"timeout_seconds": 5, "generation": {"top_k": 10}}"#)
                .unwrap();

        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.generation.top_k, 10);
        assert_eq!(config.generation.context_length, 2048);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_host = BotConfig::default().with_host("localhost:11434");
        assert!(bad_host.validate().is_err());

        let mut zero_timeout = BotConfig::default();
        zero_timeout.timeout_seconds = 0.0;
        assert!(zero_timeout.validate().is_err());

        let mut negative_delay = BotConfig::default();
        negative_delay.retry_delay_seconds = -1.0;
        assert!(negative_delay.validate().is_err());

        let mut hot = BotConfig::default();
        hot.generation.temperature = 2.5;
        assert!(hot.validate().is_err());

        let mut wide = BotConfig::default();
        wide.generation.top_p = 1.5;
        assert!(wide.validate().is_err());
    }

    #[test]
    fn test_builders_round_trip_durations() {
        let config = BotConfig::default()
            .with_timeout(Duration::from_millis(1500))
            .with_retry(2, Duration::from_millis(250));

        assert_eq!(config.timeout(), Duration::from_millis(1500));
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.retry_delay(), Duration::from_millis(250));
    }
}
