//! Swarm configuration file schema

use super::types::{BotConfig, GenerationOptions, DEFAULT_HOST, DEFAULT_MODEL};
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level swarm configuration (the `swarm_config.yaml` schema)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    /// Swarm sizing and behaviour
    pub swarm: SwarmSettings,
    /// Inference server settings
    pub ollama: OllamaSettings,
    /// Model and sampling settings
    pub model: ModelSettings,
}

/// Swarm sizing, distribution and error-handling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmSettings {
    pub name: String,
    /// Upper bound on prompts in flight at once
    pub max_concurrent_bots: usize,
    /// Pause between consecutive bot spawns
    pub spawn_stagger_seconds: f64,
    pub task_distribution: TaskDistribution,
    pub error_handling: ErrorHandling,
}

impl Default for SwarmSettings {
    fn default() -> Self {
        Self {
            name: "swarm".to_string(),
            max_concurrent_bots: 12,
            spawn_stagger_seconds: 0.05,
            task_distribution: TaskDistribution::default(),
            error_handling: ErrorHandling::default(),
        }
    }
}

/// How tasks are routed to bots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskDistribution {
    /// `round_robin`, `least_loaded` or `random`
    pub strategy: String,
    pub queue_size: usize,
    pub task_timeout_seconds: f64,
}

impl Default for TaskDistribution {
    fn default() -> Self {
        Self {
            strategy: "round_robin".to_string(),
            queue_size: 256,
            task_timeout_seconds: 30.0,
        }
    }
}

/// Retry policy and failure tolerance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorHandling {
    pub max_retries: u32,
    pub retry_delay_seconds: f64,
    /// Highest tolerated fraction of failed results (0.0 to 1.0)
    pub failure_threshold: f64,
}

impl Default for ErrorHandling {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_seconds: 2.0,
            failure_threshold: 0.2,
        }
    }
}

/// Inference server connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaSettings {
    pub host: String,
    /// HTTP client timeout, independent of the per-call task timeout
    pub timeout_seconds: f64,
    pub keep_alive: Option<String>,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            timeout_seconds: 60.0,
            keep_alive: Some("5m".to_string()),
        }
    }
}

/// Model identity and sampling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub name: String,
    pub context_length: u32,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub embedding_only: bool,
}

impl Default for ModelSettings {
    fn default() -> Self {
        let generation = GenerationOptions::default();
        Self {
            name: DEFAULT_MODEL.to_string(),
            context_length: generation.context_length,
            temperature: generation.temperature,
            top_k: generation.top_k,
            top_p: generation.top_p,
            embedding_only: false,
        }
    }
}

impl SwarmConfig {
    /// Parse a YAML document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Render as a YAML document
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// The configuration every spawned bot receives
    pub fn bot_config(&self) -> BotConfig {
        let error_handling = &self.swarm.error_handling;
        BotConfig {
            host: self.ollama.host.clone(),
            timeout_seconds: self.swarm.task_distribution.task_timeout_seconds,
            max_retries: error_handling.max_retries,
            retry_delay_seconds: error_handling.retry_delay_seconds,
            generation: GenerationOptions {
                context_length: self.model.context_length,
                temperature: self.model.temperature,
                top_k: self.model.top_k,
                top_p: self.model.top_p,
            },
            keep_alive: self.ollama.keep_alive.clone(),
            embedding_only: self.model.embedding_only,
        }
    }

    /// Pause between consecutive bot spawns
    pub fn spawn_stagger(&self) -> Duration {
        Duration::try_from_secs_f64(self.swarm.spawn_stagger_seconds).unwrap_or_default()
    }

    /// HTTP client timeout for the inference server
    pub fn http_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.ollama.timeout_seconds)
            .unwrap_or(Duration::from_secs(60))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.name.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "model.name".to_string(),
            }
            .into());
        }

        if self.swarm.max_concurrent_bots == 0 {
            return Err(ConfigError::invalid("swarm.max_concurrent_bots", 0).into());
        }

        let threshold = self.swarm.error_handling.failure_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(
                ConfigError::invalid("swarm.error_handling.failure_threshold", threshold).into(),
            );
        }

        let stagger = self.swarm.spawn_stagger_seconds;
        if !stagger.is_finite() || stagger < 0.0 {
            return Err(ConfigError::invalid("swarm.spawn_stagger_seconds", stagger).into());
        }

        if !self.ollama.timeout_seconds.is_finite() || self.ollama.timeout_seconds <= 0.0 {
            return Err(
                ConfigError::invalid("ollama.timeout_seconds", self.ollama.timeout_seconds).into(),
            );
        }

        self.bot_config().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
swarm:
  name: "Swarm-100"
  max_concurrent_bots: 6
  batch_size: 6
  scaling:
    mode: "progressive"
  task_distribution:
    strategy: "least_loaded"
    queue_size: 64
    task_timeout_seconds: 10
  error_handling:
    max_retries: 2
    retry_delay_seconds: 1
    failure_threshold: 0.25
ollama:
  host: "http://gpu-box:11434"
  keep_alive: "10m"
model:
  name: "llama3.2:1b"
  context_length: 4096
  temperature: 0.2
monitoring:
  enabled: true
"#;

    #[test]
    fn test_parse_ignores_unknown_sections() {
        let config = SwarmConfig::from_yaml_str(SAMPLE).unwrap();

        assert_eq!(config.swarm.name, "Swarm-100");
        assert_eq!(config.swarm.max_concurrent_bots, 6);
        assert_eq!(config.swarm.task_distribution.strategy, "least_loaded");
        assert_eq!(config.ollama.host, "http://gpu-box:11434");
        assert_eq!(config.model.name, "llama3.2:1b");
        // Unspecified fields keep their defaults
        assert_eq!(config.model.top_k, 40);
        assert_eq!(config.swarm.spawn_stagger_seconds, 0.05);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bot_config_derivation() {
        let config = SwarmConfig::from_yaml_str(SAMPLE).unwrap();
        let bot = config.bot_config();

        assert_eq!(bot.host, "http://gpu-box:11434");
        assert_eq!(bot.timeout(), Duration::from_secs(10));
        assert_eq!(bot.max_retries, 2);
        assert_eq!(bot.retry_delay(), Duration::from_secs(1));
        assert_eq!(bot.generation.context_length, 4096);
        assert_eq!(bot.generation.temperature, 0.2);
        assert_eq!(bot.keep_alive.as_deref(), Some("10m"));
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = SwarmConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, SwarmConfig::default());
    }

    #[test]
    fn test_validate_threshold_and_concurrency() {
        let mut config = SwarmConfig::default();
        config.swarm.error_handling.failure_threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = SwarmConfig::default();
        config.swarm.max_concurrent_bots = 0;
        assert!(config.validate().is_err());

        let mut config = SwarmConfig::default();
        config.model.name = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_round_trip_preserves_values() {
        let config = SwarmConfig::from_yaml_str(SAMPLE).unwrap();
        let rendered = config.to_yaml_string().unwrap();
        let reparsed = SwarmConfig::from_yaml_str(&rendered).unwrap();
        assert_eq!(config, reparsed);
    }
}
