//! CLI configuration loader for swarm
//!
//! Implements single-source priority loading with flag overrides:
//! 1. --config file/dir (highest priority)
//! 2. Current working directory: ./swarm_config.yaml or ./config/swarm_config.yaml
//! 3. XDG config: $XDG_CONFIG_HOME/swarm/config.yaml or ~/.config/swarm/config.yaml
//! 4. Built-in defaults with OLLAMA_HOST / SWARM_MODEL environment overrides

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use swarm_core::SwarmConfig;
use tracing::debug;

/// File name looked up in the working directory and in `--config` directories
pub const CONFIG_FILE_NAME: &str = "swarm_config.yaml";

/// CLI configuration loader
#[derive(Debug, Default)]
pub struct CliConfigLoader {
    /// Override config file/directory path
    config_override: Option<PathBuf>,
    /// Directory searched instead of the process working directory
    working_dir: Option<PathBuf>,
    /// Directory searched instead of the XDG config home
    config_home: Option<PathBuf>,
    /// Flag overrides
    host_override: Option<String>,
    model_override: Option<String>,
    timeout_override: Option<f64>,
    max_retries_override: Option<u32>,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Set config file/directory override
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    /// Search this directory instead of the current one
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = Some(dir);
        self
    }

    /// Search this directory instead of the XDG config home
    pub fn with_config_home(mut self, dir: PathBuf) -> Self {
        self.config_home = Some(dir);
        self
    }

    /// Set inference host override
    pub fn with_host_override(mut self, host: String) -> Self {
        self.host_override = Some(host);
        self
    }

    /// Set model override
    pub fn with_model_override(mut self, model: String) -> Self {
        self.model_override = Some(model);
        self
    }

    /// Set per-call timeout override, in seconds
    pub fn with_timeout_override(mut self, seconds: f64) -> Self {
        self.timeout_override = Some(seconds);
        self
    }

    /// Set retry count override
    pub fn with_max_retries_override(mut self, max_retries: u32) -> Self {
        self.max_retries_override = Some(max_retries);
        self
    }

    /// Load and resolve configuration
    pub async fn load(&self) -> Result<SwarmConfig> {
        // Step 1: Find and load base configuration
        let mut config = if let Some(override_path) = &self.config_override {
            let path = expand_path(override_path);
            self.load_from_path(&path).await.with_context(|| {
                format!(
                    "Failed to load config from override path: {}",
                    override_path.display()
                )
            })?
        } else {
            self.search_and_load().await?
        };

        // Step 2: Apply flag overrides
        if let Some(host) = &self.host_override {
            config.ollama.host = host.clone();
        }
        if let Some(model) = &self.model_override {
            config.model.name = model.clone();
        }
        if let Some(timeout) = self.timeout_override {
            config.swarm.task_distribution.task_timeout_seconds = timeout;
        }
        if let Some(max_retries) = self.max_retries_override {
            config.swarm.error_handling.max_retries = max_retries;
        }

        // Step 3: Validate
        config
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

        Ok(config)
    }

    /// Search for config in priority order
    async fn search_and_load(&self) -> Result<SwarmConfig> {
        if let Some(config) = self.try_load_cwd().await? {
            return Ok(config);
        }

        if let Some(config) = self.try_load_xdg().await? {
            return Ok(config);
        }

        Ok(defaults_from_env(
            std::env::var("OLLAMA_HOST").ok(),
            std::env::var("SWARM_MODEL").ok(),
        ))
    }

    /// Try loading from the working directory
    async fn try_load_cwd(&self) -> Result<Option<SwarmConfig>> {
        let cwd = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };

        for candidate in [
            cwd.join(CONFIG_FILE_NAME),
            cwd.join("config").join(CONFIG_FILE_NAME),
        ] {
            if candidate.is_file() {
                return Ok(Some(self.load_file(&candidate).await?));
            }
        }

        Ok(None)
    }

    /// Try loading from XDG config directory
    async fn try_load_xdg(&self) -> Result<Option<SwarmConfig>> {
        if let Some(config_dir) = self.get_xdg_config_dir() {
            let config_path = config_dir.join("swarm").join("config.yaml");
            if config_path.is_file() {
                return Ok(Some(self.load_file(&config_path).await?));
            }
        }
        Ok(None)
    }

    /// Load configuration from a specific path (file or directory)
    async fn load_from_path(&self, path: &Path) -> Result<SwarmConfig> {
        if path.is_file() {
            self.load_file(path).await
        } else if path.is_dir() {
            let config_file = path.join(CONFIG_FILE_NAME);
            if config_file.exists() {
                self.load_file(&config_file).await
            } else {
                Err(anyhow!(
                    "No {} found in directory: {}",
                    CONFIG_FILE_NAME,
                    path.display()
                ))
            }
        } else {
            Err(anyhow!("Config path does not exist: {}", path.display()))
        }
    }

    /// Load a single config file
    async fn load_file(&self, path: &Path) -> Result<SwarmConfig> {
        debug!("Loading config from {}", path.display());
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        SwarmConfig::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Get XDG config directory
    fn get_xdg_config_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.config_home {
            return Some(dir.clone());
        }
        match std::env::var("XDG_CONFIG_HOME") {
            Ok(xdg_config) if !xdg_config.is_empty() => Some(PathBuf::from(xdg_config)),
            _ => dirs::home_dir().map(|home| home.join(".config")),
        }
    }
}

/// Built-in defaults, adjusted by environment values when present
fn defaults_from_env(host: Option<String>, model: Option<String>) -> SwarmConfig {
    let mut config = SwarmConfig::default();
    if let Some(host) = host.filter(|h| !h.trim().is_empty()) {
        config.ollama.host = host;
    }
    if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
        config.model.name = model;
    }
    config
}

/// Expand a leading `~` and environment variables in a user-supplied path
fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(&raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => path.to_path_buf(),
    }
}
