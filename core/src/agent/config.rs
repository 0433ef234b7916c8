//! Bot agent builder

use crate::config::{BotConfig, DEFAULT_MODEL};
use crate::error::Result;
use crate::llm::{LlmClient, OllamaClient};
use std::sync::Arc;
use std::time::Duration;

use super::BotAgent;

/// Builder for creating bot agents
pub struct BotAgentBuilder {
    bot_id: u32,
    model: String,
    config: BotConfig,
    client: Option<Arc<dyn LlmClient>>,
    http_timeout: Option<Duration>,
}

impl BotAgentBuilder {
    /// Create a new builder for the given bot id
    pub fn new(bot_id: u32) -> Self {
        Self {
            bot_id,
            model: DEFAULT_MODEL.to_string(),
            config: BotConfig::default(),
            client: None,
            http_timeout: None,
        }
    }

    /// Set the model name
    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = model.into();
        self
    }

    /// Set bot configuration
    pub fn with_config(mut self, config: BotConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom LLM client instead of an Ollama client
    pub fn with_client(mut self, client: Arc<dyn LlmClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the HTTP timeout of the default Ollama client
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    /// Validate the configuration and build the agent
    pub fn build(self) -> Result<BotAgent> {
        self.config.validate()?;

        let client: Arc<dyn LlmClient> = match self.client {
            Some(client) => client,
            None => Arc::new(OllamaClient::with_http_timeout(
                &self.config,
                self.model,
                self.http_timeout,
            )?),
        };

        Ok(BotAgent::from_parts(self.bot_id, self.config, client))
    }
}
