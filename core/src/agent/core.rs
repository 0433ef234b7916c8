//! BotAgent implementation

use super::config::BotAgentBuilder;
use super::execution::BotResponse;
use super::metrics::{BotCounters, BotMetrics};
use super::retry::{RetryPolicy, RetryState};
use crate::config::BotConfig;
use crate::error::{LlmError, Result};
use crate::llm::{ChatOptions, LlmClient, LlmMessage};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, warn};

/// Prompt sent by [`BotAgent::health_check`]
pub const HEALTH_CHECK_PROMPT: &str = "Health check";

/// Timeout applied to health checks
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Why a single attempt failed
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptError {
    /// The call did not complete within the allotted time
    Timeout(Duration),
    /// Any other failure, including an empty payload
    CallFailed(String),
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::Timeout(timeout) => {
                write!(f, "Timeout after {}s", timeout.as_secs_f64())
            }
            AttemptError::CallFailed(message) => f.write_str(message),
        }
    }
}

/// A single bot wrapping one remote inference endpoint
pub struct BotAgent {
    bot_id: u32,
    config: BotConfig,
    client: Arc<dyn LlmClient>,
    retry: RetryPolicy,
    counters: BotCounters,
}

impl BotAgent {
    /// Create a bot talking to the configured Ollama host
    pub fn new<S: Into<String>>(bot_id: u32, model: S, config: BotConfig) -> Result<Self> {
        BotAgentBuilder::new(bot_id)
            .with_model(model)
            .with_config(config)
            .build()
    }

    /// Create a bot with a custom LLM client
    pub fn with_client(bot_id: u32, config: BotConfig, client: Arc<dyn LlmClient>) -> Result<Self> {
        BotAgentBuilder::new(bot_id)
            .with_config(config)
            .with_client(client)
            .build()
    }

    pub(crate) fn from_parts(bot_id: u32, config: BotConfig, client: Arc<dyn LlmClient>) -> Self {
        let retry = RetryPolicy::new(config.max_retries, config.retry_delay());
        Self {
            bot_id,
            config,
            client,
            retry,
            counters: BotCounters::new(),
        }
    }

    pub fn bot_id(&self) -> u32 {
        self.bot_id
    }

    pub fn model(&self) -> &str {
        self.client.model_name()
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Execute a prompt with the configured timeout
    pub async fn execute(&self, prompt: &str) -> BotResponse {
        self.execute_with_timeout(prompt, None).await
    }

    /// Execute a prompt, retrying with exponential backoff
    ///
    /// Never fails: exhausted retries produce a failed [`BotResponse`].
    pub async fn execute_with_timeout(
        &self,
        prompt: &str,
        timeout: Option<Duration>,
    ) -> BotResponse {
        let start = Instant::now();
        let timeout = timeout.unwrap_or_else(|| self.config.timeout());
        let mut state = self.retry.start();
        let mut payload = None;
        let mut last_error = None;

        loop {
            state = match state {
                RetryState::Attempting { attempt } => match self.attempt(prompt, timeout).await {
                    Ok(text) => {
                        payload = Some(text);
                        state.on_success()
                    }
                    Err(err) => {
                        debug!(bot_id = self.bot_id, attempt, "Attempt failed: {}", err);
                        last_error = Some(err);
                        state.on_failure(&self.retry)
                    }
                },
                RetryState::Waiting { attempt, delay } => {
                    let reason = last_error
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_default();
                    warn!(
                        bot_id = self.bot_id,
                        "Retry {}/{} in {:?}: {}",
                        attempt + 1,
                        self.retry.max_retries,
                        delay,
                        reason
                    );
                    tokio::time::sleep(delay).await;
                    state.on_wake()
                }
                RetryState::Succeeded { attempts } => {
                    let elapsed = start.elapsed();
                    self.counters.record(true, elapsed);
                    debug!(
                        bot_id = self.bot_id,
                        attempts,
                        "Execution succeeded in {:.3}s",
                        elapsed.as_secs_f64()
                    );
                    return BotResponse::success(
                        self.bot_id,
                        payload.unwrap_or_default(),
                        elapsed.as_secs_f64(),
                    );
                }
                RetryState::Exhausted { attempts } => {
                    let elapsed = start.elapsed();
                    self.counters.record(false, elapsed);
                    let reason = last_error
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "unknown error".to_string());
                    error!(bot_id = self.bot_id, attempts, "Execution failed: {}", reason);
                    return BotResponse::failure(
                        self.bot_id,
                        format!("Failed after {} retries: {}", self.retry.max_retries, reason),
                        elapsed.as_secs_f64(),
                    );
                }
            };
        }
    }

    async fn attempt(
        &self,
        prompt: &str,
        timeout: Duration,
    ) -> std::result::Result<String, AttemptError> {
        match tokio::time::timeout(timeout, self.call(prompt)).await {
            Err(_) => Err(AttemptError::Timeout(timeout)),
            Ok(Err(e)) => Err(AttemptError::CallFailed(e.to_string())),
            Ok(Ok(text)) => Ok(text),
        }
    }

    async fn call(&self, prompt: &str) -> Result<String> {
        let empty = || LlmError::EmptyResponse {
            provider: self.client.provider_name().to_string(),
        };

        if self.config.embedding_only {
            let embedding = self.client.embeddings(prompt).await?;
            if embedding.is_empty() {
                return Err(empty().into());
            }
            let head = &embedding[..embedding.len().min(5)];
            return Ok(format!(
                "Embedding computed: {} dimensions | first 5: {:?}",
                embedding.len(),
                head
            ));
        }

        let options = ChatOptions::from(&self.config.generation);
        let response = self
            .client
            .chat_completion(vec![LlmMessage::user(prompt)], Some(options))
            .await?;

        response
            .text()
            .map(str::to_string)
            .ok_or_else(|| empty().into())
    }

    /// Issue a minimal prompt and report whether it succeeded
    pub async fn health_check(&self) -> bool {
        self.execute_with_timeout(HEALTH_CHECK_PROMPT, Some(HEALTH_CHECK_TIMEOUT))
            .await
            .success
    }

    /// Check endpoint reachability without touching the counters
    pub async fn ping(&self) -> Result<()> {
        self.client.ping().await
    }

    /// Current counters plus derived ratios
    pub fn metrics(&self) -> BotMetrics {
        self.counters.snapshot(self.bot_id)
    }
}

impl fmt::Debug for BotAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotAgent")
            .field("bot_id", &self.bot_id)
            .field("model", &self.client.model_name())
            .field("provider", &self.client.provider_name())
            .field("retry", &self.retry)
            .finish()
    }
}
