//! Ollama client implementation

use crate::config::BotConfig;
use crate::error::{LlmError, Result};
use crate::llm::{ChatOptions, LlmClient, LlmMessage, LlmResponse, Usage};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Client for a local Ollama inference server
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    keep_alive: Option<String>,
}

impl OllamaClient {
    /// Create a new Ollama client for a model
    pub fn new<S: Into<String>>(base_url: &str, model: S) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            keep_alive: None,
        }
    }

    /// Create a client from a bot configuration
    pub fn from_config<S: Into<String>>(config: &BotConfig, model: S) -> Result<Self> {
        Self::with_http_timeout(config, model, None)
    }

    /// Create a client whose HTTP layer gives up after `http_timeout`
    pub fn with_http_timeout<S: Into<String>>(
        config: &BotConfig,
        model: S,
        http_timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = http_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.host.trim_end_matches('/').to_string(),
            model: model.into(),
            keep_alive: config.keep_alive.clone(),
        })
    }

    /// Set how long the server keeps the model loaded
    pub fn with_keep_alive<S: Into<String>>(mut self, keep_alive: S) -> Self {
        self.keep_alive = Some(keep_alive.into());
        self
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            return Err((LlmError::ModelNotFound {
                model: self.model.clone(),
            })
            .into());
        }

        let error_text = response.text().await.unwrap_or_default();
        Err((LlmError::ApiError {
            status: status.as_u16(),
            message: error_text,
        })
        .into())
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn chat_completion(
        &self,
        messages: Vec<LlmMessage>,
        options: Option<ChatOptions>,
    ) -> Result<LlmResponse> {
        let request = OllamaChatRequest {
            model: self.model.clone(),
            messages,
            stream: false,
            options: options.unwrap_or_default().into(),
            keep_alive: self.keep_alive.clone(),
        };

        debug!(model = %self.model, "Sending chat request to {}", self.base_url);

        let response = self
            .client
            .post(self.url("/api/chat"))
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Network {
                message: e.to_string(),
            })?;

        let response = self.check_status(response).await?;

        let ollama_response: OllamaChatResponse =
            response.json().await.map_err(|e| LlmError::InvalidResponse {
                message: format!("Failed to parse response: {}", e),
            })?;

        Ok(ollama_response.into())
    }

    async fn embeddings(&self, prompt: &str) -> Result<Vec<f32>> {
        let request = OllamaEmbeddingRequest {
            model: &self.model,
            prompt,
        };

        let response = self
            .client
            .post(self.url("/api/embeddings"))
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Network {
                message: e.to_string(),
            })?;

        let response = self.check_status(response).await?;

        let embedding: OllamaEmbeddingResponse =
            response.json().await.map_err(|e| LlmError::InvalidResponse {
                message: format!("Failed to parse embedding: {}", e),
            })?;

        Ok(embedding.embedding)
    }

    async fn ping(&self) -> Result<()> {
        // Listing local models is the cheapest request the server answers
        let response = self
            .client
            .get(self.url("/api/tags"))
            .send()
            .await
            .map_err(|e| LlmError::Network {
                message: e.to_string(),
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err((LlmError::Network {
                message: format!("HTTP {}", response.status()),
            })
            .into())
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<LlmMessage>,
    stream: bool,
    options: OllamaOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<String>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    num_ctx: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

impl From<ChatOptions> for OllamaOptions {
    fn from(options: ChatOptions) -> Self {
        Self {
            num_ctx: options.context_length,
            temperature: options.temperature,
            top_k: options.top_k,
            top_p: options.top_p,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    model: String,
    message: Option<LlmMessage>,
    #[serde(default)]
    done: bool,
    prompt_eval_count: Option<u32>,
    eval_count: Option<u32>,
}

impl From<OllamaChatResponse> for LlmResponse {
    fn from(response: OllamaChatResponse) -> Self {
        let usage = match (response.prompt_eval_count, response.eval_count) {
            (None, None) => None,
            (prompt, completion) => {
                let prompt_tokens = prompt.unwrap_or(0);
                let completion_tokens = completion.unwrap_or(0);
                Some(Usage {
                    prompt_tokens,
                    completion_tokens,
                    total_tokens: prompt_tokens.saturating_add(completion_tokens),
                })
            }
        };

        LlmResponse {
            message: response.message,
            model: response.model,
            done: response.done,
            usage,
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct OllamaEmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}
