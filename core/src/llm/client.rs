//! LLM client trait and response structures

use crate::config::GenerationOptions;
use crate::error::{LlmError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::message::LlmMessage;

/// Trait for LLM clients
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a chat completion request
    async fn chat_completion(
        &self,
        messages: Vec<LlmMessage>,
        options: Option<ChatOptions>,
    ) -> Result<LlmResponse>;

    /// Compute an embedding vector for a prompt
    async fn embeddings(&self, _prompt: &str) -> Result<Vec<f32>> {
        Err((LlmError::InvalidRequest {
            message: format!("Embeddings not supported by {}", self.provider_name()),
        })
        .into())
    }

    /// Check that the endpoint is reachable
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    /// Get the model name
    fn model_name(&self) -> &str;

    /// Get the provider name
    fn provider_name(&self) -> &str;
}

/// Response from an LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    /// The generated message, absent when the server returned none
    pub message: Option<LlmMessage>,

    /// Model used for generation
    pub model: String,

    /// Whether generation ran to completion
    pub done: bool,

    /// Usage statistics
    pub usage: Option<Usage>,
}

impl LlmResponse {
    /// Build a completed response carrying assistant text
    pub fn text_response<S: Into<String>>(model: &str, content: S) -> Self {
        Self {
            message: Some(LlmMessage::assistant(content)),
            model: model.to_string(),
            done: true,
            usage: None,
        }
    }

    /// Nested message content, `None` when absent or empty
    pub fn text(&self) -> Option<&str> {
        self.message.as_ref().and_then(|m| m.get_text())
    }
}

/// Usage statistics for a request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    /// Number of tokens in the prompt
    pub prompt_tokens: u32,

    /// Number of tokens in the completion
    pub completion_tokens: u32,

    /// Total number of tokens
    pub total_tokens: u32,
}

/// Options for chat completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOptions {
    /// Context window size
    pub context_length: Option<u32>,

    /// Temperature for generation
    pub temperature: Option<f32>,

    /// Top-k sampling parameter
    pub top_k: Option<u32>,

    /// Top-p sampling parameter
    pub top_p: Option<f32>,
}

impl Default for ChatOptions {
    fn default() -> Self {
        GenerationOptions::default().into()
    }
}

impl From<GenerationOptions> for ChatOptions {
    fn from(options: GenerationOptions) -> Self {
        Self {
            context_length: Some(options.context_length),
            temperature: Some(options.temperature),
            top_k: Some(options.top_k),
            top_p: Some(options.top_p),
        }
    }
}

impl From<&GenerationOptions> for ChatOptions {
    fn from(options: &GenerationOptions) -> Self {
        options.clone().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_treats_empty_as_absent() {
        let empty = LlmResponse::text_response("m", "");
        assert_eq!(empty.text(), None);

        let missing = LlmResponse {
            message: None,
            model: "m".to_string(),
            done: true,
            usage: None,
        };
        assert_eq!(missing.text(), None);

        let full = LlmResponse::text_response("m", "ok");
        assert_eq!(full.text(), Some("ok"));
    }

    #[test]
    fn test_chat_options_from_generation() {
        let options = ChatOptions::from(GenerationOptions {
            context_length: 1024,
            temperature: 0.1,
            top_k: 5,
            top_p: 0.5,
        });
        assert_eq!(options.context_length, Some(1024));
        assert_eq!(options.top_k, Some(5));

        let defaults = ChatOptions::default();
        assert_eq!(defaults.context_length, Some(2048));
        assert_eq!(defaults.top_p, Some(0.9));
    }
}
