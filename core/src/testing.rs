//! Scripted LLM client shared by unit tests

use crate::error::{LlmError, Result};
use crate::llm::{ChatOptions, LlmClient, LlmMessage, LlmResponse};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One scripted reply
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Error(String),
    Response(LlmResponse),
    /// Reply with text after sleeping
    Delayed(Duration, String),
    /// Never complete
    Hang,
}

/// Mock LLM client replaying a script; the last reply repeats forever
pub struct MockLlmClient {
    script: Vec<MockReply>,
    calls: AtomicUsize,
    embedding: Vec<f32>,
    ping_ok: bool,
    prompts: Mutex<Vec<String>>,
}

impl MockLlmClient {
    pub fn scripted(script: Vec<MockReply>) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            embedding: Vec::new(),
            ping_ok: true,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn always(text: &str) -> Self {
        Self::scripted(vec![MockReply::Text(text.to_string())])
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = embedding;
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.ping_ok = false;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn next_reply(&self) -> MockReply {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .get(index)
            .or(self.script.last())
            .cloned()
            .unwrap_or(MockReply::Hang)
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn chat_completion(
        &self,
        messages: Vec<LlmMessage>,
        _options: Option<ChatOptions>,
    ) -> Result<LlmResponse> {
        if let Some(message) = messages.last() {
            self.prompts.lock().unwrap().push(message.content.clone());
        }

        match self.next_reply() {
            MockReply::Text(text) => Ok(LlmResponse::text_response("mock-model", text)),
            MockReply::Error(message) => Err((LlmError::Network { message }).into()),
            MockReply::Response(response) => Ok(response),
            MockReply::Delayed(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(LlmResponse::text_response("mock-model", text))
            }
            MockReply::Hang => std::future::pending().await,
        }
    }

    async fn embeddings(&self, _prompt: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.embedding.clone())
    }

    async fn ping(&self) -> Result<()> {
        if self.ping_ok {
            Ok(())
        } else {
            Err((LlmError::Network {
                message: "connection refused".to_string(),
            })
            .into())
        }
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}
