//! Mock services for testing
//!
//! Provides a mock language model so handlers can be exercised without a
//! running Ollama server.

use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use research_assistant::services::{
    GenerateRequest, Generation, LanguageModel, LlmError, ModelInfo,
};

/// Types of errors the mock can simulate
#[derive(Debug, Clone)]
pub enum MockError {
    /// Connection refused
    ConnectionRefused,
    /// Timeout
    Timeout,
    /// Backend returned an error status
    Api(u16, String),
}

impl From<MockError> for LlmError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::ConnectionRefused => LlmError::Unreachable("connection refused".to_string()),
            MockError::Timeout => LlmError::Timeout,
            MockError::Api(status, body) => LlmError::Api { status, body },
        }
    }
}

/// Mock language model replaying queued replies
///
/// Once the queue is empty every call returns `default_reply`.
pub struct MockLanguageModel {
    replies: Arc<RwLock<VecDeque<String>>>,
    default_reply: String,
    /// Prompts received, in order
    pub prompts: Arc<RwLock<Vec<String>>>,
    /// Simulate errors when set
    pub error_mode: Arc<RwLock<Option<MockError>>>,
}

impl Default for MockLanguageModel {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLanguageModel {
    pub fn new() -> Self {
        Self::with_default_reply("Answer: I am a mock model.")
    }

    pub fn with_default_reply(reply: &str) -> Self {
        Self {
            replies: Arc::new(RwLock::new(VecDeque::new())),
            default_reply: reply.to_string(),
            prompts: Arc::new(RwLock::new(Vec::new())),
            error_mode: Arc::new(RwLock::new(None)),
        }
    }

    /// Queue a reply for the next generate call
    pub fn push_reply(&self, reply: &str) {
        self.replies.write().unwrap().push_back(reply.to_string());
    }

    /// Set error mode to simulate failures
    pub fn set_error_mode(&self, error: MockError) {
        *self.error_mode.write().unwrap() = Some(error);
    }

    /// Clear error mode
    pub fn clear_error_mode(&self) {
        *self.error_mode.write().unwrap() = None;
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.read().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    fn model_name(&self) -> &str {
        "mock-model"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<Generation, LlmError> {
        self.prompts.write().unwrap().push(request.prompt);

        if let Some(error) = self.error_mode.read().unwrap().clone() {
            return Err(error.into());
        }

        let text = self
            .replies
            .write()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone());

        Ok(Generation {
            text,
            model: "mock-model".to_string(),
            eval_count: None,
        })
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        if let Some(error) = self.error_mode.read().unwrap().clone() {
            return Err(error.into());
        }

        Ok(vec![ModelInfo {
            name: "mock-model".to_string(),
            size: Some(1024),
            modified_at: None,
            digest: None,
        }])
    }
}
