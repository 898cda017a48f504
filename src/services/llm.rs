//! Language model abstraction
//!
//! The assistant talks to generative backends through the [`LanguageModel`]
//! trait so handlers and services can run against Ollama in production and a
//! scripted model in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a language model backend
#[derive(Debug, Error)]
pub enum LlmError {
    /// Backend could not be reached
    #[error("model backend unreachable: {0}")]
    Unreachable(String),

    /// Request exceeded the configured timeout
    #[error("model request timed out")]
    Timeout,

    /// Backend answered with a non-success status
    #[error("model backend returned status {status}: {body}")]
    Api { status: u16, body: String },

    /// Requested model is not installed
    #[error("model '{0}' is not available")]
    ModelNotFound(String),

    /// Response body could not be interpreted
    #[error("invalid response from model backend: {0}")]
    InvalidResponse(String),

    /// Any other transport failure
    #[error("model request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_connect() {
            LlmError::Unreachable(err.to_string())
        } else if err.is_decode() {
            LlmError::InvalidResponse(err.to_string())
        } else {
            LlmError::Request(err.to_string())
        }
    }
}

/// Sampling options forwarded to the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_ctx: Option<u32>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<i32>,
}

impl GenerationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn num_ctx(mut self, num_ctx: u32) -> Self {
        self.num_ctx = Some(num_ctx);
        self
    }

    pub fn num_predict(mut self, num_predict: i32) -> Self {
        self.num_predict = Some(num_predict);
        self
    }
}

/// A single prompt completion request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub prompt: String,
    pub system: Option<String>,
    pub options: GenerationOptions,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            options: GenerationOptions::default(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }
}

/// Completed generation
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    pub model: String,
    /// Tokens generated, when reported by the backend
    pub eval_count: Option<u32>,
}

/// Installed model as reported by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub modified_at: Option<String>,
    #[serde(default)]
    pub digest: Option<String>,
}

/// Generative text backend
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model used for generation
    fn model_name(&self) -> &str;

    /// Complete a prompt
    async fn generate(&self, request: GenerateRequest) -> Result<Generation, LlmError>;

    /// Models installed on the backend
    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError>;
}
