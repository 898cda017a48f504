//! Ollama client service
//!
//! Client for the Ollama REST API: prompt completion, installed model
//! listing and model pulls.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::OllamaConfig;
use crate::services::llm::{
    GenerateRequest, Generation, GenerationOptions, LanguageModel, LlmError, ModelInfo,
};

/// Model pulls download gigabytes; they get their own timeout
const PULL_TIMEOUT: Duration = Duration::from_secs(3600);

/// Ollama API client
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    num_ctx: u32,
}

#[derive(Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    options: &'a GenerationOptions,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    model: Option<String>,
    response: String,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Serialize)]
struct PullBody<'a> {
    model: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct PullResponse {
    status: String,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(config: &OllamaConfig) -> Result<Self, LlmError> {
        info!("Initializing Ollama client for {}", config.url);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            num_ctx: config.num_ctx,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether `model` is installed. Untagged names match their `:latest` tag.
    pub async fn has_model(&self, model: &str) -> Result<bool, LlmError> {
        let installed = self.list_models().await?;
        Ok(installed.iter().any(|m| model_matches(&m.name, model)))
    }

    /// Download a model into the Ollama server
    pub async fn pull_model(&self, model: &str) -> Result<(), LlmError> {
        info!(model = %model, "Pulling Ollama model");

        let response = self
            .client
            .post(format!("{}/api/pull", self.base_url))
            .timeout(PULL_TIMEOUT)
            .json(&PullBody {
                model,
                stream: false,
            })
            .send()
            .await?;

        let pulled: PullResponse = self.handle_response(response).await?;
        if pulled.status != "success" {
            return Err(LlmError::InvalidResponse(format!(
                "unexpected pull status '{}'",
                pulled.status
            )));
        }

        info!(model = %model, "Model pulled successfully");
        Ok(())
    }

    /// Make sure the configured model is installed, pulling it when allowed
    pub async fn ensure_model(&self, auto_pull: bool) -> Result<(), LlmError> {
        if self.has_model(&self.model).await? {
            debug!(model = %self.model, "Model already installed");
            return Ok(());
        }

        if !auto_pull {
            return Err(LlmError::ModelNotFound(self.model.clone()));
        }

        warn!(model = %self.model, "Model not installed, trying to pull it");
        self.pull_model(&self.model).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, LlmError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            if status == reqwest::StatusCode::NOT_FOUND && body.contains("not found") {
                return Err(LlmError::ModelNotFound(self.model.clone()));
            }
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<T>(&body).map_err(|e| {
            let truncated = if body.len() > 500 {
                format!("{}... (truncated)", crate::services::text::char_prefix(&body, 500))
            } else {
                body.clone()
            };
            LlmError::InvalidResponse(format!("{}: {}", e, truncated))
        })
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: GenerateRequest) -> Result<Generation, LlmError> {
        let mut options = request.options;
        if options.num_ctx.is_none() {
            options.num_ctx = Some(self.num_ctx);
        }

        debug!(
            model = %self.model,
            prompt_chars = request.prompt.chars().count(),
            "Sending generate request"
        );

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&GenerateBody {
                model: &self.model,
                prompt: &request.prompt,
                system: request.system.as_deref(),
                stream: false,
                options: &options,
            })
            .send()
            .await?;

        let generated: GenerateResponse = self.handle_response(response).await?;

        Ok(Generation {
            text: generated.response,
            model: generated.model.unwrap_or_else(|| self.model.clone()),
            eval_count: generated.eval_count,
        })
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await?;

        let tags: TagsResponse = self.handle_response(response).await?;
        Ok(tags.models)
    }
}

fn model_matches(installed: &str, wanted: &str) -> bool {
    if installed == wanted {
        return true;
    }
    !wanted.contains(':') && installed == format!("{}:latest", wanted)
}

/// Strip an echoed prompt from a model reply, keeping the text after the
/// first `Answer:` marker when present
pub fn clean_answer(response: &str) -> String {
    match response.split_once("Answer:") {
        Some((_, answer)) => answer.trim().to_string(),
        None => response.trim().to_string(),
    }
}
