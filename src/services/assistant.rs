//! Research assistant facade
//!
//! Routes each operation to the language model when one is connected and to
//! the extractive engines otherwise.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{AppConfig, ChallengeConfig, DocumentConfig, QaConfig};
use crate::models::{Answer, ChallengeQuestion, Evaluation};
use crate::services::challenge;
use crate::services::llm::{LanguageModel, LlmError, ModelInfo};
use crate::services::ollama::OllamaClient;
use crate::services::qa;
use crate::services::summarizer::{self, Summary, SummaryLimits};

/// Backend name reported when no model is connected
pub const EXTRACTIVE_BACKEND: &str = "extractive";
pub const OLLAMA_BACKEND: &str = "ollama";

#[derive(Clone)]
pub struct ResearchAssistant {
    llm: Option<Arc<dyn LanguageModel>>,
    documents: DocumentConfig,
    qa: QaConfig,
    challenge: ChallengeConfig,
}

impl ResearchAssistant {
    pub fn new(llm: Option<Arc<dyn LanguageModel>>, config: &AppConfig) -> Self {
        Self {
            llm,
            documents: config.documents.clone(),
            qa: config.qa.clone(),
            challenge: config.challenge.clone(),
        }
    }

    /// Build an assistant backed by Ollama when it is configured and its
    /// model is available, falling back to the extractive engines otherwise
    pub async fn connect(config: &AppConfig) -> Self {
        let Some(ref ollama) = config.ollama else {
            info!("Ollama not configured, using extractive engines");
            return Self::new(None, config);
        };

        let client = match OllamaClient::new(ollama) {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "Failed to create Ollama client, using extractive engines");
                return Self::new(None, config);
            }
        };

        match client.ensure_model(ollama.auto_pull).await {
            Ok(()) => {
                info!(url = %ollama.url, model = %ollama.model, "Connected to Ollama");
                Self::new(Some(Arc::new(client)), config)
            }
            Err(e) => {
                warn!(
                    url = %ollama.url,
                    model = %ollama.model,
                    error = %e,
                    "Ollama unavailable, using extractive engines"
                );
                Self::new(None, config)
            }
        }
    }

    /// "ollama" when a model is connected, "extractive" otherwise
    pub fn backend(&self) -> &'static str {
        if self.llm.is_some() {
            OLLAMA_BACKEND
        } else {
            EXTRACTIVE_BACKEND
        }
    }

    pub fn model_name(&self) -> Option<&str> {
        self.llm.as_deref().map(|m| m.model_name())
    }

    pub fn llm(&self) -> Option<&dyn LanguageModel> {
        self.llm.as_deref()
    }

    pub fn qa_config(&self) -> &QaConfig {
        &self.qa
    }

    /// Models installed on the backend, `None` without a backend
    pub async fn list_models(&self) -> Option<Result<Vec<ModelInfo>, LlmError>> {
        match self.llm() {
            Some(model) => Some(model.list_models().await),
            None => None,
        }
    }

    pub async fn summarize(&self, text: &str) -> Summary {
        summarizer::summarize(
            self.llm(),
            text,
            SummaryLimits {
                input_chars: self.documents.summary_input_chars,
                max_words: self.documents.summary_max_words,
            },
        )
        .await
    }

    pub async fn ask(&self, document: &str, question: &str) -> Answer {
        qa::answer_question(self.llm(), document, question, &self.qa).await
    }

    pub async fn generate_challenge(&self, document: &str) -> Vec<ChallengeQuestion> {
        challenge::generate_questions(self.llm(), document, &self.qa, &self.challenge).await
    }

    pub fn evaluate(&self, question: &ChallengeQuestion, answer: &str, document: &str) -> Evaluation {
        challenge::evaluate_answer(question, answer, document, &self.qa, &self.challenge)
    }

    /// Evaluate answers pairwise with their questions
    pub fn evaluate_all(
        &self,
        questions: &[ChallengeQuestion],
        answers: &[String],
        document: &str,
    ) -> Vec<Evaluation> {
        questions
            .iter()
            .zip(answers)
            .map(|(question, answer)| self.evaluate(question, answer, document))
            .collect()
    }
}
