//! Business logic services

pub mod assistant;
pub mod challenge;
pub mod extraction;
pub mod llm;
pub mod ollama;
pub mod qa;
pub mod relevance;
pub mod sessions;
pub mod summarizer;
pub mod text;

pub use assistant::ResearchAssistant;
pub use extraction::{extract_text, ExtractedDocument, ExtractionError};
pub use llm::{GenerateRequest, Generation, GenerationOptions, LanguageModel, LlmError, ModelInfo};
pub use ollama::OllamaClient;
pub use sessions::{spawn_session_cleanup, DocumentSession, SessionStats, SessionStore};
pub use summarizer::Summary;
