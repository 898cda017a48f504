//! Research Assistant Library
//!
//! Document summarization, question answering and comprehension challenges
//! served over HTTP, backed by Ollama with extractive fallbacks.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

pub use config::AppConfig;
use services::{ResearchAssistant, SessionStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Summarization, QA and challenge engines
    pub assistant: Arc<ResearchAssistant>,
    /// Uploaded documents and their conversations
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: AppConfig, assistant: ResearchAssistant) -> Self {
        let sessions = Arc::new(SessionStore::from_config(&config.documents));
        Self {
            config,
            assistant: Arc::new(assistant),
            sessions,
        }
    }
}
