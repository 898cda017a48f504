//! Configuration management
//!
//! This module provides YAML-based configuration management with support for:
//! - Environment variable overrides
//! - Multiple configuration file locations
//! - Default values for all settings
//! - Ollama backend settings and generation options
//! - Document session, question answering and challenge tuning

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::utils::validation::validate_model_name;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// Ollama backend (set to `null` to run with the extractive engines only)
    #[serde(default = "default_ollama")]
    pub ollama: Option<OllamaConfig>,
    #[serde(default)]
    pub documents: DocumentConfig,
    #[serde(default)]
    pub qa: QaConfig,
    #[serde(default)]
    pub challenge: ChallengeConfig,
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// TLS/HTTPS configuration (if not set, server runs HTTP)
    #[serde(default)]
    pub tls: Option<TlsConfig>,
    /// Path to static files directory (frontend build output)
    #[serde(default = "default_static_dir")]
    pub static_dir: Option<PathBuf>,
    /// Whether to serve the frontend SPA (enables fallback to index.html)
    #[serde(default = "default_serve_frontend")]
    pub serve_frontend: bool,
}

/// TLS/HTTPS configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to TLS certificate file (PEM format)
    pub cert_file: PathBuf,
    /// Path to TLS private key file (PEM format)
    pub key_file: PathBuf,
    /// Minimum TLS version (1.2 or 1.3, defaults to 1.3)
    #[serde(default = "default_min_tls_version")]
    pub min_version: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5051
}

fn default_static_dir() -> Option<PathBuf> {
    // Default to looking for frontend/dist in current directory
    let path = PathBuf::from("frontend/dist");
    if path.exists() {
        Some(path)
    } else {
        None
    }
}

fn default_serve_frontend() -> bool {
    true
}

fn default_min_tls_version() -> String {
    "1.3".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            tls: None,
            static_dir: default_static_dir(),
            serve_frontend: default_serve_frontend(),
        }
    }
}

/// Ollama backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server
    #[serde(default = "default_ollama_url")]
    pub url: String,
    /// Model used for summaries, answers and question generation
    #[serde(default = "default_ollama_model")]
    pub model: String,
    /// Request timeout; generation on CPU can be slow
    #[serde(default = "default_ollama_timeout")]
    pub timeout_secs: u64,
    /// Pull the model at startup when it is not installed
    #[serde(default = "default_auto_pull")]
    pub auto_pull: bool,
    /// Context window passed as `num_ctx`
    #[serde(default = "default_num_ctx")]
    pub num_ctx: u32,
}

fn default_ollama() -> Option<OllamaConfig> {
    Some(OllamaConfig::default())
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3:instruct".to_string()
}

fn default_ollama_timeout() -> u64 {
    120
}

fn default_auto_pull() -> bool {
    true
}

fn default_num_ctx() -> u32 {
    4096
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: default_ollama_url(),
            model: default_ollama_model(),
            timeout_secs: default_ollama_timeout(),
            auto_pull: default_auto_pull(),
            num_ctx: default_num_ctx(),
        }
    }
}

/// Uploaded document and session limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentConfig {
    /// Maximum accepted upload size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Idle time after which a document session is dropped
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
    /// Maximum number of concurrently held document sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// Number of leading characters fed to the summarizer
    #[serde(default = "default_summary_input_chars")]
    pub summary_input_chars: usize,
    /// Upper bound on summary length in words
    #[serde(default = "default_summary_max_words")]
    pub summary_max_words: usize,
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_session_ttl() -> u64 {
    3600
}

fn default_max_sessions() -> usize {
    256
}

fn default_summary_input_chars() -> usize {
    3000
}

fn default_summary_max_words() -> usize {
    150
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            session_ttl_secs: default_session_ttl(),
            max_sessions: default_max_sessions(),
            summary_input_chars: default_summary_input_chars(),
            summary_max_words: default_summary_max_words(),
        }
    }
}

/// Question answering configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QaConfig {
    /// Words per chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Words shared between consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    /// Characters of document context returned with model answers
    #[serde(default = "default_context_preview_chars")]
    pub context_preview_chars: usize,
    /// Characters kept on each side of a highlighted excerpt
    #[serde(default = "default_highlight_window")]
    pub highlight_window: usize,
    /// Pause between streamed answer words, in milliseconds (0 disables it)
    #[serde(default = "default_stream_delay_ms")]
    pub stream_delay_ms: u64,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_context_preview_chars() -> usize {
    1000
}

fn default_highlight_window() -> usize {
    100
}

fn default_stream_delay_ms() -> u64 {
    50
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            context_preview_chars: default_context_preview_chars(),
            highlight_window: default_highlight_window(),
            stream_delay_ms: default_stream_delay_ms(),
        }
    }
}

/// Challenge mode configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChallengeConfig {
    /// Number of questions generated per round
    #[serde(default = "default_question_count")]
    pub question_count: usize,
    /// Words shorter than this are ignored when comparing answers
    #[serde(default = "default_keyword_min_len")]
    pub keyword_min_len: usize,
    /// Share of answer keywords that must appear in the context
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,
}

fn default_question_count() -> usize {
    3
}

fn default_keyword_min_len() -> usize {
    4
}

fn default_match_threshold() -> f64 {
    0.5
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            question_count: default_question_count(),
            keyword_min_len: default_keyword_min_len(),
            match_threshold: default_match_threshold(),
        }
    }
}

/// Per-IP rate limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitSettings {
    #[serde(default = "default_rate_limit_enabled")]
    pub enabled: bool,
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,
}

fn default_rate_limit_enabled() -> bool {
    true
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst_size() -> u32 {
    30
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: default_rate_limit_enabled(),
            requests_per_second: default_requests_per_second(),
            burst_size: default_burst_size(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    /// Log output target (console or file)
    #[serde(default = "default_log_target")]
    pub target: LogTarget,
    /// Directory for log files (used when target is "file")
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Log file name prefix (default: "research-assistant")
    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,
    /// Enable daily log rotation
    #[serde(default = "default_log_rotation")]
    pub daily_rotation: bool,
}

/// Log output target
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    /// Log to console (stdout/stderr) - default for development
    #[default]
    Console,
    /// Log to file with optional rotation
    File,
    /// Log to both console and file
    Both,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_log_target() -> LogTarget {
    LogTarget::Console
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_prefix() -> String {
    "research-assistant".to_string()
}

fn default_log_rotation() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            target: default_log_target(),
            log_dir: default_log_dir(),
            log_prefix: default_log_prefix(),
            daily_rotation: default_log_rotation(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            ollama: default_ollama(),
            documents: DocumentConfig::default(),
            qa: QaConfig::default(),
            challenge: ChallengeConfig::default(),
            rate_limit: RateLimitSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values
    /// 2. Configuration file (YAML)
    /// 3. Environment variables
    pub fn load() -> Result<Self> {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        let config_path = std::env::var("ASSISTANT_CONFIG")
            .map(PathBuf::from)
            .ok()
            .or_else(Self::find_config_file);

        let mut config = match config_path {
            Some(ref path) if path.exists() => {
                eprintln!("[CONFIG] Loading configuration from: {:?}", path);
                Self::from_file(path)?
            }
            Some(ref path) => {
                eprintln!("[CONFIG] Config file not found: {:?}, using defaults", path);
                AppConfig::default()
            }
            None => {
                eprintln!("[CONFIG] No config file found, using defaults");
                AppConfig::default()
            }
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parse a configuration file without applying overrides
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_norway::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Find the configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            PathBuf::from("config.yaml"),
            PathBuf::from("config/config.yaml"),
            PathBuf::from("/etc/research-assistant/config.yaml"),
            dirs::config_dir()
                .map(|p| p.join("research-assistant/config.yaml"))
                .unwrap_or_default(),
        ];

        paths.into_iter().find(|p| p.exists())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // Server overrides
        if let Ok(host) = std::env::var("ASSISTANT_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("ASSISTANT_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        // Logging overrides
        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("ASSISTANT_LOG_FORMAT") {
            self.logging.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                _ => LogFormat::Pretty,
            };
        }

        // Ollama overrides
        if let Ok(url) = std::env::var("OLLAMA_URL") {
            self.ollama.get_or_insert_with(OllamaConfig::default).url = url;
        }
        if let Ok(model) = std::env::var("OLLAMA_MODEL") {
            self.ollama.get_or_insert_with(OllamaConfig::default).model = model;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        if let Some(ref tls) = self.server.tls {
            if !tls.cert_file.exists() {
                anyhow::bail!("TLS certificate file not found: {:?}", tls.cert_file);
            }
            if !tls.key_file.exists() {
                anyhow::bail!("TLS key file not found: {:?}", tls.key_file);
            }
            if tls.min_version != "1.2" && tls.min_version != "1.3" {
                anyhow::bail!(
                    "Invalid TLS minimum version: {}. Must be '1.2' or '1.3'",
                    tls.min_version
                );
            }
        }

        if let Some(ref ollama) = self.ollama {
            if ollama.url.trim().is_empty() {
                anyhow::bail!("Ollama URL cannot be empty");
            }
            if !validate_model_name(&ollama.model) {
                anyhow::bail!("Invalid Ollama model name: {}", ollama.model);
            }
        }

        if self.qa.chunk_size == 0 {
            anyhow::bail!("qa.chunk_size must be greater than 0");
        }
        if self.qa.chunk_overlap >= self.qa.chunk_size {
            anyhow::bail!(
                "qa.chunk_overlap ({}) must be smaller than qa.chunk_size ({})",
                self.qa.chunk_overlap,
                self.qa.chunk_size
            );
        }

        if self.documents.summary_max_words == 0 {
            anyhow::bail!("documents.summary_max_words must be greater than 0");
        }
        if self.documents.max_sessions == 0 {
            anyhow::bail!("documents.max_sessions must be greater than 0");
        }

        let threshold = self.challenge.match_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            anyhow::bail!(
                "challenge.match_threshold must be in (0, 1], got {}",
                threshold
            );
        }

        if let Some(ref static_dir) = self.server.static_dir {
            if !static_dir.exists() {
                tracing::warn!(
                    "Static directory does not exist: {:?}. Frontend will not be served.",
                    static_dir
                );
            }
        }

        Ok(())
    }

    /// Create a default configuration file
    pub fn create_default_config(path: &PathBuf) -> Result<()> {
        let config = AppConfig::default();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_norway::to_string(&config)?;
        std::fs::write(path, yaml)?;

        Ok(())
    }
}
