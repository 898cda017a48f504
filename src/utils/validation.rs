//! Input validation utilities

use once_cell::sync::Lazy;
use regex::Regex;

/// Ollama model references: `name`, `name:tag`, `namespace/name:tag`
static MODEL_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9._-]*(/[a-zA-Z0-9][a-zA-Z0-9._-]*)*(:[a-zA-Z0-9][a-zA-Z0-9._-]*)?$")
        .unwrap()
});

/// Document names must not carry path components
static DOCUMENT_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^/\\\x00]+$").unwrap());

/// Validate an Ollama model reference
pub fn validate_model_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= 200 && MODEL_NAME_REGEX.is_match(name)
}

/// Validate a document (file) name
pub fn validate_document_name(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty()
        && trimmed.len() <= 255
        && trimmed != "."
        && trimmed != ".."
        && DOCUMENT_NAME_REGEX.is_match(trimmed)
}
