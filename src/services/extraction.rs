//! Document text extraction
//!
//! Turns uploaded PDF and plain text files into analysable text. PDFs are
//! parsed from memory; nothing is written to disk.

use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;
use tracing::{debug, warn};

use crate::models::DocumentKind;

/// Errors raised while extracting text from an uploaded file
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported file type: {0} (expected .pdf or .txt)")]
    UnsupportedFileType(String),

    #[error("text file is not valid UTF-8: {0}")]
    InvalidEncoding(String),

    #[error("failed to read PDF: {0}")]
    Pdf(String),

    #[error("document contains no extractable text")]
    Empty,
}

/// Text extracted from an uploaded file
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedDocument {
    pub kind: DocumentKind,
    pub text: String,
}

/// Extract text from a file based on its extension
pub fn extract_text(file_name: &str, bytes: &[u8]) -> Result<ExtractedDocument, ExtractionError> {
    let kind = DocumentKind::from_file_name(file_name)
        .ok_or_else(|| ExtractionError::UnsupportedFileType(file_name.to_string()))?;

    let text = match kind {
        DocumentKind::Pdf => extract_pdf(bytes)?,
        DocumentKind::Text => String::from_utf8(bytes.to_vec())
            .map_err(|e| ExtractionError::InvalidEncoding(e.to_string()))?,
    };

    if text.trim().is_empty() {
        return Err(ExtractionError::Empty);
    }

    debug!(
        file_name = %file_name,
        kind = ?kind,
        chars = text.chars().count(),
        "Extracted document text"
    );

    Ok(ExtractedDocument { kind, text })
}

/// Parse a PDF from memory. The parser panics on some malformed inputs;
/// those panics are reported as [`ExtractionError::Pdf`].
fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    match panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes))) {
        Ok(result) => result.map_err(|e| ExtractionError::Pdf(e.to_string())),
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown parser failure".to_string());
            warn!(reason = %reason, "PDF parser panicked");
            Err(ExtractionError::Pdf(format!("malformed PDF: {}", reason)))
        }
    }
}
