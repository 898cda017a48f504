//! Document data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Source format of an uploaded document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Text,
}

impl DocumentKind {
    /// Infer the kind from a file name extension (case-insensitive)
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "txt" => Some(DocumentKind::Text),
            _ => None,
        }
    }
}

/// A document whose text has been extracted and is ready for analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Session identifier the document is stored under
    pub id: Uuid,

    /// Original file name
    pub name: String,

    /// Source format
    pub kind: DocumentKind,

    /// Extracted plain text
    pub text: String,

    /// Upload time
    pub uploaded_at: DateTime<Utc>,
}

impl Document {
    pub fn new(name: impl Into<String>, kind: DocumentKind, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            text: text.into(),
            uploaded_at: Utc::now(),
        }
    }

    /// Number of whitespace-separated words
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Number of characters (Unicode scalar values)
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Document overview returned after upload and on lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub id: Uuid,
    pub name: String,
    pub kind: DocumentKind,
    pub word_count: usize,
    pub char_count: usize,
    pub summary: String,
    /// Model that produced the summary, or "extractive"
    pub summary_source: String,
    pub uploaded_at: DateTime<Utc>,
}
