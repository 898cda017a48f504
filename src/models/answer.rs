//! Question answering result model

use serde::{Deserialize, Serialize};

/// Answer to a free-form question about a document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    /// Answer text
    pub answer: String,

    /// Confidence in percent (0-100, one decimal place)
    pub confidence: f64,

    /// Source context; may contain `<span class="highlight">` markup
    pub context: String,

    /// Text to emphasize in the rendered answer
    pub highlight: String,

    /// Unmarked context the answer was drawn from
    pub full_context: String,

    /// Whether the answer is a full generated response rather than an extracted span
    pub is_comprehensive: bool,

    /// Model that produced the answer ("extractive" for the built-in engine)
    pub model: String,
}

impl Answer {
    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.confidence)
    }
}

/// Display bucket for answer confidence
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_score(confidence: f64) -> Self {
        if confidence > 70.0 {
            ConfidenceLevel::High
        } else if confidence > 30.0 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}
