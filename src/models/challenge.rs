//! Challenge mode data models

use serde::{Deserialize, Serialize};

/// A generated comprehension question with its supporting document context
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChallengeQuestion {
    pub question: String,

    /// Document excerpt the question should be answered from
    pub context: String,

    /// Offset of the context within the document
    pub context_start: usize,

    pub context_end: usize,
}

/// Result of checking a user's answer against a question's context
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evaluation {
    pub is_correct: bool,
    pub feedback: String,

    /// Excerpt of the context shown as reference
    pub reference: String,

    /// Entire context the question was drawn from
    pub full_context: String,
}

/// Questions of the current round with the user's answers and evaluations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChallengeRound {
    pub questions: Vec<ChallengeQuestion>,
    pub answers: Vec<String>,
    pub evaluations: Vec<Evaluation>,
}

impl ChallengeRound {
    pub fn new(questions: Vec<ChallengeQuestion>) -> Self {
        Self {
            questions,
            answers: Vec::new(),
            evaluations: Vec::new(),
        }
    }

    /// Whether answers have been submitted and evaluated
    pub fn is_submitted(&self) -> bool {
        !self.evaluations.is_empty()
    }

    /// Clear answers and evaluations, keeping the questions
    pub fn reset_answers(&mut self) {
        self.answers.clear();
        self.evaluations.clear();
    }
}
