//! Challenge mode
//!
//! Generates comprehension questions from the opening chunks of a document
//! and grades free-text answers by keyword overlap with each question's
//! context.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::config::{ChallengeConfig, QaConfig};
use crate::models::{ChallengeQuestion, Evaluation};
use crate::services::llm::{GenerateRequest, GenerationOptions, LanguageModel};
use crate::services::relevance::best_chunk;
use crate::services::text::{
    char_count, char_prefix, char_slice, char_suffix, chunk_words, highlight_excerpt,
};

pub const MISSING_ANSWER_FEEDBACK: &str = "Please provide an answer.";
pub const CORRECT_FEEDBACK: &str = "Your answer appears to be relevant to the document content.";
pub const INCORRECT_FEEDBACK: &str =
    "Your answer may not fully address the question based on the document content.";

/// Characters of a chunk shown to the model when asking for a question
const PROMPT_CHUNK_CHARS: usize = 1000;

/// Context used when no chunk matches a generated question
const DEFAULT_CONTEXT_CHARS: usize = 500;

/// Length of the fixed fallback question contexts
const FALLBACK_CONTEXT_CHARS: usize = 1000;

/// Reference excerpt window for correct answers
const CORRECT_REFERENCE_END: usize = 100;


fn question_prompt(text: &str) -> String {
    format!(
        "Generate one specific, detailed question that can be answered from the following text.\n\
         The question should test comprehension and require understanding of the content.\n\n\
         Text: {text}\n\n\
         Question:"
    )
}

/// Extract the question from a model reply: the text after the last
/// `Question:` marker up to the first `?`. Returns `None` when nothing is left.
pub fn parse_generated_question(output: &str) -> Option<String> {
    let tail = output.rsplit("Question:").next().unwrap_or(output);
    let question = tail.split('?').next().unwrap_or(tail).trim();

    if question.is_empty() {
        None
    } else {
        Some(format!("{}?", question))
    }
}

/// The chunk most relevant to `question`, or the opening of the document
/// when no chunk shares a keyword with it
pub fn find_relevant_context(document: &str, question: &str, qa: &QaConfig) -> ChallengeQuestion {
    let chunks = chunk_words(document, qa.chunk_size, qa.chunk_overlap);

    match best_chunk(&chunks, question) {
        Some((chunk, score)) if score > 0.0 => ChallengeQuestion {
            question: question.to_string(),
            context: chunk.text.clone(),
            context_start: chunk.start,
            context_end: chunk.end,
        },
        _ => ChallengeQuestion {
            question: question.to_string(),
            context: char_prefix(document, DEFAULT_CONTEXT_CHARS).to_string(),
            context_start: 0,
            context_end: char_count(document).min(DEFAULT_CONTEXT_CHARS),
        },
    }
}

/// The fixed questions asked when none could be generated
pub fn fallback_questions(document: &str) -> Vec<ChallengeQuestion> {
    let len = char_count(document);
    let long = len > FALLBACK_CONTEXT_CHARS;

    vec![
        ChallengeQuestion {
            question: "What is the main topic of the document?".to_string(),
            context: char_prefix(document, FALLBACK_CONTEXT_CHARS).to_string(),
            context_start: 0,
            context_end: len.min(FALLBACK_CONTEXT_CHARS),
        },
        ChallengeQuestion {
            question: "What are the key points mentioned in the document?".to_string(),
            context: if long {
                char_slice(document, FALLBACK_CONTEXT_CHARS, 2 * FALLBACK_CONTEXT_CHARS).to_string()
            } else {
                document.to_string()
            },
            context_start: if long { FALLBACK_CONTEXT_CHARS } else { 0 },
            context_end: len.min(2 * FALLBACK_CONTEXT_CHARS),
        },
        ChallengeQuestion {
            question: "What conclusions or recommendations does the document present?".to_string(),
            context: char_suffix(document, FALLBACK_CONTEXT_CHARS).to_string(),
            context_start: len.saturating_sub(FALLBACK_CONTEXT_CHARS),
            context_end: len,
        },
    ]
}

/// Generate up to `question_count` questions, one per opening chunk.
///
/// Chunks whose generation fails or parses to nothing are skipped. When no
/// question survives, or there is no model, the fixed questions are used.
pub async fn generate_questions(
    llm: Option<&dyn LanguageModel>,
    document: &str,
    qa: &QaConfig,
    config: &ChallengeConfig,
) -> Vec<ChallengeQuestion> {
    let mut questions = Vec::new();

    if let Some(model) = llm {
        let chunks = chunk_words(document, qa.chunk_size, qa.chunk_overlap);

        for chunk in chunks.iter().take(config.question_count) {
            let request = GenerateRequest::new(question_prompt(char_prefix(
                &chunk.text,
                PROMPT_CHUNK_CHARS,
            )))
            .with_options(
                GenerationOptions::new()
                    .temperature(0.7)
                    .top_p(0.9)
                    .num_predict(200),
            );

            let output = match model.generate(request).await {
                Ok(generation) => generation.text,
                Err(e) => {
                    warn!(error = %e, chunk_start = chunk.start, "Question generation failed");
                    continue;
                }
            };

            match parse_generated_question(&output) {
                Some(question) => {
                    debug!(question = %question, "Generated challenge question");
                    questions.push(find_relevant_context(document, &question, qa));
                }
                None => warn!(chunk_start = chunk.start, "Model reply contained no question"),
            }

            if questions.len() >= config.question_count {
                break;
            }
        }
    }

    if questions.is_empty() {
        debug!("Using fallback challenge questions");
        questions = fallback_questions(document);
    }

    questions
}

fn answer_keywords(text: &str, min_len: usize) -> HashSet<String> {
    text.split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|word| word.chars().count() >= min_len)
        .collect()
}

/// Grade `user_answer` by the share of its keywords found in the question's context
pub fn evaluate_answer(
    question: &ChallengeQuestion,
    user_answer: &str,
    document: &str,
    qa: &QaConfig,
    config: &ChallengeConfig,
) -> Evaluation {
    let full_context = if question.context.is_empty() {
        char_prefix(document, FALLBACK_CONTEXT_CHARS).to_string()
    } else {
        question.context.clone()
    };

    if user_answer.trim().is_empty() {
        return Evaluation {
            is_correct: false,
            feedback: MISSING_ANSWER_FEEDBACK.to_string(),
            reference: question.context.clone(),
            full_context,
        };
    }

    let answer_words = answer_keywords(user_answer, config.keyword_min_len);
    let context_words = answer_keywords(&question.context, config.keyword_min_len);
    let matching = answer_words.intersection(&context_words).count();
    let ratio = matching as f64 / answer_words.len().max(1) as f64;

    debug!(
        matching = matching,
        answer_keywords = answer_words.len(),
        ratio = ratio,
        "Evaluated challenge answer"
    );

    if ratio > config.match_threshold {
        Evaluation {
            is_correct: true,
            feedback: CORRECT_FEEDBACK.to_string(),
            reference: highlight_excerpt(
                &question.context,
                0,
                CORRECT_REFERENCE_END,
                qa.highlight_window,
            ),
            full_context,
        }
    } else {
        Evaluation {
            is_correct: false,
            feedback: INCORRECT_FEEDBACK.to_string(),
            reference: highlight_excerpt(
                &question.context,
                question.context_start,
                question.context_end,
                qa.highlight_window,
            ),
            full_context,
        }
    }
}
