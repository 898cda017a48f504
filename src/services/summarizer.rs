//! Document summarization
//!
//! Summaries come from the language model when one is available, and from a
//! frequency-based extractive summarizer otherwise or when generation fails.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::services::llm::{GenerateRequest, GenerationOptions, LanguageModel};
use crate::services::relevance::{normalize_token, term_frequencies};
use crate::services::text::{char_prefix, limit_words, split_sentences};

/// Engine name reported for summaries built without a model
pub const EXTRACTIVE_SOURCE: &str = "extractive";

/// A document summary and the engine that produced it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub text: String,
    pub source: String,
}

/// Summarization limits
#[derive(Debug, Clone, Copy)]
pub struct SummaryLimits {
    /// Leading characters of the document considered
    pub input_chars: usize,
    /// Upper bound on summary length in words
    pub max_words: usize,
}

fn summary_prompt(text: &str, max_words: usize) -> String {
    format!(
        "Summarize the following document in at most {max_words} words. \
         Cover the main topic and the key points. Reply with the summary only.\n\n\
         Document:\n{text}\n\nSummary:"
    )
}

/// Summarize `text`, preferring the model and falling back to extraction
pub async fn summarize(
    llm: Option<&dyn LanguageModel>,
    text: &str,
    limits: SummaryLimits,
) -> Summary {
    let input = char_prefix(text, limits.input_chars);

    if let Some(model) = llm {
        let request = GenerateRequest::new(summary_prompt(input, limits.max_words)).with_options(
            GenerationOptions::new()
                .temperature(0.2)
                .num_predict((limits.max_words * 2) as i32),
        );

        match model.generate(request).await {
            Ok(generation) => {
                let cleaned = generation
                    .text
                    .trim()
                    .trim_start_matches("Summary:")
                    .trim()
                    .to_string();
                if !cleaned.is_empty() {
                    info!(
                        model = %generation.model,
                        tokens = ?generation.eval_count,
                        "Generated summary"
                    );
                    return Summary {
                        text: limit_words(&cleaned, limits.max_words),
                        source: model.model_name().to_string(),
                    };
                }
                warn!(model = %model.model_name(), "Model returned an empty summary, using extractive summary");
            }
            Err(e) => {
                warn!(error = %e, "Summary generation failed, using extractive summary");
            }
        }
    }

    Summary {
        text: extractive_summary(input, limits.max_words),
        source: EXTRACTIVE_SOURCE.to_string(),
    }
}

/// Pick the highest-scoring sentences that fit in `max_words`, in document order.
///
/// A sentence scores the sum of its content words' normalized frequencies
/// divided by its length in words.
pub fn extractive_summary(text: &str, max_words: usize) -> String {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return limit_words(text, max_words);
    }

    let frequencies = term_frequencies(text);
    let max_frequency = frequencies.values().copied().max().unwrap_or(1) as f64;

    let mut ranked: Vec<(usize, f64, usize)> = sentences
        .iter()
        .enumerate()
        .map(|(idx, sentence)| {
            let words: Vec<&str> = sentence.split_whitespace().collect();
            let total: f64 = words
                .iter()
                .filter_map(|w| frequencies.get(&normalize_token(w)))
                .map(|&f| f as f64 / max_frequency)
                .sum();
            (idx, total / words.len().max(1) as f64, words.len())
        })
        .collect();

    // Stable sort keeps earlier sentences first on equal scores
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut chosen = Vec::new();
    let mut used_words = 0;
    for &(idx, _, words) in &ranked {
        if used_words + words <= max_words {
            chosen.push(idx);
            used_words += words;
        }
    }

    if chosen.is_empty() {
        return limit_words(sentences[ranked[0].0], max_words);
    }

    chosen.sort_unstable();
    chosen
        .into_iter()
        .map(|idx| sentences[idx])
        .collect::<Vec<_>>()
        .join(" ")
}
