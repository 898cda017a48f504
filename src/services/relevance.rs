//! Keyword relevance scoring
//!
//! Lightweight lexical scoring used by the extractive engines to locate the
//! part of a document that best matches a question.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

use super::text::{split_sentences, TextChunk};

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and",
        "any", "are", "as", "at", "be", "because", "been", "before", "being", "below",
        "between", "both", "but", "by", "can", "could", "did", "do", "does", "doing", "down",
        "during", "each", "few", "for", "from", "further", "had", "has", "have", "having", "he",
        "her", "here", "hers", "herself", "him", "himself", "his", "how", "i", "if", "in",
        "into", "is", "it", "its", "itself", "just", "me", "more", "most", "my", "myself", "no",
        "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other", "our", "ours",
        "ourselves", "out", "over", "own", "same", "she", "should", "so", "some", "such",
        "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there",
        "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
        "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom",
        "why", "will", "with", "would", "you", "your", "yours", "yourself", "yourselves",
        "tell", "explain", "describe", "document", "mentioned",
    ]
    .into_iter()
    .collect()
});

/// Lower-case a word and strip surrounding punctuation
pub fn normalize_token(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

fn is_keyword(token: &str) -> bool {
    token.chars().count() >= 3 && !STOP_WORDS.contains(token)
}

/// Distinct content words of `text`, in order of first appearance
pub fn keywords(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.split_whitespace()
        .map(normalize_token)
        .filter(|token| is_keyword(token))
        .filter(|token| seen.insert(token.clone()))
        .collect()
}

/// Occurrence counts of content words in `text`
pub fn term_frequencies(text: &str) -> HashMap<String, usize> {
    let mut frequencies = HashMap::new();
    for token in text.split_whitespace().map(normalize_token) {
        if is_keyword(&token) {
            *frequencies.entry(token).or_insert(0) += 1;
        }
    }
    frequencies
}

/// Fraction of `query` keywords that occur in `text` (0.0 for an empty query)
pub fn score_overlap(query: &[String], text: &str) -> f64 {
    if query.is_empty() {
        return 0.0;
    }

    let tokens: HashSet<String> = text.split_whitespace().map(normalize_token).collect();
    let hits = query.iter().filter(|keyword| tokens.contains(*keyword)).count();

    hits as f64 / query.len() as f64
}

/// Chunk with the highest keyword overlap with `question`. Ties go to the
/// earlier chunk.
pub fn best_chunk<'a>(chunks: &'a [TextChunk], question: &str) -> Option<(&'a TextChunk, f64)> {
    let query = keywords(question);
    let mut best: Option<(&TextChunk, f64)> = None;

    for chunk in chunks {
        let score = score_overlap(&query, &chunk.text);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((chunk, score)),
        }
    }

    best
}

/// Sentence of `text` with the highest keyword overlap with `question`.
/// Returns `None` when no sentence shares a keyword with the question.
pub fn best_sentence<'a>(text: &'a str, question: &str) -> Option<(&'a str, f64)> {
    let query = keywords(question);
    let mut best: Option<(&str, f64)> = None;

    for sentence in split_sentences(text) {
        let score = score_overlap(&query, sentence);
        if score <= 0.0 {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((sentence, score)),
        }
    }

    best
}
