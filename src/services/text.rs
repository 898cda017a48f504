//! Text utilities
//!
//! Chunking, excerpting and highlighting helpers. All offsets are measured in
//! characters (Unicode scalar values), never bytes, so documents in any
//! language can be sliced safely.

use serde::{Deserialize, Serialize};

/// A window of consecutive words from a document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextChunk {
    /// Words of the window joined by single spaces
    pub text: String,
    /// Character offset of the window in the space-normalized document
    pub start: usize,
    /// Character offset just past the window (including one trailing separator)
    pub end: usize,
}

/// Split text into overlapping word windows.
///
/// A new window starts every `chunk_size - overlap` words and holds up to
/// `chunk_size` words. Offsets count each word plus one separator, which
/// matches positions in the text after collapsing whitespace runs.
pub fn chunk_words(text: &str, chunk_size: usize, overlap: usize) -> Vec<TextChunk> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    let step = chunk_size.saturating_sub(overlap).max(1);

    let mut offsets = Vec::with_capacity(words.len() + 1);
    offsets.push(0usize);
    for word in &words {
        let last = offsets[offsets.len() - 1];
        offsets.push(last + word.chars().count() + 1);
    }

    (0..words.len())
        .step_by(step)
        .map(|i| {
            let end_idx = (i + chunk_size).min(words.len());
            TextChunk {
                text: words[i..end_idx].join(" "),
                start: offsets[i],
                end: offsets[end_idx],
            }
        })
        .collect()
}

/// Number of characters in `s`
pub fn char_count(s: &str) -> usize {
    s.chars().count()
}

/// Number of whitespace-separated words in `s`
pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

fn byte_offset(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(byte, _)| byte)
        .unwrap_or(s.len())
}

/// Characters `[start, end)` of `s`, clamped to its length
pub fn char_slice(s: &str, start: usize, end: usize) -> &str {
    if end <= start {
        return "";
    }
    let from = byte_offset(s, start);
    let to = byte_offset(s, end);
    &s[from..to]
}

/// The first `n` characters of `s`
pub fn char_prefix(s: &str, n: usize) -> &str {
    char_slice(s, 0, n)
}

/// The last `n` characters of `s`
pub fn char_suffix(s: &str, n: usize) -> &str {
    let len = char_count(s);
    char_slice(s, len.saturating_sub(n), len)
}

/// The first `n` characters of `s`, followed by `...` when anything was cut
pub fn preview(s: &str, n: usize) -> String {
    let prefix = char_prefix(s, n);
    if prefix.len() < s.len() {
        format!("{}...", prefix)
    } else {
        prefix.to_string()
    }
}

/// Keep at most `max_words` words. Text within the limit is returned trimmed
/// but otherwise untouched.
pub fn limit_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        text.trim().to_string()
    } else {
        words[..max_words].join(" ")
    }
}

/// Split text into sentences at `.`, `!` or `?` followed by whitespace
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = match chars.peek() {
                Some((_, next)) => next.is_whitespace(),
                None => true,
            };
            if at_boundary {
                let end = idx + c.len_utf8();
                let sentence = text[start..end].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                start = end;
            }
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }

    sentences
}

/// Excerpt of `text` around characters `[start, end)` with `window`
/// characters of surrounding context, marked with `...` where cut.
pub fn highlight_excerpt(text: &str, start: usize, end: usize, window: usize) -> String {
    let len = char_count(text);
    let from = start.saturating_sub(window);
    let to = end.saturating_add(window).min(len);

    let mut excerpt = char_slice(text, from, to).to_string();
    if from > 0 {
        excerpt.insert_str(0, "...");
    }
    if to < len {
        excerpt.push_str("...");
    }

    excerpt.trim().to_string()
}

/// Byte range of the first case-insensitive occurrence of `needle`
pub fn find_case_insensitive(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    let target: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    if target.is_empty() {
        return None;
    }

    'outer: for (start, _) in haystack.char_indices() {
        let mut matched = 0;
        for (offset, c) in haystack[start..].char_indices() {
            for lower in c.to_lowercase() {
                if matched < target.len() && lower == target[matched] {
                    matched += 1;
                } else {
                    continue 'outer;
                }
            }
            if matched == target.len() {
                return Some((start, start + offset + c.len_utf8()));
            }
        }
        // Haystack exhausted before the needle
        return None;
    }

    None
}

/// Escape text for inclusion in HTML
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escape `context` as HTML and wrap the first case-insensitive occurrence of
/// `answer` in a highlight span, preserving the context's casing.
pub fn mark_answer(context: &str, answer: &str) -> String {
    match find_case_insensitive(context, answer) {
        Some((start, end)) => format!(
            "{}<span class=\"highlight\">{}</span>{}",
            escape_html(&context[..start]),
            escape_html(&context[start..end]),
            escape_html(&context[end..])
        ),
        None => escape_html(context),
    }
}
