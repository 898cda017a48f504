//! Question answering over a document
//!
//! Two engines share one result type: a generative engine that hands the
//! document to the language model, and an extractive engine that returns
//! the best-matching sentence of the best-matching chunk.

use tracing::{debug, warn};

use crate::config::QaConfig;
use crate::models::Answer;
use crate::services::llm::{GenerateRequest, GenerationOptions, LanguageModel};
use crate::services::ollama::clean_answer;
use crate::services::relevance::{best_chunk, best_sentence};
use crate::services::text::{char_prefix, chunk_words, mark_answer, preview};

pub const NO_DOCUMENT: &str = "No document text provided.";
pub const NO_ANSWER: &str = "I couldn't find a clear answer in the document.";
pub const EMPTY_MODEL_ANSWER: &str =
    "I couldn't generate a response. The model returned an empty answer.";
pub const NO_CONTEXT: &str = "No specific context found.";

/// Model name reported by the extractive engine
pub const EXTRACTIVE_MODEL: &str = "extractive";

/// Characters of a generated answer used as its highlight
const GENERATED_HIGHLIGHT_CHARS: usize = 200;

fn qa_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a helpful AI assistant. Answer the following question based on the provided context.\n\n\
         Context:\n{context}\n\n\
         Question: {question}\n\n\
         Provide a detailed and accurate answer. If the context doesn't contain enough information, say so.\n\
         Answer: "
    )
}

const QA_SYSTEM_PROMPT: &str = "You are a helpful AI assistant that provides accurate, detailed answers \
based on the given context. Answer using only the information from the provided context, be precise \
and include relevant details. If the context doesn't contain enough information, say so. Format your \
response in clear, readable markdown.";

/// Answer used when the document has no text
pub fn empty_document_answer(model: &str) -> Answer {
    Answer {
        answer: NO_DOCUMENT.to_string(),
        confidence: 0.0,
        context: String::new(),
        highlight: String::new(),
        full_context: String::new(),
        is_comprehensive: false,
        model: model.to_string(),
    }
}

/// Answer `question` with the language model, using the whole document as context.
///
/// Backend failures are reported in the answer text with zero confidence
/// rather than as an error, so the conversation can continue.
pub async fn generative_answer(
    model: &dyn LanguageModel,
    document: &str,
    question: &str,
    config: &QaConfig,
) -> Answer {
    let request = GenerateRequest::new(qa_prompt(document, question))
        .with_system(QA_SYSTEM_PROMPT)
        .with_options(
            GenerationOptions::new()
                .temperature(0.2)
                .top_p(0.9)
                .num_ctx(4096),
        );

    match model.generate(request).await {
        Ok(generation) => {
            debug!(
                model = %generation.model,
                tokens = ?generation.eval_count,
                "Generated answer"
            );
            let mut answer = clean_answer(&generation.text);
            let confidence = if answer.is_empty() {
                answer = EMPTY_MODEL_ANSWER.to_string();
                0.0
            } else {
                90.0
            };

            Answer {
                highlight: char_prefix(&answer, GENERATED_HIGHLIGHT_CHARS).to_string(),
                answer,
                confidence,
                context: preview(document, config.context_preview_chars),
                full_context: char_prefix(document, config.context_preview_chars).to_string(),
                is_comprehensive: true,
                model: model.model_name().to_string(),
            }
        }
        Err(e) => {
            warn!(error = %e, "Question answering request failed");
            Answer {
                answer: format!(
                    "Error getting response from Ollama: {}\n\nMake sure Ollama is running and the model is downloaded.",
                    e
                ),
                confidence: 0.0,
                context: String::new(),
                highlight: String::new(),
                full_context: String::new(),
                is_comprehensive: false,
                model: model.model_name().to_string(),
            }
        }
    }
}

/// Answer `question` by picking the document sentence that shares the most
/// keywords with it
pub fn extractive_answer(document: &str, question: &str, config: &QaConfig) -> Answer {
    let chunks = chunk_words(document, config.chunk_size, config.chunk_overlap);

    let found = best_chunk(&chunks, question).and_then(|(chunk, _)| {
        best_sentence(&chunk.text, question).map(|(sentence, score)| (chunk, sentence, score))
    });

    match found {
        Some((chunk, sentence, score)) => {
            debug!(
                chunk_start = chunk.start,
                score = score,
                "Extractive answer found"
            );
            Answer {
                answer: sentence.to_string(),
                confidence: (score * 1000.0).round() / 10.0,
                context: mark_answer(&chunk.text, sentence),
                highlight: sentence.to_string(),
                full_context: chunk.text.clone(),
                is_comprehensive: false,
                model: EXTRACTIVE_MODEL.to_string(),
            }
        }
        None => Answer {
            answer: NO_ANSWER.to_string(),
            confidence: 0.0,
            context: NO_CONTEXT.to_string(),
            highlight: String::new(),
            full_context: char_prefix(document, config.context_preview_chars).to_string(),
            is_comprehensive: false,
            model: EXTRACTIVE_MODEL.to_string(),
        },
    }
}

/// Answer a question with the model when available, else extractively
pub async fn answer_question(
    llm: Option<&dyn LanguageModel>,
    document: &str,
    question: &str,
    config: &QaConfig,
) -> Answer {
    if document.trim().is_empty() {
        let model = llm.map(|m| m.model_name()).unwrap_or(EXTRACTIVE_MODEL);
        return empty_document_answer(model);
    }

    match llm {
        Some(model) => generative_answer(model, document, question, config).await,
        None => extractive_answer(document, question, config),
    }
}
