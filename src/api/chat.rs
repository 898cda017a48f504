//! "Ask anything" endpoints

use std::{convert::Infallible, time::Duration};

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::documents::load_session;
use crate::{
    models::{Answer, ChatMessage, ConfidenceLevel},
    utils::{AppError, AppResult},
    AppState,
};

/// Create routes for question answering endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{id}/ask", post(ask))
        .route("/{id}/ask/stream", post(ask_stream))
        .route("/{id}/messages", get(list_messages))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AskRequest {
    #[validate(length(min = 1, max = 2000))]
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    #[serde(flatten)]
    pub answer: Answer,
    pub confidence_level: ConfidenceLevel,
}

impl From<Answer> for AskResponse {
    fn from(answer: Answer) -> Self {
        let confidence_level = answer.confidence_level();
        Self {
            answer,
            confidence_level,
        }
    }
}

/// Answer a question and record the exchange in the chat history
async fn answer_and_record(state: &AppState, id: Uuid, payload: AskRequest) -> AppResult<Answer> {
    payload.validate()?;
    let question = payload.question.trim().to_string();
    if question.is_empty() {
        return Err(AppError::ValidationError(
            "question: must not be blank".to_string(),
        ));
    }

    let session = load_session(state, id).await?;
    let answer = state.assistant.ask(&session.document.text, &question).await;

    let reply = answer.answer.clone();
    state
        .sessions
        .update(&id, move |session| {
            session.messages.push(ChatMessage::user(question));
            session.messages.push(ChatMessage::assistant(reply));
        })
        .await
        .ok_or_else(|| AppError::NotFound(format!("Document {} not found", id)))?;

    Ok(answer)
}

/// Ask a question about a document
async fn ask(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AskRequest>,
) -> AppResult<Json<AskResponse>> {
    let answer = answer_and_record(&state, id, payload).await?;
    Ok(Json(answer.into()))
}

/// Ask a question and stream the answer word by word.
///
/// Emits one `token` event per word followed by a single `answer` event
/// carrying the complete result.
async fn ask_stream(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AskRequest>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let answer = answer_and_record(&state, id, payload).await?;

    let tokens: Vec<Event> = answer
        .answer
        .split_whitespace()
        .map(|word| Event::default().event("token").data(format!("{} ", word)))
        .collect();

    let response = AskResponse::from(answer);
    let final_event = Event::default()
        .event("answer")
        .json_data(&response)
        .map_err(|e| AppError::Internal(format!("Failed to encode answer: {}", e)))?;

    let delay = Duration::from_millis(state.config.qa.stream_delay_ms);
    let token_stream = stream::iter(tokens);
    let token_stream: BoxStream<'static, Event> = if delay.is_zero() {
        token_stream.boxed()
    } else {
        tokio_stream::StreamExt::throttle(token_stream, delay).boxed()
    };

    let events = token_stream
        .chain(stream::once(async move { final_event }))
        .map(Ok::<_, Infallible>);

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Chat history of a document, oldest first
async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<ChatMessage>>> {
    let session = load_session(&state, id).await?;
    Ok(Json(session.messages))
}
