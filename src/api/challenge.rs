//! "Challenge me" endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::documents::load_session;
use crate::{
    models::ChallengeRound,
    utils::{AppError, AppResult},
    AppState,
};

pub const INCOMPLETE_ANSWERS: &str = "Please answer all questions before submitting.";

/// Create routes for challenge mode endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}/challenge",
            post(generate_challenge).get(get_challenge),
        )
        .route(
            "/{id}/challenge/answers",
            post(submit_answers).delete(reset_answers),
        )
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswersRequest {
    /// One answer per question, in question order
    pub answers: Vec<String>,
}

fn document_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Document {} not found", id))
}

fn no_challenge(id: Uuid) -> AppError {
    AppError::NotFound(format!("No challenge has been generated for document {}", id))
}

/// Generate a new round of questions, replacing any previous round
async fn generate_challenge(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<ChallengeRound>)> {
    let session = load_session(&state, id).await?;
    let questions = state
        .assistant
        .generate_challenge(&session.document.text)
        .await;

    info!(
        document_id = %id,
        questions = questions.len(),
        "Challenge generated"
    );

    let round = ChallengeRound::new(questions);
    let stored = round.clone();
    state
        .sessions
        .update(&id, move |session| session.challenge = Some(stored))
        .await
        .ok_or_else(|| document_not_found(id))?;

    Ok((StatusCode::CREATED, Json(round)))
}

/// Current questions with any submitted answers and evaluations
async fn get_challenge(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ChallengeRound>> {
    let session = load_session(&state, id).await?;
    session.challenge.map(Json).ok_or_else(|| no_challenge(id))
}

/// Submit answers for every question of the current round
async fn submit_answers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitAnswersRequest>,
) -> AppResult<Json<ChallengeRound>> {
    let assistant = state.assistant.clone();

    let result = state
        .sessions
        .update(&id, move |session| {
            let document = session.document.text.clone();
            let round = session.challenge.as_mut().ok_or_else(|| no_challenge(id))?;

            if round.is_submitted() {
                return Err(AppError::Conflict(
                    "Answers were already submitted; reset them to try again".to_string(),
                ));
            }

            let complete = payload.answers.len() == round.questions.len()
                && payload.answers.iter().all(|a| !a.trim().is_empty());
            if !complete {
                return Err(AppError::BadRequest(INCOMPLETE_ANSWERS.to_string()));
            }

            round.evaluations = assistant.evaluate_all(&round.questions, &payload.answers, &document);
            round.answers = payload.answers;
            Ok(round.clone())
        })
        .await
        .ok_or_else(|| document_not_found(id))??;

    info!(
        document_id = %id,
        correct = result.evaluations.iter().filter(|e| e.is_correct).count(),
        total = result.evaluations.len(),
        "Challenge answers evaluated"
    );

    Ok(Json(result))
}

/// Clear submitted answers so the round can be retried
async fn reset_answers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state
        .sessions
        .update(&id, |session| {
            session
                .challenge
                .as_mut()
                .map(ChallengeRound::reset_answers)
                .ok_or_else(|| no_challenge(id))
        })
        .await
        .ok_or_else(|| document_not_found(id))??;

    Ok(StatusCode::NO_CONTENT)
}
