//! Document upload and lookup endpoints

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    models::{Document, DocumentInfo, DocumentKind},
    services::{extract_text, DocumentSession, ExtractionError},
    utils::{validation::validate_document_name, AppError, AppResult},
    AppState,
};

/// Multipart field holding the uploaded file
const FILE_FIELD: &str = "file";

/// Create routes for document endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(upload_document))
        .route("/text", post(create_text_document))
        .route("/{id}", get(get_document).delete(delete_document))
}

/// Plain text submitted without a file upload
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTextDocumentRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1))]
    pub text: String,
}

/// Fetch a live session or fail with 404
pub(crate) async fn load_session(state: &AppState, id: Uuid) -> AppResult<DocumentSession> {
    state
        .sessions
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Document {} not found", id)))
}

/// Summarize a document and store it as a new session
async fn create_session(
    state: &AppState,
    name: String,
    kind: DocumentKind,
    text: String,
) -> (StatusCode, Json<DocumentInfo>) {
    let summary = state.assistant.summarize(&text).await;
    let document = Document::new(name, kind, text);

    info!(
        document_id = %document.id,
        name = %document.name,
        words = document.word_count(),
        summary_source = %summary.source,
        "Document processed"
    );

    let session = DocumentSession::new(document, summary.text, summary.source);
    let info = session.info();
    state.sessions.insert(session).await;

    (StatusCode::CREATED, Json(info))
}

/// Upload a PDF or text file
async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DocumentInfo>)> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest("Uploaded file has no file name".to_string()))?;

        if !validate_document_name(&file_name) {
            return Err(AppError::ValidationError(format!(
                "Invalid file name: {}",
                file_name
            )));
        }

        let bytes = field.bytes().await?;
        if bytes.len() > state.config.documents.max_upload_bytes {
            return Err(AppError::ValidationError(format!(
                "File exceeds the {} byte upload limit",
                state.config.documents.max_upload_bytes
            )));
        }

        let name = file_name.clone();
        let extracted = tokio::task::spawn_blocking(move || extract_text(&name, &bytes))
            .await
            .map_err(|e| AppError::Internal(format!("Text extraction task failed: {}", e)))??;

        return Ok(create_session(&state, file_name, extracted.kind, extracted.text).await);
    }

    Err(AppError::BadRequest(format!(
        "Missing '{}' field in upload",
        FILE_FIELD
    )))
}

/// Create a document from pasted text
async fn create_text_document(
    State(state): State<AppState>,
    Json(payload): Json<CreateTextDocumentRequest>,
) -> AppResult<(StatusCode, Json<DocumentInfo>)> {
    payload.validate()?;

    if !validate_document_name(&payload.name) {
        return Err(AppError::ValidationError(format!(
            "Invalid document name: {}",
            payload.name
        )));
    }
    if payload.text.trim().is_empty() {
        return Err(ExtractionError::Empty.into());
    }

    Ok(create_session(&state, payload.name, DocumentKind::Text, payload.text).await)
}

/// Document overview with its summary
async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DocumentInfo>> {
    let session = load_session(&state, id).await?;
    Ok(Json(session.info()))
}

/// Drop a document and everything attached to it
async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    match state.sessions.remove(&id).await {
        Some(_) => {
            info!(document_id = %id, "Document deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(AppError::NotFound(format!("Document {} not found", id))),
    }
}
