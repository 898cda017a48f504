//! Language model listing

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{services::ModelInfo, utils::AppError, AppState};

#[derive(Serialize)]
pub struct ModelsResponse {
    pub backend: String,
    /// Model used for generation
    pub active_model: String,
    pub models: Vec<ModelInfo>,
}

/// List the models installed on the backend
pub async fn list_models(State(state): State<AppState>) -> Result<Json<ModelsResponse>, AppError> {
    let (Some(active), Some(result)) = (
        state.assistant.model_name(),
        state.assistant.list_models().await,
    ) else {
        return Err(AppError::ServiceUnavailable(
            "No language model backend is configured".to_string(),
        ));
    };

    let models = result?;

    Ok(Json(ModelsResponse {
        backend: state.assistant.backend().to_string(),
        active_model: active.to_string(),
        models,
    }))
}
