//! API routes and handlers
//!
//! This module defines all API endpoints and their routing.

use axum::{routing::get, Router};

use crate::AppState;

mod challenge;
mod chat;
mod documents;
mod health;
mod models;

pub use challenge::INCOMPLETE_ANSWERS;
pub use health::*;

/// Document routes: upload, question answering and challenge mode
fn document_routes() -> Router<AppState> {
    documents::routes()
        .merge(chat::routes())
        .merge(challenge::routes())
}

/// Create the full API router, mounted under `/api/v1`
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health check endpoints
        .route("/health", get(health::health_check))
        .route("/health/detailed", get(health::health_check_detailed))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        // Installed language models
        .route("/models", get(models::list_models))
        .nest("/documents", document_routes())
}
