//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API and OpenAPI documentation.

use crate::{
    handlers,
    models::{
        ChatRequest, ChatResponse, ErrorResponse, EvaluateRequest, EvaluateResponse,
        HealthResponse, SaveRecordingForm, SaveRecordingResponse, UploadForm, UploadResponse,
    },
    state::AppState,
};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::upload,
        handlers::chat,
        handlers::evaluate,
        handlers::save_recording,
        handlers::health,
    ),
    components(
        schemas(UploadForm, UploadResponse, ChatRequest, ChatResponse, EvaluateRequest, EvaluateResponse, SaveRecordingForm, SaveRecordingResponse, HealthResponse, ErrorResponse)
    ),
    tags(
        (name = "PREPY API", description = "Interview and hackathon rehearsal sessions")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // The body limit covers the two multipart routes; JSON payloads stay
    // far below it.
    let max_upload_bytes = app_state.config.max_upload_bytes;

    // Group all routes that require AppState into their own router.
    let api_router = Router::new()
        .route("/api/upload", post(handlers::upload))
        .route("/api/chat", post(handlers::chat))
        .route("/api/evaluate", post(handlers::evaluate))
        .route("/api/save-recording", post(handlers::save_recording))
        .route("/api/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        // Apply the state ONLY to this group of routes.
        .with_state(app_state);

    // Create the final router that merges the stateful routes
    // with the stateless routes (like Swagger UI).
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
