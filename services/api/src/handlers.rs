//! Axum Handlers for the REST API
//!
//! This module contains the logic for handling HTTP requests for the
//! rehearsal session lifecycle: document upload, turn exchange, transcript
//! grading, and recording storage. It uses `utoipa` doc comments to
//! generate OpenAPI documentation.

use axum::{
    body::Bytes,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use prepy_core::session::{Difficulty, Mode};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    extract::{self, FileKind},
    models::{
        ChatRequest, ChatResponse, ErrorResponse, EvaluateRequest, EvaluateResponse,
        HealthResponse, SaveRecordingForm, SaveRecordingResponse, UploadForm, UploadResponse,
    },
    state::AppState,
};

pub enum ApiError {
    BadRequest(String),
    BadGateway(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
            ApiError::BadGateway(message) => {
                (StatusCode::BAD_GATEWAY, Json(ErrorResponse { message })).into_response()
            }
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                let message = "An internal server error occurred.".to_string();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { message }),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::InternalServerError(err.into())
    }
}

fn bad_multipart(err: MultipartError) -> ApiError {
    ApiError::BadRequest(format!("Invalid multipart payload: {err}"))
}

/// Upload a background document and open a rehearsal session.
#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Session opened with a welcome message", body = UploadResponse),
        (status = 400, description = "Missing, unnamed, or unsupported file", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut session_type = String::new();
    let mut difficulty = String::new();
    let mut job_role: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                file = Some((filename, bytes));
            }
            Some("type") => session_type = field.text().await.map_err(bad_multipart)?,
            Some("mode") => difficulty = field.text().await.map_err(bad_multipart)?,
            Some("role") => {
                let value = field.text().await.map_err(bad_multipart)?;
                if !value.trim().is_empty() {
                    job_role = Some(value.trim().to_string());
                }
            }
            _ => {}
        }
    }

    let (filename, bytes) =
        file.ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;
    if filename.is_empty() {
        return Err(ApiError::BadRequest("No file selected".to_string()));
    }
    let kind = FileKind::from_name(&filename)
        .ok_or_else(|| ApiError::BadRequest("Invalid file type".to_string()))?;

    let text = extract::extract_text(&bytes, kind);
    info!(
        file = %filename,
        kind = ?kind,
        extracted_bytes = text.len(),
        "upload processed"
    );

    let start = state.orchestrator.start_session(
        Mode::parse(&session_type),
        Difficulty::parse(&difficulty),
        job_role,
        Some(text.clone()),
    );

    Ok(Json(UploadResponse {
        success: true,
        message: start.welcome,
        extracted_text: extract::preview(&text),
        session: start.config,
        transcript: start.transcript,
    }))
}

/// Post one candidate turn and receive the evaluator's reply.
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Evaluator reply appended to the transcript", body = ChatResponse),
        (status = 400, description = "Empty message", body = ErrorResponse),
        (status = 502, description = "Generative backend unavailable", body = ErrorResponse)
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(ApiError::BadRequest("No message provided".to_string()));
    }

    let outcome = state
        .orchestrator
        .post_turn(
            &payload.session,
            &payload.transcript,
            &payload.message,
            payload.is_final_turn,
        )
        .await
        .map_err(|err| ApiError::BadGateway(err.to_string()))?;

    Ok(Json(ChatResponse {
        success: true,
        message: outcome.evaluator_text,
        transcript: outcome.transcript,
        session_over: outcome.terminated,
    }))
}

/// Grade a finished transcript and route the outcome call.
///
/// Grading never fails outward: if the backend call or payload parsing
/// goes wrong, the response carries the zero-score fallback report with
/// `analysis_succeeded: false`.
#[utoipa::path(
    post,
    path = "/api/evaluate",
    request_body = EvaluateRequest,
    responses(
        (status = 200, description = "Score report, possibly the zero-score fallback", body = EvaluateResponse)
    )
)]
pub async fn evaluate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EvaluateRequest>,
) -> Json<EvaluateResponse> {
    let evaluation = state
        .evaluation
        .evaluate(
            &payload.transcript,
            payload.mode,
            payload.job_role.as_deref(),
            payload.candidate_name.as_deref(),
        )
        .await;

    Json(EvaluateResponse::from(evaluation))
}

/// Save a session recording to local disk.
#[utoipa::path(
    post,
    path = "/api/save-recording",
    request_body(content = SaveRecordingForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Recording stored", body = SaveRecordingResponse),
        (status = 400, description = "Missing recording field", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn save_recording(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<SaveRecordingResponse>, ApiError> {
    let mut recording: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        if field.name() == Some("recording") {
            let filename = field
                .file_name()
                .filter(|name| !name.is_empty())
                .unwrap_or("recording.webm")
                .to_string();
            let bytes = field.bytes().await.map_err(bad_multipart)?;
            recording = Some((filename, bytes));
        }
    }

    let (filename, bytes) =
        recording.ok_or_else(|| ApiError::BadRequest("No recording provided".to_string()))?;

    let stored_name = store_recording(&state.config.recordings_dir, &filename, &bytes).await?;
    info!(filename = %stored_name, bytes = bytes.len(), "recording saved");

    Ok(Json(SaveRecordingResponse {
        success: true,
        message: "Recording saved successfully".to_string(),
        filename: stored_name,
    }))
}

/// Health check.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "Backend is running".to_string(),
    })
}

/// Writes the recording under `dir` and returns the stored filename.
///
/// The client-supplied name is sanitized and prefixed with a UUID so
/// that two uploads can never collide.
async fn store_recording(dir: &Path, client_name: &str, bytes: &[u8]) -> anyhow::Result<String> {
    tokio::fs::create_dir_all(dir).await?;
    let stored_name = format!("{}_{}", Uuid::new_v4(), sanitize_filename(client_name));
    tokio::fs::write(dir.join(&stored_name), bytes).await?;
    Ok(stored_name)
}

/// Reduces a client-supplied filename to a single safe path component.
/// Anything outside `[A-Za-z0-9._-]` becomes `_`, so separators cannot
/// survive into the joined path.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches(|c| matches!(c, '.' | '_')).is_empty() {
        "recording.webm".to_string()
    } else {
        cleaned
    }
}
