//! API Models
//!
//! Request and response bodies for the rehearsal endpoints. These double as
//! the OpenAPI schema source via `utoipa`; embedded core types are exposed
//! as plain objects instead of re-deriving schemas inside the core crate.

use prepy_core::evaluation::Evaluation;
use prepy_core::outcome::OutcomeStatus;
use prepy_core::report::{Feedback, Scores};
use prepy_core::session::{Mode, SessionConfig, Transcript};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Multipart form for `/api/upload`. Schema documentation only; the
/// handler reads the fields straight from the multipart stream.
#[derive(Deserialize, ToSchema, Debug)]
pub struct UploadForm {
    /// Background document (`.pdf`, `.ppt`, or `.pptx`).
    #[schema(value_type = String, format = Binary)]
    pub file: String,
    /// Session type, `interview` (default) or `hackathon`.
    #[serde(rename = "type")]
    #[schema(example = "interview")]
    pub session_type: String,
    /// Difficulty: `easy`/`moderate`/`hard`, or the picker aliases
    /// `superman`/`batman`/`hulk`. Defaults to `hard`.
    #[schema(example = "hard")]
    pub mode: String,
    /// Target role for interview sessions.
    pub role: Option<String>,
}

/// Response to a successful document upload: the opened session, ready for
/// the client to round-trip on every subsequent call.
#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct UploadResponse {
    pub success: bool,
    /// The welcome message, which is also the first transcript turn.
    #[schema(example = "Welcome to PREPY AI Interview. Give an Introduction about yourself.")]
    pub message: String,
    /// Preview of the extracted document text, truncated to 500 characters.
    pub extracted_text: String,
    #[schema(value_type = Object)]
    pub session: SessionConfig,
    #[schema(value_type = Object)]
    pub transcript: Transcript,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct ChatRequest {
    #[schema(value_type = Object)]
    pub session: SessionConfig,
    #[schema(value_type = Object)]
    pub transcript: Transcript,
    #[schema(example = "I rebuilt our ingest pipeline around a write-ahead log.")]
    pub message: String,
    /// Marks the candidate's last turn; the reply is the fixed closing
    /// message and the session is over.
    #[serde(default)]
    pub is_final_turn: bool,
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct ChatResponse {
    pub success: bool,
    /// The evaluator's next question, or the closing message.
    pub message: String,
    #[schema(value_type = Object)]
    pub transcript: Transcript,
    pub session_over: bool,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct EvaluateRequest {
    #[schema(value_type = Object)]
    pub transcript: Transcript,
    #[serde(default)]
    #[schema(value_type = String, example = "interview")]
    pub mode: Mode,
    pub job_role: Option<String>,
    pub candidate_name: Option<String>,
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct EvaluateResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub scores: Scores,
    #[schema(value_type = Object)]
    pub feedback: Feedback,
    /// False when grading failed and the zeroed fallback report was
    /// substituted.
    pub analysis_succeeded: bool,
    #[schema(value_type = Object)]
    pub outcome: OutcomeStatus,
}

impl From<Evaluation> for EvaluateResponse {
    fn from(evaluation: Evaluation) -> Self {
        Self {
            success: true,
            scores: evaluation.report.scores,
            feedback: evaluation.report.feedback,
            analysis_succeeded: evaluation.analysis_succeeded,
            outcome: evaluation.outcome,
        }
    }
}

/// Multipart form for `/api/save-recording`. Schema documentation only.
#[derive(ToSchema, Debug)]
pub struct SaveRecordingForm {
    /// Recorded session media, stored as received.
    #[schema(value_type = String, format = Binary)]
    pub recording: String,
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct SaveRecordingResponse {
    pub success: bool,
    pub message: String,
    /// Stored filename, prefixed with a fresh UUID to avoid collisions.
    pub filename: String,
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use prepy_core::report::ScoreReport;
    use prepy_core::session::{Difficulty, Turn};
    use serde_json::json;

    fn sample_session() -> SessionConfig {
        SessionConfig {
            mode: Mode::Interview,
            difficulty: Difficulty::Hard,
            job_role: Some("Backend Engineer".to_string()),
            background_context: None,
            system_instruction: "You are an AI Interview Evaluator.".to_string(),
        }
    }

    fn sample_transcript() -> Transcript {
        let mut transcript = Transcript::new();
        transcript.push(Turn::evaluator("Welcome."));
        transcript.push(Turn::candidate("Hello."));
        transcript
    }

    #[test]
    fn test_chat_request_deserialization() {
        let body = json!({
            "session": sample_session(),
            "transcript": sample_transcript(),
            "message": "I led the migration.",
            "is_final_turn": true
        });

        let request: ChatRequest = serde_json::from_value(body).unwrap();
        assert_eq!(request.message, "I led the migration.");
        assert!(request.is_final_turn);
        assert_eq!(request.transcript.len(), 2);
        assert_eq!(request.session.mode, Mode::Interview);
    }

    #[test]
    fn test_chat_request_final_turn_defaults_to_false() {
        let body = json!({
            "session": sample_session(),
            "transcript": sample_transcript(),
            "message": "An answer."
        });

        let request: ChatRequest = serde_json::from_value(body).unwrap();
        assert!(!request.is_final_turn);
    }

    #[test]
    fn test_chat_request_missing_message_fails() {
        let body = json!({
            "session": sample_session(),
            "transcript": sample_transcript()
        });

        let result: Result<ChatRequest, _> = serde_json::from_value(body);
        assert!(result.is_err());
    }

    #[test]
    fn test_chat_response_serialization() {
        let response = ChatResponse {
            success: true,
            message: "What did you migrate first?".to_string(),
            transcript: sample_transcript(),
            session_over: false,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], json!(true));
        assert_eq!(json["message"], json!("What did you migrate first?"));
        assert_eq!(json["session_over"], json!(false));
        assert!(json["transcript"].is_array());
    }

    #[test]
    fn test_upload_response_serialization() {
        let response = UploadResponse {
            success: true,
            message: "Welcome to PREPY AI Interview. Give an Introduction about yourself."
                .to_string(),
            extracted_text: "Resume preview".to_string(),
            session: sample_session(),
            transcript: sample_transcript(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], json!(true));
        assert!(json["message"].as_str().unwrap().starts_with("Welcome to PREPY"));
        assert_eq!(json["extracted_text"], json!("Resume preview"));
        assert_eq!(json["session"]["mode"], json!("interview"));
    }

    #[test]
    fn test_evaluate_request_mode_defaults_to_interview() {
        let body = json!({ "transcript": sample_transcript() });

        let request: EvaluateRequest = serde_json::from_value(body).unwrap();
        assert_eq!(request.mode, Mode::Interview);
        assert_eq!(request.job_role, None);
        assert_eq!(request.candidate_name, None);
    }

    #[test]
    fn test_evaluate_request_full_body() {
        let body = json!({
            "transcript": sample_transcript(),
            "mode": "hackathon",
            "job_role": "Data Scientist",
            "candidate_name": "Jane"
        });

        let request: EvaluateRequest = serde_json::from_value(body).unwrap();
        assert_eq!(request.mode, Mode::Hackathon);
        assert_eq!(request.job_role.as_deref(), Some("Data Scientist"));
        assert_eq!(request.candidate_name.as_deref(), Some("Jane"));
    }

    #[test]
    fn test_evaluate_response_from_evaluation() {
        let evaluation = Evaluation {
            report: ScoreReport::fallback(),
            analysis_succeeded: false,
            outcome: OutcomeStatus::Skipped {
                reason: "score 0 is below the congratulation threshold of 80".to_string(),
            },
        };

        let response = EvaluateResponse::from(evaluation);
        assert!(response.success);
        assert!(!response.analysis_succeeded);
        assert_eq!(response.scores.overall, 0);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["scores"]["overall"], json!(0));
        assert_eq!(json["outcome"]["status"], json!("skipped"));
    }

    #[test]
    fn test_health_response_serialization() {
        let health = HealthResponse {
            status: "healthy".to_string(),
            message: "Backend is running".to_string(),
        };

        let json = serde_json::to_string(&health).unwrap();
        assert_eq!(json, r#"{"status":"healthy","message":"Backend is running"}"#);
    }

    #[test]
    fn test_error_response_serialization() {
        let error = ErrorResponse {
            message: "No file provided".to_string(),
        };

        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(json, r#"{"message":"No file provided"}"#);
    }
}
