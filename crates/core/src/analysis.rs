//! Transcript Analyzer
//!
//! Turns a completed transcript into a [`ScoreReport`] with a single
//! grading call. The transcript is first rebuilt as plain labeled text:
//! evaluator turns become "Interviewer:" lines, candidate turns run through
//! the context splitter so injected document text is pulled aside and shown
//! to the grader as reference material only. The backend's reply is parsed
//! strictly; anything short of a complete, bounded report is an error the
//! caller converts into the fixed fallback.

use crate::backend::{GenerativeBackend, SamplingOptions};
use crate::context;
use crate::report::ScoreReport;
use crate::session::{Speaker, Transcript};
use std::sync::Arc;
use tracing::{instrument, warn};

/// Failures of a grading pass. Both variants mean "no report"; the caller
/// substitutes [`ScoreReport::fallback`] and flags the analysis as failed.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("grading call failed: {0}")]
    Backend(#[from] crate::backend::BackendError),

    #[error("grading payload malformed: {0}")]
    Malformed(String),
}

/// Grades a finished session against the strict-evaluator rubric.
pub struct TranscriptAnalyzer {
    backend: Arc<dyn GenerativeBackend>,
}

impl TranscriptAnalyzer {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self { backend }
    }

    /// Runs the single grading call and parses the returned payload.
    #[instrument(name = "grading", skip_all, fields(turns = transcript.len()))]
    pub async fn analyze(
        &self,
        transcript: &Transcript,
        job_role: Option<&str>,
    ) -> Result<ScoreReport, AnalysisError> {
        let instruction = grading_instruction(transcript, job_role);

        // The entire graded material rides in the instruction; no
        // per-turn messages are sent.
        let raw = self
            .backend
            .generate(&instruction, &[], SamplingOptions::grading())
            .await?;

        parse_report(&raw).inspect_err(|e| {
            warn!(error = %e, raw_len = raw.len(), "grading payload rejected");
        })
    }
}

/// Builds the grading instruction from the transcript.
///
/// Background context is captured from the first candidate turn that
/// carries one; later backgrounds are discarded. The conversation section
/// holds only the plain replies, so uploaded material never counts as
/// something the candidate said.
fn grading_instruction(transcript: &Transcript, job_role: Option<&str>) -> String {
    let mut background = String::new();
    let mut conversation = String::new();

    for turn in transcript {
        match turn.speaker {
            Speaker::Evaluator => {
                conversation.push_str(&format!("Interviewer: {}\n", turn.text));
            }
            Speaker::Candidate => {
                let split = context::split(&turn.text);
                if background.is_empty() {
                    if let Some(captured) = split.background {
                        background = captured;
                    }
                }
                conversation.push_str(&format!("Candidate: {}\n", split.response));
            }
        }
    }

    let last_line = conversation
        .trim()
        .lines()
        .last()
        .unwrap_or("nothing")
        .to_string();

    let role_line = match job_role {
        Some(role) if !role.trim().is_empty() => format!("\nTARGET ROLE: {}\n", role.trim()),
        _ => String::new(),
    };

    format!(
        r#"You are a STRICT Interview Evaluator. You are NOT helpful. You are NOT polite. You are a critical grader.
{role_line}
CONTEXT (RESUME/PROJECTS) - FOR REFERENCE ONLY:
{background}

ACTUAL INTERVIEW TRANSCRIPT (EVALUATE THIS ONLY):
{conversation}

SCORING RULES (READ CAREFULLY):
1. **IGNORE THE RESUME FOR SCORING.** A good resume with a bad interview = 0 SCORE.
2. **AUTOMATIC FAIL CONDITIONS (Score 0-20):**
   - If the candidate says "hi", "hello", "how are you" instead of answering the question.
   - If the candidate gives one-line or one-word answers.
   - If the candidate ignores the technical question asked by the AI.
   - If the candidate's total word count in the transcript is low.

3. **SCORING SCALE:**
   - 0-30: Irrelevant, rude, or very short answers. (e.g., "I don't know", "hi", "good")
   - 31-50: Vague attempts, poor English, or dodging the question.
   - 51-70: Decent answer but lacks depth.
   - 71-100: Detailed, technical, and professional answer.

4. **MANDATORY:** If the transcript shows the candidate just said "{last_line}" or similar short text, the OVERALL SCORE MUST BE UNDER 20.

Evaluate the candidate on:
1. English Communication
2. Technical Skills
3. Communication Skills
4. Team Collaboration
5. Soft Skills
6. Project Quality

Return ONLY JSON:
{{
    "scores": {{
        "english": 0,
        "technical": 0,
        "communication": 0,
        "teamwork": 0,
        "soft_skills": 0,
        "project": 0,
        "overall": 0
    }},
    "feedback": {{
        "strengths": "None observed.",
        "improvements": "Candidate failed to answer questions.",
        "english_assessment": "Insufficient data.",
        "recommendations": "Please take the interview seriously and answer the questions."
    }}
}}"#
    )
}

/// Parses a grading payload, tolerating surrounding code fences.
fn parse_report(raw: &str) -> Result<ScoreReport, AnalysisError> {
    let stripped = strip_code_fences(raw);

    let report: ScoreReport = serde_json::from_str(stripped.trim())
        .map_err(|e| AnalysisError::Malformed(format!("invalid JSON: {e}")))?;

    if let Some((field, value)) = report.scores.first_out_of_range() {
        return Err(AnalysisError::Malformed(format!(
            "score '{field}' out of range: {value}"
        )));
    }

    Ok(report)
}

/// Models often wrap JSON in ```json fences; unwrap them when present.
fn strip_code_fences(text: &str) -> &str {
    if let Some(start) = text.find("```json") {
        let after = &text[start + "```json".len()..];
        match after.find("```") {
            Some(end) => &after[..end],
            None => after,
        }
    } else if let Some(start) = text.find("```") {
        let after = &text[start + 3..];
        match after.find("```") {
            Some(end) => &after[..end],
            None => after,
        }
    } else {
        text
    }
}
