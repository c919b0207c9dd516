//! Evaluation service
//!
//! The post-session pipeline in one call: grade the transcript, substitute
//! the fixed fallback report when grading fails, route the outcome, and
//! hand any call to the dispatcher. The report always comes back; nothing
//! downstream of the analyzer can block or replace it.

use crate::analysis::TranscriptAnalyzer;
use crate::outcome::{self, OutcomeRouter, OutcomeStatus};
use crate::report::ScoreReport;
use crate::session::{Mode, Transcript};
use serde::Serialize;
use tracing::warn;

const DEFAULT_CANDIDATE_NAME: &str = "Candidate";

/// The full result of evaluating a finished session.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub report: ScoreReport,
    /// False when the report is the fallback rather than a real grading.
    pub analysis_succeeded: bool,
    pub outcome: OutcomeStatus,
}

pub struct EvaluationService {
    analyzer: TranscriptAnalyzer,
    router: OutcomeRouter,
}

impl EvaluationService {
    pub fn new(analyzer: TranscriptAnalyzer, router: OutcomeRouter) -> Self {
        Self { analyzer, router }
    }

    /// Grades the transcript and routes the outcome.
    ///
    /// A failed analysis yields the fallback report, whose overall of 0
    /// sits below the call threshold, so no call can ride on a grading
    /// failure.
    pub async fn evaluate(
        &self,
        transcript: &Transcript,
        mode: Mode,
        job_role: Option<&str>,
        candidate_name: Option<&str>,
    ) -> Evaluation {
        let (report, analysis_succeeded) = match self.analyzer.analyze(transcript, job_role).await
        {
            Ok(report) => (report, true),
            Err(e) => {
                warn!(error = %e, "analysis failed, returning the fallback report");
                (ScoreReport::fallback(), false)
            }
        };

        let action = outcome::route(mode, report.scores.overall);
        let outcome = self.router.dispatch(
            action,
            candidate_name.unwrap_or(DEFAULT_CANDIDATE_NAME),
            job_role.unwrap_or(""),
            report.scores.overall,
        );

        Evaluation {
            report,
            analysis_succeeded,
            outcome,
        }
    }
}
