//! Score Report
//!
//! The structured result of grading a completed session. A report is
//! all-or-nothing: either every score is a valid bounded integer and every
//! feedback field is present, or callers substitute the fixed fallback
//! produced by [`ScoreReport::fallback`]. Partial reports never circulate.

use serde::{Deserialize, Serialize};

/// Upper bound for every score dimension.
pub const MAX_SCORE: u8 = 100;

/// The seven graded dimensions.
///
/// `overall` is whatever the grading backend reports. It is expected to
/// reflect the six dimension scores but is deliberately not recomputed
/// from them; the weighting lives in the grading prompt, not here.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Scores {
    pub english: u8,
    pub technical: u8,
    pub communication: u8,
    pub teamwork: u8,
    pub soft_skills: u8,
    pub project: u8,
    pub overall: u8,
}

impl Scores {
    /// Returns the first dimension whose value exceeds [`MAX_SCORE`],
    /// if any. Used to reject a payload wholesale.
    pub fn first_out_of_range(&self) -> Option<(&'static str, u8)> {
        [
            ("english", self.english),
            ("technical", self.technical),
            ("communication", self.communication),
            ("teamwork", self.teamwork),
            ("soft_skills", self.soft_skills),
            ("project", self.project),
            ("overall", self.overall),
        ]
        .into_iter()
        .find(|(_, value)| *value > MAX_SCORE)
    }

    fn zero() -> Self {
        Self {
            english: 0,
            technical: 0,
            communication: 0,
            teamwork: 0,
            soft_skills: 0,
            project: 0,
            overall: 0,
        }
    }
}

/// Free-text assessment accompanying the scores.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub strengths: String,
    pub improvements: String,
    pub english_assessment: String,
    pub recommendations: String,
}

/// A complete session evaluation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ScoreReport {
    pub scores: Scores,
    pub feedback: Feedback,
}

impl ScoreReport {
    /// The fixed zero report substituted when analysis fails.
    ///
    /// All scores are zero and the feedback says the analysis did not run,
    /// so a failed grading pass can never be mistaken for a judgment of
    /// the candidate.
    pub fn fallback() -> Self {
        Self {
            scores: Scores::zero(),
            feedback: Feedback {
                strengths: "Not available.".to_string(),
                improvements: "Not available.".to_string(),
                english_assessment: "Not available.".to_string(),
                recommendations: "The analysis could not be completed. Please run the evaluation again.".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_deserializes_from_grading_wire_shape() {
        let json = r#"{
            "scores": {
                "english": 78,
                "technical": 85,
                "communication": 70,
                "teamwork": 60,
                "soft_skills": 65,
                "project": 88,
                "overall": 80
            },
            "feedback": {
                "strengths": "Clear technical depth.",
                "improvements": "Expand on team dynamics.",
                "english_assessment": "Fluent and precise.",
                "recommendations": "Practice behavioral answers."
            }
        }"#;

        let report: ScoreReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.scores.technical, 85);
        assert_eq!(report.scores.overall, 80);
        assert_eq!(report.feedback.strengths, "Clear technical depth.");
    }

    #[test]
    fn test_missing_score_field_is_a_parse_error() {
        // "overall" absent.
        let json = r#"{
            "scores": {
                "english": 78,
                "technical": 85,
                "communication": 70,
                "teamwork": 60,
                "soft_skills": 65,
                "project": 88
            },
            "feedback": {
                "strengths": "a",
                "improvements": "b",
                "english_assessment": "c",
                "recommendations": "d"
            }
        }"#;

        let result: Result<ScoreReport, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_feedback_field_is_a_parse_error() {
        let json = r#"{
            "scores": {
                "english": 1, "technical": 1, "communication": 1,
                "teamwork": 1, "soft_skills": 1, "project": 1, "overall": 1
            },
            "feedback": {
                "strengths": "a",
                "improvements": "b",
                "english_assessment": "c"
            }
        }"#;

        let result: Result<ScoreReport, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_first_out_of_range_flags_excess_values() {
        let mut scores = Scores::zero();
        assert_eq!(scores.first_out_of_range(), None);

        scores.teamwork = 101;
        assert_eq!(scores.first_out_of_range(), Some(("teamwork", 101)));

        scores.teamwork = 100;
        assert_eq!(scores.first_out_of_range(), None);
    }

    #[test]
    fn test_fallback_report_is_all_zero_with_fixed_feedback() {
        let fallback = ScoreReport::fallback();
        assert_eq!(fallback.scores.overall, 0);
        assert_eq!(fallback.scores.first_out_of_range(), None);
        assert_eq!(fallback.feedback.strengths, "Not available.");
        assert!(fallback.feedback.recommendations.contains("could not be completed"));

        // Stable across calls.
        assert_eq!(fallback, ScoreReport::fallback());
    }

    #[test]
    fn test_report_round_trip_uses_snake_case_keys() {
        let report = ScoreReport::fallback();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"soft_skills\""));
        assert!(json.contains("\"english_assessment\""));

        let back: ScoreReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
