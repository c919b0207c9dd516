//! Outcome Router
//!
//! Decides, from the final overall score and the session mode, whether a
//! congratulatory call goes out, and hands the decision to the telephony
//! collaborator. Routing itself is a pure function; delivery happens on a
//! detached task so returning the score report never waits on a phone
//! call.

use crate::session::Mode;
use crate::telephony::{CallDispatcher, CallScript};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Minimum overall score for the congratulatory call, interview mode only.
pub const CONGRATULATION_THRESHOLD: u8 = 80;

/// Pure routing decision, before any dispatcher is consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeAction {
    /// No call goes out; the reason is surfaced in [`OutcomeStatus::Skipped`].
    None { reason: String },
    Congratulate,
}

/// Decides the outcome action for a graded session.
pub fn route(mode: Mode, overall: u8) -> OutcomeAction {
    if mode != Mode::Interview {
        return OutcomeAction::None {
            reason: "outcome calls are only placed for interview sessions".to_string(),
        };
    }

    if overall >= CONGRATULATION_THRESHOLD {
        OutcomeAction::Congratulate
    } else {
        OutcomeAction::None {
            reason: format!(
                "score {overall} is below the congratulation threshold of {CONGRATULATION_THRESHOLD}"
            ),
        }
    }
}

/// What actually happened on the delivery side. Annotates the evaluation
/// response; it never replaces or delays the score report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Skipped { reason: String },
    CallDispatched,
    NotConfigured,
}

pub struct OutcomeRouter {
    telephony: Arc<dyn CallDispatcher>,
}

impl OutcomeRouter {
    pub fn new(telephony: Arc<dyn CallDispatcher>) -> Self {
        Self { telephony }
    }

    /// Carries out an [`OutcomeAction`].
    ///
    /// A congratulatory call is issued on a detached task bounded by the
    /// dispatcher's own timeout; only failures knowable up front (no
    /// credentials) are reported synchronously. The detached task logs how
    /// the call went.
    pub fn dispatch(
        &self,
        action: OutcomeAction,
        candidate_name: &str,
        job_role: &str,
        overall: u8,
    ) -> OutcomeStatus {
        match action {
            OutcomeAction::None { reason } => {
                info!(reason = %reason, "no outcome call");
                OutcomeStatus::Skipped { reason }
            }
            OutcomeAction::Congratulate => {
                if !self.telephony.is_configured() {
                    warn!("high score reached but telephony is not configured");
                    return OutcomeStatus::NotConfigured;
                }

                let script = CallScript::congratulations(candidate_name, job_role, overall);
                let telephony = Arc::clone(&self.telephony);
                tokio::spawn(async move {
                    let score = script.overall_score();
                    match telephony.place_call(script).await {
                        Ok(placed) => {
                            info!(sid = %placed.sid, score, "congratulatory call placed");
                        }
                        Err(e) => {
                            warn!(error = %e, score, "congratulatory call failed");
                        }
                    }
                });

                OutcomeStatus::CallDispatched
            }
        }
    }
}
