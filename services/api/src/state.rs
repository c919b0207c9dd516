//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the shared,
//! clonable service collaborators built once at startup.

use crate::config::Config;
use prepy_core::{dialogue::DialogueOrchestrator, evaluation::EvaluationService};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
/// All fields are public to be accessible from other modules.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<DialogueOrchestrator>,
    pub evaluation: Arc<EvaluationService>,
    pub config: Arc<Config>,
}
