//! Session Data Model
//!
//! This module defines the data carried across a rehearsal session: the
//! session configuration chosen at upload time, the two speaker roles, and
//! the append-only transcript the dialogue and analysis stages both read.

use serde::{Deserialize, Serialize};
use std::fmt;

// --- Mode and Difficulty ---

/// The rehearsal persona the evaluator adopts for a session.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Interview,
    Hackathon,
}

impl Mode {
    /// Parses a client-supplied mode string.
    ///
    /// Unknown strings fall back to `Interview`, mirroring the defaults the
    /// upload form applies on its side.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "hackathon" => Mode::Hackathon,
            _ => Mode::Interview,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Interview => write!(f, "interview"),
            Mode::Hackathon => write!(f, "hackathon"),
        }
    }
}

/// How demanding the synthesized evaluator persona is.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Moderate,
    #[default]
    Hard,
}

impl Difficulty {
    /// Parses a client-supplied difficulty string.
    ///
    /// Accepts the plain level names plus the legacy picker aliases
    /// (`superman`/`batman`/`hulk`) still sent by older clients. Unknown
    /// strings fall back to `Hard`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "easy" | "superman" => Difficulty::Easy,
            "moderate" | "batman" => Difficulty::Moderate,
            "hard" | "hulk" => Difficulty::Hard,
            _ => Difficulty::Hard,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Moderate => write!(f, "moderate"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

// --- Transcript ---

/// Who produced a turn.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Candidate,
    Evaluator,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::Candidate => write!(f, "candidate"),
            Speaker::Evaluator => write!(f, "evaluator"),
        }
    }
}

/// A single utterance in the session.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn candidate(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Candidate,
            text: text.into(),
        }
    }

    pub fn evaluator(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Evaluator,
            text: text.into(),
        }
    }
}

/// The ordered record of a session.
///
/// Turns are only ever appended. The inner vector is private so nothing can
/// reorder, rewrite, or drop a turn once it is in; the orchestrator relies
/// on this when it hands a transcript back after a failed backend call.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct Transcript(Vec<Turn>);

impl Transcript {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a turn at the end of the transcript.
    pub fn push(&mut self, turn: Turn) {
        self.0.push(turn);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.0
    }

    pub fn last(&self) -> Option<&Turn> {
        self.0.last()
    }

    /// Rewrites the text of the most recent turn in place.
    ///
    /// Used exactly once per session, when the orchestrator wraps the first
    /// candidate reply with the uploaded background context. The turn itself
    /// keeps its position and speaker.
    pub(crate) fn amend_last_text(&mut self, text: String) {
        if let Some(turn) = self.0.last_mut() {
            turn.text = text;
        }
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// --- Session configuration ---

/// Everything fixed about a session at the moment it starts.
///
/// The transport layer round-trips this value with the client between
/// requests; the server itself keeps no session table. `system_instruction`
/// is synthesized exactly once when the session starts and reused verbatim
/// for every subsequent backend call, and `background_context` is captured
/// once from the uploaded document and never replaced.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub mode: Mode,
    pub difficulty: Difficulty,
    pub job_role: Option<String>,
    pub background_context: Option<String>,
    pub system_instruction: String,
}
