//! Dialogue Orchestrator
//!
//! Owns one rehearsal exchange end to end: seed the session with the fixed
//! welcome, append the candidate's reply, splice uploaded background into
//! the early turns, call the generative backend with the full history, and
//! sanitize whatever comes back into the single question that becomes the
//! next evaluator turn. The orchestrator holds no session table; callers
//! round-trip the config and transcript and get amended copies back.

use crate::backend::{BackendError, ChatMessage, GenerativeBackend, SamplingOptions};
use crate::context;
use crate::prompt;
use crate::sanitize;
use crate::session::{Difficulty, Mode, SessionConfig, Speaker, Transcript, Turn};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Transcript length (after the candidate turn is appended) up to which
/// uploaded background is still spliced into the conversation.
const EARLY_CONTEXT_WINDOW: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum DialogueError {
    /// Wording matches the turn-level error shown to the candidate.
    #[error("Error communicating with AI: {0}")]
    Backend(#[from] BackendError),
}

/// A freshly started session: the fixed config, a transcript holding the
/// welcome turn, and the welcome text itself for immediate display.
#[derive(Debug, Clone)]
pub struct SessionStart {
    pub config: SessionConfig,
    pub transcript: Transcript,
    pub welcome: String,
}

/// The result of one completed exchange.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub evaluator_text: String,
    pub transcript: Transcript,
    /// True once the closing message has been appended; no further turns
    /// belong in this session.
    pub terminated: bool,
}

pub struct DialogueOrchestrator {
    backend: Arc<dyn GenerativeBackend>,
}

impl DialogueOrchestrator {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self { backend }
    }

    /// Opens a session. The system instruction is synthesized here, once;
    /// every later turn reuses it verbatim. No backend call is made, so
    /// starting a session always succeeds.
    pub fn start_session(
        &self,
        mode: Mode,
        difficulty: Difficulty,
        job_role: Option<String>,
        uploaded_text: Option<String>,
    ) -> SessionStart {
        let system_instruction = prompt::synthesize(mode, difficulty, job_role.as_deref());
        let background_context = uploaded_text.filter(|text| !text.trim().is_empty());

        let welcome = prompt::welcome_message(mode).to_string();
        let mut transcript = Transcript::new();
        transcript.push(Turn::evaluator(welcome.clone()));

        SessionStart {
            config: SessionConfig {
                mode,
                difficulty,
                job_role,
                background_context,
                system_instruction,
            },
            transcript,
            welcome,
        }
    }

    /// Runs one exchange: candidate turn in, evaluator turn out.
    ///
    /// The whole turn is all-or-nothing. Work happens on a private copy of
    /// the transcript, so when the backend call fails the caller's
    /// transcript is exactly as it was and the turn can simply be retried.
    #[instrument(name = "dialogue_turn", skip_all, fields(mode = %config.mode, turns = transcript.len()))]
    pub async fn post_turn(
        &self,
        config: &SessionConfig,
        transcript: &Transcript,
        candidate_text: &str,
        is_final: bool,
    ) -> Result<TurnOutcome, DialogueError> {
        let mut working = transcript.clone();
        working.push(Turn::candidate(candidate_text));

        // The final turn gets the fixed closing line, not a generated one.
        if is_final {
            let closing = prompt::closing_message().to_string();
            working.push(Turn::evaluator(closing.clone()));
            return Ok(TurnOutcome {
                evaluator_text: closing,
                transcript: working,
                terminated: true,
            });
        }

        if let Some(background) = &config.background_context {
            let already_spliced = working
                .turns()
                .iter()
                .any(|turn| context::contains_marker(&turn.text));
            if working.len() <= EARLY_CONTEXT_WINDOW && !already_spliced {
                working.amend_last_text(context::wrap(background, candidate_text));
                debug!(
                    background_chars = background.chars().count(),
                    "spliced background context into candidate turn"
                );
            }
        }

        let history: Vec<ChatMessage> = working
            .turns()
            .iter()
            .map(|turn| match turn.speaker {
                Speaker::Candidate => ChatMessage::user(turn.text.clone()),
                Speaker::Evaluator => ChatMessage::assistant(turn.text.clone()),
            })
            .collect();

        let raw = self
            .backend
            .generate(
                &config.system_instruction,
                &history,
                SamplingOptions::dialogue(),
            )
            .await?;

        let evaluator_text = sanitize::sanitize(&raw);
        working.push(Turn::evaluator(evaluator_text.clone()));

        Ok(TurnOutcome {
            evaluator_text,
            transcript: working,
            terminated: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ChatRole, MockGenerativeBackend};

    fn orchestrator(backend: MockGenerativeBackend) -> DialogueOrchestrator {
        DialogueOrchestrator::new(Arc::new(backend))
    }

    mod start {
        use super::*;

        #[test]
        fn seeds_transcript_with_the_welcome_turn() {
            let start = orchestrator(MockGenerativeBackend::new()).start_session(
                Mode::Interview,
                Difficulty::Hard,
                None,
                None,
            );

            assert_eq!(
                start.welcome,
                "Welcome to PREPY AI Interview. Give an Introduction about yourself."
            );
            assert_eq!(start.transcript.len(), 1);
            let first = start.transcript.last().unwrap();
            assert_eq!(first.speaker, Speaker::Evaluator);
            assert_eq!(first.text, start.welcome);
        }

        #[test]
        fn hackathon_mode_gets_its_own_welcome() {
            let start = orchestrator(MockGenerativeBackend::new()).start_session(
                Mode::Hackathon,
                Difficulty::Easy,
                None,
                None,
            );
            assert_eq!(
                start.welcome,
                "Welcome to PREPY AI Hackathon. Now Start with your project explanation."
            );
        }

        #[test]
        fn instruction_is_synthesized_once_into_the_config() {
            let start = orchestrator(MockGenerativeBackend::new()).start_session(
                Mode::Interview,
                Difficulty::Moderate,
                Some("Platform Engineer".to_string()),
                None,
            );

            assert!(start.config.system_instruction.contains("AI Interview Evaluator"));
            assert!(start.config.system_instruction.contains("MODE: MODERATE"));
            assert!(start.config.system_instruction.contains("TARGET ROLE: Platform Engineer"));
        }

        #[test]
        fn blank_uploaded_text_is_discarded() {
            let start = orchestrator(MockGenerativeBackend::new()).start_session(
                Mode::Interview,
                Difficulty::Hard,
                None,
                Some("   \n  ".to_string()),
            );
            assert_eq!(start.config.background_context, None);

            let start = orchestrator(MockGenerativeBackend::new()).start_session(
                Mode::Interview,
                Difficulty::Hard,
                None,
                Some("resume text".to_string()),
            );
            assert_eq!(start.config.background_context.as_deref(), Some("resume text"));
        }
    }

    mod turns {
        use super::*;

        fn config_without_background() -> (SessionConfig, Transcript) {
            let start = orchestrator(MockGenerativeBackend::new()).start_session(
                Mode::Interview,
                Difficulty::Hard,
                None,
                None,
            );
            (start.config, start.transcript)
        }

        #[tokio::test]
        async fn appends_a_sanitized_evaluator_turn() {
            let (config, transcript) = config_without_background();

            let mut backend = MockGenerativeBackend::new();
            backend
                .expect_generate()
                .withf(|instruction, history, options| {
                    instruction.contains("AI Interview Evaluator")
                        && history.len() == 2
                        && history[0].role == ChatRole::Assistant
                        && history[1].role == ChatRole::User
                        && options.num_predict == 60
                })
                .returning(|_, _, _| {
                    Ok("Good intro. What project are you most proud of?".to_string())
                });

            let outcome = orchestrator(backend)
                .post_turn(&config, &transcript, "I am a systems engineer.", false)
                .await
                .unwrap();

            assert_eq!(outcome.evaluator_text, "What project are you most proud of?");
            assert!(!outcome.terminated);
            assert_eq!(outcome.transcript.len(), 3);

            let speakers: Vec<Speaker> = outcome
                .transcript
                .turns()
                .iter()
                .map(|t| t.speaker)
                .collect();
            assert_eq!(
                speakers,
                [Speaker::Evaluator, Speaker::Candidate, Speaker::Evaluator]
            );
        }

        #[tokio::test]
        async fn evaluator_turns_always_come_out_question_shaped() {
            let (config, transcript) = config_without_background();

            let mut backend = MockGenerativeBackend::new();
            backend.expect_generate().returning(|_, _, _| {
                Ok("Let me think about that. Since you like Rust, \
                    why did you choose it! It matters."
                    .to_string())
            });

            let outcome = orchestrator(backend)
                .post_turn(&config, &transcript, "I like Rust.", false)
                .await
                .unwrap();

            assert!(outcome.evaluator_text.ends_with('?'));
            assert_eq!(outcome.evaluator_text.matches('?').count(), 1);
            assert!(!outcome.evaluator_text.contains('.'));
            assert!(!outcome.evaluator_text.contains('!'));
        }

        #[tokio::test]
        async fn final_turn_closes_without_a_backend_call() {
            let (config, transcript) = config_without_background();

            let mut backend = MockGenerativeBackend::new();
            backend.expect_generate().times(0);

            let outcome = orchestrator(backend)
                .post_turn(&config, &transcript, "My closing statement.", true)
                .await
                .unwrap();

            assert!(outcome.terminated);
            assert_eq!(outcome.evaluator_text, prompt::closing_message());
            assert_eq!(outcome.transcript.len(), 3);
            assert_eq!(
                outcome.transcript.last().unwrap().text,
                prompt::closing_message()
            );
        }

        #[tokio::test]
        async fn backend_failure_leaves_the_transcript_untouched() {
            let (config, transcript) = config_without_background();

            let mut backend = MockGenerativeBackend::new();
            backend
                .expect_generate()
                .returning(|_, _, _| Err(BackendError::Unreachable("refused".to_string())));

            let err = orchestrator(backend)
                .post_turn(&config, &transcript, "An answer.", false)
                .await
                .unwrap_err();

            assert!(
                err.to_string()
                    .starts_with("Error communicating with AI:")
            );
            assert_eq!(transcript.len(), 1);
        }
    }

    mod context_splicing {
        use super::*;

        fn config_with_background() -> (SessionConfig, Transcript) {
            let start = orchestrator(MockGenerativeBackend::new()).start_session(
                Mode::Interview,
                Difficulty::Hard,
                None,
                Some("Resume: rust, databases, five years.".to_string()),
            );
            (start.config, start.transcript)
        }

        fn question_backend() -> MockGenerativeBackend {
            let mut backend = MockGenerativeBackend::new();
            backend
                .expect_generate()
                .returning(|_, _, _| Ok("What did you build?".to_string()));
            backend
        }

        #[tokio::test]
        async fn first_turn_carries_the_wrapped_background() {
            let (config, transcript) = config_with_background();

            let outcome = orchestrator(question_backend())
                .post_turn(&config, &transcript, "I work on storage.", false)
                .await
                .unwrap();

            let candidate = &outcome.transcript.turns()[1];
            assert_eq!(candidate.speaker, Speaker::Candidate);
            assert!(candidate.text.starts_with(context::BACKGROUND_MARKER));
            assert!(candidate.text.contains("Resume: rust, databases, five years."));
            assert!(candidate.text.contains("User's response: I work on storage."));
        }

        #[tokio::test]
        async fn background_is_spliced_only_once() {
            let (config, transcript) = config_with_background();
            let orchestrator = orchestrator(question_backend());

            let first = orchestrator
                .post_turn(&config, &transcript, "First answer.", false)
                .await
                .unwrap();
            let second = orchestrator
                .post_turn(&config, &first.transcript, "Second answer.", false)
                .await
                .unwrap();

            let marked = second
                .transcript
                .turns()
                .iter()
                .filter(|t| context::contains_marker(&t.text))
                .count();
            assert_eq!(marked, 1);
            assert_eq!(second.transcript.turns()[3].text, "Second answer.");
        }

        #[tokio::test]
        async fn late_transcripts_are_not_spliced() {
            let (config, _) = config_with_background();

            // Four turns already on record puts the append past the window.
            let mut transcript = Transcript::new();
            transcript.push(Turn::evaluator("Welcome."));
            transcript.push(Turn::candidate("a"));
            transcript.push(Turn::evaluator("What about b?"));
            transcript.push(Turn::candidate("b"));

            let outcome = orchestrator(question_backend())
                .post_turn(&config, &transcript, "A late answer.", false)
                .await
                .unwrap();

            assert!(
                outcome
                    .transcript
                    .turns()
                    .iter()
                    .all(|t| !context::contains_marker(&t.text))
            );
        }
    }
}
