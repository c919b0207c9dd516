//! Prompt Synthesizer
//!
//! Builds the system instruction that constrains the generative backend to
//! emit exactly one short question per turn, plus the fixed messages the
//! orchestrator sends without a backend call. Synthesis is a pure function
//! of mode and difficulty and never fails; unknown client strings are
//! already collapsed to defaults by `Mode::parse` / `Difficulty::parse`.

use crate::session::{Difficulty, Mode};

const INTERVIEW_PERSONA: &str = r#"You are an AI Interview Evaluator.

CRITICAL INSTRUCTIONS:
1. Output EXACTLY ONE sentence.
2. That sentence must be a QUESTION ending with "?".
3. Start with an interrogative word (What, How, Why, When, Where, Who, Which).
4. NO greetings (e.g., "Hi", "Hello").
5. NO statements before the question.
6. NO multiple questions.
7. MAX 10 words.

Your goal: Ask one relevant question based on the candidate's response."#;

const HACKATHON_PERSONA: &str = r#"You are a Hackathon Judge.

CRITICAL INSTRUCTIONS:
1. Output EXACTLY ONE sentence.
2. That sentence must be a QUESTION ending with "?".
3. Start with an interrogative word (What, How, Why, When, Where, Who, Which).
4. NO greetings (e.g., "Hi", "Hello").
5. NO statements before the question.
6. NO multiple questions.
7. MAX 10 words.

Your goal: Ask one relevant question based on the project pitch."#;

const EASY_MODIFIER: &str = r#"MODE: EASY
- Ask simple, fundamental questions.
- ONE question only.

Example: "What inspired this project?""#;

const MODERATE_MODIFIER: &str = r#"MODE: MODERATE
- Ask practical implementation questions.
- ONE question only.

Example: "How does your algorithm handle errors?""#;

const HARD_MODIFIER: &str = r#"MODE: HARD
- Ask complex technical questions.
- ONE question only.

Example: "What tradeoffs shaped your database choice?""#;

/// Builds the system instruction for a dialogue session.
///
/// The result is a persona block selected by `mode`, an optional target-role
/// line, and a difficulty modifier block. The constraints in the text are a
/// contract with the backend, enforced downstream by the sanitizer rather
/// than here.
pub fn synthesize(mode: Mode, difficulty: Difficulty, job_role: Option<&str>) -> String {
    let persona = match mode {
        Mode::Interview => INTERVIEW_PERSONA,
        Mode::Hackathon => HACKATHON_PERSONA,
    };
    let modifier = match difficulty {
        Difficulty::Easy => EASY_MODIFIER,
        Difficulty::Moderate => MODERATE_MODIFIER,
        Difficulty::Hard => HARD_MODIFIER,
    };

    match job_role {
        Some(role) if !role.trim().is_empty() => format!(
            "{persona}\n\nTARGET ROLE: {}\nKeep every question relevant to this role.\n\n{modifier}",
            role.trim()
        ),
        _ => format!("{persona}\n\n{modifier}"),
    }
}

/// The fixed first evaluator turn of a session. No backend call is made.
pub fn welcome_message(mode: Mode) -> &'static str {
    match mode {
        Mode::Interview => "Welcome to PREPY AI Interview. Give an Introduction about yourself.",
        Mode::Hackathon => "Welcome to PREPY AI Hackathon. Now Start with your project explanation.",
    }
}

/// The fixed final evaluator turn, sent when the client flags the last turn.
pub fn closing_message() -> &'static str {
    "Thank you, the session is now complete. Your responses are being evaluated."
}
