//! Context Splitter
//!
//! Uploaded-document context rides inside the first candidate turn, wrapped
//! between two fixed marker strings so the backend can ground its questions
//! on it. This module owns those markers: `wrap` produces the combined turn
//! text the orchestrator splices in, and `split` recovers the plain reply
//! (and the background, for whoever has not captured one yet) when the
//! transcript is re-read for grading. Both directions are pure.

/// Marker introducing injected document text inside a candidate turn.
pub const BACKGROUND_MARKER: &str = "Context from uploaded file:";

/// Marker introducing the candidate's actual reply after injected context.
pub const RESPONSE_MARKER: &str = "User's response:";

/// Stands in for the reply when the wrapped form is malformed and the
/// background cannot be separated out.
const MALFORMED_PLACEHOLDER: &str = "[Background Info Provided]";

/// Injected background is capped at this many characters.
const BACKGROUND_CHAR_LIMIT: usize = 2000;

/// The two halves of a marker-wrapped candidate turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSplit {
    /// Background text, present only when it could be cleanly separated
    /// from the reply and is non-empty.
    pub background: Option<String>,
    /// The candidate's reply. Never empty-dropped: on a malformed wrap the
    /// whole turn text survives here with the marker replaced by a
    /// placeholder.
    pub response: String,
}

/// Combines background text and a candidate reply into the wrapped turn
/// form the backend sees. Background is truncated to its character cap.
pub fn wrap(background: &str, response: &str) -> String {
    format!(
        "{BACKGROUND_MARKER}\n{}\n\n{RESPONSE_MARKER} {response}",
        truncate_chars(background, BACKGROUND_CHAR_LIMIT)
    )
}

/// Splits a candidate turn into background and reply.
///
/// Text without any marker passes through untouched as the response. When
/// the background marker appears but the reply marker is missing, the
/// candidate's content is kept whole with the marker replaced by a
/// placeholder rather than discarded.
pub fn split(text: &str) -> ContextSplit {
    if let Some((front, back)) = text.split_once(RESPONSE_MARKER) {
        let background = front.replace(BACKGROUND_MARKER, "").trim().to_string();
        ContextSplit {
            background: (!background.is_empty()).then_some(background),
            response: back.trim().to_string(),
        }
    } else if text.contains(BACKGROUND_MARKER) {
        ContextSplit {
            background: None,
            response: text
                .replace(BACKGROUND_MARKER, MALFORMED_PLACEHOLDER)
                .trim()
                .to_string(),
        }
    } else {
        ContextSplit {
            background: None,
            response: text.to_string(),
        }
    }
}

/// Whether a turn already carries injected context.
pub fn contains_marker(text: &str) -> bool {
    text.contains(BACKGROUND_MARKER)
}

// Character-based, not byte-based, so a multibyte boundary can never panic.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
