//! Telephony collaborator
//!
//! Voice-call delivery of session outcomes. [`CallDispatcher`] is the seam
//! the outcome router works against; [`TwilioCaller`] is the production
//! implementation (Twilio REST create-call with an inline TwiML document),
//! and [`DisabledDispatcher`] stands in when credentials are absent so the
//! rest of the pipeline never has to care.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Ring timeout passed to Twilio, in seconds.
const RING_TIMEOUT_SECS: &str = "60";

#[derive(Debug, thiserror::Error)]
pub enum TelephonyError {
    #[error("telephony request timed out")]
    Timeout,

    #[error("telephony endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("call rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid create-call response: {0}")]
    InvalidResponse(String),

    #[error("telephony is not configured")]
    NotConfigured,
}

/// A successfully created call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedCall {
    pub sid: String,
}

/// A ready-to-place voice message.
///
/// The TwiML is fully rendered at construction time; interpolated values
/// are XML-escaped so candidate-supplied names and roles cannot break the
/// document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallScript {
    kind: &'static str,
    overall_score: u8,
    twiml: String,
}

impl CallScript {
    /// The congratulatory call placed for high-scoring interview sessions.
    pub fn congratulations(candidate_name: &str, job_role: &str, overall_score: u8) -> Self {
        let candidate_name = xml_escape(candidate_name);
        let job_role = xml_escape(job_role);
        let twiml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Response>
    <Say voice="alice" rate="medium">
        Hello {candidate_name}, this is Sarah from the HR team at PREPY Private Limited. Am I speaking with you now?
    </Say>
    <Pause length="2"/>
    <Say voice="alice" rate="medium">
        Great! I’m calling to share some wonderful news — you have been selected for the {job_role} position. Congratulations!
    </Say>
    <Pause length="1"/>
    <Say voice="alice" rate="medium">
        You performed really well in the interview, and the team is excited to have you onboard.
    </Say>
    <Pause length="1"/>
    <Say voice="alice" rate="medium">
        I’ll be sending your offer letter and onboarding details to your email shortly. Kindly review and let us know if you have any questions.
    </Say>
    <Pause length="1"/>
    <Say voice="alice" rate="medium">
        Goodbye!
    </Say>
</Response>"#
        );

        Self {
            kind: "congratulations",
            overall_score,
            twiml,
        }
    }

    /// A feedback call for candidates below the threshold. Available as a
    /// capability; nothing in the pipeline triggers it automatically.
    pub fn feedback(overall_score: u8) -> Self {
        let twiml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Response>
    <Say voice="alice" rate="medium">
        Hello! This is PREPY Private Limited calling.
    </Say>
    <Pause length="1"/>
    <Say voice="alice" rate="medium">
        Thank you for taking the time to interview with us. Your score was {overall_score} percent.
    </Say>
    <Pause length="1"/>
    <Say voice="alice" rate="medium">
        While we won't be moving forward at this time, we encourage you to keep developing your skills and reapply in the future.
    </Say>
    <Pause length="1"/>
    <Say voice="alice" rate="medium">
        Best of luck in your job search. Goodbye!
    </Say>
</Response>"#
        );

        Self {
            kind: "feedback",
            overall_score,
            twiml,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn overall_score(&self) -> u8 {
        self.overall_score
    }

    pub fn twiml(&self) -> &str {
        &self.twiml
    }
}

fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Places outcome calls. Implementations own their transport and timeout.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CallDispatcher: Send + Sync {
    async fn place_call(&self, script: CallScript) -> Result<PlacedCall, TelephonyError>;

    /// Whether this dispatcher can actually place calls.
    fn is_configured(&self) -> bool;
}

// --- Twilio implementation ---

#[derive(Debug, Deserialize)]
struct CallCreated {
    sid: String,
}

/// Twilio REST dispatcher. Constructed only when all four credentials are
/// present; the config layer substitutes [`DisabledDispatcher`] otherwise.
pub struct TwilioCaller {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
    to_number: String,
}

impl TwilioCaller {
    pub fn new(
        account_sid: String,
        auth_token: String,
        from_number: String,
        to_number: String,
    ) -> anyhow::Result<Self> {
        use anyhow::Context;

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build Twilio HTTP client")?;

        Ok(Self {
            client,
            account_sid,
            auth_token,
            from_number,
            to_number,
        })
    }

    fn calls_url(&self) -> String {
        format!("{TWILIO_API_BASE}/Accounts/{}/Calls.json", self.account_sid)
    }
}

#[async_trait]
impl CallDispatcher for TwilioCaller {
    async fn place_call(&self, script: CallScript) -> Result<PlacedCall, TelephonyError> {
        let response = self
            .client
            .post(self.calls_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("To", self.to_number.as_str()),
                ("From", self.from_number.as_str()),
                ("Twiml", script.twiml()),
                ("Timeout", RING_TIMEOUT_SECS),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TelephonyError::Timeout
                } else if e.is_connect() {
                    TelephonyError::Unreachable(format!("connection failed: {e}"))
                } else {
                    TelephonyError::Unreachable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TelephonyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let created: CallCreated = response
            .json()
            .await
            .map_err(|e| TelephonyError::InvalidResponse(e.to_string()))?;

        Ok(PlacedCall { sid: created.sid })
    }

    fn is_configured(&self) -> bool {
        true
    }
}

/// No-op dispatcher used when Twilio credentials are missing.
pub struct DisabledDispatcher;

#[async_trait]
impl CallDispatcher for DisabledDispatcher {
    async fn place_call(&self, _script: CallScript) -> Result<PlacedCall, TelephonyError> {
        Err(TelephonyError::NotConfigured)
    }

    fn is_configured(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod scripts {
        use super::*;

        #[test]
        fn congratulations_speaks_name_and_role() {
            let script = CallScript::congratulations("Jane Smith", "Data Scientist", 86);

            assert_eq!(script.kind(), "congratulations");
            assert_eq!(script.overall_score(), 86);
            assert!(script.twiml().starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
            assert!(script.twiml().contains("Hello Jane Smith, this is Sarah from the HR team"));
            assert!(script.twiml().contains("selected for the Data Scientist position"));
            assert!(script.twiml().contains("<Say voice=\"alice\" rate=\"medium\">"));
            assert!(script.twiml().contains("<Pause length=\"2\"/>"));
        }

        #[test]
        fn congratulations_does_not_speak_the_score() {
            let script = CallScript::congratulations("Jane", "Engineer", 91);
            assert!(!script.twiml().contains("91"));
        }

        #[test]
        fn feedback_speaks_the_score() {
            let script = CallScript::feedback(45);

            assert_eq!(script.kind(), "feedback");
            assert!(script.twiml().contains("Your score was 45 percent."));
            assert!(script.twiml().contains("keep developing your skills"));
        }

        #[test]
        fn interpolated_values_are_xml_escaped() {
            let script = CallScript::congratulations("R&D <Lead>", "\"Staff\" Engineer", 90);

            assert!(script.twiml().contains("Hello R&amp;D &lt;Lead&gt;,"));
            assert!(script.twiml().contains("&quot;Staff&quot; Engineer position"));
            assert!(!script.twiml().contains("<Lead>"));
        }

        #[test]
        fn escape_covers_all_five_entities() {
            assert_eq!(xml_escape("a&b<c>d\"e'f"), "a&amp;b&lt;c&gt;d&quot;e&apos;f");
            assert_eq!(xml_escape("plain"), "plain");
        }
    }

    mod dispatchers {
        use super::*;

        #[test]
        fn calls_url_embeds_the_account_sid() {
            let caller = TwilioCaller::new(
                "AC00000000000000000000000000000000".to_string(),
                "token".to_string(),
                "+15550001111".to_string(),
                "+15552223333".to_string(),
            )
            .unwrap();

            assert_eq!(
                caller.calls_url(),
                "https://api.twilio.com/2010-04-01/Accounts/AC00000000000000000000000000000000/Calls.json"
            );
            assert!(caller.is_configured());
        }

        #[tokio::test]
        async fn disabled_dispatcher_refuses_calls() {
            let dispatcher = DisabledDispatcher;
            assert!(!dispatcher.is_configured());

            let err = dispatcher
                .place_call(CallScript::feedback(10))
                .await
                .unwrap_err();
            assert!(matches!(err, TelephonyError::NotConfigured));
        }

        #[test]
        fn call_created_parses_twilio_payload() {
            let created: CallCreated =
                serde_json::from_str(r#"{"sid": "CA123", "status": "queued"}"#).unwrap();
            assert_eq!(created.sid, "CA123");
        }
    }
}
