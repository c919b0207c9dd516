use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Twilio credentials for outcome calls. Present only when the full set of
/// variables is configured; the caller substitutes a disabled dispatcher
/// otherwise.
#[derive(Clone, Debug)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    pub to_number: String,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub ollama_base_url: String,
    pub chat_model: String,
    pub backend_timeout: Duration,
    pub log_level: Level,
    pub twilio: Option<TwilioConfig>,
    pub recordings_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:5000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let ollama_base_url = std::env::var("OLLAMA_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:11434".to_string());

        let chat_model = std::env::var("CHAT_MODEL").unwrap_or_else(|_| "phi3:3.8b".to_string());

        let timeout_str =
            std::env::var("BACKEND_TIMEOUT_SECS").unwrap_or_else(|_| "60".to_string());
        let timeout_secs = timeout_str.parse::<u64>().map_err(|_| {
            ConfigError::InvalidValue(
                "BACKEND_TIMEOUT_SECS".to_string(),
                format!("'{}' is not a number of seconds", timeout_str),
            )
        })?;
        let backend_timeout = Duration::from_secs(timeout_secs);

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let twilio = twilio_from_env()?;

        let recordings_dir = std::env::var("RECORDINGS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./recordings"));

        let max_upload_str =
            std::env::var("MAX_UPLOAD_BYTES").unwrap_or_else(|_| (50 * 1024 * 1024).to_string());
        let max_upload_bytes = max_upload_str.parse::<usize>().map_err(|_| {
            ConfigError::InvalidValue(
                "MAX_UPLOAD_BYTES".to_string(),
                format!("'{}' is not a byte count", max_upload_str),
            )
        })?;

        Ok(Self {
            bind_address,
            ollama_base_url,
            chat_model,
            backend_timeout,
            log_level,
            twilio,
            recordings_dir,
            max_upload_bytes,
        })
    }
}

/// Reads the Twilio variable set. All-or-nothing: a partial set is a
/// configuration mistake, not a disabled integration.
fn twilio_from_env() -> Result<Option<TwilioConfig>, ConfigError> {
    let account_sid = std::env::var("TWILIO_ACCOUNT_SID").ok();
    let auth_token = std::env::var("TWILIO_AUTH_TOKEN").ok();
    let from_number = std::env::var("TWILIO_PHONE_NUMBER").ok();
    // CANDIDATE_PHONE_NUMBER wins; YOUR_PHONE_NUMBER is the legacy fallback.
    let to_number = std::env::var("CANDIDATE_PHONE_NUMBER")
        .or_else(|_| std::env::var("YOUR_PHONE_NUMBER"))
        .ok();

    match (account_sid, auth_token, from_number, to_number) {
        (None, None, None, None) => Ok(None),
        (Some(account_sid), Some(auth_token), Some(from_number), Some(to_number)) => {
            Ok(Some(TwilioConfig {
                account_sid,
                auth_token,
                from_number,
                to_number,
            }))
        }
        (account_sid, auth_token, from_number, to_number) => {
            let mut missing = Vec::new();
            if account_sid.is_none() {
                missing.push("TWILIO_ACCOUNT_SID");
            }
            if auth_token.is_none() {
                missing.push("TWILIO_AUTH_TOKEN");
            }
            if from_number.is_none() {
                missing.push("TWILIO_PHONE_NUMBER");
            }
            if to_number.is_none() {
                missing.push("CANDIDATE_PHONE_NUMBER");
            }
            Err(ConfigError::MissingVar(format!(
                "{} (Twilio variables must be set together or not at all)",
                missing.join(", ")
            )))
        }
    }
}
