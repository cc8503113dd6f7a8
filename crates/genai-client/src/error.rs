//! Error types for the genai-client crate.

use thiserror::Error;

/// Errors that can occur while talking to the generation service.
///
/// Every variant is fatal to a pipeline run; the client never retries.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The request never produced an HTTP response (DNS, TLS, connection reset)
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The HTTP client gave up waiting for the service
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The service refused the request because the quota is exhausted
    #[error("Quota exceeded: {0}")]
    Quota(String),

    /// The service answered with a non-success status
    #[error("Generation service returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body could not be understood
    #[error("Invalid response from generation service: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenerationError::Timeout(err.to_string())
        } else if err.is_decode() {
            GenerationError::InvalidResponse(err.to_string())
        } else {
            GenerationError::Transport(err.to_string())
        }
    }
}

/// Errors raised while resolving client configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// No usable API key in the environment or on the command line
    #[error("Missing API credential: set GEMINI_API_KEY or API_KEY, or pass --api-key")]
    MissingCredential,

    /// A configuration value could not be parsed
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
