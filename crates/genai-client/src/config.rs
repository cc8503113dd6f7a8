//! Client configuration, resolved once at process start.
//!
//! Values come from the environment and may then be overridden field by
//! field (the CLI applies its flags this way):
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `GEMINI_API_KEY`, then `API_KEY` | API credential | required |
//! | `NAIWATCHES_MODEL` | model identifier | `gemini-1.5-flash` |
//! | `NAIWATCHES_BASE_URL` | service root | `https://generativelanguage.googleapis.com` |
//! | `NAIWATCHES_TIMEOUT_SECS` | per-request timeout | `60` |

use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Placeholder shipped in sample setups; treated the same as no key at all.
const PLACEHOLDER_KEY: &str = "YOUR_API_KEY_HERE";

const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];
const MODEL_VAR: &str = "NAIWATCHES_MODEL";
const BASE_URL_VAR: &str = "NAIWATCHES_BASE_URL";
const TIMEOUT_VAR: &str = "NAIWATCHES_TIMEOUT_SECS";

/// Everything a `GeminiClient` needs to reach the service.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Build a config with defaults for everything but the credential.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Resolve configuration from process environment variables.
    ///
    /// A non-blank `api_key_override` (the `--api-key` flag) replaces the
    /// environment credential.
    pub fn from_env(api_key_override: Option<String>) -> Result<Self, ConfigError> {
        Self::resolve(|key| std::env::var(key).ok(), api_key_override)
    }

    /// Resolve configuration through an arbitrary key lookup.
    ///
    /// `api_key_override` wins over every environment variable, which lets
    /// the CLI accept `--api-key` without touching the environment.
    pub fn resolve<F>(lookup: F, api_key_override: Option<String>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = api_key_override
            .into_iter()
            .chain(API_KEY_VARS.iter().filter_map(|var| lookup(var)))
            .map(|key| key.trim().to_string())
            .find(|key| is_usable_key(key))
            .ok_or(ConfigError::MissingCredential)?;

        let mut config = Self::new(api_key);

        if let Some(model) = non_empty(lookup(MODEL_VAR)) {
            config.model = model;
        }
        if let Some(base_url) = non_empty(lookup(BASE_URL_VAR)) {
            config.base_url = base_url;
        }
        if let Some(raw) = non_empty(lookup(TIMEOUT_VAR)) {
            config.timeout = parse_timeout(TIMEOUT_VAR, &raw)?;
        }

        Ok(config)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::resolve(lookup, None)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// Keep the credential out of logs.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn is_usable_key(key: &str) -> bool {
    !key.is_empty() && key != PLACEHOLDER_KEY
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a whole number of seconds; zero is rejected.
pub fn parse_timeout(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}
