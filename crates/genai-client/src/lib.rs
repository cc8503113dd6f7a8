//! Text-generation client for the recommendation grid.
//!
//! This crate owns the boundary between the pipeline and the external
//! generation service. It provides:
//! - The `GenerationClient` trait every stage talks to
//! - Request/response types that carry a prompt out and text back
//! - `GeminiClient`, the REST implementation used in production
//! - `ClientConfig`, resolved once at process start
//!
//! The pipeline never depends on `GeminiClient` directly, so tests swap in
//! scripted clients that implement the same trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod config;
pub mod error;
pub mod gemini;

pub use config::ClientConfig;
pub use error::{ConfigError, GenerationError};
pub use gemini::GeminiClient;

/// A single prompt sent to the generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Ask the service to ground the answer in web search results.
    pub grounded: bool,
    /// When set, the service must answer with JSON matching this schema.
    pub response_schema: Option<serde_json::Value>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            grounded: false,
            response_schema: None,
        }
    }

    /// Request search grounding (builder pattern).
    pub fn grounded(mut self) -> Self {
        self.grounded = true;
        self
    }

    /// Request JSON output matching `schema` (builder pattern).
    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

/// Text returned by the generation service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    /// Source URIs reported by grounded generation, in response order.
    pub sources: Vec<String>,
}

impl Generation {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sources: Vec::new(),
        }
    }
}

/// Core trait for anything that can turn a prompt into text.
///
/// `Send + Sync` lets one client be shared behind an `Arc` by every
/// orchestrator clone.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Model identifier used for logging.
    fn model(&self) -> &str;

    /// Send one request and wait for the complete response.
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, GenerationError>;
}
