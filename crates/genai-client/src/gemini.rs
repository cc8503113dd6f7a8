//! Gemini REST client.
//!
//! Speaks the `generateContent` endpoint of the Generative Language API:
//! one prompt in, the first candidate's text out. Search grounding and
//! JSON-schema output are switched on per request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::ClientConfig;
use crate::error::GenerationError;
use crate::{Generation, GenerationClient, GenerationRequest};

/// Added to the configured timeout for the whole-request HTTP deadline.
///
/// The caller's own deadline (the stage timeout) uses the configured value,
/// so it fires first and the HTTP deadline only catches callers that set none.
pub const HTTP_DEADLINE_SLACK: Duration = Duration::from_secs(1);

/// Client for the Gemini generation service.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl GeminiClient {
    /// Build a client from resolved configuration.
    ///
    /// No network traffic happens here; the first request opens the
    /// connection.
    pub fn new(config: ClientConfig) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout + HTTP_DEADLINE_SLACK)
            .user_agent(concat!("naiwatches/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        info!(
            "Gemini client ready (model: {}, endpoint: {})",
            config.model, config.base_url
        );
        Ok(Self { http, config })
    }

    /// Full URL of the generateContent endpoint for the configured model.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, GenerationError> {
        debug!(
            "Sending prompt ({} chars, grounded: {}, schema: {})",
            request.prompt.len(),
            request.grounded,
            request.response_schema.is_some()
        );

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&WireRequest::from(request))
            .send()
            .await
            .map_err(|e| {
                error!("Transport error while calling Gemini: {}", e);
                GenerationError::from(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(GenerationError::from)?;

        if !status.is_success() {
            let message = api_error_message(&body);
            error!("Gemini returned {}: {}", status, message);
            return Err(if status == StatusCode::TOO_MANY_REQUESTS {
                GenerationError::Quota(message)
            } else {
                GenerationError::Api {
                    status: status.as_u16(),
                    message,
                }
            });
        }

        parse_generation(&body)
    }
}

/// Decode a successful response body into text plus grounding sources.
pub fn parse_generation(body: &str) -> Result<Generation, GenerationError> {
    let response: WireResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::InvalidResponse(format!("undecodable body: {}", e)))?;

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::InvalidResponse("response has no candidates".into()))?;

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    let sources = candidate
        .grounding_metadata
        .map(|meta| {
            meta.grounding_chunks
                .into_iter()
                .filter_map(|chunk| chunk.web.and_then(|web| web.uri))
                .collect()
        })
        .unwrap_or_default();

    Ok(Generation { text, sources })
}

/// Pull the human-readable message out of an error body, falling back to
/// the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<WireErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest<'a> {
    contents: Vec<WireContent<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<WireGenerationConfig<'a>>,
}

#[derive(Debug, Serialize)]
struct WireContent<'a> {
    role: &'static str,
    parts: Vec<WirePart<'a>>,
}

#[derive(Debug, Serialize)]
struct WirePart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a serde_json::Value,
}

impl<'a> From<&'a GenerationRequest> for WireRequest<'a> {
    fn from(request: &'a GenerationRequest) -> Self {
        let tools = if request.grounded {
            vec![serde_json::json!({ "google_search": {} })]
        } else {
            Vec::new()
        };

        Self {
            contents: vec![WireContent {
                role: "user",
                parts: vec![WirePart {
                    text: &request.prompt,
                }],
            }],
            tools,
            generation_config: request
                .response_schema
                .as_ref()
                .map(|schema| WireGenerationConfig {
                    response_mime_type: "application/json",
                    response_schema: schema,
                }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCandidate {
    content: Option<WireResponseContent>,
    grounding_metadata: Option<WireGroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct WireResponseContent {
    #[serde(default)]
    parts: Vec<WireResponsePart>,
}

#[derive(Debug, Deserialize)]
struct WireResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireGroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<WireGroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct WireGroundingChunk {
    web: Option<WireWebSource>,
}

#[derive(Debug, Deserialize)]
struct WireWebSource {
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireErrorBody {
    error: WireErrorDetail,
}

#[derive(Debug, Deserialize)]
struct WireErrorDetail {
    message: String,
}
