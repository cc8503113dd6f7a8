//! Structured view of a curated draft.
//!
//! Only used when the curator runs in structured mode: the model is then
//! asked for a JSON array matching `recommendation_schema()`. The draft is
//! still stored as raw text; `parse_recommendations` is a best-effort reader
//! for display.

use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub year: String,
    pub rating: String,
    pub rationale: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

/// Response schema in the generation service's OpenAPI subset.
pub fn recommendation_schema() -> serde_json::Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "year": { "type": "STRING" },
                "rating": { "type": "STRING" },
                "rationale": { "type": "STRING" },
                "type": { "type": "STRING", "enum": ["movie", "series"] }
            },
            "required": ["title", "year", "rating", "rationale", "type"]
        }
    })
}

/// Read a draft as a recommendation list, tolerating a markdown code fence.
///
/// Returns `None` for free-text drafts or an empty list.
pub fn parse_recommendations(draft: &str) -> Option<Vec<Recommendation>> {
    let body = strip_code_fence(draft.trim());
    let recs: Vec<Recommendation> = serde_json::from_str(body).ok()?;
    (!recs.is_empty()).then_some(recs)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("json") on the opening line.
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
