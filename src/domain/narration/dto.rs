use serde::{Deserialize, Serialize};

/// Request for POST /api/narration/generate and /generate-personal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateNarrationRequest {
    pub story_id: String,
    pub page_index: i64,
    pub lang: String,
    pub text: String,
    pub voice_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stability: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_boost: Option<f32>,
}

/// Successful outcomes of a generate call. `Generating` is a retry
/// instruction (HTTP 202), not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum NarrationOutcome {
    #[serde(rename = "ready", rename_all = "camelCase")]
    Ready { audio_url: String, cached: bool },
    #[serde(rename = "generating", rename_all = "camelCase")]
    Generating { retry_after_ms: u64 },
}
