//! Request and response bodies for the three endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use viveflow_core::{ChatMessage, storage::SavedFramework};

#[derive(Debug, Deserialize)]
pub struct ProcessIdeaRequest {
    pub idea: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EnhancePromptRequest {
    pub prompt: Option<String>,
    /// `"idea_framework"` selects the framework-oriented enhancement
    /// prompt; anything else gets the general one.
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EnhancePromptResponse {
    #[serde(rename = "enhancedPrompt")]
    pub enhanced_prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Option<Vec<ChatMessage>>,
    /// Raw framework value from the client; run through the normalizer
    /// before use, which is a no-op for an already-valid document.
    pub framework: Option<Value>,
    pub idea: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponseBody {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct FrameworkListResponse {
    pub frameworks: Vec<SavedFramework>,
}

/// Replacement organization metadata for a saved framework.
#[derive(Debug, Deserialize)]
pub struct FrameworkMetaRequest {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub folder: Option<String>,
}
