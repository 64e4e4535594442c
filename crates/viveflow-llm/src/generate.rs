//! Framework generation and idea enhancement.

use serde_json::Value;
use tracing::{debug, info};
use viveflow_core::{Framework, normalize};

use crate::client::ChatBackend;
use crate::error::LlmError;
use crate::prompt::{self, EnhanceContext, FRAMEWORK_SYSTEM_PROMPT};
use crate::types::Message;

/// Extract JSON from text that may be wrapped in markdown code fences.
pub(crate) fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(start) = trimmed.find("```json") {
        let after_fence = &trimmed[start + 7..];
        if let Some(end) = after_fence.find("```") {
            return after_fence[..end].trim();
        }
    }
    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        if let Some(end) = after_fence.find("```") {
            return after_fence[..end].trim();
        }
    }
    trimmed
}

/// Generate a framework document from a free-text idea.
///
/// The raw reply is parsed as loose JSON and run through the normalizer,
/// so missing or misshapen fields are repaired rather than rejected. Only
/// an unparseable body is a hard failure.
pub async fn generate_framework(
    backend: &dyn ChatBackend,
    idea: &str,
) -> Result<Framework, LlmError> {
    let messages = vec![
        Message::system(FRAMEWORK_SYSTEM_PROMPT),
        Message::user(idea),
    ];
    let response = backend.chat(messages, true).await?;

    let content = response
        .text_content()
        .ok_or_else(|| LlmError::MalformedResponse("reply carried no choices".to_string()))?;
    debug!(bytes = content.len(), "generation reply received");

    let raw: Value = serde_json::from_str(extract_json(content))
        .map_err(|err| LlmError::MalformedResponse(err.to_string()))?;

    let framework = normalize(raw);
    info!(goal = %framework.goal, steps = framework.action_steps.len(), "framework generated");
    Ok(framework)
}

/// Expand a terse idea into richer generation input.
pub async fn enhance_idea(
    backend: &dyn ChatBackend,
    idea: &str,
    context: EnhanceContext,
) -> Result<String, LlmError> {
    let messages = vec![
        Message::system(prompt::enhance_system_prompt(context)),
        Message::user(idea),
    ];
    let response = backend.chat(messages, false).await?;

    let content = response
        .text_content()
        .map(str::trim)
        .unwrap_or_default();
    if content.is_empty() {
        return Err(LlmError::MalformedResponse(
            "enhancement reply was empty".to_string(),
        ));
    }
    Ok(content.to_string())
}
