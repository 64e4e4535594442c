//! Conversational exchange over an existing framework document.

use tracing::debug;
use viveflow_core::{ChatMessage, Framework, sanitize};

use crate::client::ChatBackend;
use crate::error::LlmError;
use crate::prompt::chat_system_prompt;
use crate::types::Message;

/// Most recent prior messages kept when composing a turn; older history
/// is dropped, not summarized.
pub const HISTORY_WINDOW: usize = 10;

/// Build the message sequence for one assistant turn: persona system
/// prompt, at most [`HISTORY_WINDOW`] prior messages, then the new user
/// message. The supplied history is never mutated.
pub fn compose_turn(
    framework: &Framework,
    idea: &str,
    history: &[ChatMessage],
    new_user_message: &str,
) -> Result<Vec<Message>, LlmError> {
    if idea.trim().is_empty() {
        return Err(LlmError::InvalidInput("Idea is required".to_string()));
    }
    if new_user_message.trim().is_empty() {
        return Err(LlmError::InvalidInput("Message is required".to_string()));
    }

    let window_start = history.len().saturating_sub(HISTORY_WINDOW);
    let mut messages = Vec::with_capacity(history.len() - window_start + 2);
    messages.push(Message::system(chat_system_prompt(framework, idea)));
    messages.extend(history[window_start..].iter().map(Message::from));
    messages.push(Message::user(new_user_message));
    Ok(messages)
}

/// Run one assistant turn and return the display-ready reply text, with
/// markdown stripped outside code fences and truncated fences repaired.
pub async fn chat_reply(
    backend: &dyn ChatBackend,
    framework: &Framework,
    idea: &str,
    history: &[ChatMessage],
    new_user_message: &str,
) -> Result<String, LlmError> {
    let messages = compose_turn(framework, idea, history, new_user_message)?;
    debug!(history = history.len(), "assistant turn composed");

    let response = backend.chat(messages, false).await?;
    let content = response
        .text_content()
        .ok_or_else(|| LlmError::MalformedResponse("reply carried no choices".to_string()))?;
    Ok(sanitize::clean_chat(content))
}
