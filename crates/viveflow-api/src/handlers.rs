//! HTTP handlers for the ViveFlow API.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::warn;
use viveflow_core::storage::SavedFramework;
use viveflow_core::{ChatMessage, Framework, normalize};
use viveflow_llm::{EnhanceContext, chat_reply, enhance_idea, generate_framework};

use crate::error::ApiError;
use crate::models::{
    ChatRequest, ChatResponseBody, EnhancePromptRequest, EnhancePromptResponse,
    FrameworkListResponse, FrameworkMetaRequest, ProcessIdeaRequest,
};
use crate::state::AppState;

const MAX_IDEA_CHARS: usize = 2000;
const MIN_IDEA_CHARS: usize = 10;

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Shared length validation for idea-like inputs. Rejection happens
/// before any upstream call is made.
fn validate_idea<'a>(
    text: Option<&'a str>,
    missing: &str,
    too_short: &str,
) -> Result<&'a str, ApiError> {
    let Some(text) = text.filter(|t| !t.is_empty()) else {
        return Err(ApiError::InvalidRequest(missing.to_string()));
    };
    if text.chars().count() > MAX_IDEA_CHARS {
        return Err(ApiError::InvalidRequest(
            "Idea is too long. Please keep it under 2000 characters.".to_string(),
        ));
    }
    if text.trim().chars().count() < MIN_IDEA_CHARS {
        return Err(ApiError::InvalidRequest(too_short.to_string()));
    }
    Ok(text)
}

/// Generate a framework document from a free-text idea.
pub async fn process_idea(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessIdeaRequest>,
) -> Result<Json<Framework>, ApiError> {
    let idea = validate_idea(
        req.idea.as_deref(),
        "Idea is required",
        "Please provide a more detailed idea to process.",
    )?;

    let framework = generate_framework(state.generate_backend.as_ref(), idea).await?;

    // Recency-list bookkeeping must not fail the request.
    if let Err(err) = state.frameworks.push(idea, framework.clone()) {
        warn!(%err, "failed to record framework in recency list");
    }

    Ok(Json(framework))
}

/// Expand a terse idea into richer generation input.
pub async fn enhance_prompt(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EnhancePromptRequest>,
) -> Result<Json<EnhancePromptResponse>, ApiError> {
    let prompt = validate_idea(
        req.prompt.as_deref(),
        "Prompt is required",
        "Please provide a more detailed idea to enhance.",
    )?;

    let context = EnhanceContext::from_label(req.context.as_deref());
    let enhanced_prompt = enhance_idea(state.generate_backend.as_ref(), prompt, context).await?;

    Ok(Json(EnhancePromptResponse { enhanced_prompt }))
}

/// Answer one assistant turn about an existing framework.
///
/// The client sends the full conversation including the newest user
/// message; the last entry is the new message and everything before it is
/// history.
pub async fn chat_response(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponseBody>, ApiError> {
    let messages = req
        .messages
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::InvalidRequest("Messages are required".to_string()))?;
    let raw_framework = req
        .framework
        .ok_or_else(|| ApiError::InvalidRequest("Framework is required".to_string()))?;
    let idea = req
        .idea
        .filter(|i| !i.trim().is_empty())
        .ok_or_else(|| ApiError::InvalidRequest("Idea is required".to_string()))?;

    // No-op for an already-valid document, repairs anything else.
    let framework = normalize(raw_framework);

    let Some((last, history)) = messages.split_last() else {
        return Err(ApiError::InvalidRequest("Messages are required".to_string()));
    };
    let content = chat_reply(
        state.chat_backend.as_ref(),
        &framework,
        &idea,
        history,
        &last.content,
    )
    .await?;

    let mut transcript = messages.clone();
    transcript.push(ChatMessage::assistant(content.clone()));
    if let Err(err) = state.chats.save(&idea, &framework.goal, &transcript) {
        warn!(%err, "failed to persist chat transcript");
    }

    Ok(Json(ChatResponseBody { content }))
}

/// List saved generations, most recent first.
pub async fn list_frameworks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FrameworkListResponse>, ApiError> {
    let frameworks = state.frameworks.list()?;
    Ok(Json(FrameworkListResponse { frameworks }))
}

/// Replace the tags/folder metadata of a saved generation.
pub async fn update_framework_meta(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<FrameworkMetaRequest>,
) -> Result<Json<SavedFramework>, ApiError> {
    state
        .frameworks
        .set_metadata(id, req.tags, req.folder)?
        .map(Json)
        .ok_or(ApiError::FrameworkNotFound(id))
}

/// Delete a saved generation.
pub async fn delete_framework(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.frameworks.remove(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::FrameworkNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use viveflow_core::storage::{ChatStore, FrameworkStore};
    use viveflow_llm::{ChatBackend, ChatResponse, Choice, LlmError, Message};

    struct MockBackend {
        responses: Mutex<Vec<String>>,
        calls: Mutex<Vec<Vec<Message>>>,
    }

    impl MockBackend {
        fn single(response: &str) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(vec![response.to_string()]),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChatBackend for MockBackend {
        fn model_name(&self) -> &str {
            "mock"
        }

        async fn chat(
            &self,
            messages: Vec<Message>,
            _json_mode: bool,
        ) -> Result<ChatResponse, LlmError> {
            self.calls.lock().unwrap().push(messages);
            let mut responses = self.responses.lock().unwrap();
            let text = if responses.is_empty() {
                "{}".to_string()
            } else {
                responses.remove(0)
            };
            Ok(ChatResponse {
                id: "mock".to_string(),
                choices: vec![Choice {
                    index: 0,
                    message: Message::assistant(&text),
                    finish_reason: Some("stop".to_string()),
                }],
                usage: None,
            })
        }
    }

    fn test_state(backend: Arc<MockBackend>) -> (Arc<AppState>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState {
            generate_backend: backend.clone(),
            chat_backend: backend,
            frameworks: FrameworkStore::new(dir.path()),
            chats: ChatStore::new(dir.path()),
        };
        (Arc::new(state), dir)
    }

    const VALID_IDEA: &str = "open a neighborhood bakery with a sourdough focus";

    #[tokio::test]
    async fn whitespace_idea_rejected_without_upstream_call() {
        let mock = MockBackend::single("{}");
        let (state, _dir) = test_state(mock.clone());

        let result = process_idea(
            State(state),
            Json(ProcessIdeaRequest {
                idea: Some("  ".to_string()),
            }),
        )
        .await;

        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_and_oversized_ideas_rejected() {
        let mock = MockBackend::single("{}");
        let (state, _dir) = test_state(mock.clone());

        let missing = process_idea(State(state.clone()), Json(ProcessIdeaRequest { idea: None }))
            .await
            .unwrap_err();
        assert!(matches!(missing, ApiError::InvalidRequest(msg) if msg == "Idea is required"));

        let oversized = process_idea(
            State(state),
            Json(ProcessIdeaRequest {
                idea: Some("x".repeat(2001)),
            }),
        )
        .await
        .unwrap_err();
        assert!(
            matches!(oversized, ApiError::InvalidRequest(msg) if msg.contains("under 2000 characters"))
        );
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn process_idea_returns_normalized_framework_and_records_it() {
        let mock = MockBackend::single(r#"{"goal": "Launch a bakery", "tips": []}"#);
        let (state, _dir) = test_state(mock);

        let Json(framework) = process_idea(
            State(state.clone()),
            Json(ProcessIdeaRequest {
                idea: Some(VALID_IDEA.to_string()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(framework.goal, "Launch a bakery");
        assert_eq!(framework.tips.len(), 3);

        let saved = state.frameworks.list().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].idea, VALID_IDEA);
    }

    #[tokio::test]
    async fn enhance_returns_camel_case_key() {
        let mock = MockBackend::single("A richer idea.");
        let (state, _dir) = test_state(mock);

        let Json(response) = enhance_prompt(
            State(state),
            Json(EnhancePromptRequest {
                prompt: Some(VALID_IDEA.to_string()),
                context: Some("idea_framework".to_string()),
            }),
        )
        .await
        .unwrap();

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["enhancedPrompt"], "A richer idea.");
    }

    #[tokio::test]
    async fn framework_metadata_and_delete_lifecycle() {
        let mock = MockBackend::single(r#"{"goal": "Launch a bakery"}"#);
        let (state, _dir) = test_state(mock);

        process_idea(
            State(state.clone()),
            Json(ProcessIdeaRequest {
                idea: Some(VALID_IDEA.to_string()),
            }),
        )
        .await
        .unwrap();
        let id = state.frameworks.list().unwrap()[0].id;

        let Json(updated) = update_framework_meta(
            State(state.clone()),
            Path(id),
            Json(FrameworkMetaRequest {
                tags: vec!["retail".to_string()],
                folder: Some("business".to_string()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.tags, ["retail"]);

        let status = delete_framework(State(state.clone()), Path(id)).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let missing = delete_framework(State(state), Path(id)).await.unwrap_err();
        assert!(matches!(missing, ApiError::FrameworkNotFound(_)));
    }

    #[tokio::test]
    async fn chat_requires_all_fields() {
        let mock = MockBackend::single("hi");
        let (state, _dir) = test_state(mock.clone());

        let no_framework = chat_response(
            State(state),
            Json(ChatRequest {
                messages: Some(vec![ChatMessage::user("hello")]),
                framework: None,
                idea: Some(VALID_IDEA.to_string()),
            }),
        )
        .await
        .unwrap_err();
        assert!(
            matches!(no_framework, ApiError::InvalidRequest(msg) if msg == "Framework is required")
        );
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn chat_splits_history_and_persists_transcript() {
        let mock = MockBackend::single("Do the **next** step.");
        let (state, _dir) = test_state(mock.clone());

        let messages = vec![
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
            ChatMessage::user("what next?"),
        ];
        let Json(body) = chat_response(
            State(state.clone()),
            Json(ChatRequest {
                messages: Some(messages),
                framework: Some(json!({"goal": "Launch a bakery"})),
                idea: Some(VALID_IDEA.to_string()),
            }),
        )
        .await
        .unwrap();

        // Reply is display-cleaned.
        assert_eq!(body.content, "Do the next step.");

        // system + 2 history entries + the new user message.
        let calls = mock.calls.lock().unwrap();
        assert_eq!(calls[0].len(), 4);
        assert_eq!(calls[0][0].role, "system");
        assert_eq!(calls[0][3].content, "what next?");
        drop(calls);

        let transcript = state.chats.load(VALID_IDEA, "Launch a bakery").unwrap().unwrap();
        assert_eq!(transcript.messages.len(), 4);
        assert_eq!(transcript.messages[3].content, "Do the next step.");
    }
}
