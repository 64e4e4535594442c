use std::sync::Arc;

use viveflow_core::storage::{ChatStore, FrameworkStore};
use viveflow_llm::{ChatBackend, LlmClient, LlmConfig};

use crate::config::Config;

/// Shared application state.
///
/// Two backends because the endpoints use different models and budgets:
/// generation and enhancement share the small, fast model; chat gets the
/// larger completion budget.
pub struct AppState {
    pub generate_backend: Arc<dyn ChatBackend>,
    pub chat_backend: Arc<dyn ChatBackend>,
    pub frameworks: FrameworkStore,
    pub chats: ChatStore,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            generate_backend: Arc::new(LlmClient::new(LlmConfig::for_generation(
                config.groq_api_key.clone(),
            ))),
            chat_backend: Arc::new(LlmClient::new(LlmConfig::for_chat(
                config.groq_api_key.clone(),
            ))),
            frameworks: FrameworkStore::new(&config.data_dir),
            chats: ChatStore::new(&config.data_dir),
        }
    }
}
