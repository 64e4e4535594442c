use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::types::{ChatRequest, ChatResponse, Message, ResponseFormat};

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Model for framework generation and idea enhancement.
pub const GENERATE_MODEL: &str = "gemma2-9b-it";
/// Model for conversational replies, which need a larger completion budget.
pub const CHAT_MODEL: &str = "meta-llama/llama-4-maverick-17b-128e-instruct";

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Bounded wait per request; the outbound call is cancelled on expiry.
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: GROQ_BASE_URL.to_string(),
            api_key: None,
            model: GENERATE_MODEL.to_string(),
            temperature: Some(0.7),
            max_tokens: Some(1000),
            timeout: Duration::from_secs(15),
        }
    }
}

impl LlmConfig {
    pub fn for_generation(api_key: Option<String>) -> Self {
        Self {
            api_key,
            ..Self::default()
        }
    }

    pub fn for_chat(api_key: Option<String>) -> Self {
        Self {
            api_key,
            model: CHAT_MODEL.to_string(),
            max_tokens: Some(4000),
            timeout: Duration::from_secs(20),
            ..Self::default()
        }
    }
}

/// Anything that can complete a chat exchange. Implemented by [`LlmClient`]
/// for production and by in-memory mocks in tests; object-safe so the
/// server can hold `Arc<dyn ChatBackend>`.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    fn model_name(&self) -> &str;

    /// Submit one completion request. `json_mode` asks the service to
    /// constrain the reply to a single JSON object.
    async fn chat(&self, messages: Vec<Message>, json_mode: bool)
    -> Result<ChatResponse, LlmError>;
}

pub struct LlmClient {
    config: LlmConfig,
    http: reqwest::Client,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }
}

#[async_trait]
impl ChatBackend for LlmClient {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn chat(
        &self,
        messages: Vec<Message>,
        json_mode: bool,
    ) -> Result<ChatResponse, LlmError> {
        let Some(api_key) = &self.config.api_key else {
            return Err(LlmError::MissingApiKey);
        };
        let url = format!("{}/chat/completions", self.config.base_url);

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            response_format: json_mode.then(ResponseFormat::json_object),
        };

        debug!(
            model = %request.model,
            messages = request.messages.len(),
            json_mode,
            "completion request to {url}"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .timeout(self.config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    warn!(model = %self.config.model, "completion request timed out");
                    LlmError::Timeout
                } else {
                    warn!(model = %self.config.model, %err, "completion request failed to send");
                    LlmError::Transport(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body, "completion request rejected");
            return Err(match status.as_u16() {
                429 => LlmError::RateLimited,
                503 | 504 => LlmError::Unavailable,
                code => LlmError::Upstream(code),
            });
        }

        response.json::<ChatResponse>().await.map_err(|err| {
            warn!(%err, "completion response body unreadable");
            LlmError::MalformedResponse(err.to_string())
        })
    }
}
