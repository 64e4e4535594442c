pub mod chat;
pub mod client;
pub mod error;
pub mod generate;
pub mod prompt;
pub mod types;


pub use chat::{HISTORY_WINDOW, chat_reply, compose_turn};
pub use client::{CHAT_MODEL, GENERATE_MODEL, ChatBackend, LlmClient, LlmConfig};
pub use error::LlmError;
pub use generate::{enhance_idea, generate_framework};
pub use prompt::EnhanceContext;
pub use types::{ChatRequest, ChatResponse, Choice, Message, ResponseFormat, Usage};
