//! Error responses for the ViveFlow API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use viveflow_llm::LlmError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Framework not found: {0}")]
    FrameworkNotFound(i64),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::FrameworkNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("Framework not found: {id}"))
            }
            ApiError::Llm(err) => (llm_status(err), err.to_string()),
            ApiError::Internal(err) => {
                tracing::error!("Internal error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

/// Map the generation-service taxonomy onto HTTP statuses. The variants'
/// Display text is already user-safe; diagnostic detail was logged where
/// the error arose.
fn llm_status(err: &LlmError) -> StatusCode {
    match err {
        LlmError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        LlmError::MissingApiKey => StatusCode::INTERNAL_SERVER_ERROR,
        LlmError::RateLimited | LlmError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        LlmError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        LlmError::Upstream(_) | LlmError::Transport(_) | LlmError::MalformedResponse(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn llm_statuses_follow_the_taxonomy() {
        assert_eq!(
            llm_status(&LlmError::InvalidInput("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            llm_status(&LlmError::MissingApiKey),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(llm_status(&LlmError::RateLimited), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(llm_status(&LlmError::Unavailable), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(llm_status(&LlmError::Timeout), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(llm_status(&LlmError::Upstream(500)), StatusCode::BAD_GATEWAY);
        assert_eq!(
            llm_status(&LlmError::MalformedResponse("x".into())),
            StatusCode::BAD_GATEWAY
        );
    }
}
