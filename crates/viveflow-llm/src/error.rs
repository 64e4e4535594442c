use thiserror::Error;

/// Failure taxonomy for calls to the hosted generation service.
///
/// Display text is what the end user sees, so every variant renders as a
/// short, non-technical sentence. Status codes and raw bodies are logged
/// at the call site, never shown.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Caller contract violation (missing framework or idea). Not a
    /// service failure.
    #[error("{0}")]
    InvalidInput(String),

    /// No credential configured. Fatal for the request, not the process.
    #[error("The generation service is not configured.")]
    MissingApiKey,

    #[error("The service is receiving too many requests. Please try again in a few moments.")]
    RateLimited,

    #[error("The service is temporarily unavailable. Please try again later.")]
    Unavailable,

    #[error("The request timed out. Please try again.")]
    Timeout,

    /// Any other non-success HTTP status.
    #[error("The request could not be completed. Please try again.")]
    Upstream(u16),

    /// Connection-level failure before any HTTP status was received.
    #[error("Could not reach the generation service. Please try again.")]
    Transport(String),

    /// The reply body could not be read as the expected shape. Shape
    /// defects inside an otherwise parseable payload are repaired by the
    /// normalizer instead of raising this.
    #[error("The service returned an unreadable response. Please try again.")]
    MalformedResponse(String),
}
