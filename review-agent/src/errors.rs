//! Crate-wide error hierarchy for review-agent.
//!
//! Goals:
//! - Single root `Error` for all public functions.
//! - GitLab-aware mapping (401→Unauthorized, 429→RateLimited, 5xx→Server, etc.).
//! - No dynamic dispatch, no async-trait, ergonomic `?` via `From` impls.
//!
//! Tool-level failures (bad submit payload, collaborator hiccup inside a tool
//! body) never surface here: they are reported back into the conversation as
//! error-flagged tool results so the model can self-correct. This hierarchy
//! covers protocol and pipeline failures that end a review.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type ReviewResult<T> = Result<T, Error>;

/// Root error type for the review-agent crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Repository-access (GitLab) failure.
    #[error(transparent)]
    Repo(#[from] RepoError),

    /// Model conversation (Anthropic Messages) failure.
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// A session was opened while another one was still active.
    #[error("review session is already open")]
    ContextAlreadyOpen,

    /// Session state was required but no session is open.
    #[error("review session is not open")]
    ContextNotOpen,

    /// The conversation ended without a successfully submitted verdict.
    #[error("agent finished without submitting a review verdict")]
    MissingVerdict,

    /// Input validation errors (unknown project, nonexistent branch, etc.).
    #[error("validation error: {0}")]
    Validation(String),
}

/// Detailed repository-access error used inside the repo layer.
#[derive(Debug, Error)]
pub enum RepoError {
    /// Unauthorized (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden (HTTP 403).
    #[error("forbidden")]
    Forbidden,

    /// Not found (HTTP 404).
    #[error("not found")]
    NotFound,

    /// Rate limited (HTTP 429).
    #[error("rate limited")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Gateway/Server error (HTTP 5xx).
    #[error("server error: status {0}")]
    Server(u16),

    /// Other HTTP status (4xx/3xx) not covered above.
    #[error("http status error: {0}")]
    HttpStatus(u16),

    /// Timeout at transport level.
    #[error("timeout")]
    Timeout,

    /// Network/transport failure without status (DNS/connect/reset).
    #[error("network error: {0}")]
    Network(String),

    /// Unexpected/invalid shape of provider response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Model-conversation transport and decoding errors.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Non-success HTTP status with a short body snippet for diagnostics.
    #[error("llm http status {status}: {snippet}")]
    HttpStatus { status: u16, snippet: String },

    /// Response body could not be decoded into the expected shape.
    #[error("llm decode error: {0}")]
    Decode(String),

    /// Timeout at transport level.
    #[error("llm timeout")]
    Timeout,

    /// Network/transport failure without status.
    #[error("llm network error: {0}")]
    Network(String),

    /// The response carried no usable content blocks.
    #[error("llm returned empty content")]
    EmptyContent,

    /// Scripted test client ran out of canned responses.
    #[cfg(any(test, feature = "mock"))]
    #[error("scripted llm exhausted")]
    ScriptExhausted,
}

// ===== Conversions for `?` ergonomics =====

impl From<reqwest::Error> for RepoError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return RepoError::Timeout;
        }
        if let Some(status) = e.status() {
            let code = status.as_u16();
            return match code {
                401 => RepoError::Unauthorized,
                403 => RepoError::Forbidden,
                404 => RepoError::NotFound,
                429 => RepoError::RateLimited {
                    retry_after_secs: None,
                },
                500..=599 => RepoError::Server(code),
                _ => RepoError::HttpStatus(code),
            };
        }
        RepoError::Network(e.to_string())
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return LlmError::Timeout;
        }
        if e.is_decode() {
            return LlmError::Decode(e.to_string());
        }
        LlmError::Network(e.to_string())
    }
}
