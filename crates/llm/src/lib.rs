//! Language-model collaborator
//!
//! The engine treats the language model as an optional collaborator: it is
//! used for field extraction and follow-up generation when configured, and
//! its absence or failure is an ordinary, expected outcome — never a system
//! failure. Callers must always carry a deterministic fallback.

pub mod backend;
pub mod factory;
pub mod prompt;

pub use backend::{FinishReason, GenerationResult, LlmBackend, LlmConfig, OpenAIBackend};
pub use factory::backend_from_settings;
pub use prompt::{first_json_object, Message, Role};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Generation error: {0}")]
    Generation(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}
