//! Language model client
//!
//! The pipeline sends one prompt per question and gets back either a single
//! string or a list of text fragments.

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API key not found: environment variable {env} is unset or empty")]
    MissingApiKey { env: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// Content of a model reply
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyContent {
    Text(String),
    Fragments(Vec<String>),
}

impl ReplyContent {
    /// Flatten to one string; fragments are joined with single spaces
    pub fn into_text(self) -> String {
        match self {
            ReplyContent::Text(text) => text,
            ReplyContent::Fragments(parts) => parts.join(" "),
        }
    }
}

/// Stateless single-prompt chat model
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn invoke(&self, prompt: &str) -> Result<ReplyContent, LlmError>;

    fn model_name(&self) -> &str;
}
