// src/llm/mod.rs

//! Generative-text backends.
//!
//! The course generator only needs one operation: send a prompt that asks for
//! JSON and get the raw text back. `TextGenerator` is that seam; the concrete
//! clients talk to a Gemini-style or an OpenAI-compatible HTTP API.

pub mod gemini;
pub mod openai;

use std::{fmt, sync::Arc};

use async_trait::async_trait;

use crate::config::{LlmConfig, LlmProvider};

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

/// Failure of the outbound generation call itself.
#[derive(Debug)]
pub enum LlmError {
    /// The request never produced a response (connect, TLS, decode...).
    Transport(String),
    /// The service answered with a non-success status.
    Status { status: u16, message: String },
    /// A successful response that carried no text.
    EmptyResponse,
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::Transport(msg) => write!(f, "request failed: {msg}"),
            LlmError::Status { status, message } => write!(f, "HTTP {status}: {message}"),
            LlmError::EmptyResponse => write!(f, "empty response"),
        }
    }
}

impl std::error::Error for LlmError {}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Transport(err.to_string())
    }
}

/// Prompt in, generated text out. Implementations should bias the service towards JSON output.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_json(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Builds the backend selected by configuration.
pub fn from_config(config: &LlmConfig) -> Arc<dyn TextGenerator> {
    let client = reqwest::Client::new();
    match config.provider {
        LlmProvider::Gemini => Arc::new(GeminiClient::new(client, config)),
        LlmProvider::OpenAi => Arc::new(OpenAiClient::new(client, config)),
    }
}

/// Pulls a human readable message out of a JSON error body (`{"error": {"message": ...}}`).
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

/// Converts a non-success response into `LlmError::Status`.
async fn status_error(res: reqwest::Response) -> LlmError {
    let status = res.status().as_u16();
    let body = res.text().await.unwrap_or_default();
    let message = extract_error_message(&body).unwrap_or(body);
    LlmError::Status { status, message }
}
