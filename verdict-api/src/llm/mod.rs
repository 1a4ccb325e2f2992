//! Language model gateway
//!
//! Every AI feature talks to the model through [`LanguageModel`], so the
//! hosted client can be swapped for a scripted double in tests. Callers
//! always have a rule-based fallback; a missing model is not an error.

use async_trait::async_trait;
use thiserror::Error;

pub mod gemini;
pub mod parse;
pub mod prompts;

pub use gemini::GeminiClient;
pub use parse::{parse_embedded_object, parse_json, LlmOutput};

/// Shape the model is asked to answer in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    Json,
}

/// Audio sent inline with a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineAudio {
    /// Base64-encoded bytes
    pub data: String,
    pub mime_type: String,
}

/// One generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub audio: Option<InlineAudio>,
    pub format: ResponseFormat,
}

impl GenerationRequest {
    /// Free-text answer
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            audio: None,
            format: ResponseFormat::Text,
        }
    }

    /// Answer constrained to JSON
    pub fn json(prompt: impl Into<String>) -> Self {
        Self {
            format: ResponseFormat::Json,
            ..Self::text(prompt)
        }
    }

    pub fn with_audio(mut self, audio: InlineAudio) -> Self {
        self.audio = Some(audio);
        self
    }
}

/// Model call failures
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Language model is not configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Model returned no text")]
    EmptyResponse,
}

/// Text generation backend
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model identifier shown in reports
    fn model_name(&self) -> &str;

    /// Run one prompt and return the raw text answer
    async fn generate(&self, request: GenerationRequest) -> Result<String, LlmError>;
}
