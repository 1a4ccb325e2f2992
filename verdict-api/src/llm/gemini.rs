//! Gemini REST client
//!
//! Calls `POST {base_url}/models/{model}:generateContent` with the API key
//! in the `x-goog-api-key` header, so the key never appears in logged URLs.
//! No retries; the timeout comes from `[llm] timeout_secs`.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use verdict_common::config::LlmConfig;

use super::{GenerationRequest, LanguageModel, LlmError, ResponseFormat};

/// User-Agent header sent with every request
const USER_AGENT: &str = concat!("verdict-api/", env!("CARGO_PKG_VERSION"));

/// Longest error body kept in an [`LlmError::Status`]
const MAX_ERROR_BODY: usize = 512;

/// Hosted Gemini model
pub struct GeminiClient {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self, LlmError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(USER_AGENT),
        );

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| LlmError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

// Wire types for generateContent

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum Part {
    Text(String),
    InlineData(InlineData),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

fn build_body(request: GenerationRequest) -> GenerateContentBody {
    let mut parts = vec![Part::Text(request.prompt)];
    if let Some(audio) = request.audio {
        parts.push(Part::InlineData(InlineData {
            mime_type: audio.mime_type,
            data: audio.data,
        }));
    }

    let generation_config = match request.format {
        ResponseFormat::Json => Some(GenerationConfig {
            response_mime_type: "application/json",
        }),
        ResponseFormat::Text => None,
    };

    GenerateContentBody {
        contents: vec![Content { role: "user", parts }],
        generation_config,
    }
}

/// Concatenated text parts of the first candidate
fn extract_text(response: GenerateContentResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, LlmError> {
        let body = build_body(request);
        debug!(model = %self.model, "Calling generateContent");

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body: String = text.chars().take(MAX_ERROR_BODY).collect();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        extract_text(parsed).ok_or(LlmError::EmptyResponse)
    }
}
