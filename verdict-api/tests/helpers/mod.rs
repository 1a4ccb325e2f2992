//! Shared fixtures for verdict-api integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use verdict_api::llm::{GenerationRequest, LanguageModel, LlmError};
use verdict_api::services::PdfRenderer;
use verdict_api::{build_router, AppState};
use verdict_common::config::PdfConfig;
use verdict_common::random::RandomSource;
use verdict_common::store::JsonFileStore;
use verdict_common::TopicRepository;

/// Model double answering from a queue of scripted replies
///
/// An exhausted queue answers with a network error.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(reply: &str) -> Self {
        Self::new(vec![Ok(reply.to_string())])
    }

    pub fn failing(error: LlmError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted-model"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Network("no scripted reply".to_string())))
    }
}

/// Router over a fresh JSON store; keep the `TempDir` alive for the test
pub struct TestApp {
    pub dir: TempDir,
    pub store: Arc<dyn TopicRepository>,
    pub router: Router,
}

pub async fn setup_app(llm: Option<Arc<dyn LanguageModel>>) -> TestApp {
    let dir = TempDir::new().expect("Should create temp dir");
    let store: Arc<dyn TopicRepository> = Arc::new(
        JsonFileStore::open(dir.path())
            .await
            .expect("Should open store"),
    );

    // Copies the Markdown through so exports are observable without pandoc
    let converter = PdfConfig {
        converter: "sh".to_string(),
        args: vec![
            "-c".to_string(),
            "cp \"$0\" \"$1\"".to_string(),
            "{input}".to_string(),
            "{output}".to_string(),
        ],
    };

    let state = AppState::new(store.clone(), llm)
        .with_random(RandomSource::seeded(7))
        .with_pdf_renderer(PdfRenderer::new(&converter, dir.path().join("tmp")));

    TestApp {
        router: build_router(state),
        store,
        dir,
    }
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn raw_json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Extract JSON body from response
pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

pub async fn extract_bytes(body: Body) -> Vec<u8> {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body")
        .to_vec()
}
