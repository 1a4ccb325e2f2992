//! verdict-api library interface
//!
//! HTTP service for topics, ideas, evaluations and AI-assisted judgments.
//! Exposed as a library so integration tests can drive the router directly.

pub mod api;
pub mod error;
pub mod llm;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use verdict_common::config::PdfConfig;
use verdict_common::random::RandomSource;
use verdict_common::{FallbackJudge, KeywordTable, TopicRepository};

use crate::llm::LanguageModel;
use crate::services::PdfRenderer;

/// Request body cap; recorded audio arrives base64-encoded in JSON
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Model name shown in reports when no model is configured
pub const FALLBACK_MODEL_NAME: &str = "rule-based fallback";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Topic persistence
    pub store: Arc<dyn TopicRepository>,
    /// Hosted model; `None` means every AI feature uses its fallback
    pub llm: Option<Arc<dyn LanguageModel>>,
    /// Rule-based judge
    pub fallback: Arc<FallbackJudge>,
    /// Template choice and placeholder confidence
    pub random: Arc<RandomSource>,
    pub pdf: Arc<PdfRenderer>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: Arc<dyn TopicRepository>, llm: Option<Arc<dyn LanguageModel>>) -> Self {
        let work_dir = std::env::temp_dir().join("verdict-reports");

        Self {
            store,
            llm,
            fallback: Arc::new(FallbackJudge::default()),
            random: Arc::new(RandomSource::new(None)),
            pdf: Arc::new(PdfRenderer::new(&PdfConfig::default(), work_dir)),
            startup_time: Utc::now(),
        }
    }

    pub fn with_keyword_table(mut self, table: KeywordTable) -> Self {
        self.fallback = Arc::new(FallbackJudge::new(table));
        self
    }

    pub fn with_random(mut self, random: RandomSource) -> Self {
        self.random = Arc::new(random);
        self
    }

    pub fn with_pdf_renderer(mut self, renderer: PdfRenderer) -> Self {
        self.pdf = Arc::new(renderer);
        self
    }

    /// Borrowed model handle for services
    pub fn model(&self) -> Option<&dyn LanguageModel> {
        self.llm.as_deref()
    }

    pub fn model_name(&self) -> &str {
        self.model().map(|m| m.model_name()).unwrap_or(FALLBACK_MODEL_NAME)
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::topic_routes())
        .merge(api::evaluation_routes())
        .merge(api::judge_routes())
        .merge(api::suggestion_routes())
        .merge(api::transcript_routes())
        .merge(api::export_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
