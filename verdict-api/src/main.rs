//! verdict-api - Decision-support HTTP service
//!
//! Configuration priority: command line → environment → TOML file →
//! compiled defaults. Without an API key the service still starts and every
//! AI feature answers from its rule-based fallback.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use verdict_common::config::{resolve_api_key, resolve_data_dir, TomlConfig, CONFIG_PATH_ENV};
use verdict_common::random::RandomSource;
use verdict_common::store::open_store;
use verdict_api::llm::{GeminiClient, LanguageModel};
use verdict_api::services::PdfRenderer;
use verdict_api::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "verdict-api", version, about = "Verdict decision-support service")]
struct Args {
    /// Path to the TOML config file
    #[arg(long, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// Directory holding topic data
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Listen address (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Listen port (overrides config)
    #[arg(long)]
    port: Option<u16>,

    /// Gemini API key (falls back to GEMINI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, config_source) =
        TomlConfig::load_or_default(args.config.as_deref()).context("Failed to load config")?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        "Starting Verdict API (verdict-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match &config_source {
        Some(path) => info!("Loaded config from {}", path.display()),
        None => warn!("No config file found, using defaults"),
    }

    let data_dir = resolve_data_dir(args.data_dir.as_deref(), &config);
    info!(backend = ?config.storage.backend, "Data directory: {}", data_dir.display());

    let store = open_store(config.storage.backend, &data_dir)
        .await
        .context("Failed to open topic store")?;

    let llm: Option<Arc<dyn LanguageModel>> =
        match resolve_api_key(args.api_key.as_deref(), &config) {
            Some(key) => {
                let client: Arc<dyn LanguageModel> = Arc::new(GeminiClient::new(&config.llm, key)?);
                info!(model = %config.llm.model, "✓ Language model configured");
                Some(client)
            }
            None => {
                info!("No API key configured; AI features use rule-based fallbacks");
                None
            }
        };

    let state = AppState::new(store, llm)
        .with_keyword_table(config.scoring.clone())
        .with_random(RandomSource::new(config.random_seed))
        .with_pdf_renderer(PdfRenderer::new(&config.pdf, data_dir.join("tmp")));
    let app = build_router(state);

    let host = args.host.unwrap_or(config.server.host);
    let port = args.port.unwrap_or(config.server.port);
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("verdict-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
