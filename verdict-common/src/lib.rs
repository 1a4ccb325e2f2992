//! # Verdict Common Library
//!
//! Shared code for the Verdict decision-support service:
//! - Domain model (topics, ideas, transcripts, judgments)
//! - Topic repository trait with JSON-file and SQLite backends
//! - Rule-based fallback judge
//! - Configuration loading
//! - API response envelope
//! - Seedable randomness for placeholder values

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod random;
pub mod scoring;
pub mod store;

pub use error::{Error, Result};
pub use scoring::{FallbackJudge, KeywordTable};
pub use store::TopicRepository;
