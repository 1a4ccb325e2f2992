//! Per-feature services
//!
//! Each service borrows what it needs from [`crate::AppState`] for the
//! length of one request. AI-backed services take an optional model and
//! fall back to deterministic behaviour without one.

pub mod evaluate;
pub mod judge;
pub mod report;
pub mod speech;
pub mod suggest;
pub mod templates;
pub mod transcript;

pub use evaluate::{ChatReply, ChatTurn, EvaluationSubject, Evaluator};
pub use judge::Judge;
pub use report::PdfRenderer;
pub use suggest::{IdeaSketch, Suggester, SuggestionContext};
pub use transcript::TranscriptLog;
