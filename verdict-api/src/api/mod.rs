//! HTTP handlers
//!
//! Every handler except `/health` answers with the
//! [`ApiResponse`](verdict_common::api::ApiResponse) envelope.

use axum::Json;
use verdict_common::api::ApiResponse;

pub mod evaluate;
pub mod export;
pub mod health;
pub mod judge;
pub mod suggest;
pub mod topics;
pub mod transcript;

pub use evaluate::evaluation_routes;
pub use export::export_routes;
pub use health::health_routes;
pub use judge::judge_routes;
pub use suggest::suggestion_routes;
pub use topics::topic_routes;
pub use transcript::transcript_routes;

/// Successful JSON response
pub type Envelope<T> = Json<ApiResponse<T>>;

pub(crate) fn ok<T>(data: T) -> Envelope<T> {
    Json(ApiResponse::ok(data))
}

/// Trimmed value when present and not blank
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
