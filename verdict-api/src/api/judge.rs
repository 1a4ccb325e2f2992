//! Judgment endpoint

use axum::{extract::State, routing::post, Router};
use serde::Deserialize;
use tracing::info;
use verdict_common::models::{Idea, JudgeResult};

use super::{non_blank, ok, Envelope};
use crate::error::{ApiError, ApiResult, JsonBody};
use crate::services::Judge;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeRequest {
    /// Required; ideas arrive inline, so the id is only logged
    pub topic_id: Option<String>,
    pub selected_axes: Option<Vec<String>>,
    pub transcript: Option<String>,
    #[serde(default)]
    pub ideas: Vec<Idea>,
}

/// POST /judge
pub async fn judge(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<JudgeRequest>,
) -> ApiResult<Envelope<JudgeResult>> {
    let (topic_id, axes) = match (
        non_blank(request.topic_id.as_deref()),
        request.selected_axes.as_deref(),
    ) {
        (Some(topic_id), Some(axes)) if !axes.is_empty() => (topic_id, axes),
        _ => {
            return Err(ApiError::BadRequest(
                "Topic ID and selected axes are required".to_string(),
            ))
        }
    };

    let result = Judge::new(state.model(), &state.fallback)
        .judge(axes, &request.ideas, non_blank(request.transcript.as_deref()))
        .await
        .ok_or_else(|| ApiError::BadRequest("At least one idea is required".to_string()))?;

    info!(
        topic_id = %topic_id,
        winner = %result.winner.name,
        ideas = result.ranking.len(),
        "Judgment complete"
    );
    Ok(ok(result))
}

pub fn judge_routes() -> Router<AppState> {
    Router::new().route("/judge", post(judge))
}
