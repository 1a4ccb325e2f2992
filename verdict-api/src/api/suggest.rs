//! Axis and idea suggestion endpoints

use axum::{extract::State, routing::post, Router};
use serde::Deserialize;
use verdict_common::models::{SuggestedAxis, SuggestedIdea};

use super::{non_blank, ok, Envelope};
use crate::error::{ApiError, ApiResult, JsonBody};
use crate::services::{IdeaSketch, Suggester, SuggestionContext};
use crate::AppState;

const TOPIC_NAME_REQUIRED: &str = "Topic name is required";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestAxesRequest {
    pub topic_name: Option<String>,
    pub goal: Option<String>,
    #[serde(default)]
    pub existing_axes: Vec<String>,
    pub transcript: Option<String>,
    #[serde(default)]
    pub ideas: Vec<IdeaSketch>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestIdeasRequest {
    pub topic_name: Option<String>,
    pub goal: Option<String>,
    #[serde(default)]
    pub axes: Vec<String>,
    pub transcript: Option<String>,
    #[serde(default)]
    pub existing_ideas: Vec<IdeaSketch>,
}

/// POST /suggest-axes
pub async fn suggest_axes(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SuggestAxesRequest>,
) -> ApiResult<Envelope<Vec<SuggestedAxis>>> {
    let topic_name = non_blank(request.topic_name.as_deref())
        .ok_or_else(|| ApiError::BadRequest(TOPIC_NAME_REQUIRED.to_string()))?;

    let context = SuggestionContext {
        topic_name,
        goal: non_blank(request.goal.as_deref()),
        transcript: non_blank(request.transcript.as_deref()),
    };

    let axes = Suggester::new(state.model())
        .suggest_axes(context, &request.existing_axes, &request.ideas)
        .await;
    Ok(ok(axes))
}

/// POST /suggest-ideas
pub async fn suggest_ideas(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SuggestIdeasRequest>,
) -> ApiResult<Envelope<Vec<SuggestedIdea>>> {
    let topic_name = non_blank(request.topic_name.as_deref())
        .ok_or_else(|| ApiError::BadRequest(TOPIC_NAME_REQUIRED.to_string()))?;

    let context = SuggestionContext {
        topic_name,
        goal: non_blank(request.goal.as_deref()),
        transcript: non_blank(request.transcript.as_deref()),
    };

    let ideas = Suggester::new(state.model())
        .suggest_ideas(context, &request.axes, &request.existing_ideas)
        .await;
    Ok(ok(ideas))
}

pub fn suggestion_routes() -> Router<AppState> {
    Router::new()
        .route("/suggest-axes", post(suggest_axes))
        .route("/suggest-ideas", post(suggest_ideas))
}
