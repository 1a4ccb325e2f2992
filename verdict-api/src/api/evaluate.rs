//! Idea evaluation endpoints
//!
//! Both answer successfully whether or not the model is reachable.

use axum::{extract::State, routing::post, Router};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;
use verdict_common::models::ChatMessage;

use super::{non_blank, ok, Envelope};
use crate::error::{ApiError, ApiResult, JsonBody};
use crate::services::{ChatReply, ChatTurn, EvaluationSubject, Evaluator};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Option<Vec<ChatMessage>>,
    pub idea_name: Option<String>,
    pub current_axis: Option<String>,
    #[serde(default)]
    pub axes: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoEvaluateRequest {
    pub idea_name: Option<String>,
    pub description: Option<String>,
    pub axes: Option<Vec<String>>,
    pub topic_name: Option<String>,
    pub topic_goal: Option<String>,
}

/// POST /chat
pub async fn chat(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ChatRequest>,
) -> ApiResult<Envelope<ChatReply>> {
    let (messages, idea_name, current_axis) = match (
        request.messages.as_deref(),
        non_blank(request.idea_name.as_deref()),
        non_blank(request.current_axis.as_deref()),
    ) {
        (Some(messages), Some(idea), Some(axis)) => (messages, idea, axis),
        _ => return Err(ApiError::BadRequest("Invalid request body".to_string())),
    };

    debug!(idea = %idea_name, axis = %current_axis, turns = messages.len(), "Chat turn");

    let reply = Evaluator::new(state.model(), &state.random)
        .chat(ChatTurn {
            messages,
            idea_name,
            current_axis,
            axes: &request.axes,
        })
        .await;

    Ok(ok(reply))
}

/// POST /auto-evaluate
pub async fn auto_evaluate(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<AutoEvaluateRequest>,
) -> ApiResult<Envelope<BTreeMap<String, String>>> {
    let (idea_name, axes) = match (non_blank(request.idea_name.as_deref()), request.axes.as_deref())
    {
        (Some(idea), Some(axes)) if !axes.is_empty() => (idea, axes),
        _ => {
            return Err(ApiError::BadRequest(
                "Idea name and axes are required".to_string(),
            ))
        }
    };

    let evaluations = Evaluator::new(state.model(), &state.random)
        .auto_evaluate(EvaluationSubject {
            idea_name,
            description: non_blank(request.description.as_deref()),
            axes,
            topic_name: non_blank(request.topic_name.as_deref()),
            topic_goal: non_blank(request.topic_goal.as_deref()),
        })
        .await;

    Ok(ok(evaluations))
}

pub fn evaluation_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat))
        .route("/auto-evaluate", post(auto_evaluate))
}
