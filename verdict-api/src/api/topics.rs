//! Topic CRUD
//!
//! PUT replaces the fields present in the body and writes the whole
//! aggregate back; the id always comes from the path.

use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::info;
use verdict_common::models::{NewTopic, Topic, TopicDetail, TopicUpdate};

use super::{non_blank, ok, Envelope};
use crate::error::{ApiError, ApiResult, JsonBody};
use crate::AppState;

const TOPIC_NOT_FOUND: &str = "Topic not found";

#[derive(Debug, Deserialize)]
pub struct CreateTopicRequest {
    pub name: Option<String>,
    pub goal: Option<String>,
    pub axes: Option<Vec<String>>,
}

/// GET /topics
pub async fn list_topics(State(state): State<AppState>) -> ApiResult<Envelope<Vec<Topic>>> {
    let topics = state.store.list().await?;
    Ok(ok(topics))
}

/// POST /topics
pub async fn create_topic(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateTopicRequest>,
) -> ApiResult<Envelope<Topic>> {
    let (name, axes) = match (non_blank(request.name.as_deref()), request.axes) {
        (Some(name), Some(axes)) => (name.to_string(), axes),
        _ => {
            return Err(ApiError::BadRequest(
                "Invalid request body. Name and axes are required.".to_string(),
            ))
        }
    };

    let topic = state
        .store
        .create(NewTopic {
            name,
            goal: request.goal,
            axes,
        })
        .await?;

    info!(topic_id = %topic.id, name = %topic.name, "Topic created");
    Ok(ok(topic))
}

/// GET /topics/:id
pub async fn get_topic(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<TopicDetail>> {
    let topic = state
        .store
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(TOPIC_NOT_FOUND.to_string()))?;
    Ok(ok(topic))
}

/// PUT /topics/:id
pub async fn update_topic(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<TopicUpdate>,
) -> ApiResult<Envelope<TopicDetail>> {
    let mut topic = state
        .store
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(TOPIC_NOT_FOUND.to_string()))?;

    update.apply_to(&mut topic);
    topic.id = id;

    let saved = state
        .store
        .replace(topic)
        .await?
        .ok_or_else(|| ApiError::NotFound(TOPIC_NOT_FOUND.to_string()))?;

    info!(topic_id = %saved.id, ideas = saved.ideas.len(), "Topic updated");
    Ok(ok(saved))
}

/// DELETE /topics/:id
pub async fn delete_topic(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<bool>> {
    if !state.store.delete(&id).await? {
        return Err(ApiError::NotFound(TOPIC_NOT_FOUND.to_string()));
    }

    info!(topic_id = %id, "Topic deleted");
    Ok(ok(true))
}

pub fn topic_routes() -> Router<AppState> {
    Router::new()
        .route("/topics", get(list_topics).post(create_topic))
        .route(
            "/topics/:id",
            get(get_topic).put(update_topic).delete(delete_topic),
        )
}
