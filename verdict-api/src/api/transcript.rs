//! Meeting transcript endpoints and speech-to-text

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tracing::{info, warn};
use verdict_common::models::TranscriptData;

use super::{non_blank, ok, Envelope};
use crate::error::{ApiError, ApiResult, JsonBody, QueryParams};
use crate::services::speech::{self, Transcription};
use crate::services::TranscriptLog;
use crate::AppState;

const TOPIC_NOT_FOUND: &str = "Topic not found";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptQuery {
    pub topic_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendRequest {
    pub topic_id: Option<String>,
    pub text: Option<String>,
    pub speaker: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveRequest {
    pub topic_id: Option<String>,
    pub entry_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRequest {
    pub audio: Option<String>,
    pub mime_type: Option<String>,
}

/// GET /transcript?topicId=
pub async fn get_transcript(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<TranscriptQuery>,
) -> ApiResult<Envelope<TranscriptData>> {
    let topic_id = non_blank(query.topic_id.as_deref())
        .ok_or_else(|| ApiError::BadRequest("Topic ID is required".to_string()))?;

    let transcript = TranscriptLog::new(state.store.as_ref(), &state.random)
        .load(topic_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(TOPIC_NOT_FOUND.to_string()))?;
    Ok(ok(transcript))
}

/// POST /transcript
pub async fn append_entry(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<AppendRequest>,
) -> ApiResult<Envelope<TranscriptData>> {
    let (topic_id, text) = match (
        non_blank(request.topic_id.as_deref()),
        non_blank(request.text.as_deref()),
    ) {
        (Some(topic_id), Some(text)) => (topic_id, text),
        _ => {
            return Err(ApiError::BadRequest(
                "Topic ID and text are required".to_string(),
            ))
        }
    };

    let transcript = TranscriptLog::new(state.store.as_ref(), &state.random)
        .append(topic_id, text, request.speaker.as_deref())
        .await?
        .ok_or_else(|| ApiError::NotFound(TOPIC_NOT_FOUND.to_string()))?;
    Ok(ok(transcript))
}

/// DELETE /transcript
pub async fn remove_entry(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RemoveRequest>,
) -> ApiResult<Envelope<TranscriptData>> {
    let (topic_id, entry_id) = match (
        non_blank(request.topic_id.as_deref()),
        non_blank(request.entry_id.as_deref()),
    ) {
        (Some(topic_id), Some(entry_id)) => (topic_id, entry_id),
        _ => {
            return Err(ApiError::BadRequest(
                "Topic ID and entry ID are required".to_string(),
            ))
        }
    };

    let transcript = TranscriptLog::new(state.store.as_ref(), &state.random)
        .remove(topic_id, entry_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(TOPIC_NOT_FOUND.to_string()))?;

    info!(topic_id = %topic_id, entry_id = %entry_id, "Transcript entry removed");
    Ok(ok(transcript))
}

/// POST /speech-to-text
pub async fn speech_to_text(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SpeechRequest>,
) -> ApiResult<Envelope<Transcription>> {
    let audio = non_blank(request.audio.as_deref())
        .ok_or_else(|| ApiError::BadRequest("Audio data is required".to_string()))?;

    if !speech::is_valid_base64(audio) {
        warn!(bytes = audio.len(), "Audio payload is not valid base64");
        return Err(ApiError::BadRequest(
            "Audio data must be base64-encoded".to_string(),
        ));
    }

    let transcription = speech::transcribe(state.model(), audio, request.mime_type.as_deref())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    info!(entries = transcription.entries.len(), "Audio transcribed");
    Ok(ok(transcription))
}

pub fn transcript_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/transcript",
            get(get_transcript).post(append_entry).delete(remove_entry),
        )
        .route("/speech-to-text", post(speech_to_text))
}
