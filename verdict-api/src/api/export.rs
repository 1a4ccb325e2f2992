//! PDF report export

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use verdict_common::models::JudgeResult;

use super::non_blank;
use crate::error::{ApiError, ApiResult, JsonBody};
use crate::services::report::{attachment_filename, render_markdown};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub topic_id: Option<String>,
    pub judge_result: Option<JudgeResult>,
}

/// POST /export-pdf
///
/// Answers with the PDF itself rather than the JSON envelope.
pub async fn export_pdf(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ExportRequest>,
) -> ApiResult<Response> {
    let topic_id = non_blank(request.topic_id.as_deref())
        .ok_or_else(|| ApiError::BadRequest("Topic ID is required".to_string()))?;

    let topic = state
        .store
        .get(topic_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Topic not found".to_string()))?;

    let today = Utc::now().date_naive();
    let markdown = render_markdown(
        &topic,
        request.judge_result.as_ref(),
        state.model_name(),
        today,
    );

    let pdf = state
        .pdf
        .render(&markdown)
        .await
        .map_err(|e| ApiError::internal("Failed to export PDF", e))?;

    info!(topic_id = %topic_id, bytes = pdf.len(), "PDF report exported");

    let disposition = format!(
        "attachment; filename=\"{}\"",
        attachment_filename(&topic.name, today)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    )
        .into_response())
}

pub fn export_routes() -> Router<AppState> {
    Router::new().route("/export-pdf", post(export_pdf))
}
