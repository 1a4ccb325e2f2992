//! Error types for verdict-api
//!
//! Every failure leaves the service inside the standard envelope
//! `{ "success": false, "error": "<message>" }`. Messages for 500s are
//! generic; details go to the log.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use std::fmt::Display;
use thiserror::Error;
use tracing::{error, warn};
use verdict_common::api::ApiResponse;

/// Message returned for failures whose details stay in the log
const GENERIC_INTERNAL_MESSAGE: &str = "Internal server error";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Internal server error (500) with a client-safe message
    #[error("Internal server error: {0}")]
    Internal(String),

    /// verdict-common error
    #[error("Common error: {0}")]
    Common(#[from] verdict_common::Error),
}

impl ApiError {
    /// Log `cause` and return a 500 carrying only `message`
    pub fn internal(message: &str, cause: impl Display) -> Self {
        error!(error = %cause, "{}", message);
        ApiError::Internal(message.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Common(verdict_common::Error::NotFound(msg)) => (StatusCode::NOT_FOUND, msg),
            ApiError::Common(verdict_common::Error::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, msg)
            }
            ApiError::Common(err) => {
                error!(error = %err, "Unhandled store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    GENERIC_INTERNAL_MESSAGE.to_string(),
                )
            }
        };

        (status, Json(ApiResponse::<()>::failure(message))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// JSON body extractor whose rejections use the envelope
///
/// Undecodable or mistyped bodies become 400 `Invalid request body`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                warn!(error = %rejection.body_text(), "Rejected request body");
                Err(ApiError::BadRequest("Invalid request body".to_string()))
            }
        }
    }
}

/// Query string extractor whose rejections use the envelope
///
/// Undecodable query strings become 400 `Invalid query string`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(QueryParams(value)),
            Err(rejection) => {
                warn!(error = %rejection.body_text(), "Rejected query string");
                Err(ApiError::BadRequest("Invalid query string".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_envelope() {
        let response = ApiError::NotFound("Topic not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Topic not found");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_store_failure_is_generic() {
        let err = verdict_common::Error::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "/secret/path denied",
        ));
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], GENERIC_INTERNAL_MESSAGE);
    }

    #[derive(Debug, serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct TopicQuery {
        topic_id: Option<String>,
    }

    async fn extract_query(uri: &str) -> Result<QueryParams<TopicQuery>, ApiError> {
        let request = axum::http::Request::builder().uri(uri).body(()).unwrap();
        let (mut parts, _) = request.into_parts();
        QueryParams::<TopicQuery>::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_query_params_decode() {
        let QueryParams(query) = extract_query("/transcript?topicId=abc").await.unwrap();
        assert_eq!(query.topic_id.as_deref(), Some("abc"));

        let QueryParams(query) = extract_query("/transcript").await.unwrap();
        assert!(query.topic_id.is_none());
    }

    #[tokio::test]
    async fn test_query_params_rejection_is_envelope() {
        let err = extract_query("/transcript?topicId=a&topicId=b").await.unwrap_err();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Invalid query string");
    }

    #[tokio::test]
    async fn test_common_invalid_input_is_bad_request() {
        let err = verdict_common::Error::InvalidInput("bad id".to_string());
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
