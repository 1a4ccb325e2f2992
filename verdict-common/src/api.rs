//! Shared API response envelope
//!
//! Every JSON endpoint except `/health` answers with
//! `{ "success": bool, "data"?: T, "error"?: string }`.

use serde::{Deserialize, Serialize};

/// Response envelope
///
/// # Examples
///
/// ```
/// use verdict_common::api::ApiResponse;
///
/// let ok = ApiResponse::ok(vec!["cost"]);
/// assert!(ok.success);
///
/// let failed = ApiResponse::<()>::failure("Topic not found");
/// assert_eq!(failed.error.as_deref(), Some("Topic not found"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Failed response with a client-facing message
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}
