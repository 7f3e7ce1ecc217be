use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

/// Uniform envelope shared by every API response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub code: u16,
    pub details: String,
}

/// Builds a 200 envelope with an optional data payload.
pub fn success<T: Serialize>(
    message: impl Into<String>,
    data: Option<T>,
) -> (StatusCode, Json<ApiResponse<T>>) {
    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            message: message.into(),
            data,
            error: None,
        }),
    )
}
