use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use tracing::error;

/// Error response body: `{"message": ..., "error": ...}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>, detail: Option<String>) -> Self {
        Self { status, message: message.into(), detail }
    }

    /// Map a storage error with a context message. Validation is 400, everything else 500.
    pub fn from_service(message: &str, err: ServiceError) -> Self {
        let status = match err {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, message, Some(err.to_string()))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, message = %self.message, detail = ?self.detail, "request failed");
        }
        let body = serde_json::json!({
            "message": self.message,
            "error": self.detail.unwrap_or_default(),
        });
        (self.status, Json(body)).into_response()
    }
}
