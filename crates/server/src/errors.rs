use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use reports::ReportError;

use crate::observability::REPORT_ERRORS_TOTAL;

/// HTTP boundary for `ReportError`.
///
/// Validation → 422, upstream unreachable → 503, upstream non-2xx → its own
/// status with the body echoed, anything else → 500. Body shape is
/// `{"error": <message>}`.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub ReportError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self.0 {
            ReportError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            ReportError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            ReportError::Upstream { status, body } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                body.clone(),
            ),
            ReportError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()),
        };
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %msg, "report request failed");
        }
        REPORT_ERRORS_TOTAL.inc();
        (status, Json(serde_json::json!({"error": msg}))).into_response()
    }
}
