//! Error conversions - HTTP rendering of [`AppError`]
//!
//! Behind the `axum` feature, an [`AppError`] renders as an RFC 7807
//! problem document.

#[cfg(feature = "axum")]
use super::app_error::AppError;

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // RFC 7807 Problem Details for HTTP APIs
        let mut body = serde_json::json!({
            "type": format!("https://httpstatuses.io/{}", self.status_code()),
            "title": self.kind().as_str(),
            "status": self.status_code(),
            "detail": self.message(),
        });
        if !self.fields().is_empty() {
            body["errors"] = serde_json::to_value(self.fields()).unwrap_or_default();
        }

        (status, Json(body)).into_response()
    }
}
