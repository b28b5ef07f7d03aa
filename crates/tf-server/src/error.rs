//! Error-to-HTTP response conversion.
//!
//! Route handlers return `Result<T, AppError>`; any [`tf_core::Error`]
//! converts with `?`. The response body is
//! `{"error": ..., "code": ..., "request_id": ...}` where `error` is the
//! sanitized public message. The full error is only ever logged.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::middleware::request_id::current_request_id;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: tf_core::Error,
    request_id: Option<String>,
}

impl AppError {
    pub fn new(inner: tf_core::Error) -> Self {
        Self {
            inner,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, id: String) -> Self {
        self.request_id = Some(id);
        self
    }

    pub fn inner(&self) -> &tf_core::Error {
        &self.inner
    }
}

impl From<tf_core::Error> for AppError {
    fn from(e: tf_core::Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let request_id = self.request_id.or_else(current_request_id);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                code = self.inner.code(),
                request_id = request_id.as_deref().unwrap_or("-"),
                error = %self.inner,
                "Server error in API handler"
            );
        }

        let body = json!({
            "error": self.inner.public_message(),
            "code": self.inner.code(),
            "request_id": request_id,
        });

        let mut response = (status, axum::Json(body)).into_response();

        if let tf_core::Error::RangeNotSatisfiable { size } = self.inner {
            if let Ok(val) = HeaderValue::from_str(&format!("bytes */{size}")) {
                response.headers_mut().insert(header::CONTENT_RANGE, val);
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn not_found_produces_404() {
        let err = AppError::new(tf_core::Error::not_found("track", 7));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn encoder_unavailable_produces_503() {
        let err = AppError::new(tf_core::Error::encoder_unavailable("ffmpeg", "not in PATH"));
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn range_not_satisfiable_carries_content_range() {
        let response = AppError::new(tf_core::Error::RangeNotSatisfiable { size: 1400 }).into_response();
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes */1400");
    }

    #[tokio::test]
    async fn server_error_body_is_sanitized() {
        let err = AppError::new(tf_core::Error::metadata_write(
            "create",
            tf_core::Error::database("disk I/O error at /var/lib/secret.db"),
        ))
        .with_request_id("req-123".into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["code"], "metadata_write_failed");
        assert_eq!(body["error"], "failed to record track");
        assert_eq!(body["request_id"], "req-123");
        assert!(!body.to_string().contains("secret"));
    }

    #[tokio::test]
    async fn request_id_is_null_outside_a_request() {
        let body = body_json(AppError::new(tf_core::Error::Validation("missing file".into())).into_response()).await;
        assert_eq!(body["error"], "Validation error: missing file");
        assert!(body["request_id"].is_null());
    }
}
