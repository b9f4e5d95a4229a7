//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`ps_core::Error`] so that route handlers
//! can return `Result<T, AppError>` and use `?` on repository calls.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: ps_core::Error,
}

impl AppError {
    pub fn new(inner: ps_core::Error) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &ps_core::Error {
        &self.inner
    }
}

impl From<ps_core::Error> for AppError {
    fn from(e: ps_core::Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                "Server error in API handler"
            );
        }

        let body = json!({
            "error": self.inner.to_string(),
            "code": self.inner.code(),
        });

        (status, axum::Json(body)).into_response()
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

    #[tokio::test]
    async fn not_found_produces_404() {
        let response = AppError::new(ps_core::Error::not_found("cat.png")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = body_json(response).await;
        assert_eq!(json["code"], "not_found");
        assert_eq!(json["error"], "image not found: cat.png");
    }

    #[test]
    fn validation_produces_400() {
        let err = AppError::new(ps_core::Error::Validation("image name is required".into()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn already_exists_produces_500() {
        let err = AppError::new(ps_core::Error::already_exists("cat.png"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn decode_produces_500() {
        let err = AppError::from(ps_core::Error::Decode("bad header".into()));
        assert!(matches!(err.inner(), ps_core::Error::Decode(_)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
