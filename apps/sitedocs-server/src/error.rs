//! Error types for the site documents server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use form_overlay::OverlayError;
use serde::Serialize;
use thiserror::Error;

use crate::ocr::OcrError;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Missing upload: {0}")]
    MissingUpload(String),

    #[error("No text detected in image")]
    NoTextDetected,

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Font unavailable: {0}")]
    FontUnavailable(String),

    #[error("OCR provider error: {0}")]
    OcrProvider(String),

    #[error("OCR provider not configured")]
    OcrUnavailable,

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl ServerError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ServerError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ServerError::MissingUpload(_) => (StatusCode::BAD_REQUEST, "MISSING_UPLOAD"),
            ServerError::NoTextDetected => (StatusCode::BAD_REQUEST, "NO_TEXT_DETECTED"),
            ServerError::ImageDecode(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "IMAGE_DECODE_ERROR")
            }
            ServerError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
            ServerError::FontUnavailable(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "FONT_UNAVAILABLE")
            }
            ServerError::OcrProvider(_) => (StatusCode::BAD_GATEWAY, "OCR_PROVIDER_ERROR"),
            ServerError::OcrUnavailable => (StatusCode::SERVICE_UNAVAILABLE, "OCR_UNAVAILABLE"),
            ServerError::Timeout(_) => (StatusCode::REQUEST_TIMEOUT, "TIMEOUT"),
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!("{} ({})", self, code);
        } else {
            tracing::debug!("Rejected request: {} ({})", self, code);
        }

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<OverlayError> for ServerError {
    fn from(err: OverlayError) -> Self {
        match err {
            OverlayError::Validation(msg) => ServerError::Validation(msg),
            OverlayError::ImageDecode(msg) => ServerError::ImageDecode(msg),
            err @ OverlayError::Io { .. } => ServerError::Io(err.to_string()),
            OverlayError::FontUnavailable(field) => ServerError::FontUnavailable(format!(
                "no font loaded to draw field '{}'",
                field
            )),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl From<OcrError> for ServerError {
    fn from(err: OcrError) -> Self {
        ServerError::OcrProvider(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_errors_map_to_kinds() {
        let io = OverlayError::Io {
            path: "/forms/out.png".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(matches!(ServerError::from(io), ServerError::Io(_)));
        assert!(matches!(
            ServerError::from(OverlayError::ImageDecode("bad".into())),
            ServerError::ImageDecode(_)
        ));
        assert!(matches!(
            ServerError::from(OverlayError::Validation("bad".into())),
            ServerError::Validation(_)
        ));
        assert!(matches!(
            ServerError::from(OverlayError::Encode("bad".into())),
            ServerError::Internal(_)
        ));
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (ServerError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ServerError::MissingUpload("x".into()), StatusCode::BAD_REQUEST),
            (ServerError::NoTextDetected, StatusCode::BAD_REQUEST),
            (ServerError::ImageDecode("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (ServerError::Io("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ServerError::OcrUnavailable, StatusCode::SERVICE_UNAVAILABLE),
            (ServerError::Timeout(10), StatusCode::REQUEST_TIMEOUT),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
