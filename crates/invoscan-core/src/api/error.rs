//! Mapping of pipeline errors to HTTP replies.
//!
//! Error bodies are plain text. Engine details stay in the logs.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::InvoscanError;

pub const NO_FILE: &str = "No file uploaded.";
pub const UNSUPPORTED_TYPE: &str = "Unsupported file type. Please upload a JPEG, PNG, or PDF.";
pub const PROCESSING_FAILED: &str = "An error occurred while processing the file.";

/// A plain-text error reply.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_FAILED)
    }
}

impl From<InvoscanError> for ApiError {
    fn from(error: InvoscanError) -> Self {
        match error {
            InvoscanError::NoFile => Self::new(StatusCode::BAD_REQUEST, NO_FILE),
            InvoscanError::UnsupportedFileType(_) => Self::new(StatusCode::BAD_REQUEST, UNSUPPORTED_TYPE),
            // Already logged by the pipeline or the handler
            _ => Self::internal(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(error: MultipartError) -> Self {
        // Over-limit bodies surface here as 413
        Self::new(error.status(), error.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcrError;

    #[test]
    fn test_client_errors_are_bad_request() {
        let err = ApiError::from(InvoscanError::NoFile);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, NO_FILE);

        let err = ApiError::from(InvoscanError::UnsupportedFileType(".txt".into()));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, UNSUPPORTED_TYPE);
    }

    #[test]
    fn test_engine_errors_are_generic() {
        let err = ApiError::from(InvoscanError::Ocr(OcrError::Recognition("model exploded".into())));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, PROCESSING_FAILED);

        let err = ApiError::from(InvoscanError::Timeout(5));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
