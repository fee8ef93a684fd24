use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::{AccountError, PipelineError};

pub type ApiResult<T> = Result<T, ApiError>;

/// Which notes endpoint an error came from; picks the generic server-side message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotesOperation {
    Text,
    Image,
    Video,
}

impl NotesOperation {
    fn server_message(&self) -> &'static str {
        match self {
            Self::Text => "Failed to generate notes. Please try again.",
            Self::Image => "Failed to process image. Please try again.",
            Self::Video => "Failed to process video. Please try again later.",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("{1}")]
    Notes(NotesOperation, PipelineError),

    #[error("{0}")]
    Internal(String),

    #[error("Not found")]
    NotFound,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Notes(_, err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Notes(..) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// The message shown to the caller. Server-side causes stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::Notes(op, err) => match err {
                PipelineError::InvalidRequest(msg) => msg.clone(),
                PipelineError::ImageDecodeError(_) => {
                    "Uploaded file is not a readable image".to_string()
                }
                PipelineError::InsufficientText => {
                    "Could not extract sufficient text from the image".to_string()
                }
                PipelineError::VideoInfoUnavailable(_) => {
                    "Could not extract information from the video".to_string()
                }
                PipelineError::OcrFailed(_) | PipelineError::GenerationFailed { .. } => {
                    op.server_message().to_string()
                }
            },
            Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{} -> {}: {}", status, self.public_message(), self);
        }

        let body = match &self {
            Self::Validation(errors) => json!({
                "error": self.public_message(),
                "errors": errors,
            }),
            _ => json!({ "error": self.public_message() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Validation(errors) => Self::Validation(errors),
            AccountError::InvalidCredentials | AccountError::Unauthenticated => {
                Self::Unauthorized(err.to_string())
            }
            AccountError::Storage(_) | AccountError::Hashing(_) => Self::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_fault_kinds_are_400() {
        for err in [
            PipelineError::InvalidRequest("No text provided".into()),
            PipelineError::ImageDecodeError("bad".into()),
            PipelineError::InsufficientText,
            PipelineError::VideoInfoUnavailable("private".into()),
        ] {
            assert_eq!(
                ApiError::Notes(NotesOperation::Image, err).status_code(),
                StatusCode::BAD_REQUEST
            );
        }
    }

    #[test]
    fn backend_failure_hides_cause() {
        let err = ApiError::Notes(
            NotesOperation::Text,
            PipelineError::GenerationFailed {
                cause: "quota exceeded for key sk-123".into(),
            },
        );
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.public_message(),
            "Failed to generate notes. Please try again."
        );
    }

    #[test]
    fn ocr_failure_is_server_side() {
        let err = ApiError::Notes(NotesOperation::Image, PipelineError::OcrFailed("exit 1".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.public_message().contains("exit 1"));
    }

    #[test]
    fn account_errors_map_to_status() {
        assert_eq!(
            ApiError::from(AccountError::InvalidCredentials).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AccountError::Validation(vec!["x".into()])).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
