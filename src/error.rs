//! Error taxonomy shared by the notes pipeline.
//!
//! Collaborator failures (OCR, video metadata, generation backend) are
//! expressed as their own enums and translated into [`PipelineError`] at
//! the orchestrator boundary. Nothing past that boundary sees a raw
//! collaborator error.

use thiserror::Error;

/// Failures while turning an input modality into prompt-ready text.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("input text is empty")]
    EmptyInput,

    #[error("image could not be decoded: {0}")]
    ImageDecode(String),

    #[error("extracted text too short ({chars} chars)")]
    InsufficientText { chars: usize },

    #[error("OCR engine failed: {0}")]
    Ocr(String),

    #[error("video info unavailable: {0}")]
    VideoInfoUnavailable(String),
}

/// Backend call failed; the adapter never returns partial text.
#[derive(Debug, Error)]
#[error("generation failed: {cause}")]
pub struct GenerationError {
    pub cause: String,
}

impl GenerationError {
    pub fn new(cause: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
        }
    }
}

/// Everything the orchestrator can surface to its caller.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("image could not be decoded: {0}")]
    ImageDecodeError(String),

    #[error("could not extract sufficient text from the image")]
    InsufficientText,

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("could not extract information from the video: {0}")]
    VideoInfoUnavailable(String),

    #[error("generation failed: {cause}")]
    GenerationFailed { cause: String },
}

impl PipelineError {
    /// Client-fault kinds: retrying the same request will not help.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_)
                | Self::ImageDecodeError(_)
                | Self::InsufficientText
                | Self::VideoInfoUnavailable(_)
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "InvalidRequest",
            Self::ImageDecodeError(_) => "ImageDecodeError",
            Self::InsufficientText => "InsufficientText",
            Self::OcrFailed(_) => "OcrFailed",
            Self::VideoInfoUnavailable(_) => "VideoInfoUnavailable",
            Self::GenerationFailed { .. } => "GenerationFailed",
        }
    }
}

impl From<ContentError> for PipelineError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::EmptyInput => Self::InvalidRequest("No text provided".to_string()),
            ContentError::ImageDecode(msg) => Self::ImageDecodeError(msg),
            ContentError::InsufficientText { .. } => Self::InsufficientText,
            ContentError::Ocr(msg) => Self::OcrFailed(msg),
            ContentError::VideoInfoUnavailable(msg) => Self::VideoInfoUnavailable(msg),
        }
    }
}

impl From<GenerationError> for PipelineError {
    fn from(err: GenerationError) -> Self {
        Self::GenerationFailed { cause: err.cause }
    }
}

/// Signup/login failures.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("session is missing or expired")]
    Unauthenticated,

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}
