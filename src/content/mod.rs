//! Normalisation of every accepted input modality into prompt-ready text.

pub mod ocr;
pub mod video;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::error::ContentError;

pub use ocr::{decode_image, OcrEngine, TesseractOcr};
pub use video::{RawVideoInfo, VideoInfoSource, YtDlpSource};

/// OCR output shorter than this (after trimming) is treated as noise.
pub const MIN_OCR_CHARS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    Text,
    Image,
    VideoUrl,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedContent {
    pub text: String,
    pub source_kind: SourceKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub duration_seconds: u64,
    pub channel: String,
    pub view_count: u64,
    pub upload_date: String,
}

impl Default for VideoMetadata {
    fn default() -> Self {
        Self {
            title: "Unknown Title".to_string(),
            description: String::new(),
            duration_seconds: 0,
            channel: "Unknown Channel".to_string(),
            view_count: 0,
            upload_date: String::new(),
        }
    }
}

impl From<RawVideoInfo> for VideoMetadata {
    fn from(raw: RawVideoInfo) -> Self {
        let defaults = Self::default();
        Self {
            title: raw.title.unwrap_or(defaults.title),
            description: raw.description.unwrap_or(defaults.description),
            duration_seconds: raw
                .duration
                .filter(|d| d.is_finite() && *d > 0.0)
                .map(|d| d.round() as u64)
                .unwrap_or(defaults.duration_seconds),
            channel: raw.uploader.unwrap_or(defaults.channel),
            view_count: raw.view_count.unwrap_or(defaults.view_count),
            upload_date: raw.upload_date.unwrap_or(defaults.upload_date),
        }
    }
}

impl VideoMetadata {
    /// The block the video prompt family is filled with.
    pub fn prompt_block(&self) -> String {
        format!(
            "YouTube Video: {}\nChannel: {}\nDescription: {}\nDuration: {} seconds\n",
            self.title, self.channel, self.description, self.duration_seconds
        )
    }

    pub fn into_content(self) -> NormalizedContent {
        NormalizedContent {
            text: self.prompt_block(),
            source_kind: SourceKind::VideoUrl,
        }
    }
}

/// Converts raw inputs into [`NormalizedContent`], calling out to the OCR
/// engine and the video-metadata source where needed.
#[derive(Clone)]
pub struct ContentNormalizer {
    ocr: Arc<dyn OcrEngine>,
    video: Arc<dyn VideoInfoSource>,
    ocr_timeout: Duration,
    video_timeout: Duration,
}

impl ContentNormalizer {
    pub fn new(
        ocr: Arc<dyn OcrEngine>,
        video: Arc<dyn VideoInfoSource>,
        ocr_timeout: Duration,
        video_timeout: Duration,
    ) -> Self {
        Self {
            ocr,
            video,
            ocr_timeout,
            video_timeout,
        }
    }

    pub fn from_text(&self, raw: &str) -> Result<NormalizedContent, ContentError> {
        if raw.trim().is_empty() {
            return Err(ContentError::EmptyInput);
        }
        Ok(NormalizedContent {
            text: raw.to_string(),
            source_kind: SourceKind::Text,
        })
    }

    pub async fn from_image(&self, bytes: &[u8]) -> Result<NormalizedContent, ContentError> {
        let image = decode_image(bytes)?;

        let extracted = tokio::time::timeout(self.ocr_timeout, self.ocr.extract_text(&image))
            .await
            .map_err(|_| {
                ContentError::Ocr(format!("OCR timed out after {:?}", self.ocr_timeout))
            })??;

        let text = extracted.trim();
        let chars = text.chars().count();
        if chars < MIN_OCR_CHARS {
            return Err(ContentError::InsufficientText { chars });
        }

        Ok(NormalizedContent {
            text: text.to_string(),
            source_kind: SourceKind::Image,
        })
    }

    pub async fn from_video_url(&self, url: &str) -> Result<VideoMetadata, ContentError> {
        let url = url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            let reason = format!("Not an http(s) URL: {}", url);
            return Err(ContentError::VideoInfoUnavailable(reason));
        }

        let raw = tokio::time::timeout(self.video_timeout, self.video.fetch_info(url))
            .await
            .map_err(|_| {
                ContentError::VideoInfoUnavailable(format!(
                    "metadata lookup timed out after {:?}",
                    self.video_timeout
                ))
            })??;

        Ok(VideoMetadata::from(raw))
    }
}
