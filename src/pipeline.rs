//! Request-to-notes orchestration.
//!
//! Every entry point follows the same path: validate, normalise, pick the
//! prompt template, generate once, wrap. The first failure short-circuits
//! the rest and is reported as a [`PipelineError`].

use bytes::Bytes;
use serde::Serialize;

use crate::ai::{build_prompt, GenerationClient, Style, TemplateFamily};
use crate::content::{ContentNormalizer, NormalizedContent, SourceKind};
use crate::error::PipelineError;

/// The payload of a request; the variant fixes its [`SourceKind`].
#[derive(Debug, Clone)]
pub enum Source {
    Text(String),
    Image(Bytes),
    VideoUrl(String),
}

impl Source {
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Text(_) => SourceKind::Text,
            Self::Image(_) => SourceKind::Image,
            Self::VideoUrl(_) => SourceKind::VideoUrl,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub source: Source,
    pub style: Style,
}

impl GenerationRequest {
    pub fn new(source: Source, style: Style) -> Self {
        Self { source, style }
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source.kind()
    }

    fn validate(&self) -> Result<(), PipelineError> {
        match &self.source {
            Source::Text(text) if text.trim().is_empty() => {
                Err(PipelineError::InvalidRequest("No text provided".to_string()))
            }
            Source::Image(bytes) if bytes.is_empty() => {
                Err(PipelineError::InvalidRequest("No image file provided".to_string()))
            }
            Source::VideoUrl(url) if url.trim().is_empty() => {
                Err(PipelineError::InvalidRequest("No video URL provided".to_string()))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotesResult {
    pub notes: String,
}

pub fn family_for(kind: SourceKind) -> TemplateFamily {
    match kind {
        SourceKind::Text | SourceKind::Image => TemplateFamily::DirectContent,
        SourceKind::VideoUrl => TemplateFamily::VideoMetadata,
    }
}

/// Stateless and reentrant; cloning shares the collaborators.
#[derive(Clone)]
pub struct NotesPipeline {
    normalizer: ContentNormalizer,
    generator: GenerationClient,
}

impl NotesPipeline {
    pub fn new(normalizer: ContentNormalizer, generator: GenerationClient) -> Self {
        Self {
            normalizer,
            generator,
        }
    }

    pub fn generator(&self) -> &GenerationClient {
        &self.generator
    }

    pub async fn run(&self, request: GenerationRequest) -> Result<NotesResult, PipelineError> {
        request.validate()?;

        let content = self.normalize(&request.source).await?;
        let prompt = build_prompt(request.style, family_for(content.source_kind), &content.text);

        log::debug!(
            "Generating {} notes from {:?} ({} prompt chars)",
            request.style.as_str(),
            content.source_kind,
            prompt.len()
        );

        let notes = self.generator.generate(&prompt).await.map_err(|e| {
            log::error!("Error generating notes with {}: {}", self.generator.provider(), e.cause);
            PipelineError::from(e)
        })?;

        Ok(NotesResult { notes })
    }

    pub async fn generate_from_text(
        &self,
        text: impl Into<String>,
        style: Style,
    ) -> Result<NotesResult, PipelineError> {
        self.run(GenerationRequest::new(Source::Text(text.into()), style))
            .await
    }

    pub async fn generate_from_image(
        &self,
        image: impl Into<Bytes>,
        style: Style,
    ) -> Result<NotesResult, PipelineError> {
        self.run(GenerationRequest::new(Source::Image(image.into()), style))
            .await
    }

    pub async fn generate_from_video(
        &self,
        url: impl Into<String>,
        style: Style,
    ) -> Result<NotesResult, PipelineError> {
        self.run(GenerationRequest::new(Source::VideoUrl(url.into()), style))
            .await
    }

    async fn normalize(&self, source: &Source) -> Result<NormalizedContent, PipelineError> {
        let result = match source {
            Source::Text(text) => self.normalizer.from_text(text),
            Source::Image(bytes) => self.normalizer.from_image(bytes).await,
            Source::VideoUrl(url) => {
                log::info!("Processing video URL: {}", url);
                self.normalizer
                    .from_video_url(url)
                    .await
                    .map(|meta| meta.into_content())
            }
        };

        result.map_err(|e| {
            let cause = e.to_string();
            let err = PipelineError::from(e);
            if err.is_client_error() {
                log::warn!("Rejected {:?} input: {}", source.kind(), cause);
            } else {
                log::error!("Failed to process {:?} input: {}", source.kind(), cause);
            }
            err
        })
    }
}
