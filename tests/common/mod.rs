#![allow(dead_code)]

use async_trait::async_trait;
use image::DynamicImage;
use parking_lot::Mutex;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use study_notes::accounts::{Accounts, SessionRegistry, UserStore};
use study_notes::ai::{GenerationClient, TextGenerator};
use study_notes::api::AppState;
use study_notes::content::{ContentNormalizer, OcrEngine, RawVideoInfo, VideoInfoSource};
use study_notes::error::{ContentError, GenerationError};
use study_notes::pipeline::NotesPipeline;

pub struct MockGenerator {
    reply: Result<String, String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(cause: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(cause.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.to_string());
        self.reply.clone().map_err(GenerationError::new)
    }

    fn provider(&self) -> &'static str {
        "Mock"
    }

    fn model(&self) -> &str {
        "mock-1"
    }
}

pub struct MockOcr {
    text: String,
    calls: AtomicUsize,
}

impl MockOcr {
    pub fn reading(text: &str) -> Arc<Self> {
        Arc::new(Self {
            text: text.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrEngine for MockOcr {
    async fn extract_text(&self, _image: &DynamicImage) -> Result<String, ContentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

pub struct MockVideo {
    info: Option<RawVideoInfo>,
    calls: AtomicUsize,
}

impl MockVideo {
    pub fn with(info: RawVideoInfo) -> Arc<Self> {
        Arc::new(Self {
            info: Some(info),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self {
            info: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoInfoSource for MockVideo {
    async fn fetch_info(&self, _url: &str) -> Result<RawVideoInfo, ContentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.info
            .clone()
            .ok_or_else(|| ContentError::VideoInfoUnavailable("ERROR: Private video".into()))
    }
}

pub struct Harness {
    pub generator: Arc<MockGenerator>,
    pub ocr: Arc<MockOcr>,
    pub video: Arc<MockVideo>,
    pub pipeline: NotesPipeline,
}

pub fn harness(generator: Arc<MockGenerator>, ocr: Arc<MockOcr>, video: Arc<MockVideo>) -> Harness {
    let normalizer = ContentNormalizer::new(
        ocr.clone(),
        video.clone(),
        Duration::from_secs(2),
        Duration::from_secs(2),
    );
    let client = GenerationClient::new(generator.clone(), Duration::from_secs(2));
    Harness {
        pipeline: NotesPipeline::new(normalizer, client),
        generator,
        ocr,
        video,
    }
}

pub fn default_harness() -> Harness {
    harness(
        MockGenerator::replying("- key point"),
        MockOcr::reading("Mitochondria are the powerhouse of the cell."),
        MockVideo::unavailable(),
    )
}

pub fn app_state(h: &Harness) -> Arc<AppState> {
    Arc::new(AppState {
        pipeline: h.pipeline.clone(),
        accounts: Arc::new(Accounts::new(
            UserStore::in_memory().expect("in-memory store"),
            SessionRegistry::new(chrono::Duration::hours(1), chrono::Duration::days(30)),
        )),
        max_upload_bytes: 2 * 1024 * 1024,
    })
}

pub fn png_bytes() -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::new_rgb8(16, 16)
        .write_to(&mut buf, image::ImageFormat::Png)
        .expect("encode png");
    buf.into_inner()
}

pub fn graphs_video() -> RawVideoInfo {
    RawVideoInfo {
        title: Some("Intro to Graphs".into()),
        description: Some(String::new()),
        duration: Some(600.0),
        uploader: Some("CS101".into()),
        view_count: None,
        upload_date: None,
    }
}
