pub mod accounts;
pub mod ai;
pub mod api;
pub mod config;
pub mod content;
pub mod error;
pub mod pipeline;

use std::path::Path;
use std::sync::Arc;

use accounts::{Accounts, SessionRegistry, UserStore};
use ai::GenerationClient;
use api::AppState;
use config::{AppConfig, LLMProvider};
use content::{ContentNormalizer, TesseractOcr, YtDlpSource};
use pipeline::NotesPipeline;

/// Wire the production collaborators together from configuration.
pub fn build_state(config: &AppConfig, app_data: &Path) -> anyhow::Result<AppState> {
    let generation = config.generation();
    let generator = GenerationClient::new(ai::backend_from_config(&generation), generation.timeout);

    let normalizer = ContentNormalizer::new(
        Arc::new(TesseractOcr::new(&config.tesseract_path, &config.ocr_language)),
        Arc::new(YtDlpSource::new(&config.yt_dlp_path)),
        config.ocr_timeout(),
        config.video_timeout(),
    );

    let users = UserStore::open(&config.database_path(app_data))?;
    let sessions = SessionRegistry::new(
        chrono::Duration::hours(config.session_ttl_hours),
        chrono::Duration::days(config.remember_ttl_days),
    );

    Ok(AppState {
        pipeline: NotesPipeline::new(normalizer, generator),
        accounts: Arc::new(Accounts::new(users, sessions)),
        max_upload_bytes: config.max_upload_bytes(),
    })
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app_data = AppConfig::data_dir();
    std::fs::create_dir_all(&app_data)?;

    let config = AppConfig::load(&app_data);
    let generation = config.generation();
    if generation.api_key.is_empty() && config.llm_provider != LLMProvider::Ollama {
        log::warn!(
            "{} API key not configured; note generation will fail until it is set",
            config.llm_provider.name()
        );
    }

    let state = build_state(&config, &app_data)?;
    log::info!(
        "Study notes ready. Provider: {} ({}), data dir: {}",
        config.llm_provider.name(),
        generation.model,
        app_data.display()
    );

    api::serve(Arc::new(state), &config.bind_addr).await
}
