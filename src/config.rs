use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub llm_provider: LLMProvider,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub generation_timeout_secs: u64,
    pub ocr_timeout_secs: u64,
    pub video_timeout_secs: u64,
    pub tesseract_path: String,
    pub ocr_language: String,
    pub yt_dlp_path: String,
    pub bind_addr: String,
    pub max_upload_mb: usize,
    pub database_path: Option<PathBuf>,
    pub session_ttl_hours: i64,
    pub remember_ttl_days: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    Gemini,
    OpenAI,
    Ollama,
}

impl LLMProvider {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gemini" => Some(Self::Gemini),
            "openai" => Some(Self::OpenAI),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Gemini => "Gemini",
            Self::OpenAI => "OpenAI",
            Self::Ollama => "Ollama",
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm_provider: LLMProvider::Gemini,
            gemini_api_key: String::new(),
            gemini_model: "gemini-1.5-flash".to_string(),
            openai_api_key: String::new(),
            openai_model: "gpt-4o-mini".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3".to_string(),
            max_output_tokens: 2048,
            temperature: 0.7,
            generation_timeout_secs: 30,
            ocr_timeout_secs: 30,
            video_timeout_secs: 15,
            tesseract_path: "tesseract".to_string(),
            ocr_language: "eng".to_string(),
            yt_dlp_path: "yt-dlp".to_string(),
            bind_addr: "127.0.0.1:5000".to_string(),
            max_upload_mb: 10,
            database_path: None,
            session_ttl_hours: 12,
            remember_ttl_days: 30,
        }
    }
}

/// Read-only view of the generation backend settings.
///
/// Built once at startup and handed to the backend constructors; nothing
/// mutates it afterwards, so concurrent requests read it without locking.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub provider: LLMProvider,
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl AppConfig {
    /// Resolve the data directory: `NOTES_DATA_DIR`, else the platform data dir.
    pub fn data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("NOTES_DATA_DIR") {
            if !dir.is_empty() {
                return PathBuf::from(dir);
            }
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("study-notes")
    }

    pub fn load(app_data: &Path) -> Self {
        let config_path = app_data.join("config.json");
        let mut config = if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                    log::warn!("Ignoring malformed {}: {}", config_path.display(), e);
                    Self::default()
                }),
                Err(_) => Self::default(),
            }
        } else {
            let c = Self::default();
            c.save(app_data);
            c
        };

        config.apply_env();
        config
    }

    pub fn save(&self, app_data: &Path) {
        let config_path = app_data.join("config.json");
        if let Ok(content) = serde_json::to_string_pretty(self) {
            std::fs::write(config_path, content).ok();
        }
    }

    /// Environment variables win over the config file so keys never need
    /// to be written to disk.
    pub fn apply_env(&mut self) {
        if let Some(key) = non_empty_env("GEMINI_API_KEY") {
            self.gemini_api_key = key;
        }
        if let Some(key) = non_empty_env("OPENAI_API_KEY") {
            self.openai_api_key = key;
        }
        if let Some(provider) = non_empty_env("LLM_PROVIDER") {
            match LLMProvider::parse(&provider) {
                Some(p) => self.llm_provider = p,
                None => log::warn!(
                    "Unknown LLM_PROVIDER '{}', keeping {}",
                    provider,
                    self.llm_provider.name()
                ),
            }
        }
        if let Some(addr) = non_empty_env("NOTES_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(db) = non_empty_env("NOTES_DATABASE") {
            self.database_path = Some(PathBuf::from(db));
        }
    }

    pub fn database_path(&self, app_data: &Path) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| app_data.join("notes_generator.db"))
    }

    pub fn generation(&self) -> GenerationConfig {
        let (api_key, model, base_url) = match self.llm_provider {
            LLMProvider::Gemini => (
                self.gemini_api_key.clone(),
                self.gemini_model.clone(),
                "https://generativelanguage.googleapis.com/v1beta".to_string(),
            ),
            LLMProvider::OpenAI => (
                self.openai_api_key.clone(),
                self.openai_model.clone(),
                "https://api.openai.com/v1".to_string(),
            ),
            LLMProvider::Ollama => (
                String::new(),
                self.ollama_model.clone(),
                self.ollama_url.trim_end_matches('/').to_string(),
            ),
        };

        GenerationConfig {
            provider: self.llm_provider,
            api_key,
            model,
            base_url,
            max_output_tokens: self.max_output_tokens,
            temperature: self.temperature,
            timeout: Duration::from_secs(self.generation_timeout_secs),
        }
    }

    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_secs(self.ocr_timeout_secs)
    }

    pub fn video_timeout(&self) -> Duration {
        Duration::from_secs(self.video_timeout_secs)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_gemini_flash() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.llm_provider, LLMProvider::Gemini);
        assert_eq!(cfg.gemini_model, "gemini-1.5-flash");
        assert_eq!(cfg.generation_timeout_secs, 30);
        assert_eq!(cfg.video_timeout_secs, 15);
        assert_eq!(cfg.max_upload_bytes(), 10 * 1024 * 1024);
    }

    #[test]
    fn generation_config_follows_provider() {
        let mut cfg = AppConfig::default();
        cfg.llm_provider = LLMProvider::Ollama;
        cfg.ollama_url = "http://gpu-box:11434/".to_string();

        let gen = cfg.generation();
        assert_eq!(gen.provider, LLMProvider::Ollama);
        assert_eq!(gen.model, "llama3");
        assert_eq!(gen.base_url, "http://gpu-box:11434");
        assert_eq!(gen.timeout, Duration::from_secs(30));
    }

    #[test]
    fn partial_config_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{ "llm_provider": "openai", "openai_model": "gpt-4o" }"#,
        )
        .unwrap();

        let cfg = AppConfig::load(dir.path());
        assert_eq!(cfg.openai_model, "gpt-4o");
        assert_eq!(cfg.ocr_language, "eng");
        assert!(!cfg.bind_addr.is_empty());
    }

    #[test]
    fn missing_config_file_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let _ = AppConfig::load(dir.path());
        assert!(dir.path().join("config.json").exists());
    }

    #[test]
    fn provider_names_parse_case_insensitively() {
        assert_eq!(LLMProvider::parse("OpenAI"), Some(LLMProvider::OpenAI));
        assert_eq!(LLMProvider::parse(" gemini "), Some(LLMProvider::Gemini));
        assert_eq!(LLMProvider::parse("claude"), None);
    }
}
