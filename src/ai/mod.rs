pub mod client;
pub mod gemini;
pub mod ollama;
pub mod openai;
pub mod prompts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{GenerationConfig, LLMProvider};
use crate::error::GenerationError;

pub use client::GenerationClient;
pub use prompts::{build_prompt, template_for, Style, TemplateFamily};

/// A generative-language backend: one prompt in, one complete text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    fn provider(&self) -> &'static str;

    fn model(&self) -> &str;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AIMessage {
    pub role: String,
    pub content: String,
}

impl AIMessage {
    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

/// Construct the backend selected in configuration.
pub fn backend_from_config(config: &GenerationConfig) -> Arc<dyn TextGenerator> {
    match config.provider {
        LLMProvider::Gemini => Arc::new(gemini::GeminiBackend::new(config.clone())),
        LLMProvider::OpenAI => Arc::new(openai::OpenAIBackend::new(config.clone())),
        LLMProvider::Ollama => Arc::new(ollama::OllamaBackend::new(config.clone())),
    }
}

/// Shared HTTP client for a backend; the per-call budget is enforced by
/// [`GenerationClient`], this only bounds connection setup.
fn http_client(config: &GenerationConfig) -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(config.timeout)
        .build()
        .unwrap_or_else(|e| {
            log::warn!("Falling back to default HTTP client: {}", e);
            reqwest::Client::new()
        })
}

/// Turn a non-2xx response into a [`GenerationError`] that keeps the body
/// for operators.
async fn error_from_response(provider: &str, response: reqwest::Response) -> GenerationError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    GenerationError::new(format!("{} API error ({}): {}", provider, status, body))
}
