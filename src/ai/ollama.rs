use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{error_from_response, http_client, AIMessage, TextGenerator};
use crate::config::GenerationConfig;
use crate::error::GenerationError;

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: Vec<AIMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: Option<OllamaMessageResponse>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessageResponse {
    content: String,
}

impl OllamaResponse {
    fn into_text(self) -> Result<String, GenerationError> {
        self.message
            .map(|m| m.content)
            .ok_or_else(|| GenerationError::new("No response from Ollama"))
    }
}

pub struct OllamaBackend {
    config: GenerationConfig,
    client: Client,
}

impl OllamaBackend {
    pub fn new(config: GenerationConfig) -> Self {
        let client = http_client(&config);
        Self { config, client }
    }
}

#[async_trait]
impl TextGenerator for OllamaBackend {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = OllamaRequest {
            model: &self.config.model,
            messages: vec![AIMessage::user(prompt)],
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_output_tokens,
            },
        };

        let url = format!("{}/api/chat", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                GenerationError::new(format!("Ollama request failed: {}. Is Ollama running?", e))
            })?;

        if !response.status().is_success() {
            return Err(error_from_response("Ollama", response).await);
        }

        let body: OllamaResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::new(format!("Failed to parse Ollama response: {}", e)))?;

        body.into_text()
    }

    fn provider(&self) -> &'static str {
        "Ollama"
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
