use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{error_from_response, http_client, AIMessage, TextGenerator};
use crate::config::GenerationConfig;
use crate::error::GenerationError;

const SYSTEM_PROMPT: &str = "You are a study assistant that turns source material into clear, \
                             well-organised learning notes.";

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<AIMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessageResponse,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessageResponse {
    content: Option<String>,
}

pub struct OpenAIBackend {
    config: GenerationConfig,
    client: Client,
}

impl OpenAIBackend {
    pub fn new(config: GenerationConfig) -> Self {
        let client = http_client(&config);
        Self { config, client }
    }
}

#[async_trait]
impl TextGenerator for OpenAIBackend {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        if self.config.api_key.is_empty() {
            return Err(GenerationError::new("OpenAI API key not configured"));
        }

        let request = OpenAIRequest {
            model: &self.config.model,
            messages: vec![
                AIMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                AIMessage::user(prompt),
            ],
            max_tokens: self.config.max_output_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::new(format!("OpenAI request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_from_response("OpenAI", response).await);
        }

        let body: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::new(format!("Failed to parse OpenAI response: {}", e)))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| GenerationError::new("No response from OpenAI"))
    }

    fn provider(&self) -> &'static str {
        "OpenAI"
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
