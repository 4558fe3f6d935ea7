//! Rewrite processor for OpenAI-compatible chat completion endpoints.
//!
//! Works against api.openai.com and any server speaking the same protocol
//! (Ollama, llama.cpp, vLLM, most gateways). The transcript goes in as the
//! user message with the rewrite prompt as the system message.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{AiCallError, AiOutcome, AiProcessor};
use crate::http::get_http_client;
use crate::settings::PostProcessSettings;

pub const DEFAULT_AI_ENDPOINT: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProcessor {
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}

impl OpenAiCompatibleProcessor {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_AI_ENDPOINT.to_string()),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl AiProcessor for OpenAiCompatibleProcessor {
    async fn process(
        &self,
        text: &str,
        settings: &PostProcessSettings,
        prompt_override: Option<&str>,
    ) -> Result<AiOutcome, AiCallError> {
        let api_key = settings
            .api_key()
            .ok_or_else(|| AiCallError::Transport("no API key configured".to_string()))?;
        let prompt = match prompt_override {
            Some(p) => p.to_string(),
            None => settings.rewrite_prompt(),
        };
        let model = settings.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let client = get_http_client().map_err(|e| AiCallError::Transport(e.to_string()))?;
        let response = client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&serde_json::json!({
                "model": model,
                "messages": [
                    {"role": "system", "content": prompt},
                    {"role": "user", "content": text}
                ]
            }))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AiCallError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| AiCallError::Transport(e.to_string()))?;
            crate::verbose!("AI endpoint returned {}: {}", status, body);
            return Ok(AiOutcome::failure(
                Some(status.as_u16()),
                format!("rewrite request failed with HTTP {}: {}", status.as_u16(), body),
            ));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiCallError::Malformed(e.to_string()))?;
        match chat.choices.first() {
            Some(choice) => Ok(AiOutcome::success(
                choice.message.content.trim().to_string(),
                Some(status.as_u16()),
            )),
            None => Err(AiCallError::Malformed(
                "response contained no choices".to_string(),
            )),
        }
    }
}
