#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;

use crate::backend::{Completion, CompletionError};
use crate::config::{constants::SYSTEM_PROMPT, user_agent};
use crate::models::TranscriptMessage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time;

pub struct OpenAI {
    endpoint: String,
    api_key: Option<String>,
    model: String,
    system_prompt: String,
    timeout: Option<time::Duration>,
    client: reqwest::Client,
}

#[async_trait]
impl Completion for OpenAI {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, transcript: &[TranscriptMessage]) -> Result<String, CompletionError> {
        let mut messages = Vec::with_capacity(transcript.len() + 1);
        messages.push(TranscriptMessage::system(&self.system_prompt));
        messages.extend_from_slice(transcript);

        let completion_req = CompletionRequest {
            model: &self.model,
            messages: &messages,
        };

        let mut req = self
            .client
            .post(format!("{}/v1/chat/completions", self.endpoint))
            .header("Content-Type", "application/json")
            .header("User-Agent", user_agent());

        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        if let Some(token) = &self.api_key {
            req = req.bearer_auth(token);
        }

        log::trace!(
            "Sending completion request: model={} messages={}",
            self.model,
            messages.len()
        );

        let res = req.json(&completion_req).send().await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            log::error!("Completion endpoint error ({}): {}", status.as_u16(), body);
            return Err(match status.as_u16() {
                429 => CompletionError::RateLimited,
                402 => CompletionError::Unavailable,
                code => CompletionError::Upstream { status: code, body },
            });
        }

        let body = res.text().await?;
        let data = serde_json::from_str::<CompletionResponse>(&body)
            .map_err(|e| CompletionError::Parse(e.to_string()))?;

        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or(CompletionError::EmptyChoices)?;

        Ok(choice.message.content.unwrap_or_default())
    }
}

impl OpenAI {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = prompt.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: time::Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}

impl Default for OpenAI {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com".to_string(),
            api_key: None,
            model: crate::config::constants::DEFAULT_COMPLETION_MODEL.to_string(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            timeout: None,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [TranscriptMessage],
}

#[derive(Default, Debug, Serialize, Deserialize)]
struct CompletionMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Default, Debug, Serialize, Deserialize)]
struct CompletionChoiceResponse {
    message: CompletionMessageResponse,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Default, Debug, Serialize, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    id: String,
    choices: Vec<CompletionChoiceResponse>,
}
