pub mod openai;

pub use openai::OpenAI;

#[cfg(test)]
use mockall::automock;

use crate::{
    config::{CompletionConfig, resolve_secret},
    models::TranscriptMessage,
};
use async_trait::async_trait;
use eyre::{Result, bail};
use std::{sync::Arc, time::Duration};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion endpoint rate limited the request")]
    RateLimited,

    #[error("completion endpoint is unavailable (quota exhausted)")]
    Unavailable,

    #[error("completion endpoint returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("sending completion request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("parsing completion response: {0}")]
    Parse(String),

    #[error("completion response has no choices")]
    EmptyChoices,
}

/// A hosted chat-completions endpoint. Every call is a single round-trip;
/// there is no retry, caching or streaming.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Completion {
    fn name(&self) -> &str;

    /// Sends the system prompt followed by `transcript` and returns the first
    /// choice's text unaltered.
    async fn complete(&self, transcript: &[TranscriptMessage]) -> Result<String, CompletionError>;
}

pub type ArcCompletion = Arc<dyn Completion + Send + Sync>;

pub fn new_completion(config: &CompletionConfig) -> Result<ArcCompletion> {
    if config.endpoint.trim().is_empty() {
        bail!("completion endpoint is not configured");
    }
    if config.model.trim().is_empty() {
        bail!("completion model is not configured");
    }

    let mut openai = OpenAI::default()
        .with_endpoint(&config.endpoint)
        .with_model(&config.model);

    match resolve_secret(config.api_key.as_deref()) {
        Some(api_key) => openai = openai.with_api_key(&api_key),
        None => log::warn!("No API key configured for the completion endpoint"),
    }

    if let Some(timeout) = config.timeout_secs {
        openai = openai.with_timeout(Duration::from_secs(timeout as u64));
    }

    if let Some(prompt) = config.system_prompt.as_deref() {
        openai = openai.with_system_prompt(prompt);
    }

    Ok(Arc::new(openai))
}
