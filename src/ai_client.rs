//! Google Gemini API client for the text-generation phases
//!
//! Every phase talks to the service through [`TextGenerator`], so tests can
//! swap in a scripted generator.

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::time::Duration;
use thiserror::Error;

use crate::settings::{Settings, SettingsError};
use crate::utils::preview;

#[derive(Error, Debug)]
pub enum AiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("No text in response (finish reason: {reason:?})")]
    EmptyResponse { reason: Option<String> },

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

pub type Result<T> = std::result::Result<T, AiError>;

/// Anything that turns a prompt into reply text
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> Result<String>;
}

/// Token counts accumulated over a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub requests: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Gemini API request format
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

/// Gemini API response format
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

pub struct GeminiClient {
    client: reqwest::blocking::Client,
    api_key: String,
    endpoint: String,
    usage: Cell<TokenUsage>,
}

impl GeminiClient {
    /// Build a client from resolved settings; fails when the key is missing
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.api_key()?.to_string();
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        let endpoint = format!(
            "{}/models/{}:generateContent",
            settings.api_base_url.trim_end_matches('/'),
            settings.model
        );
        Ok(Self {
            client,
            api_key,
            endpoint,
            usage: Cell::new(TokenUsage::default()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn usage(&self) -> TokenUsage {
        self.usage.get()
    }

    fn record_usage(&self, metadata: Option<&UsageMetadata>) {
        let mut usage = self.usage.get();
        usage.requests += 1;
        if let Some(m) = metadata {
            usage.input_tokens += m.prompt_token_count;
            usage.output_tokens += m.candidates_token_count;
        }
        self.usage.set(usage);
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String> {
        tracing::debug!(prompt = %preview(prompt, 200), "sending prompt");

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt.to_string() }],
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(AiError::Api { status, body });
        }

        let api_response: GenerateResponse = response.json()?;
        self.record_usage(api_response.usage_metadata.as_ref());

        let text = response_text(&api_response)?;
        tracing::debug!(reply = %preview(&text, 200), "received reply");
        Ok(text)
    }
}

/// Concatenated text parts of the first candidate
fn response_text(response: &GenerateResponse) -> Result<String> {
    let candidate = response
        .candidates
        .first()
        .ok_or(AiError::EmptyResponse { reason: None })?;

    let text: String = candidate
        .content
        .as_ref()
        .map(|c| c.parts.iter().map(|p| p.text.as_str()).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AiError::EmptyResponse {
            reason: candidate.finish_reason.clone(),
        });
    }
    Ok(text)
}
