//! Conversational response generation via the Gemini generateContent API.
//!
//! Every call uses the same persona and sampling configuration; failures are
//! classified so the orchestrator can deliver a human-readable reason.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::config::GenerationConfig;
use crate::http::build_http_client;
use crate::traits::TextGenerator;

pub struct GeminiGenerator {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    system_instruction: String,
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

impl GeminiGenerator {
    pub fn new(config: &GenerationConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_http_client(Duration::from_secs(config.timeout_secs), None)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            system_instruction: config.system_instruction.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
        })
    }

    fn build_request_body(&self, text: &str) -> Value {
        json!({
            "system_instruction": { "parts": [{ "text": self.system_instruction }] },
            "contents": [{ "role": "user", "parts": [{ "text": text }] }],
            "generation_config": {
                "temperature": self.temperature,
                "top_p": self.top_p,
                "top_k": self.top_k,
            }
        })
    }

    fn parse_response(data: &Value) -> Result<String, GenerationError> {
        let Some(candidate) = data["candidates"].get(0) else {
            let reason = data["promptFeedback"]["blockReason"]
                .as_str()
                .unwrap_or("no candidates returned");
            return Err(GenerationError::blocked(reason));
        };

        let mut out = String::new();
        if let Some(parts) = candidate["content"]["parts"].as_array() {
            for part in parts {
                if let Some(t) = part["text"].as_str() {
                    out.push_str(t);
                }
            }
        }

        if out.trim().is_empty() {
            let reason = candidate["finishReason"].as_str().unwrap_or("empty response");
            return Err(GenerationError::blocked(reason));
        }
        Ok(out)
    }

    async fn try_generate(&self, text: &str) -> Result<String, GenerationError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.build_request_body(text))
            .send()
            .await
            .map_err(|e| GenerationError::network(&e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| GenerationError::network(&e))?;
        if !status.is_success() {
            error!(status = %status, "Generation API error: {}", body);
            return Err(GenerationError::from_status(status.as_u16(), &body));
        }

        let data: Value = serde_json::from_str(&body)
            .map_err(|e| GenerationError::malformed(&format!("JSON parse error: {e}")))?;
        let response = Self::parse_response(&data)?;
        debug!(chars = response.len(), "Generated response");
        Ok(response)
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, text: &str) -> anyhow::Result<String> {
        Ok(self.try_generate(text).await?)
    }
}

/// Classified generation failure: tells the orchestrator *why* the call
/// failed so the channel gets a useful message instead of an opaque error.
#[derive(Debug)]
pub struct GenerationError {
    pub kind: GenerationErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationErrorKind {
    /// 401/403, bad API key or permissions.
    Auth,
    /// 429, rate limited.
    RateLimit,
    /// 404 or bad model name.
    NotFound,
    /// 408 or the request timed out.
    Timeout,
    /// Connection refused, DNS failure, reset, etc.
    Network,
    /// 500/502/503/504, provider-side outage.
    ServerError,
    /// The provider returned no usable candidate (safety block, empty reply).
    Blocked,
    /// Response body wasn't parseable.
    Malformed,
    /// Anything else.
    Unknown,
}

impl GenerationError {
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = match status {
            401 | 403 => GenerationErrorKind::Auth,
            404 => GenerationErrorKind::NotFound,
            408 => GenerationErrorKind::Timeout,
            429 => GenerationErrorKind::RateLimit,
            500 | 502 | 503 | 504 => GenerationErrorKind::ServerError,
            _ => GenerationErrorKind::Unknown,
        };
        Self {
            kind,
            status: Some(status),
            message: truncate_body(body),
        }
    }

    pub fn network(err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            GenerationErrorKind::Timeout
        } else {
            GenerationErrorKind::Network
        };
        Self {
            kind,
            status: None,
            message: err.to_string(),
        }
    }

    pub fn blocked(reason: &str) -> Self {
        Self {
            kind: GenerationErrorKind::Blocked,
            status: None,
            message: reason.to_string(),
        }
    }

    pub fn malformed(detail: &str) -> Self {
        Self {
            kind: GenerationErrorKind::Malformed,
            status: None,
            message: detail.to_string(),
        }
    }

    /// Message suitable for delivery to the channel.
    pub fn user_message(&self) -> String {
        match self.kind {
            GenerationErrorKind::Auth => {
                "The AI backend rejected our credentials. Please check the generation API key."
                    .to_string()
            }
            GenerationErrorKind::RateLimit => {
                "The AI backend is rate-limiting requests right now. Please try again shortly."
                    .to_string()
            }
            GenerationErrorKind::NotFound => {
                "The configured generation model was not found.".to_string()
            }
            GenerationErrorKind::Timeout => {
                "The AI backend took too long to respond. Please try again.".to_string()
            }
            GenerationErrorKind::Network => {
                "Couldn't reach the AI backend. Please try again later.".to_string()
            }
            GenerationErrorKind::ServerError => {
                "The AI backend is having trouble right now. Please try again later.".to_string()
            }
            GenerationErrorKind::Blocked => {
                "The AI backend declined to answer that one.".to_string()
            }
            GenerationErrorKind::Malformed | GenerationErrorKind::Unknown => {
                "Something went wrong while generating a response.".to_string()
            }
        }
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(
                f,
                "generation error ({:?}, status {}): {}",
                self.kind, status, self.message
            ),
            None => write!(f, "generation error ({:?}): {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for GenerationError {}

fn truncate_body(body: &str) -> String {
    if body.len() > 300 {
        let cut = body
            .char_indices()
            .take_while(|(i, _)| *i <= 300)
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
