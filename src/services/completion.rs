//! Text completion client.
//!
//! A thin chat-completions wrapper with bounded retries. Transient upstream
//! trouble (throttling, gateway errors, HTML error pages from a proxy) is
//! retried with exponential backoff; auth and request errors fail fast. In
//! lenient mode an exhausted retry budget yields an empty string so callers
//! can fall back to deterministic behavior.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::{EngineError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;

const BACKOFF_BASE_MS: u64 = 600;
const BACKOFF_CAP_MS: u64 = 12_000;

/// Per-call knobs.
#[derive(Debug, Clone, Copy)]
pub struct CompletionOptions {
    pub max_tokens: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self { max_tokens: 1200 }
    }
}

/// The seam between the engine and whatever produces text.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, prompt: &str, opts: &CompletionOptions) -> Result<String>;
}

/// Connection settings for [`OpenAiTextClient`].
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_attempts: u32,
    /// strict mode turns an exhausted retry budget into an error instead of
    /// an empty string
    pub strict: bool,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            strict: false,
        }
    }
}

pub struct OpenAiTextClient {
    config: CompletionConfig,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

enum AttemptOutcome {
    Done(String),
    Retry {
        retry_after: Option<u64>,
        rate_limited: bool,
        reason: String,
    },
    Fatal(EngineError),
}

impl OpenAiTextClient {
    pub fn new(config: CompletionConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_http(config: CompletionConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    async fn attempt(&self, prompt: &str, opts: &CompletionOptions) -> AttemptOutcome {
        let body = json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": opts.max_tokens,
        });
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(err) => {
                return AttemptOutcome::Retry {
                    retry_after: None,
                    rate_limited: false,
                    reason: format!("transport: {}", err),
                }
            }
        };

        let status = response.status();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let text = response.text().await.unwrap_or_default();

        if status.is_success() {
            // proxies sometimes return HTML error pages with 200
            if looks_like_html(&text) {
                return AttemptOutcome::Retry {
                    retry_after,
                    rate_limited: false,
                    reason: "html body on success status".into(),
                };
            }
            return match serde_json::from_str::<ChatResponse>(&text) {
                Ok(parsed) => {
                    let content = parsed
                        .choices
                        .into_iter()
                        .next()
                        .map(|c| c.message.content)
                        .unwrap_or_default();
                    AttemptOutcome::Done(content.trim().to_string())
                }
                Err(err) => AttemptOutcome::Retry {
                    retry_after,
                    rate_limited: false,
                    reason: format!("unparseable body: {}", err),
                },
            };
        }

        if is_retryable_status(status) || looks_like_html(&text) {
            return AttemptOutcome::Retry {
                retry_after,
                rate_limited: status == StatusCode::TOO_MANY_REQUESTS,
                reason: format!("status {}", status.as_u16()),
            };
        }

        AttemptOutcome::Fatal(EngineError::Completion(format!(
            "completion request failed with status {}: {}",
            status.as_u16(),
            snippet(&text)
        )))
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 408 | 429) || status.is_server_error()
}

fn looks_like_html(body: &str) -> bool {
    let head = body.trim_start().to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html") || head.contains("cloudflare")
}

fn snippet(body: &str) -> &str {
    let end = body
        .char_indices()
        .nth(200)
        .map(|(i, _)| i)
        .unwrap_or(body.len());
    &body[..end]
}

fn backoff_delay(attempt: u32, retry_after: Option<u64>) -> Duration {
    let exp = BACKOFF_BASE_MS.saturating_mul(1u64 << attempt.min(10));
    let jitter = rand::thread_rng().gen_range(0..250);
    let delay = (exp + jitter).min(BACKOFF_CAP_MS);
    match retry_after {
        Some(secs) => Duration::from_millis(delay.max(secs.saturating_mul(1000))),
        None => Duration::from_millis(delay),
    }
}

#[async_trait]
impl TextCompletion for OpenAiTextClient {
    async fn complete(&self, prompt: &str, opts: &CompletionOptions) -> Result<String> {
        let attempts = self.config.max_attempts.max(1);
        let mut last_reason = String::new();
        let mut throttled: Option<u64> = None;
        for attempt in 0..attempts {
            match self.attempt(prompt, opts).await {
                AttemptOutcome::Done(content) => {
                    debug!(target: "itinera::completion", attempt, chars = content.len(), "completion ok");
                    return Ok(content);
                }
                AttemptOutcome::Fatal(err) => return Err(err),
                AttemptOutcome::Retry { retry_after, rate_limited, reason } => {
                    warn!(target: "itinera::completion", attempt, %reason, "retrying completion");
                    last_reason = reason;
                    throttled = rate_limited.then(|| retry_after.unwrap_or(1));
                    if attempt + 1 < attempts {
                        tokio::time::sleep(backoff_delay(attempt, retry_after)).await;
                    }
                }
            }
        }
        if self.config.strict {
            if let Some(retry_after) = throttled {
                return Err(EngineError::RateLimit { retry_after });
            }
            Err(EngineError::Completion(format!(
                "completion failed after {} attempts: {}",
                attempts, last_reason
            )))
        } else {
            warn!(target: "itinera::completion", "retry budget exhausted, returning empty completion");
            Ok(String::new())
        }
    }
}
