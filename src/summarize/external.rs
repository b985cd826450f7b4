//! Summaries from an external text-generation service.
//!
//! [`ExternalSummarizer`] sends the entry text to a [`ChatBackend`] with a
//! fixed system instruction.  The reply is normalised like any feed text and
//! held to the naive character cap.  Any backend failure, or a reply that is
//! blank once normalised, falls back to the [`NaiveSummarizer`]: this
//! strategy never fails.
//!
//! The bundled backend, [`ChatClient`], speaks the OpenAI-compatible
//! `/chat/completions` protocol and is configured from the environment:
//!
//! | Variable                  | Default                      |
//! |---------------------------|------------------------------|
//! | `DIGEST_LLM_API_KEY`      | (required)                   |
//! | `DIGEST_LLM_URL`          | `https://api.openai.com/v1`  |
//! | `DIGEST_LLM_MODEL`        | `gpt-4`                      |
//! | `DIGEST_LLM_TIMEOUT_SECS` | `30`                         |

use std::env;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::{NaiveSummarizer, Summarizer};
use crate::text;

pub const SYSTEM_PROMPT: &str = "Ты — ИИ-журналист. Пиши кратко, нейтрально, без рекламы.";
pub const USER_PROMPT_PREFIX: &str = "Перескажи нейтрально и коротко: ";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("service returned no text")]
    EmptyResponse,
}

/// A text-generation service: system instruction plus user text in, text out.
pub trait ChatBackend {
    fn complete(&self, system: &str, user: &str) -> Result<String, ChatError>;
}

// ---------------------------------------------------------------------------
// Summarizer
// ---------------------------------------------------------------------------

pub struct ExternalSummarizer<B> {
    backend: B,
    fallback: NaiveSummarizer,
}

impl<B: ChatBackend> ExternalSummarizer<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            fallback: NaiveSummarizer::default(),
        }
    }
}

impl<B: ChatBackend> Summarizer for ExternalSummarizer<B> {
    fn summarize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let prompt = format!("{}{}", USER_PROMPT_PREFIX, text);
        let reply = self
            .backend
            .complete(SYSTEM_PROMPT, &prompt)
            .and_then(|reply| {
                let reply = text::normalize(&reply);
                if reply.is_empty() {
                    Err(ChatError::EmptyResponse)
                } else {
                    Ok(reply)
                }
            });

        match reply {
            Ok(summary) => self.fallback.cap(summary),
            Err(e) => {
                warn!(error = %e, "external summary failed, using naive summary");
                self.fallback.summarize(text)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// OpenAI-compatible client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl ChatConfig {
    pub fn from_env() -> Result<Self, ChatError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup, so tests don't touch the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ChatError> {
        let api_key = lookup("DIGEST_LLM_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ChatError::Config("DIGEST_LLM_API_KEY is not set".into()))?;

        let base_url = lookup("DIGEST_LLM_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        if !base_url.starts_with("http") {
            return Err(ChatError::Config(format!(
                "DIGEST_LLM_URL must be an http(s) URL, got {base_url:?}"
            )));
        }

        let model = lookup("DIGEST_LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into());

        let timeout_secs = match lookup("DIGEST_LLM_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                ChatError::Config(format!("invalid DIGEST_LLM_TIMEOUT_SECS value {raw:?}"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Blocking client for an OpenAI-compatible chat completion endpoint.
pub struct ChatClient {
    config: ChatConfig,
    client: Client,
}

impl ChatClient {
    pub fn new(config: ChatConfig) -> Result<Self, ChatError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    pub fn from_env() -> Result<Self, ChatError> {
        Self::new(ChatConfig::from_env()?)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }
}

impl ChatBackend for ChatClient {
    fn complete(&self, system: &str, user: &str) -> Result<String, ChatError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            stream: false,
        };

        debug!(model = %self.config.model, chars = user.chars().count(), "requesting summary");
        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = resp.json()?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ChatError::EmptyResponse)
    }
}
