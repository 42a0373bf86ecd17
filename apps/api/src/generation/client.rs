//! Generation client: the single call to the remote resume-generation service.
//!
//! One request per generation, no retries. Every outcome is a `Result`: a payload
//! on success, a `GenerationError` carrying the user-facing message otherwise.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{normalize, ResumeDocument};

const GENERATE_PATH: &str = "/api/v1/resume/generate";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Description cannot be empty")]
    EmptyDescription,

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response, or a 2xx response that only carries an `error`.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Generation timed out after {0}s")]
    Timeout(u64),

    #[error("Unexpected response: {0}")]
    Malformed(String),
}

/// What a successful call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ResumePayload {
    /// `{ "resume": { ... } }`
    Structured(Value),
    /// A non-JSON body, or the service's own raw-text fallback.
    RawText(String),
}

impl ResumePayload {
    /// Normalizes the payload into a document. Raw text that wraps a JSON object
    /// in markdown fences is unwrapped first; any other text yields the default document.
    pub fn into_document(self) -> ResumeDocument {
        match self {
            ResumePayload::Structured(v) => normalize(&v),
            ResumePayload::RawText(text) => {
                match serde_json::from_str::<Value>(strip_json_fences(&text)) {
                    Ok(Value::Object(mut obj)) => match obj.remove("resume") {
                        Some(inner @ Value::Object(_)) => normalize(&inner),
                        _ => normalize(&Value::Object(obj)),
                    },
                    _ => normalize(&Value::String(text)),
                }
            }
        }
    }
}

/// Seam for the remote service; the HTTP client is the production implementation.
#[async_trait]
pub trait ResumeGenerator: Send + Sync {
    async fn generate(&self, user_description: &str) -> Result<ResumePayload, GenerationError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    user_description: &'a str,
}

#[derive(Clone)]
pub struct GenerationClient {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl GenerationClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint: format!("{}{GENERATE_PATH}", base_url.trim_end_matches('/')),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ResumeGenerator for GenerationClient {
    async fn generate(&self, user_description: &str) -> Result<ResumePayload, GenerationError> {
        if user_description.trim().is_empty() {
            return Err(GenerationError::EmptyDescription);
        }

        let response = self
            .client
            .post(&self.endpoint)
            .json(&GenerateRequest { user_description })
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.classify(e))?;
        debug!(status, bytes = body.len(), "Generation service responded");

        interpret(status, &body)
    }
}

impl GenerationClient {
    fn classify(&self, e: reqwest::Error) -> GenerationError {
        if e.is_timeout() {
            GenerationError::Timeout(self.timeout.as_secs())
        } else {
            GenerationError::Http(e)
        }
    }
}

/// Maps a raw response to an outcome. Whether the body is JSON is decided by
/// trying to parse it, not by the content-type header.
pub fn interpret(status: u16, body: &str) -> Result<ResumePayload, GenerationError> {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let success = (200..300).contains(&status);

    if !success {
        let message = match parsed {
            Some(json) => error_message(&json).unwrap_or_else(|| json.to_string()),
            None if body.is_empty() => format!("HTTP {status}"),
            None => body.to_string(),
        };
        warn!(status, "Generation service returned an error: {message}");
        return Err(GenerationError::Api { status, message });
    }

    let Some(json) = parsed else {
        return Ok(ResumePayload::RawText(body.to_string()));
    };

    match json {
        Value::Object(mut obj) => {
            if let Some(resume) = obj.remove("resume").filter(|v| !v.is_null()) {
                return Ok(match resume {
                    Value::String(text) => ResumePayload::RawText(text),
                    other => ResumePayload::Structured(other),
                });
            }
            if let Some(message) = error_message(&Value::Object(obj.clone())) {
                return Err(GenerationError::Api { status, message });
            }
            if let Some(Value::String(text)) = obj.remove("resumeText") {
                return Ok(ResumePayload::RawText(text));
            }
            Err(GenerationError::Malformed(Value::Object(obj).to_string()))
        }
        Value::String(text) => Ok(ResumePayload::RawText(text)),
        other => Err(GenerationError::Malformed(other.to_string())),
    }
}

/// A non-empty `error` member, as display text.
fn error_message(json: &Value) -> Option<String> {
    match json.get("error")? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences around a payload.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest).trim_start();
    rest.strip_suffix("```").map(str::trim).unwrap_or(rest)
}
