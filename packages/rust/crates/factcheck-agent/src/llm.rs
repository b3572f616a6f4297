//! Reasoning API client: OpenAI-compatible chat completions with search citations.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use factcheck_types::{Citation, FactCheckError, FactCheckResult};
use serde::{Deserialize, Serialize};

use crate::config::FactCheckConfig;
use crate::normalizer::json_citation;
use crate::prompt::{SYSTEM_INSTRUCTION, user_message};

const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please try again later.";
const GENERIC_FAILURE_MESSAGE: &str = "API request failed";
const NO_RESPONSE_MESSAGE: &str =
    "No response from fact-checking service. Please check your internet connection.";

/// Message content plus side-channel citations extracted from one completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionEnvelope {
    pub content: String,
    pub citations: Vec<Citation>,
}

/// External reasoning service used by the orchestrator.
///
/// Implemented by [`LlmClient`] for the real HTTP API; tests inject doubles.
#[async_trait]
pub trait ReasoningApi: Send + Sync {
    /// Ask the model to fact-check `claim_text`.
    async fn complete(&self, claim_text: &str) -> FactCheckResult<CompletionEnvelope>;
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct SearchOptions<'a> {
    search_domain_filter: &'a [String],
}

/// Request body for chat completions.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    options: SearchOptions<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Response: choices[0].message plus optional top-level citations.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    /// Read leniently: a non-list is ignored, and entries that are neither
    /// a URL nor `{title?, url}` are skipped.
    #[serde(default)]
    citations: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP client for the reasoning API.
pub struct LlmClient {
    client: reqwest::Client,
    config: FactCheckConfig,
}

impl LlmClient {
    pub fn new(config: FactCheckConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Transport failure, with client-side timeouts reported as such.
    fn transport_error(&self, error: &reqwest::Error) -> FactCheckError {
        if error.is_timeout() {
            FactCheckError::no_response(format!(
                "fact-check request timed out after {}ms",
                self.config.request_timeout_ms
            ))
        } else {
            FactCheckError::no_response(NO_RESPONSE_MESSAGE)
        }
    }

    fn request_body<'a>(&'a self, claim_text: &str) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_INSTRUCTION.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_message(claim_text),
                },
            ],
            options: SearchOptions {
                search_domain_filter: &self.config.search_domain_filter,
            },
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }
}

#[async_trait]
impl ReasoningApi for LlmClient {
    async fn complete(&self, claim_text: &str) -> FactCheckResult<CompletionEnvelope> {
        let Some(api_key) = self.config.usable_api_key() else {
            return Err(FactCheckError::Configuration(
                "API key not configured".to_string(),
            ));
        };
        let started = Instant::now();
        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&self.request_body(claim_text))
            .send()
            .await
            .map_err(|error| {
                tracing::warn!(
                    event = "factcheck.upstream.request_failed",
                    url = %self.config.api_url,
                    elapsed_ms = started.elapsed().as_millis(),
                    error = %error,
                    "reasoning api request failed"
                );
                self.transport_error(&error)
            })?;
        let status = response.status();
        let body = response.text().await.map_err(|error| {
            tracing::warn!(
                event = "factcheck.upstream.body_failed",
                status = status.as_u16(),
                error = %error,
                "failed to read reasoning api response body"
            );
            self.transport_error(&error)
        })?;
        if !status.is_success() {
            tracing::warn!(
                event = "factcheck.upstream.status_error",
                status = status.as_u16(),
                elapsed_ms = started.elapsed().as_millis(),
                "reasoning api returned error status"
            );
            return Err(status_error(status.as_u16(), &body));
        }
        let envelope = parse_envelope(&body)?;
        tracing::debug!(
            event = "factcheck.upstream.completed",
            model = %self.config.model,
            elapsed_ms = started.elapsed().as_millis(),
            content_chars = envelope.content.chars().count(),
            citations = envelope.citations.len(),
            "reasoning api call completed"
        );
        Ok(envelope)
    }
}

fn status_error(status: u16, body: &str) -> FactCheckError {
    if status == 429 {
        return FactCheckError::upstream(status, RATE_LIMIT_MESSAGE);
    }
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .or_else(|| value.get("error"))
                .and_then(serde_json::Value::as_str)
                .map(ToString::to_string)
        })
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
    FactCheckError::upstream(status, message)
}

fn parse_envelope(body: &str) -> FactCheckResult<CompletionEnvelope> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body).map_err(|error| {
        FactCheckError::upstream(502, format!("malformed reasoning api response: {error}"))
    })?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| FactCheckError::upstream(502, "reasoning api response has no choices"))?;
    Ok(CompletionEnvelope {
        content: choice.message.content.unwrap_or_default(),
        citations: parsed
            .citations
            .as_array()
            .map(|items| items.iter().filter_map(json_citation).collect())
            .unwrap_or_default(),
    })
}

#[cfg(test)]
#[path = "../tests/unit/llm.rs"]
mod tests;
