//! Fact-check configuration: reasoning endpoint, model, credential, cache bounds.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default reasoning endpoint (OpenAI-compatible chat completions with search).
pub const DEFAULT_API_URL: &str = "https://api.perplexity.ai/chat/completions";
/// Default search-capable model id.
pub const DEFAULT_MODEL: &str = "sonar-pro";
/// Default OCR endpoint.
pub const DEFAULT_OCR_URL: &str = "https://api.ocr.space/parse/image";
/// Default OCR language hint.
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";

/// Reasoning API + cache configuration used by [`crate::FactChecker`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactCheckConfig {
    /// Chat completions endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Model id (e.g. `sonar-pro`).
    #[serde(default = "default_model")]
    pub model: String,
    /// Bearer credential; required at call time, not at construction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Age after which a cached verdict is stale, in milliseconds.
    #[serde(default = "default_cache_expiry_ms")]
    pub cache_expiry_ms: u64,
    /// Maximum number of cached verdicts; oldest is evicted beyond this.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    /// Upper bound for one external call, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Interval of the background expiry sweep, in seconds.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Sent as `options.search_domain_filter`.
    #[serde(default = "default_search_domain_filter")]
    pub search_domain_filter: Vec<String>,
    /// Sampling temperature; omitted from the request when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Completion token cap; omitted from the request when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

/// Six hours.
fn default_cache_expiry_ms() -> u64 {
    6 * 60 * 60 * 1000
}

fn default_max_entries() -> usize {
    100
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_sweep_interval_secs() -> u64 {
    3_600
}

fn default_search_domain_filter() -> Vec<String> {
    ["NEWS", "ACADEMIC", "GOVERNMENT"]
        .into_iter()
        .map(ToString::to_string)
        .collect()
}

impl Default for FactCheckConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            model: default_model(),
            api_key: None,
            cache_expiry_ms: default_cache_expiry_ms(),
            max_entries: default_max_entries(),
            request_timeout_ms: default_request_timeout_ms(),
            sweep_interval_secs: default_sweep_interval_secs(),
            search_domain_filter: default_search_domain_filter(),
            temperature: None,
            max_tokens: None,
        }
    }
}

impl FactCheckConfig {
    /// Config with a credential and everything else at defaults.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Credential if usable: blank or placeholder keys (`sk-...`) count as absent.
    #[must_use]
    pub fn usable_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !key.contains("..."))
    }

    #[must_use]
    pub fn cache_expiry(&self) -> Duration {
        Duration::from_millis(self.cache_expiry_ms)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// OCR collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Parse endpoint.
    #[serde(default = "default_ocr_url")]
    pub url: String,
    /// Service credential.
    pub api_key: String,
    /// Language hint when the request does not carry one.
    #[serde(default = "default_ocr_language")]
    pub language: String,
}

fn default_ocr_url() -> String {
    DEFAULT_OCR_URL.to_string()
}

fn default_ocr_language() -> String {
    DEFAULT_OCR_LANGUAGE.to_string()
}

impl OcrConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            url: default_ocr_url(),
            api_key: api_key.into(),
            language: default_ocr_language(),
        }
    }
}
