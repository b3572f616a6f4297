//! factcheck-types - Shared data model for the fact-check service
//!
//! Verdicts, ratings, claim keys and the error taxonomy used by the
//! reasoning client, the verdict normalizer, the cache and the gateways.
//!
//! Types derive `schemars::JsonSchema` so the verdict contract handed to the
//! model and to API consumers can be exported as JSON Schema.

#![allow(clippy::doc_markdown)]

use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type with fact-check specific error
pub type FactCheckResult<T> = Result<T, FactCheckError>;

/// Failure taxonomy surfaced by the fact-check pipeline.
///
/// Cloneable so a single upstream failure can be handed to every caller
/// waiting on the same in-flight request.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum FactCheckError {
    /// Empty or otherwise unusable claim text
    #[error("Input error: {0}")]
    Input(String),

    /// Missing credential or unusable configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// External API failure; `status` is `None` for transport failures and timeouts
    #[error("Upstream error ({}): {message}", status_label(.status))]
    Upstream {
        /// HTTP status returned by the upstream service, if any
        status: Option<u16>,
        /// Human-readable failure message
        message: String,
    },
}

#[allow(clippy::ref_option)]
fn status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "no response".to_string(), |code| code.to_string())
}

impl FactCheckError {
    /// Build an upstream error carrying an HTTP status.
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Build an upstream error for a call that produced no response.
    pub fn no_response(message: impl Into<String>) -> Self {
        Self::Upstream {
            status: None,
            message: message.into(),
        }
    }

    /// True when the upstream signalled rate limiting (HTTP 429).
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Upstream { status: Some(429), .. })
    }

    /// Upstream failures may succeed on a later manual retry; input and
    /// configuration failures need an external fix first.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }

    /// Short message suitable for end users (no variant prefix).
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Input(message) | Self::Configuration(message) => message,
            Self::Upstream { message, .. } => message,
        }
    }
}

/// Canonical upper-snake form of a loosely formatted rating label.
///
/// `"Mostly True"`, `"mostly-true"` and `"**MOSTLY_TRUE**."` all become
/// `"MOSTLY_TRUE"`.
fn canonical_label(raw: &str) -> String {
    let trimmed = raw.trim_matches(|c: char| !c.is_alphanumeric());
    let mut out = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_uppercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out
}

/// Overall verdict rating (closed set).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rating {
    /// Accurate
    True,
    /// Accurate with minor issues
    MostlyTrue,
    /// Partly accurate, partly not
    Mixed,
    /// Largely inaccurate
    MostlyFalse,
    /// Inaccurate
    False,
    /// Not enough evidence, or the response could not be analyzed
    Unverifiable,
}

impl Rating {
    /// Every rating, in severity order.
    pub const ALL: [Self; 6] = [
        Self::True,
        Self::MostlyTrue,
        Self::Mixed,
        Self::MostlyFalse,
        Self::False,
        Self::Unverifiable,
    ];

    /// Wire label (`MOSTLY_TRUE`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::True => "TRUE",
            Self::MostlyTrue => "MOSTLY_TRUE",
            Self::Mixed => "MIXED",
            Self::MostlyFalse => "MOSTLY_FALSE",
            Self::False => "FALSE",
            Self::Unverifiable => "UNVERIFIABLE",
        }
    }

    /// Parse a label case-insensitively; `None` when outside the enumeration.
    #[must_use]
    pub fn from_label(raw: &str) -> Option<Self> {
        let label = canonical_label(raw);
        Self::ALL.into_iter().find(|rating| rating.as_str() == label)
    }

    /// Parse a label, coercing anything outside the enumeration to
    /// [`Rating::Unverifiable`].
    #[must_use]
    pub fn coerce(raw: &str) -> Self {
        Self::from_label(raw).unwrap_or(Self::Unverifiable)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-claim rating: the overall scale plus `MISLEADING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimRating {
    /// Accurate
    True,
    /// Accurate with minor issues
    MostlyTrue,
    /// Partly accurate, partly not
    Mixed,
    /// Largely inaccurate
    MostlyFalse,
    /// Inaccurate
    False,
    /// Technically accurate but framed to mislead
    Misleading,
    /// Not enough evidence
    Unverifiable,
}

impl ClaimRating {
    /// Every claim rating.
    pub const ALL: [Self; 7] = [
        Self::True,
        Self::MostlyTrue,
        Self::Mixed,
        Self::MostlyFalse,
        Self::False,
        Self::Misleading,
        Self::Unverifiable,
    ];

    /// Wire label (`MISLEADING`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::True => "TRUE",
            Self::MostlyTrue => "MOSTLY_TRUE",
            Self::Mixed => "MIXED",
            Self::MostlyFalse => "MOSTLY_FALSE",
            Self::False => "FALSE",
            Self::Misleading => "MISLEADING",
            Self::Unverifiable => "UNVERIFIABLE",
        }
    }

    /// Parse a label, coercing anything outside the enumeration to
    /// [`ClaimRating::Unverifiable`].
    #[must_use]
    pub fn coerce(raw: &str) -> Self {
        let label = canonical_label(raw);
        Self::ALL
            .into_iter()
            .find(|rating| rating.as_str() == label)
            .unwrap_or(Self::Unverifiable)
    }
}

impl fmt::Display for ClaimRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized claim text: trimmed and case-folded.
///
/// Identity for both the verdict cache and in-flight deduplication, so
/// `" Claim A "` and `"claim a"` share one entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimKey(String);

impl ClaimKey {
    /// Normalize arbitrary text into a key (may be empty).
    #[must_use]
    pub fn normalize(text: &str) -> Self {
        Self(text.trim().to_lowercase())
    }

    /// Normalize text, rejecting empty or whitespace-only input.
    ///
    /// # Errors
    /// Returns [`FactCheckError::Input`] when nothing remains after trimming.
    pub fn try_new(text: &str) -> FactCheckResult<Self> {
        let key = Self::normalize(text);
        if key.0.is_empty() {
            return Err(FactCheckError::Input("No text provided".to_string()));
        }
        Ok(key)
    }

    /// Normalized text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClaimKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source reference listed under a claim, classified for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRef<'a> {
    /// Rendered as a link
    Link(&'a str),
    /// Rendered as plain text
    Text(&'a str),
}

impl<'a> SourceRef<'a> {
    /// Anything starting with `http` is a link.
    #[must_use]
    pub fn classify(source: &'a str) -> Self {
        if source.starts_with("http") {
            Self::Link(source)
        } else {
            Self::Text(source)
        }
    }
}

/// Analysis of one factual assertion found in the submitted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ClaimAnalysis {
    /// The assertion being rated
    #[serde(rename = "claim", alias = "claim_text")]
    pub claim_text: String,
    /// Rating for this assertion
    pub rating: ClaimRating,
    /// Why the rating was given
    #[serde(default)]
    pub explanation: String,
    /// URLs or free-text references
    #[serde(default)]
    pub sources: Vec<String>,
}

impl ClaimAnalysis {
    /// Sources classified as links or plain text.
    pub fn source_refs(&self) -> impl Iterator<Item = SourceRef<'_>> {
        self.sources.iter().map(|source| SourceRef::classify(source))
    }
}

/// Citation returned alongside (or embedded in) the model answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(from = "CitationRepr")]
pub struct Citation {
    /// Optional display title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Target URL
    pub url: String,
}

impl Citation {
    /// Citation without a title.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            title: None,
            url: url.into(),
        }
    }
}

/// Upstream APIs return citations either as bare URLs or as objects.
#[derive(Deserialize, JsonSchema)]
#[serde(untagged)]
enum CitationRepr {
    Url(String),
    Entry {
        #[serde(default)]
        title: Option<String>,
        url: String,
    },
}

impl From<CitationRepr> for Citation {
    fn from(repr: CitationRepr) -> Self {
        match repr {
            CitationRepr::Url(url) => Self { title: None, url },
            CitationRepr::Entry { title, url } => Self { title, url },
        }
    }
}

/// Structured outcome of fact-checking a piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FactCheckVerdict {
    /// Overall rating; `UNVERIFIABLE` when nothing could be parsed
    pub overall_rating: Rating,
    /// Free-text summary, possibly empty
    #[serde(default)]
    pub summary: String,
    /// Per-claim analysis, in model order
    #[serde(default)]
    pub claims: Vec<ClaimAnalysis>,
    /// Citations, in upstream order
    #[serde(default)]
    pub citations: Vec<Citation>,
    /// Unparsed model output, kept for diagnostics
    #[serde(default)]
    pub raw_response: String,
    /// When the verdict was produced
    pub created_at: DateTime<Utc>,
}

impl FactCheckVerdict {
    /// Verdict carrying no structured analysis.
    pub fn unverifiable(summary: impl Into<String>, raw_response: impl Into<String>) -> Self {
        Self {
            overall_rating: Rating::Unverifiable,
            summary: summary.into(),
            claims: Vec::new(),
            citations: Vec::new(),
            raw_response: raw_response.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/lib.rs"]
mod tests;
