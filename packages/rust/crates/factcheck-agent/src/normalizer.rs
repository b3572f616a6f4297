//! Verdict normalizer: turns raw model output into a [`FactCheckVerdict`].
//!
//! Parsers are tried in order and the first success wins:
//! fenced ```` ```json ```` block, bare JSON object, labeled text fields.
//! When none yields a rating the verdict degrades to `UNVERIFIABLE` with the
//! raw text kept in `raw_response`. Normalization never fails.

use std::sync::LazyLock;

use chrono::Utc;
use factcheck_types::{ClaimAnalysis, ClaimRating, Citation, FactCheckVerdict, Rating};
use regex::Regex;
use serde_json::Value;

/// Summary used when nothing in the model output could be analyzed.
pub const FALLBACK_SUMMARY: &str = "could not analyze";
const UNSPECIFIED_CLAIM: &str = "Unspecified claim";

static FENCED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```json\s*\n(.*?)\n?```")
        .unwrap_or_else(|err| panic!("invalid fenced json regex: {err}"))
});

/// A labeled line: optional markdown decoration, label, optional ordinal
/// (`Claim 2`, `Claim #2`), colon, inline value.
static LABELED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[\s>#*•\-\d.)]*(overall[\s_-]?rating|summary|claims|claim|rating|explanation|sources?)(?:\s*#?\d+)?\s*\**\s*:\s*\**(.*)$",
    )
    .unwrap_or_else(|err| panic!("invalid labeled line regex: {err}"))
});

/// Overall rating mentioned anywhere, e.g. inside a prose sentence.
static OVERALL_RATING_ANYWHERE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)overall[\s_-]?rating\s*\**\s*[:\s]\s*\**([A-Za-z][A-Za-z_ -]*)")
        .unwrap_or_else(|err| panic!("invalid overall rating regex: {err}"))
});

/// Intermediate result of one parser attempt.
#[derive(Debug)]
struct ParsedVerdict {
    overall_rating: Rating,
    summary: String,
    claims: Vec<ClaimAnalysis>,
    /// `None` when the model did not embed a citations field.
    citations: Option<Vec<Citation>>,
}

type ParserAttempt = fn(&str) -> Option<ParsedVerdict>;

const PARSERS: [(&str, ParserAttempt); 3] = [
    ("fenced_json", parse_fenced_json),
    ("bare_json", parse_bare_json),
    ("labeled_fields", parse_labeled_fields),
];

/// Normalize raw model text plus side-channel citations into a verdict.
pub fn normalize(raw: &str, side_citations: &[Citation]) -> FactCheckVerdict {
    let parsed = PARSERS.iter().find_map(|(strategy, parser)| {
        let parsed = parser(raw)?;
        tracing::debug!(
            event = "factcheck.normalizer.parsed",
            strategy,
            rating = %parsed.overall_rating,
            claims = parsed.claims.len(),
            "model output parsed"
        );
        Some(parsed)
    });

    let Some(parsed) = parsed else {
        tracing::info!(
            event = "factcheck.normalizer.degraded",
            raw_chars = raw.chars().count(),
            "model output could not be analyzed; returning UNVERIFIABLE"
        );
        let mut verdict = FactCheckVerdict::unverifiable(FALLBACK_SUMMARY, raw);
        verdict.citations = side_citations.to_vec();
        return verdict;
    };

    FactCheckVerdict {
        overall_rating: parsed.overall_rating,
        summary: parsed.summary,
        claims: parsed.claims,
        citations: parsed.citations.unwrap_or_else(|| side_citations.to_vec()),
        raw_response: raw.to_string(),
        created_at: Utc::now(),
    }
}

// ---- JSON parsers ----

fn parse_fenced_json(raw: &str) -> Option<ParsedVerdict> {
    FENCED_JSON
        .captures_iter(raw)
        .filter_map(|captures| captures.get(1))
        .find_map(|body| parse_json_object(body.as_str()))
}

fn parse_bare_json(raw: &str) -> Option<ParsedVerdict> {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        parse_json_object(trimmed)
    } else {
        None
    }
}

fn parse_json_object(text: &str) -> Option<ParsedVerdict> {
    let value: Value = serde_json::from_str(text.trim()).ok()?;
    let map = value.as_object()?;
    let field = |name: &str| map.get(name).filter(|v| !v.is_null());
    Some(ParsedVerdict {
        overall_rating: field("overall_rating")
            .and_then(Value::as_str)
            .map_or(Rating::Unverifiable, Rating::coerce),
        summary: field("summary").map(text_value).unwrap_or_default(),
        claims: field("claims")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter(|claim| claim.is_object())
                    .map(json_claim)
                    .collect()
            })
            .unwrap_or_default(),
        // A non-list citations field counts as absent.
        citations: field("citations")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(json_citation).collect()),
    })
}

fn json_claim(value: &Value) -> ClaimAnalysis {
    let field = |name: &str| value.get(name).filter(|v| !v.is_null());
    ClaimAnalysis {
        claim_text: field("claim")
            .or_else(|| field("claim_text"))
            .map(text_value)
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| UNSPECIFIED_CLAIM.to_string()),
        rating: field("rating")
            .and_then(Value::as_str)
            .map_or(ClaimRating::Unverifiable, ClaimRating::coerce),
        explanation: field("explanation").map(text_value).unwrap_or_default(),
        sources: match field("sources") {
            Some(Value::Array(items)) => items.iter().filter_map(json_source).collect(),
            Some(Value::String(single)) if !single.trim().is_empty() => {
                vec![single.trim().to_string()]
            }
            _ => Vec::new(),
        },
    }
}

/// Strings as-is; anything else through its JSON rendering.
fn text_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_source(value: &Value) -> Option<String> {
    let source = match value {
        Value::String(text) => text.trim().to_string(),
        Value::Object(map) => map
            .get("url")
            .or_else(|| map.get("title"))
            .and_then(Value::as_str)?
            .trim()
            .to_string(),
        _ => return None,
    };
    (!source.is_empty()).then_some(source)
}

/// Bare URL string or `{title?, url}` object; anything else is skipped.
pub(crate) fn json_citation(value: &Value) -> Option<Citation> {
    match value {
        Value::String(url) if !url.trim().is_empty() => Some(Citation::from_url(url.trim())),
        Value::Object(_) => serde_json::from_value::<Citation>(value.clone())
            .ok()
            .filter(|citation| !citation.url.trim().is_empty()),
        _ => None,
    }
}

// ---- labeled text parser ----

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    OverallRating,
    Summary,
    ClaimsHeading,
    Claim,
    Rating,
    Explanation,
    Sources,
}

impl Label {
    fn from_match(raw: &str) -> Self {
        let lower = raw.to_ascii_lowercase();
        match lower.as_str() {
            "summary" => Self::Summary,
            "claims" => Self::ClaimsHeading,
            "claim" => Self::Claim,
            "rating" => Self::Rating,
            "explanation" => Self::Explanation,
            "source" | "sources" => Self::Sources,
            _ => Self::OverallRating,
        }
    }
}

#[derive(Debug)]
struct LabeledField {
    label: Label,
    lines: Vec<String>,
    closed: bool,
}

impl LabeledField {
    fn value(&self) -> String {
        self.lines.join("\n").trim().to_string()
    }

    fn first_line(&self) -> &str {
        self.lines
            .iter()
            .map(|line| line.trim())
            .find(|line| !line.is_empty())
            .unwrap_or_default()
    }

    fn list_items(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| {
                line.trim_start_matches(['-', '*', '•', ' ', '\t'])
                    .trim()
                    .to_string()
            })
            .filter(|item| !item.is_empty())
            .collect()
    }
}

fn scan_labeled_fields(raw: &str) -> Vec<LabeledField> {
    let mut fields: Vec<LabeledField> = Vec::new();
    for line in raw.lines() {
        if let Some(captures) = LABELED_LINE.captures(line) {
            let label = captures.get(1).map_or("", |m| m.as_str());
            let inline = captures
                .get(2)
                .map_or("", |m| m.as_str())
                .trim()
                .trim_end_matches('*')
                .trim();
            fields.push(LabeledField {
                label: Label::from_match(label),
                lines: if inline.is_empty() {
                    Vec::new()
                } else {
                    vec![inline.to_string()]
                },
                closed: false,
            });
            continue;
        }
        let Some(current) = fields.last_mut() else {
            continue;
        };
        if current.closed {
            continue;
        }
        if line.trim().is_empty() {
            // A blank line ends the field unless a list has not started yet.
            if !current.lines.is_empty() || current.label != Label::Sources {
                current.closed = true;
            }
            continue;
        }
        current.lines.push(line.to_string());
    }
    fields
}

/// Longest enumeration label that prefixes `value` on a word boundary.
fn leading_label<T: Copy>(
    value: &str,
    candidates: impl IntoIterator<Item = (&'static str, T)>,
) -> Option<T> {
    let upper = value
        .trim()
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .to_uppercase()
        .replace([' ', '-'], "_");
    candidates
        .into_iter()
        .filter(|(label, _)| {
            upper
                .strip_prefix(label)
                .is_some_and(|rest| !rest.starts_with(|c: char| c.is_alphanumeric()))
        })
        .max_by_key(|(label, _)| label.len())
        .map(|(_, value)| value)
}

fn heuristic_rating(value: &str) -> Option<Rating> {
    leading_label(value, Rating::ALL.map(|rating| (rating.as_str(), rating)))
}

fn heuristic_claim_rating(value: &str) -> ClaimRating {
    leading_label(value, ClaimRating::ALL.map(|rating| (rating.as_str(), rating)))
        .unwrap_or(ClaimRating::Unverifiable)
}

/// First recognizable overall rating mentioned anywhere in `raw`.
fn overall_rating_in_prose(raw: &str) -> Option<Rating> {
    OVERALL_RATING_ANYWHERE
        .captures_iter(raw)
        .filter_map(|captures| captures.get(1))
        .find_map(|value| heuristic_rating(value.as_str()))
}

fn parse_labeled_fields(raw: &str) -> Option<ParsedVerdict> {
    let fields = scan_labeled_fields(raw);
    let overall_field = fields
        .iter()
        .find(|field| field.label == Label::OverallRating && !field.first_line().is_empty());
    // An unrecognized labeled value still counts as a rating line.
    let overall_rating = overall_field
        .and_then(|field| heuristic_rating(field.first_line()))
        .or_else(|| overall_rating_in_prose(raw))
        .or_else(|| overall_field.map(|_| Rating::Unverifiable))?;

    let summary = fields
        .iter()
        .find(|field| field.label == Label::Summary)
        .map(LabeledField::value)
        .unwrap_or_default();

    let mut claims = Vec::new();
    let mut current: Option<ClaimAnalysis> = None;
    for field in &fields {
        match field.label {
            Label::Claim => {
                claims.extend(current.take());
                let text = field.value();
                current = Some(ClaimAnalysis {
                    claim_text: if text.is_empty() {
                        UNSPECIFIED_CLAIM.to_string()
                    } else {
                        text
                    },
                    rating: ClaimRating::Unverifiable,
                    explanation: String::new(),
                    sources: Vec::new(),
                });
            }
            Label::Rating => {
                if let Some(claim) = current.as_mut() {
                    claim.rating = heuristic_claim_rating(field.first_line());
                }
            }
            Label::Explanation => {
                if let Some(claim) = current.as_mut() {
                    claim.explanation = field.value();
                }
            }
            Label::Sources => {
                if let Some(claim) = current.as_mut() {
                    claim.sources.extend(field.list_items());
                }
            }
            Label::OverallRating | Label::Summary | Label::ClaimsHeading => {}
        }
    }
    claims.extend(current);

    Some(ParsedVerdict {
        overall_rating,
        summary,
        claims,
        citations: None,
    })
}

#[cfg(test)]
#[path = "../tests/unit/normalizer.rs"]
mod tests;
