//! Fact-check orchestrator: cache lookup, in-flight dedup, reasoning call,
//! normalization and cache write.

use std::sync::Arc;
use std::time::{Duration, Instant};

use factcheck_types::{ClaimKey, FactCheckError, FactCheckResult, FactCheckVerdict};
use tokio::task::JoinHandle;

use crate::cache::{CacheStatsSnapshot, VerdictCache};
use crate::config::FactCheckConfig;
use crate::dedup::RequestDeduplicator;
use crate::extractor::{ImageInput, TextExtractor};
use crate::llm::{LlmClient, ReasoningApi};
use crate::normalizer::normalize;
use crate::stats::{CheckStats, CheckStatsSnapshot};

const LOG_PREVIEW_CHARS: usize = 80;

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(LOG_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Composes cache, deduplicator, reasoning API and normalizer.
pub struct FactChecker {
    api: Arc<dyn ReasoningApi>,
    extractor: Option<Arc<dyn TextExtractor>>,
    cache: Arc<VerdictCache>,
    dedup: RequestDeduplicator,
    stats: CheckStats,
    request_timeout: Duration,
}

impl FactChecker {
    /// Checker backed by the HTTP reasoning client built from `config`.
    pub fn new(config: FactCheckConfig) -> Self {
        let api: Arc<dyn ReasoningApi> = Arc::new(LlmClient::new(config.clone()));
        Self::with_api(&config, api)
    }

    /// Checker with an injected reasoning backend; cache bounds and the
    /// request timeout still come from `config`.
    pub fn with_api(config: &FactCheckConfig, api: Arc<dyn ReasoningApi>) -> Self {
        Self {
            api,
            extractor: None,
            cache: Arc::new(VerdictCache::new(
                config.cache_expiry(),
                config.max_entries,
            )),
            dedup: RequestDeduplicator::new(),
            stats: CheckStats::default(),
            request_timeout: config.request_timeout(),
        }
    }

    #[must_use]
    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn has_extractor(&self) -> bool {
        self.extractor.is_some()
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Fact-check `text`.
    ///
    /// Cache hits return immediately. On a miss, at most one external call
    /// runs per claim key; concurrent callers share its outcome. Failed calls
    /// are never cached.
    ///
    /// # Errors
    /// [`FactCheckError::Input`] for blank text, [`FactCheckError::Configuration`]
    /// when no credential is available, [`FactCheckError::Upstream`] when the
    /// external call fails or times out.
    pub async fn check(&self, text: &str) -> FactCheckResult<FactCheckVerdict> {
        let key = ClaimKey::try_new(text)?;
        if let Some(verdict) = self.cache.get(&key) {
            tracing::debug!(
                event = "factcheck.cache.hit",
                claim = %preview(key.as_str()),
                "serving cached verdict"
            );
            return Ok(verdict);
        }

        let claim_text = text.trim();
        self.dedup
            .run_exclusive(&key, || self.fetch_and_store(&key, claim_text))
            .await
    }

    async fn fetch_and_store(
        &self,
        key: &ClaimKey,
        claim_text: &str,
    ) -> FactCheckResult<FactCheckVerdict> {
        // A previous leader may have filled the cache between our miss and
        // our registration.
        if let Some(verdict) = self.cache.peek(key) {
            return Ok(verdict);
        }

        let started = Instant::now();
        tracing::info!(
            event = "factcheck.check.started",
            claim = %preview(claim_text),
            "requesting fact-check from reasoning api"
        );
        let completion = match tokio::time::timeout(
            self.request_timeout,
            self.api.complete(claim_text),
        )
        .await
        {
            Ok(Ok(completion)) => completion,
            Ok(Err(error)) => {
                if matches!(error, FactCheckError::Upstream { .. }) {
                    self.stats.record_upstream_failure();
                }
                tracing::warn!(
                    event = "factcheck.check.failed",
                    elapsed_ms = started.elapsed().as_millis(),
                    error = %error,
                    "fact-check failed"
                );
                return Err(error);
            }
            Err(_elapsed) => {
                self.stats.record_upstream_failure();
                let timeout_ms = self.request_timeout.as_millis();
                tracing::warn!(
                    event = "factcheck.check.timed_out",
                    timeout_ms,
                    "fact-check request timed out"
                );
                return Err(FactCheckError::no_response(format!(
                    "fact-check request timed out after {timeout_ms}ms"
                )));
            }
        };

        let verdict = normalize(&completion.content, &completion.citations);
        self.stats.record_verdict(verdict.overall_rating);
        self.cache.put(key.clone(), verdict.clone());
        tracing::info!(
            event = "factcheck.check.completed",
            rating = %verdict.overall_rating,
            claims = verdict.claims.len(),
            citations = verdict.citations.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "fact-check completed"
        );
        Ok(verdict)
    }

    /// Extract text from an image, then [`FactChecker::check`] it.
    ///
    /// # Errors
    /// [`FactCheckError::Configuration`] when no extractor is configured and
    /// [`FactCheckError::Input`] when no text could be extracted, plus every
    /// error of [`FactChecker::check`].
    pub async fn check_image(&self, image: &ImageInput) -> FactCheckResult<FactCheckVerdict> {
        let Some(extractor) = self.extractor.as_ref() else {
            return Err(FactCheckError::Configuration(
                "text extraction is not configured".to_string(),
            ));
        };
        let Some(text) = extractor
            .extract(image)
            .await
            .filter(|text| !text.trim().is_empty())
        else {
            return Err(FactCheckError::Input("no text found in image".to_string()));
        };
        self.check(&text).await
    }

    /// Cached verdict for `text` without any network call.
    pub fn cached(&self, text: &str) -> Option<FactCheckVerdict> {
        let key = ClaimKey::try_new(text).ok()?;
        self.cache.peek(&key)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::info!(event = "factcheck.cache.cleared", "verdict cache cleared");
    }

    pub fn sweep_expired(&self) -> usize {
        self.cache.sweep_expired()
    }

    pub fn is_in_flight(&self, text: &str) -> bool {
        self.dedup.is_in_flight(&ClaimKey::normalize(text))
    }

    pub fn in_flight_count(&self) -> usize {
        self.dedup.in_flight_count()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn cache_stats(&self) -> CacheStatsSnapshot {
        self.cache.stats()
    }

    pub fn stats(&self) -> CheckStatsSnapshot {
        let cache = self.cache.stats();
        self.stats.snapshot(
            cache.hits,
            cache.misses,
            cache.entries,
            self.dedup.joined_total(),
        )
    }

    /// Periodically drop expired verdicts. Abort the handle to stop.
    pub fn spawn_cache_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let cache = Arc::clone(&self.cache);
        let period = interval.max(Duration::from_millis(10));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = cache.sweep_expired();
                if removed > 0 {
                    tracing::debug!(
                        event = "factcheck.cache.swept",
                        removed,
                        remaining = cache.len(),
                        "expired verdicts removed"
                    );
                }
            }
        })
    }
}
