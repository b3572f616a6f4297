use std::sync::Arc;

use factcheck_agent::{
    DEFAULT_API_URL, DEFAULT_MODEL, DEFAULT_OCR_LANGUAGE, DEFAULT_OCR_URL, FactCheckConfig,
    FactChecker, OcrConfig, OcrSpaceExtractor, RuntimeSettings,
};

use crate::cli::CheckerArgs;
use crate::resolve::{resolve_positive_u64, resolve_positive_usize, resolve_secret, resolve_string};

/// CLI > env > settings > default for every option.
pub(crate) fn resolve_checker_config(
    args: &CheckerArgs,
    runtime_settings: &RuntimeSettings,
) -> FactCheckConfig {
    let settings = &runtime_settings.factcheck;
    let defaults = FactCheckConfig::default();
    FactCheckConfig {
        api_url: resolve_string(
            args.api_url.clone(),
            "FACTCHECK_API_URL",
            settings.api_url.as_deref(),
            DEFAULT_API_URL,
        ),
        model: resolve_string(
            args.model.clone(),
            "FACTCHECK_MODEL",
            settings.model.as_deref(),
            DEFAULT_MODEL,
        ),
        api_key: resolve_secret(
            args.api_key.clone(),
            &["FACTCHECK_API_KEY", "PERPLEXITY_API_KEY"],
        ),
        cache_expiry_ms: resolve_positive_u64(
            args.cache_expiry_ms,
            "FACTCHECK_CACHE_EXPIRY_MS",
            settings.cache_expiry_ms,
            defaults.cache_expiry_ms,
        ),
        max_entries: resolve_positive_usize(
            args.max_entries,
            "FACTCHECK_MAX_ENTRIES",
            settings.max_entries,
            defaults.max_entries,
        ),
        request_timeout_ms: resolve_positive_u64(
            args.request_timeout_ms,
            "FACTCHECK_REQUEST_TIMEOUT_MS",
            settings.request_timeout_ms,
            defaults.request_timeout_ms,
        ),
        sweep_interval_secs: settings
            .sweep_interval_secs
            .filter(|secs| *secs > 0)
            .unwrap_or(defaults.sweep_interval_secs),
        search_domain_filter: settings
            .search_domain_filter
            .clone()
            .unwrap_or(defaults.search_domain_filter),
        temperature: settings.temperature,
        max_tokens: settings.max_tokens,
    }
}

fn resolve_ocr_config(args: &CheckerArgs, runtime_settings: &RuntimeSettings) -> Option<OcrConfig> {
    let api_key = resolve_secret(args.ocr_api_key.clone(), &["FACTCHECK_OCR_API_KEY"])?;
    let settings = &runtime_settings.ocr;
    Some(OcrConfig {
        url: resolve_string(
            None,
            "FACTCHECK_OCR_URL",
            settings.url.as_deref(),
            DEFAULT_OCR_URL,
        ),
        api_key,
        language: settings
            .language
            .clone()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_OCR_LANGUAGE.to_string()),
    })
}

pub(crate) fn build_checker(
    args: &CheckerArgs,
    runtime_settings: &RuntimeSettings,
) -> (Arc<FactChecker>, FactCheckConfig) {
    let config = resolve_checker_config(args, runtime_settings);
    if config.usable_api_key().is_none() {
        tracing::warn!(
            event = "factcheck.config.missing_api_key",
            "no API key configured; fact-checks will fail until FACTCHECK_API_KEY or PERPLEXITY_API_KEY is set"
        );
    }
    let mut checker = FactChecker::new(config.clone());
    if let Some(ocr) = resolve_ocr_config(args, runtime_settings) {
        tracing::info!(
            event = "factcheck.config.ocr_enabled",
            url = %ocr.url,
            language = %ocr.language,
            "image text extraction enabled"
        );
        checker = checker.with_extractor(Arc::new(OcrSpaceExtractor::new(
            ocr,
            config.request_timeout(),
        )));
    }
    tracing::info!(
        event = "factcheck.config.resolved",
        api_url = %config.api_url,
        model = %config.model,
        cache_expiry_ms = config.cache_expiry_ms,
        max_entries = config.max_entries,
        request_timeout_ms = config.request_timeout_ms,
        "fact-check pipeline configured"
    );
    (Arc::new(checker), config)
}
