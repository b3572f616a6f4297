//! Fact-check pipeline: reasoning API client, verdict normalizer, verdict
//! cache, in-flight request deduplication; HTTP and stdio gateways.
//!
//! - **Normalizer**: raw model text → typed verdict, never failing.
//! - **Cache + dedup**: at most one external call per claim key at a time;
//!   verdicts reused until they expire or are evicted.

#![allow(missing_docs)]

mod cache;
mod checker;
mod config;
mod dedup;
mod extractor;
mod gateway;
mod llm;
mod normalizer;
mod prompt;
mod stats;

pub use cache::{CacheStatsSnapshot, VerdictCache};
pub use checker::FactChecker;
pub use config::{
    DEFAULT_API_URL, DEFAULT_MODEL, DEFAULT_OCR_LANGUAGE, DEFAULT_OCR_URL, FactCheckConfig,
    FactCheckSettings, GatewaySettings, OcrConfig, OcrSettings, RuntimeSettings,
    load_runtime_settings, load_runtime_settings_from_paths, runtime_settings_paths,
    set_config_home_override,
};
pub use dedup::RequestDeduplicator;
pub use extractor::{ImageInput, OcrSpaceExtractor, TextExtractor};
pub use gateway::{
    CacheClearedResponse, CacheQuery, CachedVerdictResponse, ErrorResponse, FactCheckRequest,
    GatewayHealthResponse, GatewayState, ImageCheckRequest, error_status, router, run_http,
    run_stdio, run_stdio_with_io,
};
pub use llm::{CompletionEnvelope, LlmClient, ReasoningApi};
pub use normalizer::{FALLBACK_SUMMARY, normalize};
pub use prompt::SYSTEM_INSTRUCTION;
pub use stats::CheckStatsSnapshot;

pub use factcheck_types::{
    Citation, ClaimAnalysis, ClaimKey, ClaimRating, FactCheckError, FactCheckResult,
    FactCheckVerdict, Rating, SourceRef,
};
