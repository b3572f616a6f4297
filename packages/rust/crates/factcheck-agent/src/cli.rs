use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "factcheck-agent")]
#[command(about = "Fact-check claims with a search-backed reasoning API. Gateway, stdio, or one-shot check.")]
pub(crate) struct Cli {
    /// Override config directory (user settings at <conf>/factcheck/settings.yaml).
    #[arg(long, global = true)]
    pub(crate) conf: Option<PathBuf>,

    /// Debug logging (RUST_LOG still wins when set).
    #[arg(long, short, global = true)]
    pub(crate) verbose: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

/// Overrides for the fact-check pipeline; each falls back to env, then settings, then default.
#[derive(Debug, Clone, Default, Args)]
pub(crate) struct CheckerArgs {
    /// Chat completions endpoint (env: FACTCHECK_API_URL)
    #[arg(long)]
    pub(crate) api_url: Option<String>,

    /// Model id (env: FACTCHECK_MODEL; default: sonar-pro)
    #[arg(long)]
    pub(crate) model: Option<String>,

    /// API key (env: FACTCHECK_API_KEY or PERPLEXITY_API_KEY)
    #[arg(long)]
    pub(crate) api_key: Option<String>,

    /// Cache entry lifetime in milliseconds (env: FACTCHECK_CACHE_EXPIRY_MS; default: 6h)
    #[arg(long)]
    pub(crate) cache_expiry_ms: Option<u64>,

    /// Maximum cached verdicts (env: FACTCHECK_MAX_ENTRIES; default: 100)
    #[arg(long)]
    pub(crate) max_entries: Option<usize>,

    /// Per-request timeout in milliseconds (env: FACTCHECK_REQUEST_TIMEOUT_MS; default: 30000)
    #[arg(long)]
    pub(crate) request_timeout_ms: Option<u64>,

    /// OCR service key; enables image checks (env: FACTCHECK_OCR_API_KEY)
    #[arg(long)]
    pub(crate) ocr_api_key: Option<String>,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run HTTP server (POST /api/fact-check). Default bind: 0.0.0.0:3000
    Gateway {
        /// Listen address (e.g. 0.0.0.0:3000)
        #[arg(long)]
        bind: Option<String>,

        /// Max concurrent fact-checks (omit for settings value / no limit)
        #[arg(long)]
        max_concurrent: Option<usize>,

        #[command(flatten)]
        checker: CheckerArgs,
    },
    /// Read claims from stdin (one per line), print one JSON verdict per line. Exit on EOF.
    Stdio {
        #[command(flatten)]
        checker: CheckerArgs,
    },
    /// Check one claim and print the verdict as JSON.
    Check {
        /// Claim text to check.
        #[arg(long)]
        text: String,

        #[command(flatten)]
        checker: CheckerArgs,
    },
}
