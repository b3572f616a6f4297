use factcheck_agent::{RuntimeSettings, run_http};

use crate::checker_builder::build_checker;
use crate::cli::CheckerArgs;

const DEFAULT_BIND: &str = "0.0.0.0:3000";

pub(crate) async fn run_gateway_mode(
    bind: Option<String>,
    max_concurrent: Option<usize>,
    checker_args: &CheckerArgs,
    runtime_settings: &RuntimeSettings,
) -> anyhow::Result<()> {
    let (checker, config) = build_checker(checker_args, runtime_settings);
    let sweeper = checker.spawn_cache_sweeper(config.sweep_interval());
    let bind = bind
        .or_else(|| runtime_settings.gateway.bind.clone())
        .unwrap_or_else(|| DEFAULT_BIND.to_string());
    let max_concurrent = max_concurrent
        .or(runtime_settings.gateway.max_concurrent)
        .filter(|n| *n > 0);
    let result = run_http(checker, &bind, max_concurrent).await;
    sweeper.abort();
    result
}
