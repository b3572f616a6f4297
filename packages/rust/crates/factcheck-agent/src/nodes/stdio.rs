use factcheck_agent::{RuntimeSettings, run_stdio};

use crate::checker_builder::build_checker;
use crate::cli::CheckerArgs;

pub(crate) async fn run_stdio_mode(
    checker_args: &CheckerArgs,
    runtime_settings: &RuntimeSettings,
) -> anyhow::Result<()> {
    let (checker, config) = build_checker(checker_args, runtime_settings);
    let sweeper = checker.spawn_cache_sweeper(config.sweep_interval());
    let result = run_stdio(checker).await;
    sweeper.abort();
    result
}
