use anyhow::Context;
use factcheck_agent::RuntimeSettings;

use crate::checker_builder::build_checker;
use crate::cli::CheckerArgs;

pub(crate) async fn run_check_mode(
    text: &str,
    checker_args: &CheckerArgs,
    runtime_settings: &RuntimeSettings,
) -> anyhow::Result<()> {
    let (checker, _config) = build_checker(checker_args, runtime_settings);
    let verdict = checker.check(text).await.context("fact-check failed")?;
    println!("{}", serde_json::to_string_pretty(&verdict)?);
    Ok(())
}
