//! factcheck-agent CLI: gateway, stdio, or one-shot check.
//!
//! Settings from `packages/conf/settings.yaml`, overridden per user by
//! `<PRJ_CONFIG_HOME>/factcheck/settings.yaml` (`--conf <dir>` to relocate).
//!
//! Logging: set `RUST_LOG=factcheck_agent=info` (or `warn`, `debug`) to see logs on stderr.

mod checker_builder;
mod cli;
mod nodes;
mod resolve;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use factcheck_agent::{load_runtime_settings, set_config_home_override};

use crate::cli::{Cli, Command};
use crate::nodes::{run_check_mode, run_gateway_mode, run_stdio_mode};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Some(conf_dir) = cli.conf.clone() {
        set_config_home_override(conf_dir);
    }

    // Initialize tracing: RUST_LOG overrides; --verbose => debug; else info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            "factcheck_agent=debug"
        } else {
            "factcheck_agent=info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let runtime_settings = load_runtime_settings();

    match cli.command {
        Command::Gateway {
            bind,
            max_concurrent,
            checker,
        } => run_gateway_mode(bind, max_concurrent, &checker, &runtime_settings).await,
        Command::Stdio { checker } => run_stdio_mode(&checker, &runtime_settings).await,
        Command::Check { text, checker } => {
            run_check_mode(&text, &checker, &runtime_settings).await
        }
    }
}
