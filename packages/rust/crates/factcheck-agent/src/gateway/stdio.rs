//! Stdio gateway: read claim lines from stdin → fact-check → print one JSON line each.

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::checker::FactChecker;
use crate::gateway::http::ErrorResponse;

/// Run stdio loop until EOF: each non-empty line is checked and answered
/// with a verdict or `{"error": ...}` object on its own line.
pub async fn run_stdio(checker: Arc<FactChecker>) -> Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    run_stdio_with_io(&checker, reader, tokio::io::stdout()).await
}

#[doc(hidden)]
pub async fn run_stdio_with_io<R, W>(checker: &FactChecker, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut out = match checker.check(line).await {
            Ok(verdict) => serde_json::to_string(&verdict)?,
            Err(error) => serde_json::to_string(&ErrorResponse {
                error: error.user_message().to_string(),
            })?,
        };
        out.push('\n');
        writer.write_all(out.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}
