//! `sri serve` – drive an integrity controller from editor events on stdin.

use anyhow::{Context, Result};
use sri_core::config::{ConfigStore, SharedConfig, SriConfig};
use sri_core::controller::{Controller, ControllerHandle};
use sri_core::runner::{DigestRunner, InProcessRunner, ProcessRunner};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::host::{parse_line, ActiveFile, HostCommand, StdoutClipboard, StdoutIndicator};

pub async fn run_serve(cfg: SriConfig, in_process: bool, sri_gen: Option<PathBuf>) -> Result<()> {
    let config = SharedConfig::new(cfg);
    if in_process {
        tracing::info!("serve: hashing in process");
        return serve(InProcessRunner, config).await;
    }
    let program = match sri_gen {
        Some(p) => p,
        None => default_sri_gen()?,
    };
    tracing::info!(program = %program.display(), "serve: hashing via sri-gen");
    serve(ProcessRunner::new(program), config).await
}

/// `sri-gen` installed next to the running `sri` binary.
fn default_sri_gen() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("locate current executable")?;
    let dir = exe
        .parent()
        .context("current executable has no parent directory")?;
    Ok(dir.join(format!("sri-gen{}", std::env::consts::EXE_SUFFIX)))
}

async fn serve<R: DigestRunner>(runner: R, config: SharedConfig) -> Result<()> {
    let active = ActiveFile::default();
    let handle = Controller::new(
        runner,
        StdoutIndicator,
        StdoutClipboard,
        Arc::new(config.clone()),
        active.clone(),
    )
    .activate();

    let mut sent = 0u64;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("read stdin")? {
        match parse_line(&line) {
            Ok(None) => {}
            Ok(Some(HostCommand::SetAlgorithm(algorithm))) => config.set_algorithm(algorithm),
            Ok(Some(HostCommand::Event(event))) => match active.resolve(event) {
                Some(event) => {
                    handle.send(event).await?;
                    sent += 1;
                }
                None => tracing::debug!("hash-active: no saved file is active"),
            },
            Err(e) => tracing::warn!(line = %line, "ignoring input line: {:#}", e),
        }
    }

    drain(&handle, sent, &config).await;
    handle.deactivate().await
}

/// Wait until every forwarded event was handled and its digests reported back,
/// bounded by the dispatch timeout.
async fn drain(handle: &ControllerHandle, sent: u64, config: &SharedConfig) {
    let mut rx = handle.state();
    let limit = config.dispatch_timeout();
    let settled = tokio::time::timeout(
        limit,
        rx.wait_for(|s| s.events_handled >= sent && s.in_flight == 0),
    )
    .await;
    if !matches!(settled, Ok(Ok(_))) {
        tracing::warn!("input closed with digests still running; dropping them");
    }
}
