// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ivmd`: run one index job and exit.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use ivm_adapters::{ProcessRunner, TempWorkspaceFactory, UuidIdGen};
use ivm_core::Index;
use ivm_daemon::env::{self, Config};
use ivm_daemon::{Handler, HandlerDeps, IndexManager};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Index one repository commit and upload the result.
///
/// Configuration is read from `IVM_*` environment variables.
#[derive(Parser, Debug)]
#[command(name = "ivmd", version)]
struct Args {
    /// Index job id
    #[arg(long)]
    id: i64,

    /// Repository name, e.g. github.com/org/repo
    #[arg(long)]
    repo: String,

    /// Full 40-character commit sha
    #[arg(long)]
    commit: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_env(env::LOG).unwrap_or_else(|_| EnvFilter::new(env::DEFAULT_LOG));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let index = Index::new(args.id, args.repo, args.commit).context("invalid index job")?;
    let config = Config::from_env().context("invalid configuration")?;

    let handler = Handler::new(
        Arc::new(config.handler),
        HandlerDeps {
            runner: Arc::new(ProcessRunner::new(config.command_timeout)),
            workspaces: Arc::new(TempWorkspaceFactory::new(config.workspace_root)),
            ids: Arc::new(UuidIdGen),
            manager: IndexManager::new(),
        },
    );

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling job");
            on_signal.cancel();
        }
    });

    handler.handle(&cancel, &index).await.with_context(|| format!("{index} failed"))?;
    info!(index_id = index.id, "done");
    Ok(())
}
