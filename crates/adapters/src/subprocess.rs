// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution with timeout and cancellation.

use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Default ceiling for a single indexing step (fetch, docker run, ignite exec).
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Why a subprocess produced no exit status.
#[derive(Debug)]
pub enum SubprocessError {
    Spawn(std::io::Error),
    Wait(std::io::Error),
    TimedOut(Duration),
    Cancelled,
}

/// Run `cmd` to completion, capturing stdout and stderr.
///
/// The child is killed if `timeout` elapses or `cancel` fires first. A
/// non-zero exit is not an error here; callers inspect `output.status`.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<Output, SubprocessError> {
    if cancel.is_cancelled() {
        return Err(SubprocessError::Cancelled);
    }

    cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);
    let child = cmd.spawn().map_err(SubprocessError::Spawn)?;

    // Dropping the wait future drops the child, which kills it.
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SubprocessError::Cancelled),
        result = tokio::time::timeout(timeout, child.wait_with_output()) => match result {
            Ok(output) => output.map_err(SubprocessError::Wait),
            Err(_) => Err(SubprocessError::TimedOut(timeout)),
        },
    }
}
