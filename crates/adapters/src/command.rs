// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command runner: the single seam through which jobs touch the outside world.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use ivm_core::{redact_arg, redact_args};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::subprocess::{run_with_timeout, SubprocessError, DEFAULT_COMMAND_TIMEOUT};

/// Number of trailing output characters kept in error messages.
const OUTPUT_TAIL: usize = 2000;

/// Errors from running one external command.
///
/// Captured output is redacted before it is stored, so these errors are safe
/// to log and to report upstream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("failed to spawn `{program}`: {message}")]
    Spawn { program: String, message: String },
    #[error("failed waiting on `{program}`: {message}")]
    Wait { program: String, message: String },
    #[error("`{program}` exited with {}{}", exit_label(.code), output_suffix(.output))]
    Exit { program: String, code: Option<i32>, output: String },
    #[error("`{program}` timed out after {timeout:?}")]
    TimedOut { program: String, timeout: Duration },
    #[error("`{program}` cancelled")]
    Cancelled { program: String },
}

impl CommandError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CommandError::Cancelled { .. })
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "signal".to_string(),
    }
}

fn output_suffix(output: &str) -> String {
    let output = output.trim();
    if output.is_empty() {
        return String::new();
    }
    let skip = output.chars().count().saturating_sub(OUTPUT_TAIL);
    if skip == 0 {
        format!(": {output}")
    } else {
        format!(": ...{}", output.chars().skip(skip).collect::<String>())
    }
}

/// Runs one external process.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `args` (program first) in `dir` and return its combined output.
    ///
    /// Must return an error for spawn failures and non-zero exits, and must
    /// stop the process when `cancel` fires.
    async fn run(
        &self,
        cancel: &CancellationToken,
        dir: &Path,
        args: &[String],
    ) -> Result<String, CommandError>;
}

/// Runs commands as real OS processes.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND_TIMEOUT)
    }
}

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(
        &self,
        cancel: &CancellationToken,
        dir: &Path,
        args: &[String],
    ) -> Result<String, CommandError> {
        let (program, rest) = args.split_first().ok_or(CommandError::Empty)?;
        tracing::debug!(command = %redact_args(args), dir = %dir.display(), "running command");
        let mut cmd = tokio::process::Command::new(program);
        cmd.args(rest).current_dir(dir);

        let output = run_with_timeout(cmd, self.timeout, cancel).await.map_err(|e| match e {
            SubprocessError::Spawn(e) => {
                CommandError::Spawn { program: program.clone(), message: e.to_string() }
            }
            SubprocessError::Wait(e) => {
                CommandError::Wait { program: program.clone(), message: e.to_string() }
            }
            SubprocessError::TimedOut(timeout) => {
                CommandError::TimedOut { program: program.clone(), timeout }
            }
            SubprocessError::Cancelled => CommandError::Cancelled { program: program.clone() },
        })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.stderr.is_empty() && !combined.is_empty() && !combined.ends_with('\n') {
            combined.push('\n');
        }
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        let combined = redact_arg(&combined);

        if !output.status.success() {
            return Err(CommandError::Exit {
                program: program.clone(),
                code: output.status.code(),
                output: combined,
            });
        }
        Ok(combined)
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{CommandError, CommandRunner};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    /// Recorded command invocation
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct CommandCall {
        pub dir: PathBuf,
        pub args: Vec<String>,
    }

    impl CommandCall {
        pub fn command_line(&self) -> String {
            self.args.join(" ")
        }
    }

    /// What the fake does when a call matches a prefix.
    #[derive(Debug, Clone)]
    enum Reaction {
        Fail { code: i32, output: String },
        Cancel(CancellationToken),
    }

    #[derive(Default)]
    struct FakeRunnerState {
        calls: Vec<CommandCall>,
        reactions: Vec<(String, Reaction)>,
    }

    /// Fake command runner for testing. Records every call in order and
    /// succeeds unless a reaction matches the call's command line.
    #[derive(Clone, Default)]
    pub struct FakeCommandRunner {
        inner: Arc<Mutex<FakeRunnerState>>,
    }

    impl FakeCommandRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Fail calls whose command line starts with `prefix`.
        pub fn fail_on(&self, prefix: &str, code: i32, output: &str) {
            self.inner.lock().reactions.push((
                prefix.to_string(),
                Reaction::Fail { code, output: output.to_string() },
            ));
        }

        /// Cancel `token` while a call starting with `prefix` is in flight.
        pub fn cancel_on(&self, prefix: &str, token: CancellationToken) {
            self.inner.lock().reactions.push((prefix.to_string(), Reaction::Cancel(token)));
        }

        /// Get all recorded calls
        pub fn calls(&self) -> Vec<CommandCall> {
            self.inner.lock().calls.clone()
        }

        /// Recorded calls as space-joined command lines
        pub fn command_lines(&self) -> Vec<String> {
            self.inner.lock().calls.iter().map(CommandCall::command_line).collect()
        }
    }

    #[async_trait]
    impl CommandRunner for FakeCommandRunner {
        async fn run(
            &self,
            cancel: &CancellationToken,
            dir: &Path,
            args: &[String],
        ) -> Result<String, CommandError> {
            let program = args.first().cloned().ok_or(CommandError::Empty)?;
            let call = CommandCall { dir: dir.to_path_buf(), args: args.to_vec() };
            let line = call.command_line();

            let reaction = {
                let mut state = self.inner.lock();
                state.calls.push(call);
                state
                    .reactions
                    .iter()
                    .find(|(prefix, _)| line.starts_with(prefix.as_str()))
                    .map(|(_, r)| r.clone())
            };

            if cancel.is_cancelled() {
                return Err(CommandError::Cancelled { program });
            }
            match reaction {
                Some(Reaction::Fail { code, output }) => {
                    Err(CommandError::Exit { program, code: Some(code), output })
                }
                Some(Reaction::Cancel(token)) => {
                    token.cancel();
                    Err(CommandError::Cancelled { program })
                }
                None => Ok(String::new()),
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{CommandCall, FakeCommandRunner};

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
