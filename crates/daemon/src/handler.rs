// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Index job handler.
//!
//! Handling a job is linear: create a workspace, build the command plan
//! (git checkout followed by the backend's commands), run it step by step
//! through the [`CommandRunner`], then clean up.
//!
//! Execution stops at the first failing step. Teardown steps still run once
//! the plan's arming step has been attempted, under a fresh cancellation
//! token so a cancelled job still releases its VM.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ivm_adapters::{CommandError, CommandRunner, IdError, IdGen, Workspace, WorkspaceFactory};
use ivm_core::{CommandPlan, HandlerOptions, Index, IndexError, PlanStep, StepKind};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::backend::{self, Backend};
use crate::manager::IndexManager;
use crate::provision::workspace_plan;

/// A plan step that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("step {position} ({kind}) failed: `{command}`: {error}")]
pub struct StepFailure {
    /// 1-based position across the job's whole plan, teardown included.
    pub position: usize,
    pub kind: StepKind,
    /// Redacted command line.
    pub command: String,
    pub error: CommandError,
}

#[derive(Debug, Error)]
pub enum HandleError {
    #[error("invalid index: {0}")]
    InvalidIndex(#[from] IndexError),
    #[error("failed to create workspace: {0}")]
    Workspace(#[source] io::Error),
    #[error(transparent)]
    VmName(#[from] IdError),
    #[error("failed to create scratch directory {}: {source}", .path.display())]
    ScratchDir { path: PathBuf, source: io::Error },
    #[error("{failure}{}", TeardownSuffix(.teardown))]
    Step { failure: StepFailure, teardown: Vec<StepFailure> },
    #[error("teardown failed: {}", Failures(.failures))]
    Teardown { failures: Vec<StepFailure> },
}

impl HandleError {
    /// The first step that failed, if the job got as far as running commands.
    pub fn failed_step(&self) -> Option<&StepFailure> {
        match self {
            HandleError::Step { failure, .. } => Some(failure),
            HandleError::Teardown { failures } => failures.first(),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, HandleError::Step { failure, .. } if failure.error.is_cancelled())
    }
}

struct Failures<'a>(&'a [StepFailure]);

impl fmt::Display for Failures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

struct TeardownSuffix<'a>(&'a [StepFailure]);

impl fmt::Display for TeardownSuffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        write!(f, " (teardown also failed: {})", Failures(self.0))
    }
}

/// Collaborators injected into a [`Handler`].
#[derive(Clone)]
pub struct HandlerDeps {
    pub runner: Arc<dyn CommandRunner>,
    pub workspaces: Arc<dyn WorkspaceFactory>,
    pub ids: Arc<dyn IdGen>,
    pub manager: IndexManager,
}

/// Runs index jobs. Shareable across concurrent jobs; each job gets its own
/// workspace and VM name.
pub struct Handler {
    options: Arc<HandlerOptions>,
    runner: Arc<dyn CommandRunner>,
    workspaces: Arc<dyn WorkspaceFactory>,
    manager: IndexManager,
    backend: Box<dyn Backend>,
}

impl Handler {
    pub fn new(options: Arc<HandlerOptions>, deps: HandlerDeps) -> Self {
        let backend = backend::select(Arc::clone(&options), deps.ids);
        Self {
            options,
            runner: deps.runner,
            workspaces: deps.workspaces,
            manager: deps.manager,
            backend,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn manager(&self) -> &IndexManager {
        &self.manager
    }

    /// Run one job to completion.
    ///
    /// Cancelling `cancel` stops the in-flight command and skips the rest of
    /// the plan; VM teardown is still attempted.
    pub async fn handle(
        &self,
        cancel: &CancellationToken,
        index: &Index,
    ) -> Result<(), HandleError> {
        index.validate()?;
        let _guard = self.manager.track(index.id);
        info!(
            index_id = index.id,
            repo = %index.repository_name,
            commit = %index.commit,
            backend = self.backend.name(),
            "handling index"
        );

        let workspace = self.workspaces.create().map_err(HandleError::Workspace)?;
        let result = self.run_in(cancel, index, workspace.path()).await;
        close_workspace(workspace).await;

        match &result {
            Ok(()) => info!(index_id = index.id, "index complete"),
            Err(e) => warn!(index_id = index.id, error = %e, "index failed"),
        }
        result
    }

    async fn run_in(
        &self,
        cancel: &CancellationToken,
        index: &Index,
        dir: &Path,
    ) -> Result<(), HandleError> {
        let mut plan = workspace_plan(&self.options, index, dir);
        plan.extend(self.backend.plan(index, dir)?);

        create_scratch_dirs(&plan).await?;
        let result = self.execute(cancel, index, &plan).await;
        remove_scratch_dirs(&plan).await;
        result
    }

    async fn execute(
        &self,
        cancel: &CancellationToken,
        index: &Index,
        plan: &CommandPlan,
    ) -> Result<(), HandleError> {
        let mut attempted = 0;
        let mut failure = None;
        for (i, step) in plan.steps().iter().enumerate() {
            attempted = i + 1;
            if let Err(e) = self.run_step(cancel, index, attempted, step).await {
                warn!(
                    index_id = index.id,
                    position = e.position,
                    step = %e.kind,
                    error = %e.error,
                    "step failed"
                );
                failure = Some(e);
                break;
            }
        }

        let teardown = if plan.teardown_required(attempted) {
            self.teardown(index, plan).await
        } else {
            Vec::new()
        };

        match failure {
            Some(failure) => Err(HandleError::Step { failure, teardown }),
            None if teardown.is_empty() => Ok(()),
            None => Err(HandleError::Teardown { failures: teardown }),
        }
    }

    /// Attempt every teardown step, collecting failures.
    async fn teardown(&self, index: &Index, plan: &CommandPlan) -> Vec<StepFailure> {
        // The job's token may already be cancelled; teardown must not be.
        let cancel = CancellationToken::new();
        let offset = plan.steps().len();
        let mut failures = Vec::new();
        for (i, step) in plan.teardown().iter().enumerate() {
            if let Err(e) = self.run_step(&cancel, index, offset + i + 1, step).await {
                error!(
                    index_id = index.id,
                    position = e.position,
                    step = %e.kind,
                    error = %e.error,
                    "teardown step failed"
                );
                failures.push(e);
            }
        }
        failures
    }

    async fn run_step(
        &self,
        cancel: &CancellationToken,
        index: &Index,
        position: usize,
        step: &PlanStep,
    ) -> Result<(), StepFailure> {
        debug!(
            index_id = index.id,
            position,
            step = %step.kind,
            command = %step.command,
            "running step"
        );
        match self.runner.run(cancel, &step.command.dir, &step.command.args).await {
            Ok(_) => Ok(()),
            Err(error) => Err(StepFailure {
                position,
                kind: step.kind,
                command: step.command.to_string(),
                error,
            }),
        }
    }
}

async fn create_scratch_dirs(plan: &CommandPlan) -> Result<(), HandleError> {
    for dir in plan.scratch_dirs() {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| HandleError::ScratchDir { path: dir.clone(), source })?;
    }
    Ok(())
}

/// Best-effort removal; failures are logged.
async fn remove_scratch_dirs(plan: &CommandPlan) {
    for dir in plan.scratch_dirs() {
        match tokio::fs::remove_dir_all(dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "failed to remove scratch directory")
            }
        }
    }
}

/// Best-effort removal of the workspace off the async runtime.
async fn close_workspace(workspace: Workspace) {
    let path = workspace.path().to_path_buf();
    match tokio::task::spawn_blocking(move || workspace.close()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(path = %path.display(), error = %e, "failed to remove workspace"),
        Err(e) => warn!(path = %path.display(), error = %e, "workspace cleanup task failed"),
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
