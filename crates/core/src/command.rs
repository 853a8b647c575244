// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command invocations and ordered command plans.
//!
//! A [`CommandPlan`] is the full, ordered list of external processes a job
//! runs. Order is significant: each step relies on the side effects of the
//! steps before it (a checked-out tree, a staged archive, a running VM).
//!
//! Teardown steps are kept apart from the main sequence so the executor can
//! run them on every exit path once the step that acquires the resource (the
//! arming step) has been attempted. On success they simply run last.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::redact::redact_args;

/// One external process call: a working directory and an argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub dir: PathBuf,
    pub args: Vec<String>,
}

impl CommandInvocation {
    pub fn new<I, S>(dir: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { dir: dir.into(), args: args.into_iter().map(Into::into).collect() }
    }

    /// The executable name (first argument).
    pub fn program(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    /// Space-joined arguments, unredacted. Only for tests and comparisons.
    pub fn command_line(&self) -> String {
        self.args.join(" ")
    }
}

/// Renders the redacted command line; safe to log.
impl fmt::Display for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact_args(&self.args))
    }
}

/// What a plan step does, used to name failures in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    InitRepo,
    FetchCommit,
    Checkout,
    PullImage,
    SaveImage,
    StartVm,
    LoadImage,
    RunIndexer,
    RunUploader,
    StopVm,
    RemoveVm,
}

impl StepKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StepKind::InitRepo => "init repo",
            StepKind::FetchCommit => "fetch commit",
            StepKind::Checkout => "checkout",
            StepKind::PullImage => "pull image",
            StepKind::SaveImage => "save image",
            StepKind::StartVm => "start vm",
            StepKind::LoadImage => "load image",
            StepKind::RunIndexer => "run indexer",
            StepKind::RunUploader => "run uploader",
            StepKind::StopVm => "stop vm",
            StepKind::RemoveVm => "remove vm",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    pub kind: StepKind,
    pub command: CommandInvocation,
}

/// Ordered steps plus the teardown that must follow them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandPlan {
    steps: Vec<PlanStep>,
    teardown: Vec<PlanStep>,
    /// Index into `steps` of the step that acquires the torn-down resource.
    armed_at: Option<usize>,
    /// Host directories the executor creates before the plan and removes after.
    scratch_dirs: Vec<PathBuf>,
}

impl CommandPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: StepKind, command: CommandInvocation) -> &mut Self {
        self.steps.push(PlanStep { kind, command });
        self
    }

    /// Push the step that acquires the resource released by the teardown.
    ///
    /// Teardown is armed as soon as this step is attempted, even if it
    /// fails: a failed start can still leave a registered instance behind.
    pub fn push_arming(&mut self, kind: StepKind, command: CommandInvocation) -> &mut Self {
        self.armed_at = Some(self.steps.len());
        self.push(kind, command)
    }

    pub fn push_teardown(&mut self, kind: StepKind, command: CommandInvocation) -> &mut Self {
        self.teardown.push(PlanStep { kind, command });
        self
    }

    pub fn add_scratch_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.scratch_dirs.push(dir.into());
        self
    }

    /// Append `other` after this plan's steps, merging its teardown.
    pub fn extend(&mut self, other: CommandPlan) -> &mut Self {
        let offset = self.steps.len();
        if let Some(armed) = other.armed_at {
            self.armed_at = Some(self.armed_at.unwrap_or(offset + armed));
        }
        self.steps.extend(other.steps);
        // Teardown of the later plan runs first: release in reverse acquisition order.
        let mut teardown = other.teardown;
        teardown.append(&mut self.teardown);
        self.teardown = teardown;
        self.scratch_dirs.extend(other.scratch_dirs);
        self
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn teardown(&self) -> &[PlanStep] {
        &self.teardown
    }

    pub fn scratch_dirs(&self) -> &[PathBuf] {
        &self.scratch_dirs
    }

    /// Whether teardown must run once the first `attempted` steps were tried.
    ///
    /// Without an arming step the teardown always runs.
    pub fn teardown_required(&self, attempted: usize) -> bool {
        match self.armed_at {
            Some(armed) => attempted > armed,
            None => true,
        }
    }

    /// Total number of invocations on the success path.
    pub fn len(&self) -> usize {
        self.steps.len() + self.teardown.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All steps in success-path order: main steps, then teardown.
    pub fn iter(&self) -> impl Iterator<Item = &PlanStep> {
        self.steps.iter().chain(self.teardown.iter())
    }

    /// Unredacted command lines in success-path order.
    pub fn command_lines(&self) -> Vec<String> {
        self.iter().map(|s| s.command.command_line()).collect()
    }
}

/// Render a host path as a command argument.
pub fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
