// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace population: a fresh repository fetched at exactly one commit.

use std::path::Path;

use ivm_core::{path_arg, CommandInvocation, CommandPlan, HandlerOptions, Index, StepKind};

/// `git init`, a protocol v2 fetch of the single target commit over the
/// authenticated internal git route, and a detached checkout of it.
pub fn workspace_plan(options: &HandlerOptions, index: &Index, workspace: &Path) -> CommandPlan {
    let dir = path_arg(workspace);
    let git = |args: &[&str]| {
        let mut argv = vec!["git".to_string(), "-C".to_string(), dir.clone()];
        argv.extend(args.iter().map(|s| s.to_string()));
        CommandInvocation::new(workspace, argv)
    };

    let fetch_url = options.fetch_url(&index.repository_name);
    let mut plan = CommandPlan::new();
    plan.push(StepKind::InitRepo, git(&["init"]))
        .push(
            StepKind::FetchCommit,
            git(&["-c", "protocol.version=2", "fetch", &fetch_url, &index.commit]),
        )
        .push(StepKind::Checkout, git(&["checkout", &index.commit]));
    plan
}

#[cfg(test)]
#[path = "provision_tests.rs"]
mod tests;
