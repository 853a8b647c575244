// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Direct docker backend.

use std::path::Path;
use std::sync::Arc;

use ivm_adapters::IdError;
use ivm_core::{path_arg, CommandInvocation, CommandPlan, HandlerOptions, Index, StepKind};

use super::{indexer_args, uploader_args, Backend};

/// Runs the indexer and uploader as containers on the host, with the
/// workspace bind-mounted read-write.
pub struct ContainerBackend {
    options: Arc<HandlerOptions>,
}

impl ContainerBackend {
    pub fn new(options: Arc<HandlerOptions>) -> Self {
        Self { options }
    }
}

impl Backend for ContainerBackend {
    fn name(&self) -> &'static str {
        "docker"
    }

    fn plan(&self, index: &Index, workspace: &Path) -> Result<CommandPlan, IdError> {
        let mount = path_arg(workspace);
        let mut plan = CommandPlan::new();
        plan.push(
            StepKind::RunIndexer,
            CommandInvocation::new(workspace, indexer_args(&self.options, &mount)),
        )
        .push(
            StepKind::RunUploader,
            CommandInvocation::new(workspace, uploader_args(&self.options, index, &mount)),
        );
        Ok(plan)
    }
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;
