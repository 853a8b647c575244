// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution backends.
//!
//! A backend turns a job and its checked-out workspace into the ordered
//! commands that run the indexer and uploader.
//!
//! # Module layout
//!
//! - [`container`] — runs both tools directly against the host's docker
//! - [`ignite`] — stages images, runs both tools inside a Firecracker VM
//!   managed by ignite, then stops and removes the VM

mod container;
mod ignite;

pub use container::ContainerBackend;
pub use ignite::IgniteBackend;

use std::path::Path;
use std::sync::Arc;

use ivm_adapters::{IdError, IdGen};
use ivm_core::{CommandPlan, HandlerOptions, Index, UPLOAD_ROUTE};

/// A containerized tool the job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolImage {
    pub image: &'static str,
    /// Archive and in-VM file stem.
    pub short_name: &'static str,
}

/// Produces the index artifact inside the mounted workspace.
pub const INDEXER: ToolImage =
    ToolImage { image: "sourcegraph/lsif-go:latest", short_name: "lsif-go" };

/// Uploads the index artifact to the frontend.
pub const UPLOADER: ToolImage =
    ToolImage { image: "sourcegraph/src-cli:latest", short_name: "src-cli" };

const INDEXER_COMMAND: &[&str] = &["lsif-go", "--no-animation"];

/// Mount point of the repository inside tool containers.
pub const CONTAINER_DATA_DIR: &str = "/data";

/// Path the workspace is copied to inside the VM.
pub const VM_REPO_DIR: &str = "/repo-dir";

/// Environment variable the uploader reads its endpoint from.
pub const ENDPOINT_ENV: &str = "SRC_ENDPOINT";

/// Builds the command plan for one job.
pub trait Backend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Commands to run after the workspace at `workspace` is checked out.
    fn plan(&self, index: &Index, workspace: &Path) -> Result<CommandPlan, IdError>;
}

/// Pick the backend for `options`. Decided once, when the handler is built.
pub fn select(options: Arc<HandlerOptions>, ids: Arc<dyn IdGen>) -> Box<dyn Backend> {
    if options.use_firecracker {
        Box::new(IgniteBackend::new(options, ids))
    } else {
        Box::new(ContainerBackend::new(options))
    }
}

/// `docker run` prefix shared by both tools: auto-removal, resource limits,
/// and `mount_source` mounted as the working directory.
fn docker_run(options: &HandlerOptions, mount_source: &str) -> Vec<String> {
    vec![
        "docker".to_string(),
        "run".to_string(),
        "--rm".to_string(),
        "--cpus".to_string(),
        options.firecracker_num_cpus.to_string(),
        "--memory".to_string(),
        options.firecracker_memory.clone(),
        "-v".to_string(),
        format!("{mount_source}:{CONTAINER_DATA_DIR}"),
        "-w".to_string(),
        CONTAINER_DATA_DIR.to_string(),
    ]
}

/// Run the indexer over the repository at `mount_source`.
pub(crate) fn indexer_args(options: &HandlerOptions, mount_source: &str) -> Vec<String> {
    let mut args = docker_run(options, mount_source);
    args.push(INDEXER.image.to_string());
    args.extend(INDEXER_COMMAND.iter().map(|s| s.to_string()));
    args
}

/// Upload the artifact at `mount_source` for the job's repository and commit.
pub(crate) fn uploader_args(
    options: &HandlerOptions,
    index: &Index,
    mount_source: &str,
) -> Vec<String> {
    let mut args = docker_run(options, mount_source);
    args.push("-e".to_string());
    args.push(format!("{ENDPOINT_ENV}={}", options.upload_endpoint()));
    args.push(UPLOADER.image.to_string());
    args.extend(
        [
            "lsif",
            "upload",
            "-no-progress",
            "-repo",
            &index.repository_name,
            "-commit",
            &index.commit,
            "-upload-route",
            UPLOAD_ROUTE,
        ]
        .iter()
        .map(|s| s.to_string()),
    );
    args
}
