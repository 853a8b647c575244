// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Firecracker backend driven through the ignite CLI.
//!
//! The VM has no registry access, so both tool images are pulled and saved
//! to tar archives on the host, copied into the VM at startup, and loaded
//! into the VM's docker before the tools run.
//!
//! ```text
//! docker pull / docker save     (per image, on the host)
//! ignite run --copy-files ...   (arms teardown)
//! ignite exec <vm> -- docker load -i /<image>.tar
//! ignite exec <vm> -- docker run ... indexer
//! ignite exec <vm> -- docker run ... uploader
//! ignite stop <vm> / ignite rm -f <vm>   (teardown)
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ivm_adapters::{IdError, IdGen};
use ivm_core::{path_arg, CommandInvocation, CommandPlan, HandlerOptions, Index, StepKind, VmName};

use super::{indexer_args, uploader_args, Backend, ToolImage, INDEXER, UPLOADER, VM_REPO_DIR};

/// Flags selecting ignite's docker runtime and bridge network on every
/// lifecycle command.
const RUNTIME_FLAGS: &[&str] = &["--runtime", "docker", "--network-plugin", "docker-bridge"];

const STAGED_IMAGES: [ToolImage; 2] = [INDEXER, UPLOADER];

pub struct IgniteBackend {
    options: Arc<HandlerOptions>,
    ids: Arc<dyn IdGen>,
}

impl IgniteBackend {
    pub fn new(options: Arc<HandlerOptions>, ids: Arc<dyn IdGen>) -> Self {
        Self { options, ids }
    }

    /// Host directory holding this VM's staged archives.
    fn archive_dir(&self, vm: &VmName) -> PathBuf {
        if self.options.namespace_image_archives {
            self.options.image_archive_path.join(vm.as_str())
        } else {
            self.options.image_archive_path.clone()
        }
    }

    fn run_args(
        &self,
        workspace: &Path,
        archives: &[(ToolImage, PathBuf)],
        vm: &VmName,
    ) -> Vec<String> {
        let mut args: Vec<String> = ["ignite", "run"].iter().map(|s| s.to_string()).collect();
        args.extend(RUNTIME_FLAGS.iter().map(|s| s.to_string()));
        args.extend([
            "--cpus".to_string(),
            self.options.firecracker_num_cpus.to_string(),
            "--memory".to_string(),
            self.options.firecracker_memory.clone(),
            "--copy-files".to_string(),
            format!("{}:{VM_REPO_DIR}", path_arg(workspace)),
        ]);
        for (tool, archive) in archives {
            args.push("--copy-files".to_string());
            args.push(format!("{}:{}", path_arg(archive), vm_archive_path(tool)));
        }
        args.extend([
            "--ssh".to_string(),
            "--name".to_string(),
            vm.to_string(),
            self.options.firecracker_image.clone(),
        ]);
        args
    }
}

impl Backend for IgniteBackend {
    fn name(&self) -> &'static str {
        "firecracker"
    }

    fn plan(&self, index: &Index, workspace: &Path) -> Result<CommandPlan, IdError> {
        let vm = self.ids.next()?;
        let archive_dir = self.archive_dir(&vm);
        let cmd = |args: Vec<String>| CommandInvocation::new(workspace, args);

        let mut plan = CommandPlan::new();
        if self.options.namespace_image_archives {
            plan.add_scratch_dir(&archive_dir);
        }

        let archives: Vec<(ToolImage, PathBuf)> = STAGED_IMAGES
            .iter()
            .map(|tool| (*tool, archive_dir.join(format!("{}.tar", tool.short_name))))
            .collect();
        for (tool, archive) in &archives {
            plan.push(StepKind::PullImage, cmd(strings(&["docker", "pull", tool.image])))
                .push(
                    StepKind::SaveImage,
                    cmd(strings(&["docker", "save", "-o", &path_arg(archive), tool.image])),
                );
        }

        plan.push_arming(StepKind::StartVm, cmd(self.run_args(workspace, &archives, &vm)));

        for tool in &STAGED_IMAGES {
            plan.push(
                StepKind::LoadImage,
                cmd(exec(&vm, strings(&["docker", "load", "-i", &vm_archive_path(tool)]))),
            );
        }
        plan.push(StepKind::RunIndexer, cmd(exec(&vm, indexer_args(&self.options, VM_REPO_DIR))))
            .push(
                StepKind::RunUploader,
                cmd(exec(&vm, uploader_args(&self.options, index, VM_REPO_DIR))),
            );

        plan.push_teardown(StepKind::StopVm, cmd(lifecycle(&["ignite", "stop"], &vm)))
            .push_teardown(StepKind::RemoveVm, cmd(lifecycle(&["ignite", "rm", "-f"], &vm)));

        Ok(plan)
    }
}

/// Where a staged archive lands inside the VM.
fn vm_archive_path(tool: &ToolImage) -> String {
    format!("/{}.tar", tool.short_name)
}

/// Wrap `args` to run inside `vm` over ssh.
fn exec(vm: &VmName, args: Vec<String>) -> Vec<String> {
    let mut wrapped = strings(&["ignite", "exec", vm.as_str(), "--"]);
    wrapped.extend(args);
    wrapped
}

/// An ignite lifecycle command addressed to `vm`.
fn lifecycle(prefix: &[&str], vm: &VmName) -> Vec<String> {
    let mut args = strings(prefix);
    args.extend(RUNTIME_FLAGS.iter().map(|s| s.to_string()));
    args.push(vm.to_string());
    args
}

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
#[path = "ignite_tests.rs"]
mod tests;
