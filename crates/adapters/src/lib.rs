// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for external I/O: processes, directories and VM names.

pub mod command;
pub mod id;
pub mod subprocess;
pub mod workspace;

pub use command::{CommandError, CommandRunner, ProcessRunner};
pub use id::{IdError, IdGen, UuidIdGen};
pub use subprocess::DEFAULT_COMMAND_TIMEOUT;
pub use workspace::{TempWorkspaceFactory, Workspace, WorkspaceFactory};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use command::{CommandCall, FakeCommandRunner};
#[cfg(any(test, feature = "test-support"))]
pub use id::FixedIdGen;
#[cfg(any(test, feature = "test-support"))]
pub use workspace::FixedWorkspaceFactory;
