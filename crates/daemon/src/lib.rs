// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Indexer VM daemon library
//!
//! Runs code-intelligence index jobs: checks out one commit into a fresh
//! workspace, runs the indexer and uploader either as host containers or
//! inside a Firecracker VM, and reports the outcome to the queue.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod backend;
pub mod env;
pub mod handler;
pub mod manager;
pub mod provision;
pub mod queue;
pub mod worker;

pub use backend::{Backend, ContainerBackend, IgniteBackend};
pub use env::{Config, ConfigError};
pub use handler::{HandleError, Handler, HandlerDeps, StepFailure};
pub use manager::{IndexGuard, IndexManager};
pub use provision::workspace_plan;
pub use queue::{QueueClient, QueueError};
pub use worker::{Worker, WorkerOptions};

#[cfg(any(test, feature = "test-support"))]
pub use queue::FakeQueueClient;
