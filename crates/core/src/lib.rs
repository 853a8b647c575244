// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ivm-core: job, configuration and command-plan types for the indexer VM

pub mod command;
pub mod id;
pub mod index;
pub mod options;
pub mod redact;

#[cfg(any(test, feature = "test-support"))]
#[allow(clippy::panic)]
pub mod test_support;

pub use command::{path_arg, CommandInvocation, CommandPlan, PlanStep, StepKind};
pub use id::{short, VmName};
pub use index::{Index, IndexError, COMMIT_LEN};
pub use options::{
    FrontendUrl, HandlerOptions, OptionsError, GIT_ROUTE, INDEXER_USERNAME, UPLOAD_ROUTE,
};
pub use redact::{redact_arg, redact_args, REDACTED};
