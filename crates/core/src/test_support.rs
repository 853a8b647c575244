// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixtures and proptest strategies shared by other crates' tests.

use crate::{HandlerOptions, Index};
use proptest::prelude::*;

pub const TEST_REPO: &str = "github.com/sourcegraph/sourcegraph";
pub const TEST_COMMIT: &str = "e2249f2173e8ca0c8c2541644847e7bf01aaef4a";
pub const TEST_TOKEN: &str = "hunter2";

/// Index 42 of the sourcegraph repository.
pub fn test_index() -> Index {
    Index { id: 42, repository_name: TEST_REPO.to_string(), commit: TEST_COMMIT.to_string() }
}

/// Container-backend options pointing at `sourcegraph.test`, 8 cpus and 32G.
pub fn test_options() -> HandlerOptions {
    let mut options = match HandlerOptions::new(
        "https://sourcegraph.test:1234",
        "https://sourcegraph.test:5432",
        TEST_TOKEN,
    ) {
        Ok(options) => options,
        Err(e) => panic!("test options must be valid: {e}"),
    };
    options.firecracker_num_cpus = 8;
    options.firecracker_memory = "32G".to_string();
    options
}

/// Firecracker options with archives staged directly under `/images`.
pub fn test_firecracker_options() -> HandlerOptions {
    let mut options = test_options();
    options.use_firecracker = true;
    options.firecracker_image = "sourcegraph/ignite-ubuntu:latest".to_string();
    options.image_archive_path = "/images".into();
    options.namespace_image_archives = false;
    options
}

/// Strategy for valid index jobs.
pub fn arb_index() -> impl Strategy<Value = Index> {
    (1i64..100_000, "[a-z]{3,10}\\.com/[a-z]{2,8}/[a-z\\-]{2,12}", "[0-9a-f]{40}").prop_map(
        |(id, repository_name, commit)| Index { id, repository_name, commit },
    )
}
