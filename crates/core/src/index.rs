// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Index job descriptor.
//!
//! An `Index` names one repository commit to be indexed. Jobs are created by
//! the upstream queue and are only ever read by the handler.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Length of a full hex-encoded commit SHA.
pub const COMMIT_LEN: usize = 40;

/// Reasons an `Index` cannot be handled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("repository name is empty")]
    EmptyRepository,
    #[error("commit `{0}` is not a full {COMMIT_LEN}-character hex sha")]
    InvalidCommit(String),
}

/// A unit of work identifying one repository commit to index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub id: i64,
    /// Slash-qualified repository name (e.g. `github.com/org/repo`).
    pub repository_name: String,
    /// Full commit sha.
    pub commit: String,
}

impl Index {
    /// Build a validated index job.
    pub fn new(
        id: i64,
        repository_name: impl Into<String>,
        commit: impl Into<String>,
    ) -> Result<Self, IndexError> {
        let index = Self { id, repository_name: repository_name.into(), commit: commit.into() };
        index.validate()?;
        Ok(index)
    }

    /// Check the job invariants. Jobs deserialized from the queue bypass
    /// `new`, so the handler calls this before doing any work.
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.repository_name.trim().is_empty() {
            return Err(IndexError::EmptyRepository);
        }
        if !is_full_sha(&self.commit) {
            return Err(IndexError::InvalidCommit(self.commit.clone()));
        }
        Ok(())
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "index {} ({}@{})", self.id, self.repository_name, crate::short(&self.commit, 7))
    }
}

fn is_full_sha(commit: &str) -> bool {
    commit.len() == COMMIT_LEN && commit.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
#[path = "index_tests.rs"]
mod tests;
