// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ephemeral job workspaces.
//!
//! The factory only creates the directory; populating it with the repository
//! is a sequence of git commands run by the handler.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Prefix for workspace directory names.
pub const WORKSPACE_PREFIX: &str = "ivm-";

/// A job's working directory. Removed by [`Workspace::close`].
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    dir: Option<TempDir>,
}

impl Workspace {
    /// A workspace at a caller-owned path; `close` leaves it in place.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), dir: None }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the directory and everything in it.
    pub fn close(self) -> io::Result<()> {
        match self.dir {
            Some(dir) => dir.close(),
            None => Ok(()),
        }
    }
}

impl From<TempDir> for Workspace {
    fn from(dir: TempDir) -> Self {
        Self { path: dir.path().to_path_buf(), dir: Some(dir) }
    }
}

/// Creates a fresh, empty workspace per job.
pub trait WorkspaceFactory: Send + Sync {
    fn create(&self) -> io::Result<Workspace>;
}

/// Creates workspaces as temporary directories under `root`
/// (the system temp directory when unset).
#[derive(Debug, Clone, Default)]
pub struct TempWorkspaceFactory {
    root: Option<PathBuf>,
}

impl TempWorkspaceFactory {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }
}

impl WorkspaceFactory for TempWorkspaceFactory {
    fn create(&self) -> io::Result<Workspace> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let dir = match &self.root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };
        Ok(Workspace::from(dir))
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{Workspace, WorkspaceFactory};
    use std::io;
    use std::path::PathBuf;

    /// Hands out the same path for every job without touching the disk.
    #[derive(Debug, Clone)]
    pub struct FixedWorkspaceFactory {
        path: PathBuf,
    }

    impl FixedWorkspaceFactory {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }
    }

    impl WorkspaceFactory for FixedWorkspaceFactory {
        fn create(&self) -> io::Result<Workspace> {
            Ok(Workspace::at(self.path.clone()))
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FixedWorkspaceFactory;

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
