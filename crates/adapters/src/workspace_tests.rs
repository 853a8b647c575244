// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn temp_factory_creates_distinct_directories() {
    let root = tempfile::tempdir().unwrap();
    let factory = TempWorkspaceFactory::new(Some(root.path().join("workspaces")));

    let a = factory.create().unwrap();
    let b = factory.create().unwrap();

    assert_ne!(a.path(), b.path());
    assert!(a.path().is_dir());
    assert!(a.path().starts_with(root.path().join("workspaces")));
    let name = a.path().file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with(WORKSPACE_PREFIX), "{name}");
}

#[test]
fn close_removes_populated_workspace() {
    let root = tempfile::tempdir().unwrap();
    let factory = TempWorkspaceFactory::new(Some(root.path().to_path_buf()));
    let workspace = factory.create().unwrap();
    let path = workspace.path().to_path_buf();
    std::fs::create_dir_all(path.join(".git/objects")).unwrap();
    std::fs::write(path.join("main.go"), "package main").unwrap();

    workspace.close().unwrap();
    assert!(!path.exists());
}

#[test]
fn fixed_workspace_close_leaves_path_alone() {
    let dir = tempfile::tempdir().unwrap();
    let workspace = FixedWorkspaceFactory::new(dir.path()).create().unwrap();
    assert_eq!(workspace.path(), dir.path());
    workspace.close().unwrap();
    assert!(dir.path().exists());
}

#[test]
fn fixed_factory_does_not_require_path_to_exist() {
    let workspace = FixedWorkspaceFactory::new("/tmp/testing").create().unwrap();
    assert_eq!(workspace.path(), Path::new("/tmp/testing"));
}
