// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use assert_cmd::Command;

const COMMIT: &str = "e2249f2173e8ca0c8c2541644847e7bf01aaef4a";

fn ivmd() -> Command {
    let mut cmd = Command::cargo_bin("ivmd").unwrap();
    for var in ["IVM_FRONTEND_URL", "IVM_FRONTEND_URL_FROM_DOCKER", "IVM_AUTH_TOKEN"] {
        cmd.env_remove(var);
    }
    cmd
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn help_lists_job_arguments() {
    let output = ivmd().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in ["--id", "--repo", "--commit"] {
        assert!(stdout.contains(flag), "missing {flag} in:\n{stdout}");
    }
}

#[test]
fn missing_arguments_fail() {
    let output = ivmd().args(["--id", "1"]).output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn short_commit_is_rejected_before_config() {
    let output = ivmd()
        .args(["--id", "1", "--repo", "github.com/acme/widget", "--commit", "e2249f2"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = stderr(&output);
    assert!(stderr.contains("invalid index job"), "{stderr}");
    assert!(!stderr.contains("IVM_FRONTEND_URL"), "{stderr}");
}

#[test]
fn missing_frontend_url_is_reported() {
    let output = ivmd()
        .args(["--id", "1", "--repo", "github.com/acme/widget", "--commit", COMMIT])
        .env("IVM_AUTH_TOKEN", "hunter2")
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = stderr(&output);
    assert!(stderr.contains("IVM_FRONTEND_URL is not set"), "{stderr}");
}
