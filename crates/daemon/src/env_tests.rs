// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use secrecy::ExposeSecret;
use serial_test::serial;
use std::collections::HashMap;

fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
    let vars: HashMap<&str, &str> = vars.iter().copied().collect();
    move |name| vars.get(name).map(|v| v.to_string())
}

const REQUIRED: [(&str, &str); 2] =
    [(FRONTEND_URL, "https://sourcegraph.test:1234"), (AUTH_TOKEN, "hunter2")];

fn with_required(extra: &[(&'static str, &'static str)]) -> Result<Config, ConfigError> {
    let mut vars = REQUIRED.to_vec();
    vars.extend_from_slice(extra);
    Config::from_lookup(lookup(&vars))
}

#[test]
fn defaults_apply_when_only_required_vars_set() {
    let config = with_required(&[]).unwrap();

    assert_eq!(config.handler.frontend_url.as_url().as_str(), "https://sourcegraph.test:1234/");
    assert_eq!(config.handler.frontend_url_from_docker, config.handler.frontend_url);
    assert_eq!(config.handler.auth_token.expose_secret(), "hunter2");
    assert!(!config.handler.use_firecracker);
    assert_eq!(config.handler.firecracker_image, "sourcegraph/ignite-ubuntu:insiders");
    assert_eq!(config.handler.firecracker_num_cpus, 4);
    assert_eq!(config.handler.firecracker_memory, "12G");
    assert!(config.handler.namespace_image_archives);
    assert_eq!(config.workspace_root, None);
    assert_eq!(config.command_timeout, Duration::from_secs(3600));
}

#[test]
fn every_variable_is_honored() {
    let config = with_required(&[
        (FRONTEND_URL_FROM_DOCKER, "http://host.docker.internal:3080"),
        (USE_FIRECRACKER, "true"),
        (FIRECRACKER_IMAGE, "sourcegraph/ignite-ubuntu:latest"),
        (FIRECRACKER_NUM_CPUS, "8"),
        (FIRECRACKER_MEMORY, "32G"),
        (IMAGE_ARCHIVE_PATH, "/images"),
        (NAMESPACE_ARCHIVES, "no"),
        (WORKSPACE_ROOT, "/var/lib/ivm"),
        (COMMAND_TIMEOUT_SECS, "90"),
    ])
    .unwrap();

    assert_eq!(
        config.handler.frontend_url_from_docker.as_url().as_str(),
        "http://host.docker.internal:3080/"
    );
    assert!(config.handler.use_firecracker);
    assert_eq!(config.handler.firecracker_image, "sourcegraph/ignite-ubuntu:latest");
    assert_eq!(config.handler.firecracker_num_cpus, 8);
    assert_eq!(config.handler.firecracker_memory, "32G");
    assert_eq!(config.handler.image_archive_path, PathBuf::from("/images"));
    assert!(!config.handler.namespace_image_archives);
    assert_eq!(config.workspace_root, Some(PathBuf::from("/var/lib/ivm")));
    assert_eq!(config.command_timeout, Duration::from_secs(90));
}

#[test]
fn poll_loop_variables_are_not_read() {
    let config =
        with_required(&[("IVM_POLL_INTERVAL_MS", "0"), ("IVM_MAX_CONCURRENT", "0")]).unwrap();
    assert_eq!(config.command_timeout, Config::DEFAULT_COMMAND_TIMEOUT);
}

#[yare::parameterized(
    frontend = { FRONTEND_URL },
    token = { AUTH_TOKEN },
)]
fn required_variable_missing(var: &str) {
    let vars: Vec<_> = REQUIRED.iter().copied().filter(|(name, _)| *name != var).collect();
    let err = Config::from_lookup(lookup(&vars)).unwrap_err();
    assert!(matches!(err, ConfigError::Missing(name) if name == var), "{err}");
    assert_eq!(err.to_string(), format!("{var} is not set"));
}

#[test]
fn empty_token_is_missing() {
    let vars = [(FRONTEND_URL, "https://sourcegraph.test"), (AUTH_TOKEN, "")];
    let err = Config::from_lookup(lookup(&vars)).unwrap_err();
    assert!(matches!(err, ConfigError::Missing(AUTH_TOKEN)));
}

#[test]
fn relative_frontend_url_is_rejected() {
    let vars = [(FRONTEND_URL, "sourcegraph.test"), (AUTH_TOKEN, "hunter2")];
    let err = Config::from_lookup(lookup(&vars)).unwrap_err();
    assert!(matches!(err, ConfigError::Options(_)), "{err}");
}

#[yare::parameterized(
    one = { "1", true },
    zero = { "0", false },
    upper_true = { "TRUE", true },
    false_ = { "false", false },
    yes = { "Yes", true },
    no = { "no", false },
)]
fn bool_spellings(value: &'static str, expected: bool) {
    let config = with_required(&[(USE_FIRECRACKER, value)]).unwrap();
    assert_eq!(config.handler.use_firecracker, expected);
}

#[yare::parameterized(
    bad_bool = { USE_FIRECRACKER, "maybe" },
    zero_cpus = { FIRECRACKER_NUM_CPUS, "0" },
    negative_cpus = { FIRECRACKER_NUM_CPUS, "-2" },
    word_cpus = { FIRECRACKER_NUM_CPUS, "eight" },
    memory_no_digits = { FIRECRACKER_MEMORY, "G" },
    memory_two_units = { FIRECRACKER_MEMORY, "12GB" },
    memory_fraction = { FIRECRACKER_MEMORY, "1.5G" },
    zero_timeout = { COMMAND_TIMEOUT_SECS, "0" },
)]
fn malformed_values_are_rejected(var: &'static str, value: &'static str) {
    let err = with_required(&[(var, value)]).unwrap_err();
    match err {
        ConfigError::Invalid { var: name, value: got, .. } => {
            assert_eq!(name, var);
            assert_eq!(got, value);
        }
        other => panic!("expected invalid {var}, got {other}"),
    }
}

#[yare::parameterized(
    gigabytes = { "32G" },
    lower_megabytes = { "512m" },
    bare_bytes = { "1073741824" },
)]
fn memory_sizes_accepted(value: &'static str) {
    let config = with_required(&[(FIRECRACKER_MEMORY, value)]).unwrap();
    assert_eq!(config.handler.firecracker_memory, value);
}

#[test]
#[serial]
fn from_env_reads_process_environment() {
    std::env::set_var(FRONTEND_URL, "https://sourcegraph.test:1234");
    std::env::set_var(AUTH_TOKEN, "hunter2");
    std::env::set_var(FIRECRACKER_NUM_CPUS, "2");

    let result = Config::from_env();

    std::env::remove_var(FRONTEND_URL);
    std::env::remove_var(AUTH_TOKEN);
    std::env::remove_var(FIRECRACKER_NUM_CPUS);

    assert_eq!(result.unwrap().handler.firecracker_num_cpus, 2);
}
