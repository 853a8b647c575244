// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.
//!
//! Configuration is resolved once at startup. Unset or empty variables take
//! their defaults; malformed values are errors.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use ivm_core::{HandlerOptions, OptionsError};
use thiserror::Error;

pub const FRONTEND_URL: &str = "IVM_FRONTEND_URL";
pub const FRONTEND_URL_FROM_DOCKER: &str = "IVM_FRONTEND_URL_FROM_DOCKER";
pub const AUTH_TOKEN: &str = "IVM_AUTH_TOKEN";
pub const USE_FIRECRACKER: &str = "IVM_USE_FIRECRACKER";
pub const FIRECRACKER_IMAGE: &str = "IVM_FIRECRACKER_IMAGE";
pub const FIRECRACKER_NUM_CPUS: &str = "IVM_FIRECRACKER_NUM_CPUS";
pub const FIRECRACKER_MEMORY: &str = "IVM_FIRECRACKER_MEMORY";
pub const IMAGE_ARCHIVE_PATH: &str = "IVM_IMAGE_ARCHIVE_PATH";
pub const NAMESPACE_ARCHIVES: &str = "IVM_NAMESPACE_ARCHIVES";
pub const WORKSPACE_ROOT: &str = "IVM_WORKSPACE_ROOT";
pub const COMMAND_TIMEOUT_SECS: &str = "IVM_COMMAND_TIMEOUT_SECS";

/// Tracing filter directives, read by the binary before anything else.
pub const LOG: &str = "IVM_LOG";
pub const DEFAULT_LOG: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("invalid {var} `{value}`: {reason}")]
    Invalid { var: &'static str, value: String, reason: String },
    #[error(transparent)]
    Options(#[from] OptionsError),
}

/// Everything the daemon needs, resolved from the environment.
#[derive(Debug)]
pub struct Config {
    pub handler: HandlerOptions,
    /// Parent of job workspaces; the system temp dir when unset.
    pub workspace_root: Option<PathBuf>,
    pub command_timeout: Duration,
}

impl Config {
    pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(3600);

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let frontend = get(FRONTEND_URL).ok_or(ConfigError::Missing(FRONTEND_URL))?;
        let from_docker = get(FRONTEND_URL_FROM_DOCKER).unwrap_or_else(|| frontend.clone());
        let token = get(AUTH_TOKEN).ok_or(ConfigError::Missing(AUTH_TOKEN))?;
        let mut handler = HandlerOptions::new(&frontend, &from_docker, token)?;

        if let Some(v) = get(USE_FIRECRACKER) {
            handler.use_firecracker = parse_bool(USE_FIRECRACKER, &v)?;
        }
        if let Some(v) = get(FIRECRACKER_IMAGE) {
            handler.firecracker_image = v;
        }
        if let Some(v) = get(FIRECRACKER_NUM_CPUS) {
            handler.firecracker_num_cpus = parse_positive(FIRECRACKER_NUM_CPUS, &v)?;
        }
        if let Some(v) = get(FIRECRACKER_MEMORY) {
            handler.firecracker_memory = parse_memory(&v)?;
        }
        if let Some(v) = get(IMAGE_ARCHIVE_PATH) {
            handler.image_archive_path = PathBuf::from(v);
        }
        if let Some(v) = get(NAMESPACE_ARCHIVES) {
            handler.namespace_image_archives = parse_bool(NAMESPACE_ARCHIVES, &v)?;
        }

        let command_timeout = match get(COMMAND_TIMEOUT_SECS) {
            Some(v) => Duration::from_secs(parse_positive(COMMAND_TIMEOUT_SECS, &v)?),
            None => Self::DEFAULT_COMMAND_TIMEOUT,
        };

        Ok(Self {
            handler,
            workspace_root: get(WORKSPACE_ROOT).map(PathBuf::from),
            command_timeout,
        })
    }
}

fn invalid(var: &'static str, value: &str, reason: impl Display) -> ConfigError {
    ConfigError::Invalid { var, value: value.to_string(), reason: reason.to_string() }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(invalid(var, value, "expected one of 1, 0, true, false, yes, no")),
    }
}

fn parse_positive<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr + Default + PartialEq,
    T::Err: Display,
{
    let parsed: T = value.trim().parse().map_err(|e| invalid(var, value, e))?;
    if parsed == T::default() {
        return Err(invalid(var, value, "must be greater than zero"));
    }
    Ok(parsed)
}

/// Docker/ignite size syntax: digits with an optional `b`, `k`, `m` or `g` unit.
fn parse_memory(value: &str) -> Result<String, ConfigError> {
    let value = value.trim();
    let digits = value.trim_end_matches(|c: char| "bkmgBKMG".contains(c));
    let unit_len = value.len() - digits.len();
    if digits.is_empty() || unit_len > 1 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(FIRECRACKER_MEMORY, value, "expected a size such as 12G or 512m"));
    }
    Ok(value.to_string())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
