// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handler configuration.
//!
//! Resolved once at startup and never mutated. The auth token is embedded
//! into frontend URLs as basic-auth userinfo; it is held as a
//! [`SecretString`] so `Debug` output never shows it.

use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Username paired with the auth token in every authenticated URL.
pub const INDEXER_USERNAME: &str = "indexer";

/// Frontend route serving git data to indexers.
pub const GIT_ROUTE: &str = "/.internal-code-intel/git";

/// Frontend route accepting index uploads.
pub const UPLOAD_ROUTE: &str = "/.internal-code-intel/lsif/upload";

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("invalid frontend url `{url}`: {source}")]
    InvalidUrl { url: String, source: url::ParseError },
    #[error("frontend url `{0}` must be an absolute url with a host")]
    NotAbsolute(String),
    #[error("frontend url `{0}` must use http or https")]
    UnsupportedScheme(String),
    #[error("auth token is empty")]
    EmptyToken,
}

/// A frontend base URL that can carry credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendUrl(Url);

impl FrontendUrl {
    pub fn parse(raw: &str) -> Result<Self, OptionsError> {
        let url = Url::parse(raw)
            .map_err(|source| OptionsError::InvalidUrl { url: raw.to_string(), source })?;
        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(OptionsError::NotAbsolute(raw.to_string()));
        }
        if !matches!(url.scheme(), "http" | "https") {
            return Err(OptionsError::UnsupportedScheme(raw.to_string()));
        }
        Ok(Self(url))
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Render the URL with `indexer:<token>` userinfo and no trailing slash.
    pub fn with_credentials(&self, token: &SecretString) -> String {
        let mut url = self.0.clone();
        // Cannot fail: `parse` admits only http(s) URLs with a host.
        let _ = url.set_username(INDEXER_USERNAME);
        let _ = url.set_password(Some(token.expose_secret()));
        url.as_str().trim_end_matches('/').to_string()
    }
}

/// Options shared by every job a handler runs.
#[derive(Debug)]
pub struct HandlerOptions {
    /// Frontend as reachable from the host (used for `git fetch`).
    pub frontend_url: FrontendUrl,
    /// Frontend as reachable from inside a container or VM (used by the uploader).
    pub frontend_url_from_docker: FrontendUrl,
    pub auth_token: SecretString,
    /// Run jobs inside an isolated Firecracker VM instead of directly in docker.
    pub use_firecracker: bool,
    /// Base image for the isolated VM.
    pub firecracker_image: String,
    pub firecracker_num_cpus: u32,
    /// Memory limit in docker/ignite syntax (e.g. `12G`).
    pub firecracker_memory: String,
    /// Host directory holding staged image archives.
    pub image_archive_path: PathBuf,
    /// Stage archives under a per-VM subdirectory of `image_archive_path`.
    pub namespace_image_archives: bool,
}

impl HandlerOptions {
    pub const DEFAULT_FIRECRACKER_IMAGE: &'static str = "sourcegraph/ignite-ubuntu:insiders";
    pub const DEFAULT_NUM_CPUS: u32 = 4;
    pub const DEFAULT_MEMORY: &'static str = "12G";

    /// Build options for the container backend with default VM settings.
    pub fn new(
        frontend_url: &str,
        frontend_url_from_docker: &str,
        auth_token: impl Into<String>,
    ) -> Result<Self, OptionsError> {
        let auth_token: String = auth_token.into();
        if auth_token.is_empty() {
            return Err(OptionsError::EmptyToken);
        }
        Ok(Self {
            frontend_url: FrontendUrl::parse(frontend_url)?,
            frontend_url_from_docker: FrontendUrl::parse(frontend_url_from_docker)?,
            auth_token: SecretString::from(auth_token),
            use_firecracker: false,
            firecracker_image: Self::DEFAULT_FIRECRACKER_IMAGE.to_string(),
            firecracker_num_cpus: Self::DEFAULT_NUM_CPUS,
            firecracker_memory: Self::DEFAULT_MEMORY.to_string(),
            image_archive_path: std::env::temp_dir().join("ivm-images"),
            namespace_image_archives: true,
        })
    }

    /// Authenticated URL to fetch `repository_name` from.
    pub fn fetch_url(&self, repository_name: &str) -> String {
        format!(
            "{}{}/{}",
            self.frontend_url.with_credentials(&self.auth_token),
            GIT_ROUTE,
            repository_name
        )
    }

    /// Authenticated endpoint handed to the uploader inside a container or VM.
    pub fn upload_endpoint(&self) -> String {
        self.frontend_url_from_docker.with_credentials(&self.auth_token)
    }
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;
