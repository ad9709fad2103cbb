// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Provider configuration.
//!
//! Settings come from command-line flags or the environment:
//!
//! | Setting | Environment | Default |
//! |---------|-------------|---------|
//! | `host_url` | `NIOS_HOST_URL` | required |
//! | `username` | `NIOS_USERNAME` | required |
//! | `password` | `NIOS_PASSWORD` | required |
//! | `wapi_version` | `NIOS_WAPI_VERSION` | `v2.13.6` |
//! | `insecure` | `NIOS_INSECURE` | `false` |
//! | `timeout_secs` | `NIOS_TIMEOUT_SECS` | `60` |
//! | `max_retry_secs` | `NIOS_MAX_RETRY_SECS` | `120` |
//! | `default_view` | `NIOS_DEFAULT_VIEW` | `default` |

use clap::Args;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::constants::{
    DEFAULT_DNS_VIEW, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_MAX_RETRY_ELAPSED_SECS,
    DEFAULT_WAPI_VERSION,
};
use crate::errors::ConfigError;
use crate::wapi::{build_base_url, WapiClient};

/// Connection settings for one grid master.
#[derive(Args, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Grid master host or URL (scheme defaults to https)
    #[arg(long, env = "NIOS_HOST_URL", default_value = "")]
    #[serde(default)]
    pub host_url: String,

    /// WAPI user name
    #[arg(long, env = "NIOS_USERNAME", default_value = "")]
    #[serde(default)]
    pub username: String,

    /// WAPI password
    #[arg(long, env = "NIOS_PASSWORD", default_value = "", hide_env_values = true)]
    #[serde(default, skip_serializing)]
    pub password: String,

    /// WAPI version
    #[arg(long, env = "NIOS_WAPI_VERSION", default_value = DEFAULT_WAPI_VERSION)]
    #[serde(default = "default_wapi_version")]
    pub wapi_version: String,

    /// Skip TLS certificate verification
    #[arg(long, env = "NIOS_INSECURE")]
    #[serde(default)]
    pub insecure: bool,

    /// HTTP request timeout in seconds
    #[arg(long, env = "NIOS_TIMEOUT_SECS", default_value_t = DEFAULT_HTTP_TIMEOUT_SECS)]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Total time spent retrying transient WAPI failures, in seconds
    #[arg(long, env = "NIOS_MAX_RETRY_SECS", default_value_t = DEFAULT_MAX_RETRY_ELAPSED_SECS)]
    #[serde(default = "default_max_retry_secs")]
    pub max_retry_secs: u64,

    /// DNS view used when a resource does not set one
    #[arg(long, env = "NIOS_DEFAULT_VIEW", default_value = DEFAULT_DNS_VIEW)]
    #[serde(default = "default_view")]
    pub default_view: String,
}

fn default_wapi_version() -> String {
    DEFAULT_WAPI_VERSION.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

fn default_max_retry_secs() -> u64 {
    DEFAULT_MAX_RETRY_ELAPSED_SECS
}

fn default_view() -> String {
    DEFAULT_DNS_VIEW.to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            host_url: String::new(),
            username: String::new(),
            password: String::new(),
            wapi_version: default_wapi_version(),
            insecure: false,
            timeout_secs: default_timeout_secs(),
            max_retry_secs: default_max_retry_secs(),
            default_view: default_view(),
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("host_url", &self.host_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("wapi_version", &self.wapi_version)
            .field("insecure", &self.insecure)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retry_secs", &self.max_retry_secs)
            .field("default_view", &self.default_view)
            .finish()
    }
}

impl ProviderConfig {
    /// Check every setting.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require("host_url", "NIOS_HOST_URL", &self.host_url)?;
        require("username", "NIOS_USERNAME", &self.username)?;
        require("password", "NIOS_PASSWORD", &self.password)?;
        require("wapi_version", "NIOS_WAPI_VERSION", &self.wapi_version)?;

        if !self.wapi_version.trim_start_matches('/').starts_with('v') {
            return Err(invalid(
                "wapi_version",
                format!("expected a version such as 'v2.13.6', got '{}'", self.wapi_version),
            ));
        }
        build_base_url(&self.host_url, &self.wapi_version)
            .map_err(|e| invalid("host_url", e.to_string()))?;

        if self.timeout_secs == 0 {
            return Err(invalid("timeout_secs", "must be greater than 0".to_string()));
        }
        if self.default_view.trim().is_empty() {
            return Err(invalid("default_view", "must not be blank".to_string()));
        }
        Ok(())
    }

    /// Validate and build a WAPI client.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if validation fails or the HTTP client cannot be built.
    pub fn build_client(&self) -> Result<WapiClient, ConfigError> {
        self.validate()?;

        if self.insecure {
            warn!(host = %self.host_url, "TLS certificate verification is disabled");
        }
        let timeout = Duration::from_secs(self.timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(self.insecure)
            .build()
            .map_err(|e| ConfigError::HttpClient {
                reason: e.to_string(),
            })?;

        let client = WapiClient::new(
            Arc::new(http),
            &self.host_url,
            &self.wapi_version,
            &self.username,
            &self.password,
        )
        .map_err(|e| invalid("host_url", e.to_string()))?
        .with_timeout(timeout)
        .with_max_retry_elapsed(Duration::from_secs(self.max_retry_secs));

        debug!(base_url = %client.base_url(), "WAPI client configured");
        Ok(client)
    }
}

fn require(field: &str, env_var: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingField {
            field: field.to_string(),
            env_var: env_var.to_string(),
        });
    }
    Ok(())
}

fn invalid(field: &str, reason: String) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason,
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
