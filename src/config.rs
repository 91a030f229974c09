// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Runtime settings read from the environment.
//!
//! | Variable               | Effect                                        |
//! |------------------------|-----------------------------------------------|
//! | `CLOUD_PROVIDER`       | Skip provider detection and use this value    |
//! | `CNI_PLUGIN`           | Skip CNI detection and use this value         |
//! | `TEST_TIMEOUT`         | Replace the tuned per-recipe timeout (secs)   |
//! | `MAX_WORKERS`          | Replace the tuned parallel worker count       |
//! | `RESULTS_DIR`          | Output directory for reports                  |
//! | `KUBE_REQUEST_TIMEOUT` | Budget for a single cluster query (secs)      |
//!
//! Empty values count as unset. Command-line flags take precedence.

use crate::constants::{
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RESULTS_DIR, ENV_CLOUD_PROVIDER, ENV_CNI_PLUGIN,
    ENV_KUBE_REQUEST_TIMEOUT, ENV_MAX_WORKERS, ENV_RESULTS_DIR, ENV_TEST_TIMEOUT,
};
use crate::errors::ConfigError;
use crate::planner::PlanOverrides;
use crate::types::{CniPlugin, Provider};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Effective settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub provider_override: Option<Provider>,
    pub cni_override: Option<CniPlugin>,
    pub test_timeout: Option<u64>,
    pub max_workers: Option<u32>,
    pub results_dir: PathBuf,
    pub request_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider_override: None,
            cni_override: None,
            test_timeout: None,
            max_workers: None,
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for unparseable values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup function.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for unparseable values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let provider_override = get(ENV_CLOUD_PROVIDER)
            .map(|v| {
                Provider::from_str(&v).map_err(|e| invalid(ENV_CLOUD_PROVIDER, &v, &e.to_string()))
            })
            .transpose()?;

        let cni_override = get(ENV_CNI_PLUGIN).map(|v| CniPlugin::from_name(&v));

        let test_timeout = get(ENV_TEST_TIMEOUT)
            .map(|v| parse_positive::<u64>(ENV_TEST_TIMEOUT, &v))
            .transpose()?;

        let max_workers = get(ENV_MAX_WORKERS)
            .map(|v| parse_positive::<u32>(ENV_MAX_WORKERS, &v))
            .transpose()?;

        let results_dir = get(ENV_RESULTS_DIR)
            .map_or_else(|| PathBuf::from(DEFAULT_RESULTS_DIR), PathBuf::from);

        let request_timeout = get(ENV_KUBE_REQUEST_TIMEOUT)
            .map(|v| parse_positive::<u64>(ENV_KUBE_REQUEST_TIMEOUT, &v))
            .transpose()?
            .map_or(
                Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
                Duration::from_secs,
            );

        Ok(Self {
            provider_override,
            cni_override,
            test_timeout,
            max_workers,
            results_dir,
            request_timeout,
        })
    }

    /// Plan overrides derived from `TEST_TIMEOUT` and `MAX_WORKERS`.
    #[must_use]
    pub fn plan_overrides(&self) -> PlanOverrides {
        PlanOverrides {
            timeout_seconds: self.test_timeout,
            worker_count: self.max_workers,
        }
    }
}

fn parse_positive<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr + PartialEq + Default,
{
    let parsed: T = value
        .parse()
        .map_err(|_| invalid(key, value, "not a non-negative integer"))?;
    if parsed == T::default() {
        return Err(invalid(key, value, "must be greater than zero"));
    }
    Ok(parsed)
}

fn invalid(key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
