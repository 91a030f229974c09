// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for netpol-compat.
//!
//! This module provides specialized error types for:
//! - Cluster queries made during provider and CNI detection
//! - Lookups outside the fixed recipe and feature enumerations
//! - Environment configuration
//! - Report aggregation and output
//!
//! Detection ambiguity and unsupported recipes are *not* errors. They surface
//! as `unknown` enum values and skip decisions respectively.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while querying the cluster for detection signals.
///
/// Most of these degrade a single heuristic to "no signal". Only the fatal
/// ones (see [`DetectionError::is_fatal`]) halt detection.
#[derive(Error, Debug)]
pub enum DetectionError {
    /// The API server could not be reached at all.
    #[error("Kubernetes cluster is unreachable: {reason}")]
    ClusterUnreachable {
        /// Underlying connection failure
        reason: String,
    },

    /// A Kubernetes API call failed after retries.
    #[error("Kubernetes API call '{operation}' failed: {source}")]
    Kube {
        /// Human-readable name of the call (e.g., "list daemonsets in kube-system")
        operation: String,
        /// The error returned by the client
        #[source]
        source: kube::Error,
    },

    /// A cluster query exceeded its time budget.
    #[error("Cluster query '{operation}' timed out after {timeout_secs}s")]
    Timeout {
        /// Human-readable name of the query
        operation: String,
        /// Budget that was exceeded
        timeout_secs: u64,
    },

    /// The kubeconfig could not be loaded or inferred.
    #[error("Failed to load Kubernetes configuration: {reason}")]
    Kubeconfig {
        /// Explanation from the config loader
        reason: String,
    },

    /// A local helper command (`minikube`, `snap`) or a pod exec failed.
    #[error("Command '{command}' failed: {reason}")]
    Command {
        /// The command line that was run
        command: String,
        /// Specific reason for the failure
        reason: String,
    },

    /// A cluster snapshot file could not be read or parsed.
    #[error("Invalid cluster snapshot {path}: {reason}")]
    Snapshot {
        /// Snapshot file path
        path: PathBuf,
        /// Specific reason for the failure
        reason: String,
    },
}

impl DetectionError {
    /// Whether this error must halt detection instead of degrading one heuristic.
    ///
    /// Connection-level failures, hung API servers, broken kubeconfigs and
    /// unreadable snapshots are fatal. API errors such as 403 or 404 and
    /// failing helper commands only mean "this signal is unavailable".
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::ClusterUnreachable { .. }
            | Self::Timeout { .. }
            | Self::Kubeconfig { .. }
            | Self::Snapshot { .. } => true,
            Self::Kube { source, .. } => is_connection_error(source),
            Self::Command { .. } => false,
        }
    }

    /// Wrap a client error, classifying connection failures as unreachable.
    pub fn from_kube(operation: impl Into<String>, source: kube::Error) -> Self {
        if is_connection_error(&source) {
            Self::ClusterUnreachable {
                reason: format!("{}: {source}", operation.into()),
            }
        } else {
            Self::Kube {
                operation: operation.into(),
                source,
            }
        }
    }
}

fn is_connection_error(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Service(_) | kube::Error::HyperError(_))
}

/// Errors for identifiers outside the fixed recipe and feature sets.
///
/// These indicate an inconsistent caller (typo in a CI script, stale recipe
/// list) and fail fast.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Recipe identifier is not one of `00`..`14`, `02a`
    #[error("Unknown recipe '{id}' (expected one of 00, 01, 02, 02a, 03 .. 14)")]
    UnknownRecipe {
        /// The identifier that was given
        id: String,
    },

    /// Feature name is not part of the feature matrix
    #[error("Unknown feature '{name}'")]
    UnknownFeature {
        /// The name that was given
        name: String,
    },

    /// Provider name is not one of the known providers
    #[error("Unknown provider '{name}'")]
    UnknownProvider {
        /// The name that was given
        name: String,
    },
}

/// Errors raised while reading settings from the environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set to a value that cannot be used
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        /// Environment variable name
        key: String,
        /// Value that was read
        value: String,
        /// Explanation of what is invalid
        reason: String,
    },
}

/// Errors raised while aggregating test results and writing reports.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Reading input or writing an output file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Results or summary JSON could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Prometheus metrics could not be registered or encoded
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// TAP input line could not be interpreted
    #[error("Malformed TAP line {line}: {reason}")]
    Tap {
        /// 1-based line number
        line: usize,
        /// Explanation of what is malformed
        reason: String,
    },
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
