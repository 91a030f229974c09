// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for netpol-compat.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Kubernetes Namespaces
// ============================================================================

/// Namespace holding cluster add-ons, including most CNI DaemonSets
pub const KUBE_SYSTEM_NAMESPACE: &str = "kube-system";

/// Namespace used by the Tigera operator for Calico components
pub const CALICO_SYSTEM_NAMESPACE: &str = "calico-system";

/// Namespace used by current upstream Flannel manifests
pub const KUBE_FLANNEL_NAMESPACE: &str = "kube-flannel";

/// Namespaces searched for CNI DaemonSets and Deployments, in order
pub const CNI_WORKLOAD_NAMESPACES: &[&str] = &[
    KUBE_SYSTEM_NAMESPACE,
    CALICO_SYSTEM_NAMESPACE,
    KUBE_FLANNEL_NAMESPACE,
];

// ============================================================================
// Kubernetes API Constants
// ============================================================================

/// Page size for Kubernetes API list operations
pub const KUBE_LIST_PAGE_SIZE: u32 = 100;

/// Default timeout for a single cluster query, in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Connect timeout for the Kubernetes client, in seconds
pub const KUBE_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default number of retries for transient Kubernetes API errors
pub const DEFAULT_API_RETRIES: u32 = 2;

/// Timeout for local helper binaries (`minikube`, `snap`), in seconds
pub const COMMAND_TIMEOUT_SECS: u64 = 5;

/// Directory holding CNI plugin binaries on a node
pub const CNI_BIN_DIR: &str = "/opt/cni/bin";

/// Kernel interface table read inside a host-network pod
pub const PROC_NET_DEV: &str = "/proc/net/dev";

// ============================================================================
// Execution Plan Defaults - Managed Cloud Providers
// ============================================================================

/// Per-recipe timeout on managed cloud clusters (10 minutes)
pub const CLOUD_TIMEOUT_SECS: u64 = 600;

/// Retries of flaky cluster commands on managed cloud clusters
pub const CLOUD_RETRY_COUNT: u32 = 3;

/// Poll interval while waiting for resources on managed cloud clusters
pub const CLOUD_POLL_INTERVAL_SECS: u64 = 10;

/// Parallel test workers on managed cloud clusters
pub const CLOUD_WORKER_COUNT: u32 = 8;

// ============================================================================
// Execution Plan Defaults - Local Clusters
// ============================================================================

/// Per-recipe timeout on local clusters (5 minutes)
pub const LOCAL_TIMEOUT_SECS: u64 = 300;

/// Retries of flaky cluster commands on local clusters
pub const LOCAL_RETRY_COUNT: u32 = 1;

/// Poll interval while waiting for resources on local clusters
pub const LOCAL_POLL_INTERVAL_SECS: u64 = 2;

/// Parallel test workers on local clusters
pub const LOCAL_WORKER_COUNT: u32 = 4;

// ============================================================================
// Execution Plan Defaults - Unknown Provider
// ============================================================================

/// Per-recipe timeout when the provider is unknown
pub const UNKNOWN_TIMEOUT_SECS: u64 = 450;

/// Retries of flaky cluster commands when the provider is unknown
pub const UNKNOWN_RETRY_COUNT: u32 = 2;

/// Poll interval when the provider is unknown
pub const UNKNOWN_POLL_INTERVAL_SECS: u64 = 5;

/// Parallel test workers when the provider is unknown
pub const UNKNOWN_WORKER_COUNT: u32 = 2;

// ============================================================================
// Environment Variables
// ============================================================================

/// Manual override of the detected provider
pub const ENV_CLOUD_PROVIDER: &str = "CLOUD_PROVIDER";

/// Manual override of the detected CNI plugin
pub const ENV_CNI_PLUGIN: &str = "CNI_PLUGIN";

/// Manual override of the per-recipe timeout, in seconds
pub const ENV_TEST_TIMEOUT: &str = "TEST_TIMEOUT";

/// Manual override of the parallel worker count
pub const ENV_MAX_WORKERS: &str = "MAX_WORKERS";

/// Directory where report files are written
pub const ENV_RESULTS_DIR: &str = "RESULTS_DIR";

/// Timeout for a single cluster query, in seconds
pub const ENV_KUBE_REQUEST_TIMEOUT: &str = "KUBE_REQUEST_TIMEOUT";

/// Log output format (`text` or `json`)
pub const ENV_LOG_FORMAT: &str = "RUST_LOG_FORMAT";

// ============================================================================
// Reporting Constants
// ============================================================================

/// Default directory for generated reports
pub const DEFAULT_RESULTS_DIR: &str = "test-results";

/// Summary JSON file name
pub const SUMMARY_FILE: &str = "summary.json";

/// HTML report file name
pub const HTML_REPORT_FILE: &str = "report.html";

/// Markdown report file name
pub const MARKDOWN_REPORT_FILE: &str = "report.md";

/// shields.io endpoint badge file name
pub const BADGE_FILE: &str = "badge.json";

/// Prometheus text-format metrics file name
pub const METRICS_FILE: &str = "metrics.prom";

/// Label shown on the test badge
pub const BADGE_LABEL: &str = "network policies";

/// Namespace prefix for all exported metrics
pub const METRICS_NAMESPACE: &str = "netpol";

// ============================================================================
// Cluster Defaults
// ============================================================================

/// Region reported when nodes carry no topology label
pub const DEFAULT_REGION: &str = "local";

/// Cluster name reported when running without a kubeconfig context
pub const IN_CLUSTER_NAME: &str = "in-cluster";

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 2;

/// Default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "warn";
