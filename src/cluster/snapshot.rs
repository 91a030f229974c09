// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Captured cluster signals for offline detection.
//!
//! A [`ClusterSnapshot`] records everything a [`ClusterProbe`] can answer.
//! [`SnapshotProbe`] replays it, so detection and planning can run in CI jobs
//! without cluster credentials, and tests can describe a cluster in a few
//! lines of JSON.

use super::{ClusterProbe, NodeInfo, WorkloadInfo};
use crate::constants::CNI_WORKLOAD_NAMESPACES;
use crate::errors::DetectionError;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Every cluster signal detection uses, keyed the way the probe asks for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterSnapshot {
    pub api_server_url: Option<String>,
    pub current_context: Option<String>,
    pub minikube_running: bool,
    pub microk8s_snap_installed: bool,
    pub kubernetes_version: Option<String>,
    pub nodes: Vec<NodeInfo>,
    /// DaemonSets by namespace
    pub daemonsets: BTreeMap<String, Vec<WorkloadInfo>>,
    /// Deployments by namespace
    pub deployments: BTreeMap<String, Vec<WorkloadInfo>>,
    pub host_interfaces: Vec<String>,
    pub cni_binaries: Vec<String>,
}

/// Treat a non-fatal probe error as an absent signal.
fn or_empty<T: Default>(
    signal: &str,
    result: Result<T, DetectionError>,
) -> Result<T, DetectionError> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            debug!(signal = signal, error = %e, "Signal unavailable, recording it as empty");
            Ok(T::default())
        }
    }
}

impl ClusterSnapshot {
    /// Capture every signal from `probe`.
    ///
    /// # Errors
    ///
    /// Returns the first fatal probe error. Non-fatal errors are recorded as
    /// empty values.
    pub async fn capture(probe: &dyn ClusterProbe) -> Result<Self, DetectionError> {
        let mut snapshot = Self {
            api_server_url: or_empty("api_server_url", probe.api_server_url().await)?,
            current_context: or_empty("current_context", probe.current_context().await)?,
            minikube_running: or_empty("minikube_running", probe.minikube_running().await)?,
            microk8s_snap_installed: or_empty(
                "microk8s_snap_installed",
                probe.microk8s_snap_installed().await,
            )?,
            kubernetes_version: or_empty("kubernetes_version", probe.kubernetes_version().await)?,
            nodes: or_empty("nodes", probe.nodes().await)?,
            host_interfaces: or_empty("host_interfaces", probe.host_interfaces().await)?,
            cni_binaries: or_empty("cni_binaries", probe.cni_binaries().await)?,
            ..Self::default()
        };

        for namespace in CNI_WORKLOAD_NAMESPACES {
            let daemonsets = or_empty("daemonsets", probe.daemonsets(namespace).await)?;
            if !daemonsets.is_empty() {
                snapshot.daemonsets.insert((*namespace).to_string(), daemonsets);
            }
            let deployments = or_empty("deployments", probe.deployments(namespace).await)?;
            if !deployments.is_empty() {
                snapshot.deployments.insert((*namespace).to_string(), deployments);
            }
        }

        info!(
            nodes = snapshot.nodes.len(),
            daemonset_namespaces = snapshot.daemonsets.len(),
            "Captured cluster snapshot"
        );
        Ok(snapshot)
    }

    /// Load a snapshot from a `.json`, `.yaml` or `.yml` file.
    ///
    /// # Errors
    ///
    /// Returns [`DetectionError::Snapshot`] when the file cannot be read or parsed.
    pub async fn from_file(path: &Path) -> Result<Self, DetectionError> {
        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| DetectionError::Snapshot {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;

        let parsed = if is_yaml(path) {
            serde_yaml::from_str(&content).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        };

        parsed.map_err(|reason| DetectionError::Snapshot {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Write the snapshot as JSON, or YAML for `.yaml`/`.yml` paths.
    ///
    /// # Errors
    ///
    /// Returns [`DetectionError::Snapshot`] when serialization or the write fails.
    pub async fn to_file(&self, path: &Path) -> Result<(), DetectionError> {
        let snapshot_error = |reason: String| DetectionError::Snapshot {
            path: path.to_path_buf(),
            reason,
        };

        let content = if is_yaml(path) {
            serde_yaml::to_string(self).map_err(|e| snapshot_error(e.to_string()))?
        } else {
            serde_json::to_string_pretty(self).map_err(|e| snapshot_error(e.to_string()))?
        };

        tokio::fs::write(path, content)
            .await
            .map_err(|e| snapshot_error(e.to_string()))
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    )
}

/// Probe answering from a [`ClusterSnapshot`].
#[derive(Debug, Clone, Default)]
pub struct SnapshotProbe {
    snapshot: ClusterSnapshot,
}

impl SnapshotProbe {
    #[must_use]
    pub fn new(snapshot: ClusterSnapshot) -> Self {
        Self { snapshot }
    }

    /// Load the snapshot at `path`.
    ///
    /// # Errors
    ///
    /// See [`ClusterSnapshot::from_file`].
    pub async fn from_file(path: &Path) -> Result<Self, DetectionError> {
        Ok(Self::new(ClusterSnapshot::from_file(path).await?))
    }

    #[must_use]
    pub fn snapshot(&self) -> &ClusterSnapshot {
        &self.snapshot
    }
}

#[async_trait]
impl ClusterProbe for SnapshotProbe {
    async fn api_server_url(&self) -> Result<Option<String>, DetectionError> {
        Ok(self.snapshot.api_server_url.clone())
    }

    async fn current_context(&self) -> Result<Option<String>, DetectionError> {
        Ok(self.snapshot.current_context.clone())
    }

    async fn minikube_running(&self) -> Result<bool, DetectionError> {
        Ok(self.snapshot.minikube_running)
    }

    async fn microk8s_snap_installed(&self) -> Result<bool, DetectionError> {
        Ok(self.snapshot.microk8s_snap_installed)
    }

    async fn nodes(&self) -> Result<Vec<NodeInfo>, DetectionError> {
        let mut nodes = self.snapshot.nodes.clone();
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(nodes)
    }

    async fn daemonsets(&self, namespace: &str) -> Result<Vec<WorkloadInfo>, DetectionError> {
        Ok(self
            .snapshot
            .daemonsets
            .get(namespace)
            .cloned()
            .unwrap_or_default())
    }

    async fn deployments(&self, namespace: &str) -> Result<Vec<WorkloadInfo>, DetectionError> {
        Ok(self
            .snapshot
            .deployments
            .get(namespace)
            .cloned()
            .unwrap_or_default())
    }

    async fn host_interfaces(&self) -> Result<Vec<String>, DetectionError> {
        Ok(self.snapshot.host_interfaces.clone())
    }

    async fn cni_binaries(&self) -> Result<Vec<String>, DetectionError> {
        Ok(self.snapshot.cni_binaries.clone())
    }

    async fn kubernetes_version(&self) -> Result<Option<String>, DetectionError> {
        Ok(self.snapshot.kubernetes_version.clone())
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod snapshot_tests;
