// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Read-only access to the cluster being fingerprinted.
//!
//! Detection never talks to the Kubernetes API directly. Every query goes
//! through a [`ClusterProbe`], which is either a live [`KubeProbe`] or a
//! [`SnapshotProbe`] answering from a captured [`ClusterSnapshot`].
//!
//! # Example
//!
//! ```rust,no_run
//! use netpol_compat::cluster::{ClusterProbe, KubeProbe};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), netpol_compat::errors::DetectionError> {
//! let probe = KubeProbe::connect(Duration::from_secs(10), 2).await?;
//! let nodes = probe.nodes().await?;
//! println!("{} nodes", nodes.len());
//! # Ok(())
//! # }
//! ```

mod command;
pub mod kube_probe;
pub mod pagination;
pub mod snapshot;

pub use kube_probe::KubeProbe;
pub use snapshot::{ClusterSnapshot, SnapshotProbe};

use crate::errors::DetectionError;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The node facts detection looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_image: Option<String>,
}

/// A DaemonSet or Deployment reduced to its name, images and literal env values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadInfo {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl WorkloadInfo {
    /// Tag of the first container image, if it has one.
    #[must_use]
    pub fn image_tag(&self) -> Option<String> {
        self.images.first().and_then(|image| image_tag(image))
    }
}

/// Extract the tag from an image reference (`registry/repo:tag@digest`).
#[must_use]
pub fn image_tag(image: &str) -> Option<String> {
    let last_segment = image.rsplit('/').next().unwrap_or(image);
    let without_digest = last_segment.split('@').next().unwrap_or(last_segment);
    without_digest
        .rsplit_once(':')
        .map(|(_, tag)| tag.to_string())
        .filter(|tag| !tag.is_empty())
}

/// Read-only cluster queries used by the fingerprinters.
///
/// Implementations must not mutate the cluster. Errors are classified with
/// [`DetectionError::is_fatal`]: fatal errors halt detection, everything else
/// only removes one signal.
#[async_trait]
pub trait ClusterProbe: Send + Sync {
    /// URL of the API server the client talks to.
    async fn api_server_url(&self) -> Result<Option<String>, DetectionError>;

    /// Active kubeconfig context. `None` when running in-cluster.
    async fn current_context(&self) -> Result<Option<String>, DetectionError>;

    /// Whether a local `minikube` binary reports a running host.
    async fn minikube_running(&self) -> Result<bool, DetectionError>;

    /// Whether the `microk8s` snap is installed locally.
    async fn microk8s_snap_installed(&self) -> Result<bool, DetectionError>;

    /// All nodes, sorted by name.
    async fn nodes(&self) -> Result<Vec<NodeInfo>, DetectionError>;

    /// DaemonSets in `namespace`.
    async fn daemonsets(&self, namespace: &str) -> Result<Vec<WorkloadInfo>, DetectionError>;

    /// Deployments in `namespace`.
    async fn deployments(&self, namespace: &str) -> Result<Vec<WorkloadInfo>, DetectionError>;

    /// Host network interface names as seen from a host-network pod.
    async fn host_interfaces(&self) -> Result<Vec<String>, DetectionError>;

    /// File names in the node's CNI binary directory.
    async fn cni_binaries(&self) -> Result<Vec<String>, DetectionError>;

    /// API server `gitVersion`.
    async fn kubernetes_version(&self) -> Result<Option<String>, DetectionError>;

    /// First node by name, if any.
    async fn first_node(&self) -> Result<Option<NodeInfo>, DetectionError> {
        Ok(self.nodes().await?.into_iter().next())
    }
}
