// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Provider fingerprinting.
//!
//! Cascade order:
//!
//! 1. `api-server-domain` - managed-service domains in the API server URL
//! 2. `context-name` - kubeconfig context naming conventions
//! 3. `minikube-status` - a local minikube host that is running
//! 4. `node-labels` - cloud and distribution node labels
//! 5. `provider-id` - the node `providerID` scheme
//! 6. `microk8s` - node OS image or the installed snap
//! 7. `control-plane-fallback` - a control-plane role label and nothing else

use super::{run_cascade, soft, Heuristic, ProviderDetection};
use crate::cluster::{ClusterProbe, NodeInfo};
use crate::errors::DetectionError;
use crate::labels::{
    AKS_AGENTPOOL, AKS_CLUSTER, EKSCTL_CLUSTER_NAME, EKS_COMPUTE_TYPE, EKS_NODEGROUP,
    GKE_NODEPOOL, MICROK8S_CLUSTER, MINIKUBE_NAME, NODE_ROLE_CONTROL_PLANE, NODE_ROLE_MASTER,
    PROVIDER_ID_AWS, PROVIDER_ID_AZURE, PROVIDER_ID_GCE, PROVIDER_ID_K3S, PROVIDER_ID_KIND,
};
use crate::types::Provider;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Node label keys that identify a provider, checked in order.
const PROVIDER_LABELS: &[(&str, Provider)] = &[
    (GKE_NODEPOOL, Provider::Gke),
    (EKS_NODEGROUP, Provider::Eks),
    (EKS_COMPUTE_TYPE, Provider::Eks),
    (EKSCTL_CLUSTER_NAME, Provider::Eks),
    (AKS_CLUSTER, Provider::Aks),
    (AKS_AGENTPOOL, Provider::Aks),
    (MINIKUBE_NAME, Provider::Minikube),
    (MICROK8S_CLUSTER, Provider::Microk8s),
];

/// `providerID` schemes, checked in order.
const PROVIDER_ID_SCHEMES: &[(&str, Provider)] = &[
    (PROVIDER_ID_GCE, Provider::Gke),
    (PROVIDER_ID_AWS, Provider::Eks),
    (PROVIDER_ID_AZURE, Provider::Aks),
    (PROVIDER_ID_K3S, Provider::K3s),
    (PROVIDER_ID_KIND, Provider::Kind),
];

/// Provider implied by the API server URL.
#[must_use]
pub fn provider_from_api_url(url: &str) -> Option<Provider> {
    let url = url.to_ascii_lowercase();
    if url.contains(".gke.") || url.contains("googleapis.com") {
        Some(Provider::Gke)
    } else if url.contains("eks.amazonaws.com") {
        Some(Provider::Eks)
    } else if url.contains("azmk8s.io") {
        Some(Provider::Aks)
    } else {
        None
    }
}

/// Provider implied by a kubeconfig context name.
#[must_use]
pub fn provider_from_context(context: &str) -> Option<Provider> {
    let context = context.to_ascii_lowercase();
    if context.starts_with("kind-") {
        Some(Provider::Kind)
    } else if context.contains("minikube") {
        Some(Provider::Minikube)
    } else if context.contains("k3s") || context.contains("k3d") {
        Some(Provider::K3s)
    } else if context.starts_with("gke_") {
        Some(Provider::Gke)
    } else if context.starts_with("arn:aws:eks:") {
        Some(Provider::Eks)
    } else if context.contains("microk8s") {
        Some(Provider::Microk8s)
    } else {
        None
    }
}

/// Provider implied by well-known node label keys.
#[must_use]
pub fn provider_from_node_labels(labels: &BTreeMap<String, String>) -> Option<Provider> {
    PROVIDER_LABELS
        .iter()
        .find(|(key, _)| labels.contains_key(*key))
        .map(|(_, provider)| *provider)
}

/// Provider implied by a node `providerID`.
#[must_use]
pub fn provider_from_provider_id(provider_id: &str) -> Option<Provider> {
    PROVIDER_ID_SCHEMES
        .iter()
        .find(|(scheme, _)| provider_id.starts_with(scheme))
        .map(|(_, provider)| *provider)
}

/// Whether the node carries a control-plane or legacy master role label.
#[must_use]
pub fn has_control_plane_role(node: &NodeInfo) -> bool {
    node.labels.contains_key(NODE_ROLE_CONTROL_PLANE) || node.labels.contains_key(NODE_ROLE_MASTER)
}

struct ApiServerDomain;

#[async_trait]
impl Heuristic<Provider> for ApiServerDomain {
    fn name(&self) -> &'static str {
        "api-server-domain"
    }

    async fn evaluate(&self, probe: &dyn ClusterProbe) -> Result<Option<Provider>, DetectionError> {
        Ok(probe
            .api_server_url()
            .await?
            .and_then(|url| provider_from_api_url(&url)))
    }
}

struct ContextName;

#[async_trait]
impl Heuristic<Provider> for ContextName {
    fn name(&self) -> &'static str {
        "context-name"
    }

    async fn evaluate(&self, probe: &dyn ClusterProbe) -> Result<Option<Provider>, DetectionError> {
        Ok(probe
            .current_context()
            .await?
            .and_then(|ctx| provider_from_context(&ctx)))
    }
}

struct MinikubeStatus;

#[async_trait]
impl Heuristic<Provider> for MinikubeStatus {
    fn name(&self) -> &'static str {
        "minikube-status"
    }

    async fn evaluate(&self, probe: &dyn ClusterProbe) -> Result<Option<Provider>, DetectionError> {
        Ok(probe
            .minikube_running()
            .await?
            .then_some(Provider::Minikube))
    }
}

struct NodeLabels;

#[async_trait]
impl Heuristic<Provider> for NodeLabels {
    fn name(&self) -> &'static str {
        "node-labels"
    }

    async fn evaluate(&self, probe: &dyn ClusterProbe) -> Result<Option<Provider>, DetectionError> {
        Ok(probe
            .first_node()
            .await?
            .and_then(|node| provider_from_node_labels(&node.labels)))
    }
}

struct ProviderId;

#[async_trait]
impl Heuristic<Provider> for ProviderId {
    fn name(&self) -> &'static str {
        "provider-id"
    }

    async fn evaluate(&self, probe: &dyn ClusterProbe) -> Result<Option<Provider>, DetectionError> {
        Ok(probe
            .first_node()
            .await?
            .and_then(|node| node.provider_id)
            .and_then(|id| provider_from_provider_id(&id)))
    }
}

struct Microk8s;

#[async_trait]
impl Heuristic<Provider> for Microk8s {
    fn name(&self) -> &'static str {
        "microk8s"
    }

    async fn evaluate(&self, probe: &dyn ClusterProbe) -> Result<Option<Provider>, DetectionError> {
        let os_image_match = soft("nodes", probe.first_node().await)?
            .and_then(|node| node.os_image)
            .is_some_and(|image| image.to_ascii_lowercase().contains("microk8s"));

        if os_image_match || probe.microk8s_snap_installed().await? {
            Ok(Some(Provider::Microk8s))
        } else {
            Ok(None)
        }
    }
}

struct ControlPlaneFallback;

#[async_trait]
impl Heuristic<Provider> for ControlPlaneFallback {
    fn name(&self) -> &'static str {
        "control-plane-fallback"
    }

    async fn evaluate(&self, probe: &dyn ClusterProbe) -> Result<Option<Provider>, DetectionError> {
        Ok(probe
            .first_node()
            .await?
            .filter(has_control_plane_role)
            .map(|_| Provider::Kind))
    }
}

/// The provider heuristics in evaluation order.
#[must_use]
pub fn provider_cascade() -> Vec<Box<dyn Heuristic<Provider>>> {
    vec![
        Box::new(ApiServerDomain),
        Box::new(ContextName),
        Box::new(MinikubeStatus),
        Box::new(NodeLabels),
        Box::new(ProviderId),
        Box::new(Microk8s),
        Box::new(ControlPlaneFallback),
    ]
}

/// Fingerprint the provider. Ambiguity yields [`Provider::Unknown`].
///
/// # Errors
///
/// Returns a fatal [`DetectionError`] when the cluster cannot be queried.
pub async fn detect_provider(probe: &dyn ClusterProbe) -> Result<ProviderDetection, DetectionError> {
    let detection = match run_cascade("provider", &provider_cascade(), probe).await? {
        Some(found) => ProviderDetection {
            provider: found.value,
            detected_by: Some(found.detected_by.to_string()),
        },
        None => ProviderDetection {
            provider: Provider::Unknown,
            detected_by: None,
        },
    };
    Ok(detection)
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod provider_tests;
