// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! CNI plugin fingerprinting.
//!
//! Cascade order:
//!
//! 1. `daemonset-name` - well-known agent DaemonSets
//! 2. `deployment-name` - well-known controller Deployments
//! 3. `interface-names` - host interface prefixes
//! 4. `cni-conf-env` - the `CNI_CONF_NAME` env of CNI workloads
//! 5. `provider-default` - the default dataplane of the detected provider
//! 6. `cni-binaries` - plugin binaries in `/opt/cni/bin`
//!
//! When more than one plugin matches within a step, the one that enforces
//! NetworkPolicy wins (Calico over Flannel in a canal install, Calico or
//! Cilium over the VPC CNI they are chained with on EKS).

use super::{run_cascade, soft, CniDetection, Heuristic};
use crate::cluster::{ClusterProbe, WorkloadInfo};
use crate::constants::{CNI_WORKLOAD_NAMESPACES, KUBE_SYSTEM_NAMESPACE};
use crate::errors::DetectionError;
use crate::labels::{
    DEPLOY_CALICO_KUBE_CONTROLLERS, DEPLOY_CILIUM_OPERATOR, DS_ANETD, DS_AWS_NODE,
    DS_AZURE_CNI_NETWORKMONITOR, DS_AZURE_NPM, DS_CALICO_NODE, DS_CILIUM, DS_CILIUM_AGENT,
    DS_KUBE_FLANNEL, DS_KUBE_FLANNEL_DS, DS_KUBE_ROUTER, DS_WEAVE_NET, ENV_CNI_CONF_NAME,
    GKE_DATAPLANE_V2,
};
use crate::types::{CniPlugin, Provider};
use async_trait::async_trait;

/// Tie-break order when several plugins match in one step.
const POLICY_PRIORITY: [CniPlugin; 8] = [
    CniPlugin::Calico,
    CniPlugin::Cilium,
    CniPlugin::Weave,
    CniPlugin::KubeRouter,
    CniPlugin::AzureCni,
    CniPlugin::GcpCni,
    CniPlugin::VpcCni,
    CniPlugin::Flannel,
];

fn priority(plugin: CniPlugin) -> usize {
    POLICY_PRIORITY
        .iter()
        .position(|p| *p == plugin)
        .unwrap_or(POLICY_PRIORITY.len())
}

/// A plugin identified by a heuristic, with the version if one was visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CniMatch {
    pub plugin: CniPlugin,
    pub version: Option<String>,
}

impl CniMatch {
    fn bare(plugin: CniPlugin) -> Self {
        Self {
            plugin,
            version: None,
        }
    }
}

/// Highest-priority match among candidates.
fn best<I: IntoIterator<Item = CniMatch>>(candidates: I) -> Option<CniMatch> {
    candidates
        .into_iter()
        .min_by_key(|candidate| priority(candidate.plugin))
}

/// Plugin owning a DaemonSet of this name.
#[must_use]
pub fn cni_from_daemonset_name(name: &str) -> Option<CniPlugin> {
    match name {
        DS_CALICO_NODE => Some(CniPlugin::Calico),
        DS_CILIUM | DS_CILIUM_AGENT | DS_ANETD => Some(CniPlugin::Cilium),
        DS_WEAVE_NET => Some(CniPlugin::Weave),
        DS_KUBE_FLANNEL | DS_KUBE_FLANNEL_DS => Some(CniPlugin::Flannel),
        DS_AWS_NODE => Some(CniPlugin::VpcCni),
        DS_AZURE_CNI_NETWORKMONITOR | DS_AZURE_NPM => Some(CniPlugin::AzureCni),
        DS_KUBE_ROUTER => Some(CniPlugin::KubeRouter),
        _ => None,
    }
}

/// Plugin owning a Deployment of this name.
#[must_use]
pub fn cni_from_deployment_name(name: &str) -> Option<CniPlugin> {
    match name {
        DEPLOY_CALICO_KUBE_CONTROLLERS => Some(CniPlugin::Calico),
        DEPLOY_CILIUM_OPERATOR => Some(CniPlugin::Cilium),
        _ => None,
    }
}

/// Plugin that creates host interfaces with this name.
#[must_use]
pub fn cni_from_interface(name: &str) -> Option<CniPlugin> {
    if name.starts_with("cali") {
        Some(CniPlugin::Calico)
    } else if name.starts_with("lxc") || name.starts_with("cilium_") {
        Some(CniPlugin::Cilium)
    } else if name == "weave" {
        Some(CniPlugin::Weave)
    } else if name.starts_with("flannel") {
        Some(CniPlugin::Flannel)
    } else if name.starts_with("eni") {
        Some(CniPlugin::VpcCni)
    } else if name.starts_with("azv") {
        Some(CniPlugin::AzureCni)
    } else if name == "kube-bridge" {
        Some(CniPlugin::KubeRouter)
    } else {
        None
    }
}

/// Plugin named by a `CNI_CONF_NAME` value such as `10-calico.conflist`.
#[must_use]
pub fn cni_from_conf_name(value: &str) -> Option<CniPlugin> {
    let value = value.to_ascii_lowercase();
    [
        ("calico", CniPlugin::Calico),
        ("cilium", CniPlugin::Cilium),
        ("weave", CniPlugin::Weave),
        ("flannel", CniPlugin::Flannel),
        ("aws", CniPlugin::VpcCni),
        ("azure", CniPlugin::AzureCni),
        ("kuberouter", CniPlugin::KubeRouter),
        ("kube-router", CniPlugin::KubeRouter),
    ]
    .into_iter()
    .find(|(needle, _)| value.contains(needle))
    .map(|(_, plugin)| plugin)
}

/// Plugin shipping a binary of this name in the CNI binary directory.
#[must_use]
pub fn cni_from_binary(name: &str) -> Option<CniPlugin> {
    match name {
        "calico" => Some(CniPlugin::Calico),
        "cilium-cni" => Some(CniPlugin::Cilium),
        "weave-net" | "weave-plugin" => Some(CniPlugin::Weave),
        "aws-cni" => Some(CniPlugin::VpcCni),
        "azure-vnet" => Some(CniPlugin::AzureCni),
        "flannel" => Some(CniPlugin::Flannel),
        _ => None,
    }
}

/// Default dataplane of a managed or packaged distribution.
#[must_use]
pub fn default_cni_for(provider: Provider, dataplane_v2: bool) -> Option<CniPlugin> {
    match provider {
        Provider::Gke if dataplane_v2 => Some(CniPlugin::Cilium),
        Provider::Gke => Some(CniPlugin::GcpCni),
        Provider::Eks => Some(CniPlugin::VpcCni),
        Provider::Aks => Some(CniPlugin::AzureCni),
        Provider::K3s => Some(CniPlugin::Flannel),
        Provider::Microk8s => Some(CniPlugin::Calico),
        Provider::Kind | Provider::Minikube | Provider::Unknown => None,
    }
}

/// Best match among workloads whose names identify a plugin.
#[must_use]
pub fn match_workloads(
    workloads: &[WorkloadInfo],
    identify: fn(&str) -> Option<CniPlugin>,
) -> Option<CniMatch> {
    best(workloads.iter().filter_map(|workload| {
        identify(&workload.name).map(|plugin| CniMatch {
            plugin,
            version: workload.image_tag(),
        })
    }))
}

/// Workloads of one kind across the CNI namespaces. A namespace that cannot
/// be listed (missing, forbidden) contributes nothing.
async fn workloads_in_cni_namespaces(
    probe: &dyn ClusterProbe,
    deployments: bool,
) -> Result<Vec<WorkloadInfo>, DetectionError> {
    let mut all = Vec::new();
    for namespace in CNI_WORKLOAD_NAMESPACES {
        let listed = if deployments {
            probe.deployments(namespace).await
        } else {
            probe.daemonsets(namespace).await
        };
        all.extend(soft("workloads", listed)?);
    }
    Ok(all)
}

struct DaemonSetName;

#[async_trait]
impl Heuristic<CniMatch> for DaemonSetName {
    fn name(&self) -> &'static str {
        "daemonset-name"
    }

    async fn evaluate(&self, probe: &dyn ClusterProbe) -> Result<Option<CniMatch>, DetectionError> {
        let daemonsets = workloads_in_cni_namespaces(probe, false).await?;
        Ok(match_workloads(&daemonsets, cni_from_daemonset_name))
    }
}

struct DeploymentName;

#[async_trait]
impl Heuristic<CniMatch> for DeploymentName {
    fn name(&self) -> &'static str {
        "deployment-name"
    }

    async fn evaluate(&self, probe: &dyn ClusterProbe) -> Result<Option<CniMatch>, DetectionError> {
        let deployments = workloads_in_cni_namespaces(probe, true).await?;
        Ok(match_workloads(&deployments, cni_from_deployment_name))
    }
}

struct InterfaceNames;

#[async_trait]
impl Heuristic<CniMatch> for InterfaceNames {
    fn name(&self) -> &'static str {
        "interface-names"
    }

    async fn evaluate(&self, probe: &dyn ClusterProbe) -> Result<Option<CniMatch>, DetectionError> {
        let interfaces = probe.host_interfaces().await?;
        Ok(best(
            interfaces
                .iter()
                .filter_map(|name| cni_from_interface(name))
                .map(CniMatch::bare),
        ))
    }
}

struct CniConfEnv;

#[async_trait]
impl Heuristic<CniMatch> for CniConfEnv {
    fn name(&self) -> &'static str {
        "cni-conf-env"
    }

    async fn evaluate(&self, probe: &dyn ClusterProbe) -> Result<Option<CniMatch>, DetectionError> {
        let mut workloads = soft("daemonsets", probe.daemonsets(KUBE_SYSTEM_NAMESPACE).await)?;
        workloads.extend(soft(
            "deployments",
            probe.deployments(KUBE_SYSTEM_NAMESPACE).await,
        )?);

        Ok(best(workloads.iter().filter_map(|workload| {
            let conf_name = workload.env.get(ENV_CNI_CONF_NAME)?;
            cni_from_conf_name(conf_name).map(|plugin| CniMatch {
                plugin,
                version: workload.image_tag(),
            })
        })))
    }
}

struct ProviderDefault {
    provider: Provider,
}

#[async_trait]
impl Heuristic<CniMatch> for ProviderDefault {
    fn name(&self) -> &'static str {
        "provider-default"
    }

    async fn evaluate(&self, probe: &dyn ClusterProbe) -> Result<Option<CniMatch>, DetectionError> {
        let dataplane_v2 = if self.provider == Provider::Gke {
            soft("nodes", probe.first_node().await)?.is_some_and(|node| {
                node.labels
                    .get(GKE_DATAPLANE_V2)
                    .is_some_and(|value| value != "false")
            })
        } else {
            false
        };
        Ok(default_cni_for(self.provider, dataplane_v2).map(CniMatch::bare))
    }
}

struct CniBinaries;

#[async_trait]
impl Heuristic<CniMatch> for CniBinaries {
    fn name(&self) -> &'static str {
        "cni-binaries"
    }

    async fn evaluate(&self, probe: &dyn ClusterProbe) -> Result<Option<CniMatch>, DetectionError> {
        let binaries = probe.cni_binaries().await?;
        Ok(best(
            binaries
                .iter()
                .filter_map(|name| cni_from_binary(name))
                .map(CniMatch::bare),
        ))
    }
}

/// The CNI heuristics in evaluation order for a cluster on `provider`.
#[must_use]
pub fn cni_cascade(provider: Provider) -> Vec<Box<dyn Heuristic<CniMatch>>> {
    vec![
        Box::new(DaemonSetName),
        Box::new(DeploymentName),
        Box::new(InterfaceNames),
        Box::new(CniConfEnv),
        Box::new(ProviderDefault { provider }),
        Box::new(CniBinaries),
    ]
}

/// Fingerprint the CNI plugin. Ambiguity yields [`CniPlugin::Unknown`].
///
/// # Errors
///
/// Returns a fatal [`DetectionError`] when the cluster cannot be queried.
pub async fn detect_cni(
    probe: &dyn ClusterProbe,
    provider: Provider,
) -> Result<CniDetection, DetectionError> {
    let detection = match run_cascade("cni", &cni_cascade(provider), probe).await? {
        Some(found) => CniDetection {
            name: found.value.plugin,
            version: found.value.version,
            detected_by: Some(found.detected_by.to_string()),
        },
        None => CniDetection {
            name: CniPlugin::Unknown,
            version: None,
            detected_by: None,
        },
    };
    Ok(detection)
}

#[cfg(test)]
#[path = "cni_tests.rs"]
mod cni_tests;
