// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Core enumerations: providers, CNI plugins, NetworkPolicy features and
//! support levels.
//!
//! All four are closed sets. Detection maps whatever it sees onto them, and
//! `unknown` is a first-class, actionable value rather than an error.

use crate::errors::LookupError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Kubernetes distribution or managed service hosting the cluster.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gke,
    Eks,
    Aks,
    Kind,
    Minikube,
    K3s,
    Microk8s,
    Unknown,
}

impl Provider {
    /// Every provider, in declaration order.
    pub const ALL: [Provider; 8] = [
        Provider::Gke,
        Provider::Eks,
        Provider::Aks,
        Provider::Kind,
        Provider::Minikube,
        Provider::K3s,
        Provider::Microk8s,
        Provider::Unknown,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Gke => "gke",
            Provider::Eks => "eks",
            Provider::Aks => "aks",
            Provider::Kind => "kind",
            Provider::Minikube => "minikube",
            Provider::K3s => "k3s",
            Provider::Microk8s => "microk8s",
            Provider::Unknown => "unknown",
        }
    }

    /// Managed cloud services that can provision external LoadBalancers.
    #[must_use]
    pub fn is_managed_cloud(self) -> bool {
        matches!(self, Provider::Gke | Provider::Eks | Provider::Aks)
    }

    /// Single-host or developer distributions.
    #[must_use]
    pub fn is_local(self) -> bool {
        matches!(
            self,
            Provider::Kind | Provider::Minikube | Provider::K3s | Provider::Microk8s
        )
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gke" | "gcp" | "google" => Ok(Provider::Gke),
            "eks" | "aws" => Ok(Provider::Eks),
            "aks" | "azure" => Ok(Provider::Aks),
            "kind" => Ok(Provider::Kind),
            "minikube" => Ok(Provider::Minikube),
            "k3s" | "k3d" => Ok(Provider::K3s),
            "microk8s" => Ok(Provider::Microk8s),
            "unknown" => Ok(Provider::Unknown),
            _ => Err(LookupError::UnknownProvider {
                name: s.to_string(),
            }),
        }
    }
}

/// CNI plugin providing pod networking (and, usually, NetworkPolicy enforcement).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum CniPlugin {
    Calico,
    Cilium,
    Weave,
    Flannel,
    VpcCni,
    AzureCni,
    GcpCni,
    KubeRouter,
    #[serde(other)]
    Unknown,
}

impl CniPlugin {
    /// Every CNI plugin, in declaration order.
    pub const ALL: [CniPlugin; 9] = [
        CniPlugin::Calico,
        CniPlugin::Cilium,
        CniPlugin::Weave,
        CniPlugin::Flannel,
        CniPlugin::VpcCni,
        CniPlugin::AzureCni,
        CniPlugin::GcpCni,
        CniPlugin::KubeRouter,
        CniPlugin::Unknown,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CniPlugin::Calico => "calico",
            CniPlugin::Cilium => "cilium",
            CniPlugin::Weave => "weave",
            CniPlugin::Flannel => "flannel",
            CniPlugin::VpcCni => "vpc-cni",
            CniPlugin::AzureCni => "azure-cni",
            CniPlugin::GcpCni => "gcp-cni",
            CniPlugin::KubeRouter => "kube-router",
            CniPlugin::Unknown => "unknown",
        }
    }

    /// Map a free-form name onto the enum. Unrecognized names are `Unknown`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "calico" | "canal" => CniPlugin::Calico,
            "cilium" => CniPlugin::Cilium,
            "weave" | "weave-net" => CniPlugin::Weave,
            "flannel" => CniPlugin::Flannel,
            "vpc-cni" | "aws-vpc-cni" | "aws-node" => CniPlugin::VpcCni,
            "azure-cni" | "azure" | "azure-npm" => CniPlugin::AzureCni,
            "gcp-cni" | "gke" | "gcp" => CniPlugin::GcpCni,
            "kube-router" | "kuberouter" => CniPlugin::KubeRouter,
            _ => CniPlugin::Unknown,
        }
    }
}

impl fmt::Display for CniPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CniPlugin {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

/// NetworkPolicy capability exercised by one or more recipes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    IngressRules,
    EgressRules,
    NamespaceSelectors,
    PodSelectors,
    IpBlocks,
    PortRanges,
    NamedPorts,
    SctpProtocol,
    DenyAll,
}

impl Feature {
    /// Every feature, in declaration order.
    pub const ALL: [Feature; 9] = [
        Feature::IngressRules,
        Feature::EgressRules,
        Feature::NamespaceSelectors,
        Feature::PodSelectors,
        Feature::IpBlocks,
        Feature::PortRanges,
        Feature::NamedPorts,
        Feature::SctpProtocol,
        Feature::DenyAll,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Feature::IngressRules => "ingress_rules",
            Feature::EgressRules => "egress_rules",
            Feature::NamespaceSelectors => "namespace_selectors",
            Feature::PodSelectors => "pod_selectors",
            Feature::IpBlocks => "ip_blocks",
            Feature::PortRanges => "port_ranges",
            Feature::NamedPorts => "named_ports",
            Feature::SctpProtocol => "sctp_protocol",
            Feature::DenyAll => "deny_all",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Feature::ALL
            .into_iter()
            .find(|feature| feature.as_str() == normalized)
            .ok_or_else(|| LookupError::UnknownFeature {
                name: s.to_string(),
            })
    }
}

/// How completely a CNI plugin implements a feature.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum SupportLevel {
    Full,
    Partial,
    None,
    Unknown,
}

impl SupportLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SupportLevel::Full => "full",
            SupportLevel::Partial => "partial",
            SupportLevel::None => "none",
            SupportLevel::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SupportLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
