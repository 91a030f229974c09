// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Well-known node labels, provider ID schemes and workload names used as
//! detection signals.
//!
//! Nothing here is created by this tool; these are the names cloud providers
//! and CNI installers put on clusters.

// ============================================================================
// Kubernetes Standard Node Labels
// ============================================================================

/// Role label set on control-plane nodes by kubeadm >= 1.20
pub const NODE_ROLE_CONTROL_PLANE: &str = "node-role.kubernetes.io/control-plane";

/// Legacy role label set on control-plane nodes
pub const NODE_ROLE_MASTER: &str = "node-role.kubernetes.io/master";

/// Topology label with the cloud region of a node
pub const TOPOLOGY_REGION: &str = "topology.kubernetes.io/region";

// ============================================================================
// Provider-Specific Node Labels
// ============================================================================

/// GKE node pool label
pub const GKE_NODEPOOL: &str = "cloud.google.com/gke-nodepool";

/// GKE Dataplane V2 (Cilium based) node label
pub const GKE_DATAPLANE_V2: &str = "cloud.google.com/gke-dpv2";

/// EKS managed node group label
pub const EKS_NODEGROUP: &str = "eks.amazonaws.com/nodegroup";

/// EKS compute type label (ec2, fargate, auto)
pub const EKS_COMPUTE_TYPE: &str = "eks.amazonaws.com/compute-type";

/// Cluster label added by eksctl-created node groups
pub const EKSCTL_CLUSTER_NAME: &str = "alpha.eksctl.io/cluster-name";

/// AKS cluster label
pub const AKS_CLUSTER: &str = "kubernetes.azure.com/cluster";

/// AKS agent pool label
pub const AKS_AGENTPOOL: &str = "kubernetes.azure.com/agentpool";

/// Node label added by `minikube start`
pub const MINIKUBE_NAME: &str = "minikube.k8s.io/name";

/// Node label added by microk8s
pub const MICROK8S_CLUSTER: &str = "microk8s.io/cluster";

// ============================================================================
// Provider ID Schemes
// ============================================================================

/// `spec.providerID` prefix on GCE-backed nodes
pub const PROVIDER_ID_GCE: &str = "gce://";

/// `spec.providerID` prefix on AWS-backed nodes
pub const PROVIDER_ID_AWS: &str = "aws://";

/// `spec.providerID` prefix on Azure-backed nodes
pub const PROVIDER_ID_AZURE: &str = "azure://";

/// `spec.providerID` prefix on k3s nodes
pub const PROVIDER_ID_K3S: &str = "k3s://";

/// `spec.providerID` prefix on kind nodes
pub const PROVIDER_ID_KIND: &str = "kind://";

// ============================================================================
// CNI Workload Names
// ============================================================================

/// Calico per-node agent
pub const DS_CALICO_NODE: &str = "calico-node";

/// Cilium per-node agent
pub const DS_CILIUM: &str = "cilium";

/// Cilium per-node agent (alternative chart naming)
pub const DS_CILIUM_AGENT: &str = "cilium-agent";

/// GKE Dataplane V2 agent (Cilium based)
pub const DS_ANETD: &str = "anetd";

/// Weave Net per-node agent
pub const DS_WEAVE_NET: &str = "weave-net";

/// Flannel per-node agent
pub const DS_KUBE_FLANNEL: &str = "kube-flannel";

/// Flannel per-node agent (legacy manifest naming)
pub const DS_KUBE_FLANNEL_DS: &str = "kube-flannel-ds";

/// AWS VPC CNI per-node agent
pub const DS_AWS_NODE: &str = "aws-node";

/// Azure CNI network monitor
pub const DS_AZURE_CNI_NETWORKMONITOR: &str = "azure-cni-networkmonitor";

/// Azure network policy manager
pub const DS_AZURE_NPM: &str = "azure-npm";

/// kube-router per-node agent
pub const DS_KUBE_ROUTER: &str = "kube-router";

/// Calico controllers Deployment
pub const DEPLOY_CALICO_KUBE_CONTROLLERS: &str = "calico-kube-controllers";

/// Cilium operator Deployment
pub const DEPLOY_CILIUM_OPERATOR: &str = "cilium-operator";

// ============================================================================
// Container Environment
// ============================================================================

/// Environment variable naming the CNI config file written by the CNI installer
pub const ENV_CNI_CONF_NAME: &str = "CNI_CONF_NAME";
