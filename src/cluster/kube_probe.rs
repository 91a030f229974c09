// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Live cluster probe backed by `kube::Client`.
//!
//! Every API call is retried on transient errors and bounded by the request
//! timeout. Node-level signals (interfaces, CNI binaries) are read by exec'ing
//! into a running host-network pod in `kube-system`; those are best-effort and
//! fail with a non-fatal [`DetectionError::Command`].

use super::command::run_helper;
use super::pagination::list_all_paginated;
use super::{ClusterProbe, NodeInfo, WorkloadInfo};
use crate::constants::{CNI_BIN_DIR, KUBE_CONNECT_TIMEOUT_SECS, KUBE_SYSTEM_NAMESPACE, PROC_NET_DEV};
use crate::errors::DetectionError;
use crate::retry::retry_api_call;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment};
use k8s_openapi::api::core::v1::{Container, Node, Pod, PodTemplateSpec};
use kube::api::{AttachParams, ListParams};
use kube::config::Kubeconfig;
use kube::{Api, Client, Config};
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

/// Cluster probe talking to the API server from the ambient kubeconfig.
#[derive(Clone)]
pub struct KubeProbe {
    client: Client,
    cluster_url: String,
    context: Option<String>,
    request_timeout: Duration,
    retries: u32,
}

impl KubeProbe {
    /// Build a probe from the ambient kubeconfig, or in-cluster config when
    /// no kubeconfig exists.
    ///
    /// # Errors
    ///
    /// Returns [`DetectionError::Kubeconfig`] when no usable configuration
    /// can be inferred.
    pub async fn connect(request_timeout: Duration, retries: u32) -> Result<Self, DetectionError> {
        let context = match Kubeconfig::read() {
            Ok(kubeconfig) => kubeconfig.current_context,
            Err(e) => {
                debug!(error = %e, "No kubeconfig found, assuming in-cluster configuration");
                None
            }
        };

        let config = Config::infer()
            .await
            .map_err(|e| DetectionError::Kubeconfig {
                reason: e.to_string(),
            })?;

        Self::from_config(config, context, request_timeout, retries)
    }

    /// Build a probe from an explicit client configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DetectionError::Kubeconfig`] when the client cannot be built.
    pub fn from_config(
        mut config: Config,
        context: Option<String>,
        request_timeout: Duration,
        retries: u32,
    ) -> Result<Self, DetectionError> {
        config.connect_timeout = Some(Duration::from_secs(KUBE_CONNECT_TIMEOUT_SECS));
        config.read_timeout = Some(request_timeout);
        let cluster_url = config.cluster_url.to_string();

        let client = Client::try_from(config).map_err(|e| DetectionError::Kubeconfig {
            reason: format!("failed to create client: {e}"),
        })?;

        info!(
            cluster_url = %cluster_url,
            context = ?context,
            timeout_secs = request_timeout.as_secs(),
            "Connected Kubernetes client"
        );

        Ok(Self {
            client,
            cluster_url,
            context,
            request_timeout,
            retries,
        })
    }

    /// Run a cluster query with the request timeout, mapping client errors.
    async fn bounded<T, Fut>(&self, operation: &str, query: Fut) -> Result<T, DetectionError>
    where
        Fut: Future<Output = Result<T, kube::Error>>,
    {
        match tokio::time::timeout(self.request_timeout, query).await {
            Ok(result) => result.map_err(|e| DetectionError::from_kube(operation, e)),
            Err(_) => Err(DetectionError::Timeout {
                operation: operation.to_string(),
                timeout_secs: self.request_timeout.as_secs(),
            }),
        }
    }

    /// Exec `command` in a running host-network pod and return its stdout.
    async fn exec_on_host(&self, command: &[&str]) -> Result<String, DetectionError> {
        let command_line = command.join(" ");
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), KUBE_SYSTEM_NAMESPACE);
        let params = ListParams::default().fields("status.phase=Running");
        let operation = format!("list running pods in {KUBE_SYSTEM_NAMESPACE}");

        let running = self
            .bounded(
                &operation,
                list_all_paginated(&pods, params, &operation, self.retries),
            )
            .await?;

        let (pod_name, container) = running
            .iter()
            .find_map(host_network_target)
            .ok_or_else(|| DetectionError::Command {
                command: command_line.clone(),
                reason: format!("no running hostNetwork pod in {KUBE_SYSTEM_NAMESPACE}"),
            })?;

        debug!(pod = %pod_name, container = %container, command = %command_line, "Exec into host-network pod");

        let exec = async {
            let attach = AttachParams::default().container(container).stderr(false);
            let mut attached = pods
                .exec(&pod_name, command.iter().copied(), &attach)
                .await
                .map_err(|e| e.to_string())?;

            let mut stdout = String::new();
            if let Some(mut reader) = attached.stdout() {
                reader
                    .read_to_string(&mut stdout)
                    .await
                    .map_err(|e| e.to_string())?;
            }
            attached.join().await.map_err(|e| e.to_string())?;
            Ok::<_, String>(stdout)
        };

        match tokio::time::timeout(self.request_timeout, exec).await {
            Ok(Ok(stdout)) => Ok(stdout),
            Ok(Err(reason)) => Err(DetectionError::Command {
                command: command_line,
                reason,
            }),
            Err(_) => Err(DetectionError::Command {
                command: command_line,
                reason: format!("timed out after {}s", self.request_timeout.as_secs()),
            }),
        }
    }
}

#[async_trait]
impl ClusterProbe for KubeProbe {
    async fn api_server_url(&self) -> Result<Option<String>, DetectionError> {
        Ok(Some(self.cluster_url.clone()))
    }

    async fn current_context(&self) -> Result<Option<String>, DetectionError> {
        Ok(self.context.clone())
    }

    async fn minikube_running(&self) -> Result<bool, DetectionError> {
        let output = run_helper("minikube", &["status", "--format", "{{.Host}}"]).await?;
        Ok(output.is_some_and(|out| out.stdout.trim() == "Running"))
    }

    async fn microk8s_snap_installed(&self) -> Result<bool, DetectionError> {
        let output = run_helper("snap", &["list", "microk8s"]).await?;
        Ok(output.is_some_and(|out| out.success))
    }

    async fn nodes(&self) -> Result<Vec<NodeInfo>, DetectionError> {
        let api: Api<Node> = Api::all(self.client.clone());
        let operation = "list nodes";
        let nodes = self
            .bounded(
                operation,
                list_all_paginated(&api, ListParams::default(), operation, self.retries),
            )
            .await?;

        let mut infos: Vec<NodeInfo> = nodes.iter().map(node_info_from).collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(infos)
    }

    async fn daemonsets(&self, namespace: &str) -> Result<Vec<WorkloadInfo>, DetectionError> {
        let api: Api<DaemonSet> = Api::namespaced(self.client.clone(), namespace);
        let operation = format!("list daemonsets in {namespace}");
        let items = self
            .bounded(
                &operation,
                list_all_paginated(&api, ListParams::default(), &operation, self.retries),
            )
            .await?;
        Ok(items.iter().map(workload_from_daemonset).collect())
    }

    async fn deployments(&self, namespace: &str) -> Result<Vec<WorkloadInfo>, DetectionError> {
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        let operation = format!("list deployments in {namespace}");
        let items = self
            .bounded(
                &operation,
                list_all_paginated(&api, ListParams::default(), &operation, self.retries),
            )
            .await?;
        Ok(items.iter().map(workload_from_deployment).collect())
    }

    async fn host_interfaces(&self) -> Result<Vec<String>, DetectionError> {
        let output = self.exec_on_host(&["cat", PROC_NET_DEV]).await?;
        Ok(parse_proc_net_dev(&output))
    }

    async fn cni_binaries(&self) -> Result<Vec<String>, DetectionError> {
        let output = self.exec_on_host(&["ls", CNI_BIN_DIR]).await?;
        Ok(parse_ls_output(&output))
    }

    async fn kubernetes_version(&self) -> Result<Option<String>, DetectionError> {
        let operation = "get apiserver version";
        let info = self
            .bounded(
                operation,
                retry_api_call(|| self.client.apiserver_version(), operation, self.retries),
            )
            .await?;
        Ok(Some(info.git_version))
    }
}

/// Pick the pod and container to exec into, if the pod uses the host network.
fn host_network_target(pod: &Pod) -> Option<(String, String)> {
    let spec = pod.spec.as_ref()?;
    if spec.host_network != Some(true) {
        return None;
    }
    let name = pod.metadata.name.clone()?;
    let container = spec.containers.first()?.name.clone();
    Some((name, container))
}

/// Reduce a Node to the facts detection uses.
#[must_use]
pub fn node_info_from(node: &Node) -> NodeInfo {
    NodeInfo {
        name: node.metadata.name.clone().unwrap_or_default(),
        labels: node.metadata.labels.clone().unwrap_or_default(),
        provider_id: node
            .spec
            .as_ref()
            .and_then(|spec| spec.provider_id.clone())
            .filter(|id| !id.is_empty()),
        os_image: node
            .status
            .as_ref()
            .and_then(|status| status.node_info.as_ref())
            .map(|info| info.os_image.clone())
            .filter(|image| !image.is_empty()),
    }
}

/// Reduce a DaemonSet to its name, images and literal env values.
#[must_use]
pub fn workload_from_daemonset(ds: &DaemonSet) -> WorkloadInfo {
    workload_from_template(
        ds.metadata.name.clone(),
        ds.metadata.namespace.clone(),
        ds.spec.as_ref().map(|spec| &spec.template),
    )
}

/// Reduce a Deployment to its name, images and literal env values.
#[must_use]
pub fn workload_from_deployment(deploy: &Deployment) -> WorkloadInfo {
    workload_from_template(
        deploy.metadata.name.clone(),
        deploy.metadata.namespace.clone(),
        deploy.spec.as_ref().map(|spec| &spec.template),
    )
}

fn workload_from_template(
    name: Option<String>,
    namespace: Option<String>,
    template: Option<&PodTemplateSpec>,
) -> WorkloadInfo {
    let pod_spec = template.and_then(|t| t.spec.as_ref());

    let images = pod_spec
        .map(|spec| spec.containers.iter().filter_map(|c| c.image.clone()).collect())
        .unwrap_or_default();

    // install-cni init containers carry CNI_CONF_NAME on Calico
    let mut env = BTreeMap::new();
    if let Some(spec) = pod_spec {
        let init = spec.init_containers.iter().flatten();
        for container in init.chain(spec.containers.iter()) {
            collect_env(container, &mut env);
        }
    }

    WorkloadInfo {
        name: name.unwrap_or_default(),
        namespace: namespace.unwrap_or_default(),
        images,
        env,
    }
}

fn collect_env(container: &Container, env: &mut BTreeMap<String, String>) {
    for var in container.env.iter().flatten() {
        if let Some(value) = &var.value {
            env.entry(var.name.clone()).or_insert_with(|| value.clone());
        }
    }
}

/// Interface names from `/proc/net/dev` output (header lines skipped).
#[must_use]
pub fn parse_proc_net_dev(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(name, _)| name.trim().to_string())
        .filter(|name| !name.is_empty() && !name.contains('|'))
        .collect()
}

/// File names from `ls` output.
#[must_use]
pub fn parse_ls_output(output: &str) -> Vec<String> {
    output
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "kube_probe_tests.rs"]
mod kube_probe_tests;
