// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `snapshot.rs`

#[cfg(test)]
mod tests {
    use super::super::{ClusterSnapshot, SnapshotProbe};
    use crate::cluster::{ClusterProbe, NodeInfo, WorkloadInfo};
    use crate::errors::DetectionError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::BTreeMap;

    /// Probe whose node-level exec always fails and whose nodes call is
    /// optionally unreachable.
    struct FlakyProbe {
        unreachable: bool,
    }

    #[async_trait]
    impl ClusterProbe for FlakyProbe {
        async fn api_server_url(&self) -> Result<Option<String>, DetectionError> {
            Ok(Some("https://10.0.0.1:6443".to_string()))
        }
        async fn current_context(&self) -> Result<Option<String>, DetectionError> {
            Ok(Some("k3d-dev".to_string()))
        }
        async fn minikube_running(&self) -> Result<bool, DetectionError> {
            Ok(false)
        }
        async fn microk8s_snap_installed(&self) -> Result<bool, DetectionError> {
            Ok(false)
        }
        async fn nodes(&self) -> Result<Vec<NodeInfo>, DetectionError> {
            if self.unreachable {
                return Err(DetectionError::ClusterUnreachable {
                    reason: "connection refused".to_string(),
                });
            }
            Ok(vec![NodeInfo {
                name: "k3d-dev-server-0".to_string(),
                provider_id: Some("k3s://k3d-dev-server-0".to_string()),
                ..Default::default()
            }])
        }
        async fn daemonsets(&self, namespace: &str) -> Result<Vec<WorkloadInfo>, DetectionError> {
            if namespace == "kube-system" {
                Ok(vec![WorkloadInfo {
                    name: "svclb-traefik".to_string(),
                    namespace: namespace.to_string(),
                    ..Default::default()
                }])
            } else {
                Ok(Vec::new())
            }
        }
        async fn deployments(&self, _namespace: &str) -> Result<Vec<WorkloadInfo>, DetectionError> {
            Ok(Vec::new())
        }
        async fn host_interfaces(&self) -> Result<Vec<String>, DetectionError> {
            Err(DetectionError::Command {
                command: "cat /proc/net/dev".to_string(),
                reason: "no running hostNetwork pod in kube-system".to_string(),
            })
        }
        async fn cni_binaries(&self) -> Result<Vec<String>, DetectionError> {
            Ok(vec!["flannel".to_string(), "host-local".to_string()])
        }
        async fn kubernetes_version(&self) -> Result<Option<String>, DetectionError> {
            Ok(Some("v1.27.4+k3s1".to_string()))
        }
    }

    #[tokio::test]
    async fn test_capture_records_non_fatal_failures_as_empty() {
        let snapshot = ClusterSnapshot::capture(&FlakyProbe { unreachable: false })
            .await
            .unwrap();

        assert_eq!(snapshot.current_context.as_deref(), Some("k3d-dev"));
        assert_eq!(snapshot.nodes.len(), 1);
        assert!(snapshot.host_interfaces.is_empty());
        assert_eq!(snapshot.cni_binaries, vec!["flannel", "host-local"]);
        assert_eq!(
            snapshot.daemonsets.keys().collect::<Vec<_>>(),
            vec!["kube-system"],
            "empty namespaces are omitted"
        );
        assert!(snapshot.deployments.is_empty());
    }

    #[tokio::test]
    async fn test_capture_propagates_fatal_errors() {
        let err = ClusterSnapshot::capture(&FlakyProbe { unreachable: true })
            .await
            .unwrap_err();
        assert!(matches!(err, DetectionError::ClusterUnreachable { .. }));
    }

    #[tokio::test]
    async fn test_snapshot_probe_replays_signals() {
        let snapshot: ClusterSnapshot = serde_json::from_value(json!({
            "currentContext": "kind-np-test",
            "nodes": [
                { "name": "np-test-worker" },
                { "name": "np-test-control-plane", "providerId": "kind://docker/np-test/np-test-control-plane" }
            ],
            "daemonsets": {
                "kube-system": [{ "name": "kindnet", "images": ["docker.io/kindest/kindnetd:v20230511-dc714da8"] }]
            }
        }))
        .unwrap();
        let probe = SnapshotProbe::new(snapshot);

        let nodes = probe.nodes().await.unwrap();
        assert_eq!(nodes[0].name, "np-test-control-plane");
        assert_eq!(probe.daemonsets("kube-system").await.unwrap()[0].name, "kindnet");
        assert!(probe.daemonsets("calico-system").await.unwrap().is_empty());
        assert!(probe.deployments("kube-system").await.unwrap().is_empty());
        assert_eq!(probe.api_server_url().await.unwrap(), None);
        assert!(!probe.minikube_running().await.unwrap());
    }

    #[tokio::test]
    async fn test_file_round_trip_in_json_and_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let mut env = BTreeMap::new();
        env.insert("CNI_CONF_NAME".to_string(), "05-cilium.conflist".to_string());
        let snapshot = ClusterSnapshot {
            current_context: Some("gke_proj_us-central1_np".to_string()),
            kubernetes_version: Some("v1.28.3-gke.1203001".to_string()),
            daemonsets: BTreeMap::from([(
                "kube-system".to_string(),
                vec![WorkloadInfo {
                    name: "anetd".to_string(),
                    namespace: "kube-system".to_string(),
                    images: vec!["gke.gcr.io/cilium/cilium:v1.12.10-gke3".to_string()],
                    env,
                }],
            )]),
            ..Default::default()
        };

        for file in ["snapshot.json", "snapshot.yaml"] {
            let path = dir.path().join(file);
            snapshot.to_file(&path).await.unwrap();
            let loaded = ClusterSnapshot::from_file(&path).await.unwrap();
            assert_eq!(loaded, snapshot, "{file}");
        }

        let yaml = std::fs::read_to_string(dir.path().join("snapshot.yaml")).unwrap();
        assert!(yaml.contains("currentContext: gke_proj_us-central1_np"));
    }

    #[tokio::test]
    async fn test_unreadable_snapshot_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let err = SnapshotProbe::from_file(&missing).await.unwrap_err();
        assert!(matches!(err, DetectionError::Snapshot { .. }));
        assert!(err.is_fatal());

        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, "{ not json").unwrap();
        let err = ClusterSnapshot::from_file(&garbage).await.unwrap_err();
        assert!(err.to_string().contains("garbage.json"));
    }
}
