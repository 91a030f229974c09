// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `detection/mod.rs`

#[cfg(test)]
mod tests {
    use super::super::{
        cluster_name_from_context, region_from_nodes, run_cascade, Detector, Heuristic,
    };
    use crate::cluster::{ClusterProbe, ClusterSnapshot, NodeInfo, SnapshotProbe, WorkloadInfo};
    use crate::errors::DetectionError;
    use crate::types::{CniPlugin, Provider};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn kind_calico_snapshot() -> ClusterSnapshot {
        serde_json::from_value(json!({
            "apiServerUrl": "https://127.0.0.1:43215",
            "currentContext": "kind-np-test",
            "kubernetesVersion": "v1.28.0",
            "nodes": [
                { "name": "np-test-control-plane", "labels": { "node-role.kubernetes.io/control-plane": "" } },
                { "name": "np-test-worker" },
                { "name": "np-test-worker2" }
            ],
            "daemonsets": {
                "kube-system": [{ "name": "calico-node", "images": ["docker.io/calico/node:v3.26.1"] }]
            }
        }))
        .unwrap()
    }

    /// Counts how often the cascade reaches the cluster.
    struct CountingProbe {
        inner: SnapshotProbe,
        context_calls: AtomicUsize,
        daemonset_calls: AtomicUsize,
    }

    impl CountingProbe {
        fn new(snapshot: ClusterSnapshot) -> Self {
            Self {
                inner: SnapshotProbe::new(snapshot),
                context_calls: AtomicUsize::new(0),
                daemonset_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ClusterProbe for CountingProbe {
        async fn api_server_url(&self) -> Result<Option<String>, DetectionError> {
            self.inner.api_server_url().await
        }
        async fn current_context(&self) -> Result<Option<String>, DetectionError> {
            self.context_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.current_context().await
        }
        async fn minikube_running(&self) -> Result<bool, DetectionError> {
            self.inner.minikube_running().await
        }
        async fn microk8s_snap_installed(&self) -> Result<bool, DetectionError> {
            self.inner.microk8s_snap_installed().await
        }
        async fn nodes(&self) -> Result<Vec<NodeInfo>, DetectionError> {
            self.inner.nodes().await
        }
        async fn daemonsets(&self, namespace: &str) -> Result<Vec<WorkloadInfo>, DetectionError> {
            self.daemonset_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.daemonsets(namespace).await
        }
        async fn deployments(&self, namespace: &str) -> Result<Vec<WorkloadInfo>, DetectionError> {
            self.inner.deployments(namespace).await
        }
        async fn host_interfaces(&self) -> Result<Vec<String>, DetectionError> {
            self.inner.host_interfaces().await
        }
        async fn cni_binaries(&self) -> Result<Vec<String>, DetectionError> {
            self.inner.cni_binaries().await
        }
        async fn kubernetes_version(&self) -> Result<Option<String>, DetectionError> {
            self.inner.kubernetes_version().await
        }
    }

    struct Never;

    #[async_trait]
    impl Heuristic<u8> for Never {
        fn name(&self) -> &'static str {
            "never"
        }
        async fn evaluate(&self, _probe: &dyn ClusterProbe) -> Result<Option<u8>, DetectionError> {
            Ok(None)
        }
    }

    struct Broken {
        fatal: bool,
    }

    #[async_trait]
    impl Heuristic<u8> for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }
        async fn evaluate(&self, _probe: &dyn ClusterProbe) -> Result<Option<u8>, DetectionError> {
            if self.fatal {
                Err(DetectionError::ClusterUnreachable {
                    reason: "connection refused".to_string(),
                })
            } else {
                Err(DetectionError::Command {
                    command: "snap list microk8s".to_string(),
                    reason: "exit status 1".to_string(),
                })
            }
        }
    }

    struct Always(u8, &'static str);

    #[async_trait]
    impl Heuristic<u8> for Always {
        fn name(&self) -> &'static str {
            self.1
        }
        async fn evaluate(&self, _probe: &dyn ClusterProbe) -> Result<Option<u8>, DetectionError> {
            Ok(Some(self.0))
        }
    }

    #[tokio::test]
    async fn test_cascade_first_match_wins() {
        let probe = SnapshotProbe::default();
        let cascade: Vec<Box<dyn Heuristic<u8>>> = vec![
            Box::new(Never),
            Box::new(Broken { fatal: false }),
            Box::new(Always(1, "first")),
            Box::new(Always(2, "second")),
        ];
        let found = run_cascade("test", &cascade, &probe).await.unwrap().unwrap();
        assert_eq!(found.value, 1);
        assert_eq!(found.detected_by, "first");

        let empty: Vec<Box<dyn Heuristic<u8>>> = vec![Box::new(Never)];
        assert!(run_cascade("test", &empty, &probe).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cascade_stops_on_fatal_error() {
        let probe = SnapshotProbe::default();
        let cascade: Vec<Box<dyn Heuristic<u8>>> =
            vec![Box::new(Broken { fatal: true }), Box::new(Always(1, "later"))];
        let err = run_cascade("test", &cascade, &probe).await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_cluster_name_from_context() {
        assert_eq!(cluster_name_from_context(Some("kind-np-test")), "np-test");
        assert_eq!(cluster_name_from_context(Some("minikube")), "minikube");
        assert_eq!(cluster_name_from_context(None), "in-cluster");
    }

    #[test]
    fn test_region_from_nodes() {
        assert_eq!(region_from_nodes(&[]), "local");
        let node = NodeInfo {
            name: "n".to_string(),
            labels: BTreeMap::from([(
                "topology.kubernetes.io/region".to_string(),
                "us-east-1".to_string(),
            )]),
            ..Default::default()
        };
        assert_eq!(region_from_nodes(&[node]), "us-east-1");
    }

    #[tokio::test]
    async fn test_detector_memoizes_answers() {
        let probe = Arc::new(CountingProbe::new(kind_calico_snapshot()));
        let detector = Detector::new(probe.clone());

        for _ in 0..3 {
            assert_eq!(detector.provider().await.unwrap().provider, Provider::Kind);
            assert_eq!(detector.cni().await.unwrap().name, CniPlugin::Calico);
        }

        assert_eq!(probe.context_calls.load(Ordering::SeqCst), 1);
        assert_eq!(probe.daemonset_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_overrides_skip_detection() {
        let probe = Arc::new(CountingProbe::new(kind_calico_snapshot()));
        let detector = Detector::new(probe.clone())
            .with_overrides(Some(Provider::Eks), Some(CniPlugin::VpcCni));

        let provider = detector.provider().await.unwrap();
        assert_eq!(provider.provider, Provider::Eks);
        assert_eq!(provider.detected_by.as_deref(), Some("override"));
        assert_eq!(detector.cni().await.unwrap().name, CniPlugin::VpcCni);
        assert_eq!(probe.daemonset_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_environment_document() {
        let detector = Detector::new(Arc::new(SnapshotProbe::new(kind_calico_snapshot())));
        let env = detector.environment().await.unwrap();

        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            json!({
                "provider": "kind",
                "cni": { "name": "calico", "version": "v3.26.1", "detected_by": "daemonset-name" },
                "kubernetes": { "version": "v1.28.0" },
                "cluster": { "name": "np-test", "region": "local", "node_count": 3 }
            })
        );
    }
}
