// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use kube::Config;
use netpol_compat::cluster::KubeProbe;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Connect to the cluster from the ambient kubeconfig or skip the test
pub async fn get_kube_probe_or_skip() -> Option<KubeProbe> {
    match KubeProbe::connect(Duration::from_secs(10), 2).await {
        Ok(probe) => {
            println!("✓ Successfully connected to Kubernetes cluster");
            Some(probe)
        }
        Err(e) => {
            eprintln!("⊘ Skipping integration test: no reachable Kubernetes cluster: {e}");
            None
        }
    }
}

/// Probe talking to a mock API server, without retries
pub fn probe_for(server: &MockServer, context: Option<&str>) -> KubeProbe {
    let config = Config::new(server.uri().parse().expect("mock server URI"));
    KubeProbe::from_config(
        config,
        context.map(str::to_string),
        Duration::from_secs(5),
        0,
    )
    .expect("client from mock config")
}

/// Serve `items` as a single-page list at `list_path`
pub async fn mount_list(server: &MockServer, list_path: &str, kind: &str, items: Value) {
    Mock::given(method("GET"))
        .and(path(list_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "apiVersion": "v1",
            "kind": kind,
            "metadata": {},
            "items": items
        })))
        .mount(server)
        .await;
}

/// Serve a `/version` document
pub async fn mount_version(server: &MockServer, git_version: &str) {
    Mock::given(method("GET"))
        .and(path("/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "major": "1", "minor": "28", "gitVersion": git_version,
            "gitCommit": "", "gitTreeState": "clean", "buildDate": "",
            "goVersion": "go1.20.5", "compiler": "gc", "platform": "linux/amd64"
        })))
        .mount(server)
        .await;
}

/// DaemonSet manifest with one container
pub fn daemonset(name: &str, namespace: &str, image: &str) -> Value {
    json!({
        "metadata": { "name": name, "namespace": namespace },
        "spec": {
            "selector": { "matchLabels": { "k8s-app": name } },
            "template": {
                "metadata": { "labels": { "k8s-app": name } },
                "spec": { "containers": [{ "name": name, "image": image }] }
            }
        }
    })
}

/// Mock API server shaped like an EKS cluster running Calico next to aws-node
pub async fn eks_with_calico() -> MockServer {
    let server = MockServer::start().await;

    mount_list(
        &server,
        "/api/v1/nodes",
        "NodeList",
        json!([
            {
                "metadata": { "name": "ip-10-0-1-23.us-west-2.compute.internal", "labels": {
                    "eks.amazonaws.com/nodegroup": "default",
                    "topology.kubernetes.io/region": "us-west-2"
                }},
                "spec": { "providerID": "aws:///us-west-2a/i-0123456789abcdef0" }
            },
            {
                "metadata": { "name": "ip-10-0-2-45.us-west-2.compute.internal", "labels": {
                    "eks.amazonaws.com/nodegroup": "default",
                    "topology.kubernetes.io/region": "us-west-2"
                }},
                "spec": { "providerID": "aws:///us-west-2b/i-0fedcba9876543210" }
            }
        ]),
    )
    .await;

    mount_list(
        &server,
        "/apis/apps/v1/namespaces/kube-system/daemonsets",
        "DaemonSetList",
        json!([
            daemonset(
                "aws-node",
                "kube-system",
                "602401143452.dkr.ecr.us-west-2.amazonaws.com/amazon-k8s-cni:v1.15.0"
            ),
            daemonset("calico-node", "kube-system", "docker.io/calico/node:v3.26.1"),
            daemonset("kube-proxy", "kube-system", "registry.k8s.io/kube-proxy:v1.28.0")
        ]),
    )
    .await;

    mount_version(&server, "v1.28.3-eks-4f4795d").await;
    server
}
