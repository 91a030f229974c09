// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Capture a snapshot from a mock cluster and replay it offline.
//!
//! Run with: cargo test --test snapshot_integration

mod common;

use common::{eks_with_calico, probe_for};
use netpol_compat::cluster::{ClusterSnapshot, SnapshotProbe};
use netpol_compat::detection::Detector;
use netpol_compat::planner::generate_plan;
use netpol_compat::recipes::RecipeId;
use std::sync::Arc;

#[tokio::test]
async fn test_snapshot_replays_live_detection() {
    let server = eks_with_calico().await;
    let live = probe_for(&server, Some("arn:aws:eks:us-west-2:123456789012:cluster/np-test"));

    let snapshot = ClusterSnapshot::capture(&live).await.unwrap();
    assert_eq!(snapshot.nodes.len(), 2);
    assert_eq!(snapshot.daemonsets.len(), 1);
    assert_eq!(snapshot.daemonsets["kube-system"].len(), 3);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eks.yaml");
    snapshot.to_file(&path).await.unwrap();

    let live_environment = Detector::new(Arc::new(live)).environment().await.unwrap();
    let replayed_environment = Detector::new(Arc::new(SnapshotProbe::from_file(&path).await.unwrap()))
        .environment()
        .await
        .unwrap();
    assert_eq!(replayed_environment, live_environment);

    let plan = generate_plan(
        replayed_environment.provider,
        replayed_environment.cni.name,
    );
    assert_eq!(plan.runnable.len() + plan.skipped.len(), RecipeId::ALL.len());
    assert!(plan.runnable.contains(&RecipeId::R08));
}
