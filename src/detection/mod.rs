// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Provider and CNI fingerprinting.
//!
//! Both fingerprinters are ordered cascades of independent [`Heuristic`]s:
//! the first heuristic returning a value wins, there is no scoring and no
//! backtracking. A heuristic whose probe call fails with a non-fatal error is
//! treated as "no signal" and the cascade moves on. Fatal errors (cluster
//! unreachable, query timeout) halt detection.
//!
//! [`Detector`] memoizes the answers for the lifetime of the process.

pub mod cni;
pub mod provider;

pub use cni::{cni_cascade, detect_cni, CniMatch};
pub use provider::{detect_provider, provider_cascade};

use crate::cluster::{ClusterProbe, NodeInfo};
use crate::constants::{DEFAULT_REGION, IN_CLUSTER_NAME};
use crate::errors::DetectionError;
use crate::labels::TOPOLOGY_REGION;
use crate::types::{CniPlugin, Provider};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Name reported in `detected_by` when a value came from configuration.
pub const OVERRIDE_SOURCE: &str = "override";

/// One step of a detection cascade.
#[async_trait]
pub trait Heuristic<T>: Send + Sync {
    /// Stable name reported as `detected_by`.
    fn name(&self) -> &'static str;

    /// Inspect the cluster. `Ok(None)` means "no signal".
    async fn evaluate(&self, probe: &dyn ClusterProbe) -> Result<Option<T>, DetectionError>;
}

/// A cascade answer together with the heuristic that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detected<T> {
    pub value: T,
    pub detected_by: &'static str,
}

/// Run `heuristics` in order and return the first match.
///
/// # Errors
///
/// Returns the first fatal error. Non-fatal errors are logged and skipped.
pub async fn run_cascade<T: Send>(
    kind: &str,
    heuristics: &[Box<dyn Heuristic<T>>],
    probe: &dyn ClusterProbe,
) -> Result<Option<Detected<T>>, DetectionError> {
    for heuristic in heuristics {
        match heuristic.evaluate(probe).await {
            Ok(Some(value)) => {
                debug!(kind = kind, heuristic = heuristic.name(), "Heuristic matched");
                return Ok(Some(Detected {
                    value,
                    detected_by: heuristic.name(),
                }));
            }
            Ok(None) => {
                debug!(kind = kind, heuristic = heuristic.name(), "No signal");
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                debug!(
                    kind = kind,
                    heuristic = heuristic.name(),
                    error = %e,
                    "Heuristic failed, treating as no signal"
                );
            }
        }
    }
    Ok(None)
}

/// Degrade a non-fatal probe error to `T::default()`.
pub(crate) fn soft<T: Default>(
    signal: &str,
    result: Result<T, DetectionError>,
) -> Result<T, DetectionError> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            debug!(signal = signal, error = %e, "Signal unavailable");
            Ok(T::default())
        }
    }
}

/// Provider answer with its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProviderDetection {
    pub provider: Provider,
    pub detected_by: Option<String>,
}

/// CNI answer with version and source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CniDetection {
    pub name: CniPlugin,
    pub version: Option<String>,
    pub detected_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct KubernetesInfo {
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ClusterInfo {
    pub name: String,
    pub region: String,
    pub node_count: usize,
}

/// Everything known about the cluster under test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EnvironmentInfo {
    pub provider: Provider,
    pub cni: CniDetection,
    pub kubernetes: KubernetesInfo,
    pub cluster: ClusterInfo,
}

/// Cluster name from the kubeconfig context, with kind's prefix removed.
#[must_use]
pub fn cluster_name_from_context(context: Option<&str>) -> String {
    match context {
        Some(ctx) => ctx.strip_prefix("kind-").unwrap_or(ctx).to_string(),
        None => IN_CLUSTER_NAME.to_string(),
    }
}

/// Region label of the first node, `local` when absent.
#[must_use]
pub fn region_from_nodes(nodes: &[NodeInfo]) -> String {
    nodes
        .first()
        .and_then(|node| node.labels.get(TOPOLOGY_REGION))
        .filter(|region| !region.is_empty())
        .cloned()
        .unwrap_or_else(|| DEFAULT_REGION.to_string())
}

/// Memoizing front-end to provider and CNI detection.
///
/// The first answer for each is kept for the lifetime of the detector, so
/// repeated queries within one process always agree.
pub struct Detector {
    probe: Arc<dyn ClusterProbe>,
    provider_override: Option<Provider>,
    cni_override: Option<CniPlugin>,
    provider: OnceCell<ProviderDetection>,
    cni: OnceCell<CniDetection>,
}

impl Detector {
    #[must_use]
    pub fn new(probe: Arc<dyn ClusterProbe>) -> Self {
        Self {
            probe,
            provider_override: None,
            cni_override: None,
            provider: OnceCell::new(),
            cni: OnceCell::new(),
        }
    }

    /// Skip detection for whichever of provider or CNI is given.
    #[must_use]
    pub fn with_overrides(mut self, provider: Option<Provider>, cni: Option<CniPlugin>) -> Self {
        self.provider_override = provider;
        self.cni_override = cni;
        self
    }

    #[must_use]
    pub fn probe(&self) -> &dyn ClusterProbe {
        self.probe.as_ref()
    }

    /// Detected (or overridden) provider.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`DetectionError`] when the cluster cannot be queried.
    pub async fn provider(&self) -> Result<&ProviderDetection, DetectionError> {
        self.provider
            .get_or_try_init(|| async {
                if let Some(provider) = self.provider_override {
                    info!(provider = %provider, "Using provider override");
                    return Ok(ProviderDetection {
                        provider,
                        detected_by: Some(OVERRIDE_SOURCE.to_string()),
                    });
                }

                let detection = detect_provider(self.probe.as_ref()).await?;
                info!(
                    provider = %detection.provider,
                    detected_by = ?detection.detected_by,
                    "Detected provider"
                );
                Ok::<_, DetectionError>(detection)
            })
            .await
    }

    /// Detected (or overridden) CNI plugin.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`DetectionError`] when the cluster cannot be queried.
    pub async fn cni(&self) -> Result<&CniDetection, DetectionError> {
        self.cni
            .get_or_try_init(|| async {
                if let Some(name) = self.cni_override {
                    info!(cni = %name, "Using CNI override");
                    return Ok(CniDetection {
                        name,
                        version: None,
                        detected_by: Some(OVERRIDE_SOURCE.to_string()),
                    });
                }

                let provider = self.provider().await?.provider;
                let detection = detect_cni(self.probe.as_ref(), provider).await?;
                info!(
                    cni = %detection.name,
                    version = ?detection.version,
                    detected_by = ?detection.detected_by,
                    "Detected CNI plugin"
                );
                Ok::<_, DetectionError>(detection)
            })
            .await
    }

    /// Provider, CNI, Kubernetes version and cluster facts.
    ///
    /// Independent facts are fetched concurrently.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`DetectionError`] when the cluster cannot be queried.
    pub async fn environment(&self) -> Result<EnvironmentInfo, DetectionError> {
        let probe = self.probe.as_ref();
        let (provider, cni, version, nodes, context) = futures::try_join!(
            self.provider(),
            self.cni(),
            async { soft("kubernetes_version", probe.kubernetes_version().await) },
            async { soft("nodes", probe.nodes().await) },
            async { soft("current_context", probe.current_context().await) },
        )?;

        Ok(EnvironmentInfo {
            provider: provider.provider,
            cni: cni.clone(),
            kubernetes: KubernetesInfo { version },
            cluster: ClusterInfo {
                name: cluster_name_from_context(context.as_deref()),
                region: region_from_nodes(&nodes),
                node_count: nodes.len(),
            },
        })
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod mod_tests;
