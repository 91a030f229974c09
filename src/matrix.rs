// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Static NetworkPolicy feature-support matrix.
//!
//! The matrix is an exhaustive `match` over `(CniPlugin, Feature)`, so adding
//! a plugin or a feature without filling in its row is a compile error.
//!
//! # Example
//!
//! ```rust
//! use netpol_compat::matrix::{is_recipe_supported, support};
//! use netpol_compat::recipes::RecipeId;
//! use netpol_compat::types::{CniPlugin, Feature, SupportLevel};
//!
//! assert_eq!(support(CniPlugin::Calico, Feature::SctpProtocol), SupportLevel::Full);
//! assert!(!is_recipe_supported(RecipeId::R01, CniPlugin::Flannel));
//! ```

use crate::recipes::RecipeId;
use crate::types::{CniPlugin, Feature, SupportLevel};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Support level of `feature` on `cni`. `Unknown` CNI yields `Unknown` everywhere.
#[must_use]
pub fn support(cni: CniPlugin, feature: Feature) -> SupportLevel {
    use SupportLevel::{Full, Partial};

    match (cni, feature) {
        (CniPlugin::Unknown, _) => SupportLevel::Unknown,

        (CniPlugin::Calico, _) => Full,

        (CniPlugin::Cilium, Feature::SctpProtocol) => Partial,
        (CniPlugin::Cilium, _) => Full,

        (CniPlugin::Weave, Feature::IpBlocks | Feature::SctpProtocol) => Partial,
        (CniPlugin::Weave, Feature::PortRanges) => SupportLevel::None,
        (CniPlugin::Weave, _) => Full,

        (CniPlugin::Flannel, _) => SupportLevel::None,

        (CniPlugin::VpcCni, Feature::SctpProtocol) => SupportLevel::None,
        (CniPlugin::VpcCni, _) => Partial,

        (CniPlugin::AzureCni, Feature::SctpProtocol) => SupportLevel::None,
        (CniPlugin::AzureCni, Feature::PortRanges) => Partial,
        (CniPlugin::AzureCni, _) => Full,

        (CniPlugin::GcpCni, Feature::SctpProtocol) => Partial,
        (CniPlugin::GcpCni, _) => Full,

        (CniPlugin::KubeRouter, Feature::SctpProtocol) => SupportLevel::None,
        (CniPlugin::KubeRouter, Feature::PortRanges) => Partial,
        (CniPlugin::KubeRouter, _) => Full,
    }
}

/// Human-readable caveat for a partial or missing feature, if one is known.
#[must_use]
pub fn details(cni: CniPlugin, feature: Feature) -> Option<&'static str> {
    let text = match (cni, feature) {
        (CniPlugin::Unknown, _) => "CNI plugin could not be detected; support cannot be verified",
        (CniPlugin::Flannel, _) => {
            "Flannel does not enforce NetworkPolicy; pair it with Calico (Canal) for policy support"
        }
        (CniPlugin::VpcCni, Feature::IngressRules | Feature::DenyAll) => {
            "VPC CNI enforces ingress only when the network policy agent or security groups for pods are configured"
        }
        (CniPlugin::VpcCni, Feature::EgressRules) => {
            "VPC CNI egress enforcement requires the network policy agent (VPC CNI >= 1.14)"
        }
        (CniPlugin::VpcCni, Feature::SctpProtocol) => "VPC CNI does not support SCTP",
        (CniPlugin::VpcCni, _) => {
            "VPC CNI support depends on the network policy agent being enabled"
        }
        (CniPlugin::Cilium, Feature::SctpProtocol) => {
            "Cilium SCTP support is beta and must be enabled with --enable-sctp"
        }
        (CniPlugin::Weave, Feature::IpBlocks) => {
            "Weave Net ignores ipBlock except clauses"
        }
        (CniPlugin::Weave, Feature::PortRanges) => {
            "Weave Net does not implement endPort ranges"
        }
        (CniPlugin::Weave, Feature::SctpProtocol) => {
            "Weave Net forwards SCTP but does not filter it by port"
        }
        (CniPlugin::AzureCni, Feature::PortRanges) => {
            "Azure NPM matches endPort ranges only on Linux nodes"
        }
        (CniPlugin::AzureCni, Feature::SctpProtocol) => "Azure CNI does not support SCTP",
        (CniPlugin::GcpCni, Feature::SctpProtocol) => {
            "GKE supports SCTP only with Dataplane V2"
        }
        (CniPlugin::KubeRouter, Feature::PortRanges) => {
            "kube-router implements endPort from v1.5 onwards"
        }
        (CniPlugin::KubeRouter, Feature::SctpProtocol) => "kube-router does not filter SCTP",
        _ => return None,
    };
    Some(text)
}

/// Whether `recipe` can be expected to pass on `cni`.
///
/// Cluster bootstrap is always supported. Other recipes apply their
/// [`SupportPolicy`](crate::recipes::SupportPolicy) to the support level of
/// their required feature.
#[must_use]
pub fn is_recipe_supported(recipe: RecipeId, cni: CniPlugin) -> bool {
    match recipe.required_feature() {
        None => true,
        Some(feature) => recipe.support_policy().accepts(support(cni, feature)),
    }
}

/// Recipes of the fixed set that are supported on `cni`, in catalog order.
#[must_use]
pub fn supported_recipes(cni: CniPlugin) -> Vec<RecipeId> {
    RecipeId::ALL
        .into_iter()
        .filter(|recipe| is_recipe_supported(*recipe, cni))
        .collect()
}

/// Complement of [`supported_recipes`] within the fixed set.
#[must_use]
pub fn unsupported_recipes(cni: CniPlugin) -> Vec<RecipeId> {
    RecipeId::ALL
        .into_iter()
        .filter(|recipe| !is_recipe_supported(*recipe, cni))
        .collect()
}

/// Percentage of features supported, counting partial support as half.
#[must_use]
pub fn compatibility_score(cni: CniPlugin) -> u8 {
    let points: u32 = Feature::ALL
        .into_iter()
        .map(|feature| match support(cni, feature) {
            SupportLevel::Full => 2,
            SupportLevel::Partial => 1,
            SupportLevel::None | SupportLevel::Unknown => 0,
        })
        .sum();
    let max = 2 * Feature::ALL.len() as u32;
    // Round half up: (points * 100 + max / 2) / max
    ((points * 100 + max / 2) / max) as u8
}

/// One row of the feature table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FeatureSupport {
    pub support: SupportLevel,
    pub details: Option<String>,
}

/// Support level and caveat for every feature on `cni`.
#[must_use]
pub fn feature_table(cni: CniPlugin) -> BTreeMap<Feature, FeatureSupport> {
    Feature::ALL
        .into_iter()
        .map(|feature| {
            (
                feature,
                FeatureSupport {
                    support: support(cni, feature),
                    details: details(cni, feature).map(str::to_string),
                },
            )
        })
        .collect()
}

#[cfg(test)]
#[path = "matrix_tests.rs"]
mod matrix_tests;
