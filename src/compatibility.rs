// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The compatibility report: what a provider/CNI pair can run and how the
//! test runner should be tuned for it.

use crate::matrix::{
    compatibility_score, feature_table, supported_recipes, unsupported_recipes, FeatureSupport,
};
use crate::planner::{generate_plan_with, PlanOverrides};
use crate::recipes::RecipeId;
use crate::types::{CniPlugin, Feature, Provider};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReportEnvironment {
    pub provider: Provider,
    pub cni: CniPlugin,
    /// Percentage with a trailing `%`, e.g. `"94%"`
    pub compatibility_score: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Recommendations {
    pub timeout_seconds: u64,
    pub parallel_workers: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RecipeSupport {
    pub supported: Vec<RecipeId>,
    pub unsupported: Vec<RecipeId>,
}

/// Compatibility document for one provider/CNI pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CompatibilityReport {
    pub environment: ReportEnvironment,
    pub recommendations: Recommendations,
    pub features: BTreeMap<Feature, FeatureSupport>,
    pub recipes: RecipeSupport,
    /// RFC 3339 timestamp
    #[schemars(with = "String")]
    pub generated_at: DateTime<Utc>,
}

impl CompatibilityReport {
    /// Build the report, applying `overrides` to the recommendations.
    #[must_use]
    pub fn build(
        provider: Provider,
        cni: CniPlugin,
        overrides: PlanOverrides,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let plan = generate_plan_with(provider, cni, overrides);
        Self {
            environment: ReportEnvironment {
                provider,
                cni,
                compatibility_score: format!("{}%", compatibility_score(cni)),
            },
            recommendations: Recommendations {
                timeout_seconds: plan.timeout_seconds,
                parallel_workers: plan.worker_count,
            },
            features: feature_table(cni),
            recipes: RecipeSupport {
                supported: supported_recipes(cni),
                unsupported: unsupported_recipes(cni),
            },
            generated_at,
        }
    }
}

#[cfg(test)]
#[path = "compatibility_tests.rs"]
mod compatibility_tests;
