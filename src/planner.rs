// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Conditional execution planning.
//!
//! Combines the detected provider and CNI plugin with the feature matrix to
//! decide which recipes the test runner should execute, and picks
//! provider-tuned timeouts, retries, poll intervals and worker counts.
//!
//! Every function here is pure. Nothing is measured or adapted at runtime;
//! the tuned values are a fixed lookup per provider class.

use crate::constants::{
    CLOUD_POLL_INTERVAL_SECS, CLOUD_RETRY_COUNT, CLOUD_TIMEOUT_SECS, CLOUD_WORKER_COUNT,
    LOCAL_POLL_INTERVAL_SECS, LOCAL_RETRY_COUNT, LOCAL_TIMEOUT_SECS, LOCAL_WORKER_COUNT,
    UNKNOWN_POLL_INTERVAL_SECS, UNKNOWN_RETRY_COUNT, UNKNOWN_TIMEOUT_SECS, UNKNOWN_WORKER_COUNT,
};
use crate::matrix::support;
use crate::recipes::{RecipeId, SupportPolicy};
use crate::types::{CniPlugin, Provider};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Run or skip, with the reason shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RunDecision {
    pub run: bool,
    pub reason: String,
}

impl RunDecision {
    fn run(reason: impl Into<String>) -> Self {
        Self {
            run: true,
            reason: reason.into(),
        }
    }

    fn skip(reason: impl Into<String>) -> Self {
        Self {
            run: false,
            reason: reason.into(),
        }
    }
}

/// Decide whether `recipe` should run on this provider/CNI combination.
///
/// - `00` (cluster bootstrap) always runs.
/// - `08` needs an external LoadBalancer, so only managed clouds run it.
/// - `14` needs a resolved CNI plugin.
/// - Everything else follows the feature matrix.
#[must_use]
pub fn should_run(recipe: RecipeId, provider: Provider, cni: CniPlugin) -> RunDecision {
    if recipe == RecipeId::ClusterBootstrap {
        return RunDecision::run("cluster bootstrap always runs");
    }

    if recipe == RecipeId::R08 && !provider.is_managed_cloud() {
        return RunDecision::skip(format!(
            "requires an external LoadBalancer from a managed cloud provider (detected: {provider})"
        ));
    }

    if recipe == RecipeId::R14 && cni == CniPlugin::Unknown {
        return RunDecision::skip("requires a detected CNI plugin");
    }

    let Some(feature) = recipe.required_feature() else {
        return RunDecision::run("no feature requirement");
    };
    let level = support(cni, feature);

    if recipe.support_policy().accepts(level) {
        RunDecision::run(format!("{cni} has {level} support for {feature}"))
    } else {
        RunDecision::skip(format!(
            "{cni} has {level} support for {feature}, {} needed",
            match recipe.support_policy() {
                SupportPolicy::RequireFull => "full",
                SupportPolicy::AllowPartial => "at least partial",
            }
        ))
    }
}

/// Per-recipe timeout for the provider, in seconds.
#[must_use]
pub fn timeout_for(provider: Provider) -> u64 {
    if provider.is_managed_cloud() {
        CLOUD_TIMEOUT_SECS
    } else if provider.is_local() {
        LOCAL_TIMEOUT_SECS
    } else {
        UNKNOWN_TIMEOUT_SECS
    }
}

/// Retries of flaky cluster commands for the provider.
#[must_use]
pub fn retry_count_for(provider: Provider) -> u32 {
    if provider.is_managed_cloud() {
        CLOUD_RETRY_COUNT
    } else if provider.is_local() {
        LOCAL_RETRY_COUNT
    } else {
        UNKNOWN_RETRY_COUNT
    }
}

/// Poll interval while waiting for resources, in seconds.
#[must_use]
pub fn poll_interval_for(provider: Provider) -> u64 {
    if provider.is_managed_cloud() {
        CLOUD_POLL_INTERVAL_SECS
    } else if provider.is_local() {
        LOCAL_POLL_INTERVAL_SECS
    } else {
        UNKNOWN_POLL_INTERVAL_SECS
    }
}

/// Number of recipes the runner may execute in parallel.
#[must_use]
pub fn worker_count_for(provider: Provider) -> u32 {
    if provider.is_managed_cloud() {
        CLOUD_WORKER_COUNT
    } else if provider.is_local() {
        LOCAL_WORKER_COUNT
    } else {
        UNKNOWN_WORKER_COUNT
    }
}

/// Manual replacements for the tuned values (`TEST_TIMEOUT`, `MAX_WORKERS`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanOverrides {
    pub timeout_seconds: Option<u64>,
    pub worker_count: Option<u32>,
}

/// Run/skip partition of the fixed recipe set plus tuned execution parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExecutionPlan {
    pub provider: Provider,
    pub cni: CniPlugin,
    pub runnable: BTreeSet<RecipeId>,
    pub skipped: BTreeSet<RecipeId>,
    pub decisions: BTreeMap<RecipeId, RunDecision>,
    pub timeout_seconds: u64,
    pub worker_count: u32,
    pub retry_count: u32,
    pub poll_interval_seconds: u64,
}

/// Build the plan for every recipe of the fixed set.
#[must_use]
pub fn generate_plan(provider: Provider, cni: CniPlugin) -> ExecutionPlan {
    generate_plan_with(provider, cni, PlanOverrides::default())
}

/// [`generate_plan`] with manual overrides applied to the tuned values.
#[must_use]
pub fn generate_plan_with(
    provider: Provider,
    cni: CniPlugin,
    overrides: PlanOverrides,
) -> ExecutionPlan {
    let mut runnable = BTreeSet::new();
    let mut skipped = BTreeSet::new();
    let mut decisions = BTreeMap::new();

    for recipe in RecipeId::ALL {
        let decision = should_run(recipe, provider, cni);
        debug!(
            recipe = %recipe,
            run = decision.run,
            reason = %decision.reason,
            "Planned recipe"
        );
        if decision.run {
            runnable.insert(recipe);
        } else {
            skipped.insert(recipe);
        }
        decisions.insert(recipe, decision);
    }

    ExecutionPlan {
        provider,
        cni,
        runnable,
        skipped,
        decisions,
        timeout_seconds: overrides
            .timeout_seconds
            .unwrap_or_else(|| timeout_for(provider)),
        worker_count: overrides
            .worker_count
            .unwrap_or_else(|| worker_count_for(provider)),
        retry_count: retry_count_for(provider),
        poll_interval_seconds: poll_interval_for(provider),
    }
}

#[cfg(test)]
#[path = "planner_tests.rs"]
mod planner_tests;
