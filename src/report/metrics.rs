// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for a test run.
//!
//! The metrics are written to `metrics.prom` in text exposition format so a
//! CI job can hand them to a Pushgateway or a node-exporter textfile
//! collector. All names carry the `netpol_` prefix.
//!
//! # Metrics
//!
//! - `netpol_recipe_passed{recipe}` - 1 when the recipe passed, 0 otherwise
//! - `netpol_recipe_duration_seconds{recipe}` - wall time of the recipe test
//! - `netpol_results_total{status}` - results by status
//! - `netpol_pass_rate_percent` - pass rate of the run
//!
//! # Example
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use netpol_compat::report::{metrics::ReportMetrics, summarize};
//!
//! # fn example() -> Result<(), prometheus::Error> {
//! let results = Vec::new();
//! let metrics = ReportMetrics::new()?;
//! metrics.record(&results, &summarize(&results, Utc::now()));
//! println!("{}", metrics.render()?);
//! # Ok(())
//! # }
//! ```

use super::{Summary, TestResult, TestStatus};
use crate::constants::METRICS_NAMESPACE;
use prometheus::{Encoder, Gauge, GaugeVec, IntCounterVec, Opts, Registry, TextEncoder};

/// Metrics of one test run in a dedicated registry.
pub struct ReportMetrics {
    registry: Registry,
    recipe_passed: GaugeVec,
    recipe_duration_seconds: GaugeVec,
    results_total: IntCounterVec,
    pass_rate_percent: Gauge,
}

impl ReportMetrics {
    /// Create and register all report metrics.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric definition is invalid or registered twice.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let recipe_passed = GaugeVec::new(
            Opts::new(
                format!("{METRICS_NAMESPACE}_recipe_passed"),
                "Whether the recipe test passed (1) or not (0)",
            ),
            &["recipe"],
        )?;
        registry.register(Box::new(recipe_passed.clone()))?;

        let recipe_duration_seconds = GaugeVec::new(
            Opts::new(
                format!("{METRICS_NAMESPACE}_recipe_duration_seconds"),
                "Duration of the recipe test in seconds",
            ),
            &["recipe"],
        )?;
        registry.register(Box::new(recipe_duration_seconds.clone()))?;

        let results_total = IntCounterVec::new(
            Opts::new(
                format!("{METRICS_NAMESPACE}_results_total"),
                "Total number of recipe test results by status",
            ),
            &["status"],
        )?;
        registry.register(Box::new(results_total.clone()))?;

        let pass_rate_percent = Gauge::with_opts(Opts::new(
            format!("{METRICS_NAMESPACE}_pass_rate_percent"),
            "Percentage of recipe tests that passed",
        ))?;
        registry.register(Box::new(pass_rate_percent.clone()))?;

        Ok(Self {
            registry,
            recipe_passed,
            recipe_duration_seconds,
            results_total,
            pass_rate_percent,
        })
    }

    /// Record a result set and its summary.
    pub fn record(&self, results: &[TestResult], summary: &Summary) {
        // Pre-create every status series so absent statuses export as 0
        for status in [TestStatus::Pass, TestStatus::Fail, TestStatus::Timeout] {
            self.results_total.with_label_values(&[status.as_str()]);
        }

        for result in results {
            let passed = if result.status == TestStatus::Pass { 1.0 } else { 0.0 };
            self.recipe_passed
                .with_label_values(&[result.recipe_id.as_str()])
                .set(passed);
            self.recipe_duration_seconds
                .with_label_values(&[result.recipe_id.as_str()])
                .set(result.duration_seconds);
            self.results_total
                .with_label_values(&[result.status.as_str()])
                .inc();
        }

        self.pass_rate_percent.set(summary.pass_rate);
    }

    /// Encode all metrics in Prometheus text format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
    }
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod metrics_tests;
