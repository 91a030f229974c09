// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Test result aggregation and report rendering.
//!
//! Results come either from a JSON array of [`TestResult`] or from BATS TAP
//! output ([`tap::parse_tap`]). [`write_reports`] renders every output format
//! into one directory:
//!
//! | file           | content                                   |
//! |----------------|-------------------------------------------|
//! | `summary.json` | [`Summary`] plus the individual results   |
//! | `report.html`  | standalone HTML page with inlined chart data |
//! | `report.md`    | Markdown summary for PR comments          |
//! | `badge.json`   | shields.io endpoint badge                 |
//! | `metrics.prom` | Prometheus text exposition format         |

pub mod badge;
pub mod html;
pub mod markdown;
pub mod metrics;
pub mod tap;

use crate::constants::{
    BADGE_FILE, HTML_REPORT_FILE, MARKDOWN_REPORT_FILE, METRICS_FILE, SUMMARY_FILE,
};
use crate::errors::ReportError;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Outcome of one recipe test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    Pass,
    Fail,
    Timeout,
}

impl TestStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TestStatus::Pass => "PASS",
            TestStatus::Fail => "FAIL",
            TestStatus::Timeout => "TIMEOUT",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of running one recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TestResult {
    /// Recipe identifier (e.g. `"02a"`) or the test name when it has none
    pub recipe_id: String,
    pub status: TestStatus,
    #[serde(default)]
    pub duration_seconds: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
}

/// Aggregate counts over a result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub timed_out: usize,
    /// Percentage of passing tests, one decimal place
    pub pass_rate: f64,
    pub total_duration_seconds: f64,
    #[schemars(with = "String")]
    pub generated_at: DateTime<Utc>,
}

/// Contents of `summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SummaryDocument {
    pub summary: Summary,
    pub results: Vec<TestResult>,
}

/// Count results by status. An empty set has a pass rate of 0.
#[must_use]
pub fn summarize(results: &[TestResult], generated_at: DateTime<Utc>) -> Summary {
    let count = |status: TestStatus| results.iter().filter(|r| r.status == status).count();
    let total = results.len();
    let passed = count(TestStatus::Pass);

    let pass_rate = if total == 0 {
        0.0
    } else {
        round_one_decimal(passed as f64 * 100.0 / total as f64)
    };

    Summary {
        total,
        passed,
        failed: count(TestStatus::Fail),
        timed_out: count(TestStatus::Timeout),
        pass_rate,
        total_duration_seconds: round_one_decimal(
            results.iter().map(|r| r.duration_seconds).sum(),
        ),
        generated_at,
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Read results from `path`, as TAP when `tap` is set and JSON otherwise.
///
/// # Errors
///
/// Returns [`ReportError`] when the file cannot be read or parsed.
pub async fn load_results(path: &Path, tap: bool) -> Result<Vec<TestResult>, ReportError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let results = if tap {
        tap::parse_tap(&content)?
    } else {
        serde_json::from_str(&content)?
    };
    debug!(path = %path.display(), count = results.len(), tap, "Loaded test results");
    Ok(results)
}

async fn write_file(dir: &Path, name: &str, content: &str) -> Result<PathBuf, ReportError> {
    let path = dir.join(name);
    tokio::fs::write(&path, content)
        .await
        .map_err(|source| ReportError::Io {
            path: path.clone(),
            source,
        })?;
    debug!(path = %path.display(), bytes = content.len(), "Wrote report file");
    Ok(path)
}

/// Render every report format into `dir`, creating it if needed.
///
/// # Errors
///
/// Returns [`ReportError`] when rendering or any write fails.
pub async fn write_reports(
    dir: &Path,
    results: &[TestResult],
    generated_at: DateTime<Utc>,
) -> Result<Summary, ReportError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| ReportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

    let summary = summarize(results, generated_at);
    let document = SummaryDocument {
        summary: summary.clone(),
        results: results.to_vec(),
    };

    let metrics = metrics::ReportMetrics::new()?;
    metrics.record(results, &summary);

    write_file(dir, SUMMARY_FILE, &serde_json::to_string_pretty(&document)?).await?;
    write_file(dir, HTML_REPORT_FILE, &html::render_html(&summary, results)?).await?;
    write_file(
        dir,
        MARKDOWN_REPORT_FILE,
        &markdown::render_markdown(&summary, results),
    )
    .await?;
    write_file(
        dir,
        BADGE_FILE,
        &serde_json::to_string_pretty(&badge::badge(&summary))?,
    )
    .await?;
    write_file(dir, METRICS_FILE, &metrics.render()?).await?;

    info!(
        dir = %dir.display(),
        total = summary.total,
        passed = summary.passed,
        failed = summary.failed,
        timed_out = summary.timed_out,
        pass_rate = summary.pass_rate,
        "Wrote test reports"
    );
    Ok(summary)
}
