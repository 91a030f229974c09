// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Standalone HTML report.

use super::{Summary, TestResult, TestStatus};
use serde_json::json;
use std::fmt::Write;

const STYLE: &str = r#"
    body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; margin: 2rem; color: #24292f; }
    h1 { margin-bottom: 0.25rem; }
    .generated { color: #57606a; margin-top: 0; }
    .cards { display: flex; gap: 1rem; margin: 1.5rem 0; }
    .card { border: 1px solid #d0d7de; border-radius: 6px; padding: 1rem 1.5rem; min-width: 8rem; }
    .card .value { font-size: 2rem; font-weight: 600; }
    .chart { max-width: 320px; }
    table { border-collapse: collapse; width: 100%; margin-top: 1.5rem; }
    th, td { border: 1px solid #d0d7de; padding: 0.5rem; text-align: left; vertical-align: top; }
    th { background: #f6f8fa; }
    .PASS { color: #1a7f37; font-weight: 600; }
    .FAIL { color: #cf222e; font-weight: 600; }
    .TIMEOUT { color: #9a6700; font-weight: 600; }
    pre { margin: 0; white-space: pre-wrap; font-size: 0.85rem; }
"#;

const CHART_SCRIPT: &str = r#"
    new Chart(document.getElementById('results-chart'), {
      type: 'doughnut',
      data: {
        labels: chartData.labels,
        datasets: [{ data: chartData.values, backgroundColor: ['#2da44e', '#cf222e', '#bf8700'] }]
      }
    });
"#;

/// Escape text for inclusion in HTML element content or attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Chart data inlined into the page as `const chartData`.
fn chart_data(summary: &Summary) -> Result<String, serde_json::Error> {
    let data = json!({
        "labels": ["Passed", "Failed", "Timed out"],
        "values": [summary.passed, summary.failed, summary.timed_out],
        "passRate": summary.pass_rate,
    });
    // "</" inside a script element would end it early
    Ok(serde_json::to_string(&data)?.replace("</", "<\\/"))
}

/// Render the HTML report page.
///
/// # Errors
///
/// Returns an error if the chart data cannot be serialized.
pub fn render_html(summary: &Summary, results: &[TestResult]) -> Result<String, serde_json::Error> {
    let mut rows = String::new();
    for result in results {
        let detail = result
            .error_message
            .as_deref()
            .map(escape_html)
            .unwrap_or_default();
        let output = result
            .raw_output
            .as_deref()
            .map(|raw| format!("<details><summary>output</summary><pre>{}</pre></details>", escape_html(raw)))
            .unwrap_or_default();
        let _ = writeln!(
            rows,
            "      <tr><td>{}</td><td class=\"{status}\">{status}</td><td>{:.1}</td><td>{}{}</td></tr>",
            escape_html(&result.recipe_id),
            result.duration_seconds,
            detail,
            output,
            status = result.status,
        );
    }

    let banner = if summary.total > 0 && summary.passed == summary.total {
        TestStatus::Pass
    } else {
        TestStatus::Fail
    };

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>NetworkPolicy Recipe Test Report</title>
  <style>{STYLE}</style>
  <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
</head>
<body>
  <h1>NetworkPolicy Recipe Test Report</h1>
  <p class="generated">Generated {generated}</p>
  <div class="cards">
    <div class="card"><div>Total</div><div class="value">{total}</div></div>
    <div class="card"><div>Passed</div><div class="value PASS">{passed}</div></div>
    <div class="card"><div>Failed</div><div class="value FAIL">{failed}</div></div>
    <div class="card"><div>Timed out</div><div class="value TIMEOUT">{timed_out}</div></div>
    <div class="card"><div>Pass rate</div><div class="value {banner}">{pass_rate:.1}%</div></div>
    <div class="card"><div>Duration</div><div class="value">{duration:.1}s</div></div>
  </div>
  <div class="chart"><canvas id="results-chart"></canvas></div>
  <table>
    <thead>
      <tr><th>Recipe</th><th>Status</th><th>Duration (s)</th><th>Details</th></tr>
    </thead>
    <tbody>
{rows}    </tbody>
  </table>
  <script>
    const chartData = {chart};
{CHART_SCRIPT}  </script>
</body>
</html>
"#,
        generated = escape_html(&summary.generated_at.to_rfc3339()),
        total = summary.total,
        passed = summary.passed,
        failed = summary.failed,
        timed_out = summary.timed_out,
        pass_rate = summary.pass_rate,
        duration = summary.total_duration_seconds,
        chart = chart_data(summary)?,
    ))
}

#[cfg(test)]
#[path = "html_tests.rs"]
mod html_tests;
