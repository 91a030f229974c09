// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Markdown report for pull request comments and job summaries.

use super::{Summary, TestResult, TestStatus};
use std::fmt::Write;

fn status_icon(status: TestStatus) -> &'static str {
    match status {
        TestStatus::Pass => "✅",
        TestStatus::Fail => "❌",
        TestStatus::Timeout => "⏱️",
    }
}

/// Make text safe for a single Markdown table cell.
fn table_cell(text: &str) -> String {
    text.replace('|', "\\|")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("<br>")
}

/// Render the summary and per-recipe tables.
#[must_use]
pub fn render_markdown(summary: &Summary, results: &[TestResult]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# NetworkPolicy Recipe Test Report");
    let _ = writeln!(out);
    let _ = writeln!(out, "_Generated {}_", summary.generated_at.to_rfc3339());
    let _ = writeln!(out);
    let _ = writeln!(out, "| Metric | Value |");
    let _ = writeln!(out, "|--------|-------|");
    let _ = writeln!(out, "| Total | {} |", summary.total);
    let _ = writeln!(out, "| Passed | {} |", summary.passed);
    let _ = writeln!(out, "| Failed | {} |", summary.failed);
    let _ = writeln!(out, "| Timed out | {} |", summary.timed_out);
    let _ = writeln!(out, "| Pass rate | {:.1}% |", summary.pass_rate);
    let _ = writeln!(out, "| Duration | {:.1}s |", summary.total_duration_seconds);

    if results.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "No test results.");
        return out;
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "| Recipe | Status | Duration (s) | Error |");
    let _ = writeln!(out, "|--------|--------|--------------|-------|");
    for result in results {
        let _ = writeln!(
            out,
            "| {} | {} {} | {:.1} | {} |",
            table_cell(&result.recipe_id),
            status_icon(result.status),
            result.status,
            result.duration_seconds,
            result
                .error_message
                .as_deref()
                .map(table_cell)
                .unwrap_or_default(),
        );
    }
    out
}

#[cfg(test)]
#[path = "markdown_tests.rs"]
mod markdown_tests;
