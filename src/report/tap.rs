// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! BATS TAP output parsing.
//!
//! Recognized lines:
//!
//! - `ok <n> <id> <description> [in <ms>ms]` - passing test
//! - `not ok <n> <id> <description> [in <ms>ms]` - failing test
//! - `# ...` (optionally indented) - diagnostics for the preceding test
//! - `1..<n>` plan lines and anything else are ignored
//!
//! A `# timeout` marker in the description or the diagnostics turns a failure
//! into [`TestStatus::Timeout`]. Tests with a `# skip` directive are dropped.

use super::{TestResult, TestStatus};
use crate::errors::ReportError;
use tracing::debug;

const TIMEOUT_MARKER: &str = "# timeout";
const SKIP_MARKER: &str = "# skip";

struct PendingResult {
    result: TestResult,
    diagnostics: Vec<String>,
}

impl PendingResult {
    fn finish(mut self) -> TestResult {
        let timed_out = self
            .diagnostics
            .iter()
            .any(|line| line.to_ascii_lowercase().starts_with("timeout"));
        if timed_out && self.result.status == TestStatus::Fail {
            self.result.status = TestStatus::Timeout;
        }

        if !self.diagnostics.is_empty() {
            if self.result.status != TestStatus::Pass && self.result.error_message.is_none() {
                self.result.error_message = self.diagnostics.first().cloned();
            }
            self.result.raw_output = Some(self.diagnostics.join("\n"));
        }
        self.result
    }
}

/// Split a trailing `in <n>ms` timing suffix off a description.
fn split_timing(description: &str) -> (&str, Option<f64>) {
    if let Some((head, tail)) = description.rsplit_once(" in ") {
        if let Some(millis) = tail.trim().strip_suffix("ms") {
            if let Ok(ms) = millis.parse::<u64>() {
                return (head.trim_end(), Some(ms as f64 / 1000.0));
            }
        }
    }
    (description, None)
}

fn parse_test_line(
    line_number: usize,
    passed: bool,
    rest: &str,
) -> Result<Option<TestResult>, ReportError> {
    let malformed = |reason: &str| ReportError::Tap {
        line: line_number,
        reason: reason.to_string(),
    };

    let rest = rest.trim();
    let (number, description) = rest
        .split_once(char::is_whitespace)
        .unwrap_or((rest, ""));
    number
        .parse::<u64>()
        .map_err(|_| malformed("missing test number"))?;

    let description = description.trim();
    let lower = description.to_ascii_lowercase();
    if lower.contains(SKIP_MARKER) {
        debug!(line = line_number, "Skipping TAP test with skip directive");
        return Ok(None);
    }

    let (description, duration) = split_timing(description);
    let timed_out = lower.contains(TIMEOUT_MARKER);
    let description = match description.find('#') {
        Some(idx) => description[..idx].trim_end(),
        None => description,
    };

    let recipe_id = description
        .split_whitespace()
        .next()
        .map(|token| token.trim_end_matches(':').to_string())
        .ok_or_else(|| malformed("missing test description"))?;

    let status = match (passed, timed_out) {
        (true, _) => TestStatus::Pass,
        (false, true) => TestStatus::Timeout,
        (false, false) => TestStatus::Fail,
    };

    Ok(Some(TestResult {
        recipe_id,
        status,
        duration_seconds: duration.unwrap_or(0.0),
        error_message: None,
        raw_output: None,
    }))
}

/// Parse BATS TAP output into results, in input order.
///
/// # Errors
///
/// Returns [`ReportError::Tap`] for a test line without a number or
/// description.
pub fn parse_tap(input: &str) -> Result<Vec<TestResult>, ReportError> {
    let mut results = Vec::new();
    let mut pending: Option<PendingResult> = None;

    for (index, raw_line) in input.lines().enumerate() {
        let line_number = index + 1;
        let line = raw_line.trim_start();

        let test_line = if let Some(rest) = line.strip_prefix("not ok") {
            Some((false, rest))
        } else {
            line.strip_prefix("ok").map(|rest| (true, rest))
        };

        if let Some((passed, rest)) = test_line {
            // "okay", "oklahoma" etc. are not test lines
            if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
                continue;
            }
            if let Some(done) = pending.take() {
                results.push(done.finish());
            }
            pending = parse_test_line(line_number, passed, rest)?.map(|result| PendingResult {
                result,
                diagnostics: Vec::new(),
            });
        } else if let Some(comment) = line.strip_prefix('#') {
            if let Some(current) = pending.as_mut() {
                let text = comment.trim();
                if !text.is_empty() {
                    current.diagnostics.push(text.to_string());
                }
            }
        }
    }

    if let Some(done) = pending.take() {
        results.push(done.finish());
    }
    Ok(results)
}

#[cfg(test)]
#[path = "tap_tests.rs"]
mod tap_tests;
