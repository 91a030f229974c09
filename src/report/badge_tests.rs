// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `badge.rs`

#[cfg(test)]
mod tests {
    use super::super::{badge, badge_color};
    use crate::report::{summarize, TestResult, TestStatus};
    use chrono::Utc;
    use serde_json::json;

    fn results(passed: usize, failed: usize) -> Vec<TestResult> {
        let make = |i: usize, status| TestResult {
            recipe_id: format!("{i:02}"),
            status,
            duration_seconds: 1.0,
            error_message: None,
            raw_output: None,
        };
        (0..passed)
            .map(|i| make(i, TestStatus::Pass))
            .chain((passed..passed + failed).map(|i| make(i, TestStatus::Fail)))
            .collect()
    }

    #[test]
    fn test_color_thresholds() {
        assert_eq!(badge_color(100.0), "brightgreen");
        assert_eq!(badge_color(93.3), "green");
        assert_eq!(badge_color(90.0), "green");
        assert_eq!(badge_color(80.0), "yellow");
        assert_eq!(badge_color(75.0), "yellow");
        assert_eq!(badge_color(60.0), "orange");
        assert_eq!(badge_color(49.9), "red");
        assert_eq!(badge_color(0.0), "red");
    }

    #[test]
    fn test_badge_document() {
        let summary = summarize(&results(14, 1), Utc::now());
        assert_eq!(
            serde_json::to_value(badge(&summary)).unwrap(),
            json!({
                "schemaVersion": 1,
                "label": "network policies",
                "message": "14/15 passing",
                "color": "green"
            })
        );
    }

    #[test]
    fn test_no_results_badge() {
        let summary = summarize(&[], Utc::now());
        let badge = badge(&summary);
        assert_eq!(badge.message, "no tests");
        assert_eq!(badge.color, "lightgrey");
    }
}
