// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `metrics.rs`

#[cfg(test)]
mod tests {
    use super::super::ReportMetrics;
    use crate::report::{summarize, TestResult, TestStatus};
    use chrono::Utc;

    fn result(recipe_id: &str, status: TestStatus, duration_seconds: f64) -> TestResult {
        TestResult {
            recipe_id: recipe_id.to_string(),
            status,
            duration_seconds,
            error_message: None,
            raw_output: None,
        }
    }

    #[test]
    fn test_render_records_every_result() {
        let results = vec![
            result("01", TestStatus::Pass, 12.5),
            result("02a", TestStatus::Pass, 9.0),
            result("08", TestStatus::Fail, 42.0),
        ];
        let metrics = ReportMetrics::new().unwrap();
        metrics.record(&results, &summarize(&results, Utc::now()));
        let text = metrics.render().unwrap();

        assert!(text.contains("# TYPE netpol_recipe_passed gauge"));
        assert!(text.contains("netpol_recipe_passed{recipe=\"01\"} 1"));
        assert!(text.contains("netpol_recipe_passed{recipe=\"08\"} 0"));
        assert!(text.contains("netpol_recipe_duration_seconds{recipe=\"02a\"} 9"));
        assert!(text.contains("netpol_results_total{status=\"PASS\"} 2"));
        assert!(text.contains("netpol_results_total{status=\"FAIL\"} 1"));
        assert!(text.contains("netpol_results_total{status=\"TIMEOUT\"} 0"));
        assert!(text.contains("netpol_pass_rate_percent 66.7"));
    }

    #[test]
    fn test_registries_are_independent() {
        let first = ReportMetrics::new().unwrap();
        let second = ReportMetrics::new().unwrap();
        let results = vec![result("03", TestStatus::Timeout, 300.0)];
        first.record(&results, &summarize(&results, Utc::now()));

        assert!(first.render().unwrap().contains("recipe=\"03\""));
        assert!(!second.render().unwrap().contains("recipe=\"03\""));
    }
}
