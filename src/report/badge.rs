// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! shields.io endpoint badge.
//!
//! See <https://shields.io/badges/endpoint-badge> for the schema.

use super::Summary;
use crate::constants::BADGE_LABEL;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// shields.io endpoint badge document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub schema_version: u8,
    pub label: String,
    pub message: String,
    pub color: String,
}

/// Badge color for a pass rate in percent.
#[must_use]
pub fn badge_color(pass_rate: f64) -> &'static str {
    if pass_rate >= 100.0 {
        "brightgreen"
    } else if pass_rate >= 90.0 {
        "green"
    } else if pass_rate >= 75.0 {
        "yellow"
    } else if pass_rate >= 50.0 {
        "orange"
    } else {
        "red"
    }
}

/// Badge for a summary. An empty result set gets a grey "no tests" badge.
#[must_use]
pub fn badge(summary: &Summary) -> Badge {
    let (message, color) = if summary.total == 0 {
        ("no tests".to_string(), "lightgrey")
    } else {
        (
            format!("{}/{} passing", summary.passed, summary.total),
            badge_color(summary.pass_rate),
        )
    };

    Badge {
        schema_version: 1,
        label: BADGE_LABEL.to_string(),
        message,
        color: color.to_string(),
    }
}

#[cfg(test)]
#[path = "badge_tests.rs"]
mod badge_tests;
