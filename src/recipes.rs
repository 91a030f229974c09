// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The fixed catalog of NetworkPolicy recipes.
//!
//! Each recipe exercises one [`Feature`] and carries a [`SupportPolicy`]
//! deciding which [`SupportLevel`]s are good enough to run it. Recipe `00`
//! bootstraps the test cluster; it is accepted everywhere a recipe ID is but
//! is not part of [`RecipeId::ALL`].

use crate::errors::LookupError;
use crate::types::{Feature, SupportLevel};
use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Identifier of a recipe (`"00"`..`"14"`, plus `"02a"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecipeId {
    ClusterBootstrap,
    R01,
    R02,
    R02a,
    R03,
    R04,
    R05,
    R06,
    R07,
    R08,
    R09,
    R10,
    R11,
    R12,
    R13,
    R14,
}

/// Which support levels are acceptable for a recipe to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SupportPolicy {
    /// Only `full` support.
    RequireFull,
    /// Anything but `none`. `unknown` is still rejected since nothing can be verified.
    AllowPartial,
}

impl SupportPolicy {
    #[must_use]
    pub fn accepts(self, level: SupportLevel) -> bool {
        match self {
            SupportPolicy::RequireFull => level == SupportLevel::Full,
            SupportPolicy::AllowPartial => {
                matches!(level, SupportLevel::Full | SupportLevel::Partial)
            }
        }
    }
}

impl RecipeId {
    /// The fixed set of fifteen recipes, in catalog order.
    pub const ALL: [RecipeId; 15] = [
        RecipeId::R01,
        RecipeId::R02,
        RecipeId::R02a,
        RecipeId::R03,
        RecipeId::R04,
        RecipeId::R05,
        RecipeId::R06,
        RecipeId::R07,
        RecipeId::R08,
        RecipeId::R09,
        RecipeId::R10,
        RecipeId::R11,
        RecipeId::R12,
        RecipeId::R13,
        RecipeId::R14,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RecipeId::ClusterBootstrap => "00",
            RecipeId::R01 => "01",
            RecipeId::R02 => "02",
            RecipeId::R02a => "02a",
            RecipeId::R03 => "03",
            RecipeId::R04 => "04",
            RecipeId::R05 => "05",
            RecipeId::R06 => "06",
            RecipeId::R07 => "07",
            RecipeId::R08 => "08",
            RecipeId::R09 => "09",
            RecipeId::R10 => "10",
            RecipeId::R11 => "11",
            RecipeId::R12 => "12",
            RecipeId::R13 => "13",
            RecipeId::R14 => "14",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            RecipeId::ClusterBootstrap => "Create a test cluster",
            RecipeId::R01 => "Deny all traffic to an application",
            RecipeId::R02 => "Limit traffic to an application",
            RecipeId::R02a => "Allow all traffic to an application",
            RecipeId::R03 => "Deny all non-whitelisted traffic in the namespace",
            RecipeId::R04 => "Deny traffic from other namespaces",
            RecipeId::R05 => "Allow traffic from all namespaces",
            RecipeId::R06 => "Allow traffic from a namespace",
            RecipeId::R07 => "Allow traffic from some pods in another namespace",
            RecipeId::R08 => "Allow external traffic",
            RecipeId::R09 => "Allow traffic only to a port",
            RecipeId::R10 => "Allow traffic with multiple selectors",
            RecipeId::R11 => "Deny egress traffic from an application",
            RecipeId::R12 => "Deny all non-whitelisted egress traffic from a namespace",
            RecipeId::R13 => "Allow egress traffic to IP blocks",
            RecipeId::R14 => "Allow traffic over SCTP",
        }
    }

    /// The feature a recipe depends on. `None` for cluster bootstrap.
    #[must_use]
    pub fn required_feature(self) -> Option<Feature> {
        match self {
            RecipeId::ClusterBootstrap => None,
            RecipeId::R01 | RecipeId::R02 | RecipeId::R02a => Some(Feature::DenyAll),
            RecipeId::R03 => Some(Feature::IngressRules),
            RecipeId::R04 | RecipeId::R05 | RecipeId::R06 => Some(Feature::NamespaceSelectors),
            RecipeId::R07 | RecipeId::R10 => Some(Feature::PodSelectors),
            RecipeId::R08 | RecipeId::R13 => Some(Feature::IpBlocks),
            RecipeId::R09 => Some(Feature::NamedPorts),
            RecipeId::R11 | RecipeId::R12 => Some(Feature::EgressRules),
            RecipeId::R14 => Some(Feature::SctpProtocol),
        }
    }

    /// Isolation-class recipes need full enforcement; a partially enforced
    /// deny would pass traffic and fail the test for the wrong reason.
    #[must_use]
    pub fn support_policy(self) -> SupportPolicy {
        match self {
            RecipeId::ClusterBootstrap
            | RecipeId::R01
            | RecipeId::R02
            | RecipeId::R02a
            | RecipeId::R03
            | RecipeId::R08 => SupportPolicy::RequireFull,
            RecipeId::R04
            | RecipeId::R05
            | RecipeId::R06
            | RecipeId::R07
            | RecipeId::R09
            | RecipeId::R10
            | RecipeId::R11
            | RecipeId::R12
            | RecipeId::R13
            | RecipeId::R14 => SupportPolicy::AllowPartial,
        }
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecipeId {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == RecipeId::ClusterBootstrap.as_str() {
            return Ok(RecipeId::ClusterBootstrap);
        }
        RecipeId::ALL
            .into_iter()
            .find(|recipe| recipe.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| LookupError::UnknownRecipe { id: s.to_string() })
    }
}

impl Serialize for RecipeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RecipeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl JsonSchema for RecipeId {
    fn schema_name() -> Cow<'static, str> {
        "RecipeId".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        let ids: Vec<&str> = std::iter::once(RecipeId::ClusterBootstrap)
            .chain(RecipeId::ALL)
            .map(RecipeId::as_str)
            .collect();
        schemars::json_schema!({
            "type": "string",
            "enum": ids,
        })
    }
}

#[cfg(test)]
#[path = "recipes_tests.rs"]
mod recipes_tests;
