// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#![allow(unexpected_cfgs)]

//! # netpol-compat - NetworkPolicy recipe compatibility tooling
//!
//! netpol-compat fingerprints the Kubernetes provider and CNI plugin of a
//! cluster, maps the CNI onto a static NetworkPolicy feature matrix, plans
//! which of the fifteen policy recipes can run there, and aggregates the
//! recipe test results into reports.
//!
//! ## Modules
//!
//! - [`cluster`] - the read-only [`ClusterProbe`](cluster::ClusterProbe) seam, live and snapshot backed
//! - [`detection`] - provider and CNI heuristic cascades and the memoizing [`Detector`](detection::Detector)
//! - [`matrix`] - static `(CniPlugin, Feature)` support table
//! - [`planner`] - run/skip decisions and tuned execution parameters
//! - [`compatibility`] - the compatibility report document
//! - [`report`] - result aggregation into JSON, HTML, Markdown, badge and Prometheus files
//!
//! ## Example
//!
//! ```rust,no_run
//! use netpol_compat::planner::generate_plan;
//! use netpol_compat::types::{CniPlugin, Provider};
//!
//! let plan = generate_plan(Provider::Eks, CniPlugin::VpcCni);
//! for recipe in &plan.skipped {
//!     println!("skip {recipe}: {}", plan.decisions[recipe].reason);
//! }
//! ```

pub mod cluster;
pub mod compatibility;
pub mod config;
pub mod constants;
pub mod detection;
pub mod errors;
pub mod labels;
pub mod matrix;
pub mod planner;
pub mod recipes;
pub mod report;
pub mod retry;
pub mod types;
