// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Pagination helpers for Kubernetes API list operations.
//!
//! Lists are fetched in pages to bound memory use and API server load on
//! large clusters. Each page request is retried on transient errors.

use crate::constants::KUBE_LIST_PAGE_SIZE;
use crate::retry::retry_api_call;
use kube::{api::ListParams, Api, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::debug;

/// List all resources with automatic pagination.
///
/// # Arguments
///
/// * `api` - Kubernetes API client for the resource type
/// * `list_params` - Base list parameters (labels, fields, etc.)
/// * `operation_name` - Human-readable name for logging
/// * `max_retries` - Retries per page on transient errors
///
/// # Example
///
/// ```no_run
/// use k8s_openapi::api::apps::v1::DaemonSet;
/// use kube::{Api, Client, api::ListParams};
/// use netpol_compat::cluster::pagination::list_all_paginated;
///
/// # async fn example() -> Result<(), kube::Error> {
/// let client = Client::try_default().await?;
/// let api: Api<DaemonSet> = Api::namespaced(client, "kube-system");
///
/// let daemonsets = list_all_paginated(&api, ListParams::default(), "list daemonsets", 2).await?;
/// println!("Found {} daemonsets", daemonsets.len());
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns the client error of the first page request that fails after retries.
pub async fn list_all_paginated<K>(
    api: &Api<K>,
    mut list_params: ListParams,
    operation_name: &str,
    max_retries: u32,
) -> Result<Vec<K>, kube::Error>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug,
{
    list_params.limit = Some(KUBE_LIST_PAGE_SIZE);

    let mut all_items = Vec::new();
    let mut page_count = 0;

    loop {
        page_count += 1;
        let result = retry_api_call(|| api.list(&list_params), operation_name, max_retries).await?;

        let item_count = result.items.len();
        all_items.extend(result.items);

        debug!(
            operation = operation_name,
            page = page_count,
            items_in_page = item_count,
            total_items = all_items.len(),
            "Fetched page from Kubernetes API"
        );

        match result.metadata.continue_ {
            Some(continue_token) if !continue_token.is_empty() => {
                list_params.continue_token = Some(continue_token);
            }
            _ => break,
        }
    }

    Ok(all_items)
}

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod pagination_tests;
