// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `pagination.rs`

#[cfg(test)]
mod tests {
    use super::super::list_all_paginated;
    use crate::constants::KUBE_LIST_PAGE_SIZE;
    use k8s_openapi::api::apps::v1::DaemonSet;
    use kube::{api::ListParams, Api, Client, Config};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn daemonset_page(names: &[&str], continue_token: Option<&str>) -> serde_json::Value {
        json!({
            "apiVersion": "apps/v1",
            "kind": "DaemonSetList",
            "metadata": { "continue": continue_token.unwrap_or("") },
            "items": names.iter().map(|name| json!({
                "metadata": { "name": name, "namespace": "kube-system" }
            })).collect::<Vec<_>>()
        })
    }

    fn client_for(server: &MockServer) -> Client {
        let config = Config::new(server.uri().parse().unwrap());
        Client::try_from(config).unwrap()
    }

    #[test]
    fn test_page_size_is_bounded() {
        assert_eq!(KUBE_LIST_PAGE_SIZE, 100);
    }

    #[tokio::test]
    async fn test_follows_continue_tokens() {
        let server = MockServer::start().await;
        let list_path = "/apis/apps/v1/namespaces/kube-system/daemonsets";

        Mock::given(method("GET"))
            .and(path(list_path))
            .and(query_param("limit", "100"))
            .and(query_param_is_missing("continue"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(daemonset_page(&["calico-node", "kube-proxy"], Some("page-2"))),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(list_path))
            .and(query_param("continue", "page-2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(daemonset_page(&["csi-node"], None)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let api: Api<DaemonSet> = Api::namespaced(client_for(&server), "kube-system");
        let items = list_all_paginated(&api, ListParams::default(), "list daemonsets", 0)
            .await
            .unwrap();

        let names: Vec<_> = items
            .iter()
            .filter_map(|ds| ds.metadata.name.clone())
            .collect();
        assert_eq!(names, vec!["calico-node", "kube-proxy", "csi-node"]);
    }

    #[tokio::test]
    async fn test_forbidden_is_returned_without_retry() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/apis/apps/v1/namespaces/calico-system/daemonsets"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "kind": "Status",
                "apiVersion": "v1",
                "status": "Failure",
                "message": "daemonsets.apps is forbidden",
                "reason": "Forbidden",
                "code": 403
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api: Api<DaemonSet> = Api::namespaced(client_for(&server), "calico-system");
        let err = list_all_paginated(&api, ListParams::default(), "list daemonsets", 3)
            .await
            .unwrap_err();

        assert!(matches!(err, kube::Error::Api(ref status) if status.code == 403));
    }
}
