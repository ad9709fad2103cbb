// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `resources/data_sources.rs`

#[cfg(test)]
mod tests {
    use crate::diagnostics::SUMMARY_EXTATTR_CONVERSION;
    use crate::extattrs::ExtAttrs;
    use crate::models::zone_auth::ZoneAuthModel;
    use crate::resources::{SearchFilter, WapiResource};
    use crate::wapi::WapiClient;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn zones(server: &MockServer) -> WapiResource<ZoneAuthModel> {
        let client = WapiClient::new(
            Arc::new(reqwest::Client::new()),
            &server.uri(),
            "v2.13.6",
            "admin",
            "infoblox",
        )
        .unwrap();
        WapiResource::new(Arc::new(client), "default")
    }

    fn site_filter() -> SearchFilter {
        SearchFilter {
            filters: BTreeMap::from([("view".to_string(), "default".to_string())]),
            extattr_filters: BTreeMap::from([("Site".to_string(), "NYC".to_string())]),
        }
    }

    #[test]
    fn test_query_pairs() {
        assert_eq!(
            site_filter().to_query_pairs(),
            vec![
                ("view".to_string(), "default".to_string()),
                ("*Site".to_string(), "NYC".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_search_returns_full_live_set() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wapi/v2.13.6/zone_auth"))
            .and(query_param("view", "default"))
            .and(query_param("*Site", "NYC"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [
                    {
                        "_ref": "zone_auth/ZG5z:example.com/default",
                        "fqdn": "example.com",
                        "view": "default",
                        "extattrs": {
                            "Site": {"value": "NYC"},
                            "Owner": {"value": "infra-team", "inheritance_source": {"_ref": "view/x"}}
                        }
                    },
                    {
                        "_ref": "zone_auth/ZG5z:corp.example.com/default",
                        "fqdn": "corp.example.com",
                        "view": "default",
                        "extattrs": {"Site": {"value": "NYC"}}
                    }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let found = zones(&server).search(&site_filter()).await.unwrap();

        assert_eq!(found.len(), 2);
        let all: ExtAttrs =
            serde_json::from_value(json!({"Site": "NYC", "Owner": "infra-team"})).unwrap();
        assert_eq!(found[0].fqdn, "example.com");
        assert_eq!(found[0].extattrs.as_ref(), Some(&all));
        assert_eq!(found[0].extattrs_all.as_ref(), Some(&all));
        assert_eq!(found[1].fqdn, "corp.example.com");
    }

    #[tokio::test]
    async fn test_search_with_no_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": []})))
            .mount(&server)
            .await;

        let found = zones(&server).search(&SearchFilter::default()).await.unwrap();

        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_search_reports_unconvertible_attribute() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [
                    {"_ref": "zone_auth/a", "fqdn": "example.com", "extattrs": {"Site": "NYC"}}
                ]
            })))
            .mount(&server)
            .await;

        let diags = zones(&server).search(&site_filter()).await.unwrap_err();

        assert_eq!(diags.errors().next().unwrap().summary, SUMMARY_EXTATTR_CONVERSION);
    }
}
