// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use nios_dns::resources::Provider;
use nios_dns::wapi::WapiClient;
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const WAPI_VERSION: &str = "v2.13.6";

/// Build a provider pointed at a mock grid master.
pub fn provider_for(server: &MockServer) -> Provider {
    let client = WapiClient::new(
        Arc::new(reqwest::Client::new()),
        &server.uri(),
        WAPI_VERSION,
        "admin",
        "infoblox",
    )
    .expect("mock server URI should be valid")
    .with_max_retry_elapsed(Duration::from_millis(200));
    Provider::with_default_view(Arc::new(client))
}

/// In-memory grid holding a single object, with a parent scope that can push
/// inherited extensible attributes onto it.
///
/// Updates replace the whole attribute set, like the real WAPI: an inherited
/// attribute that is not sent back is gone.
#[derive(Clone, Default)]
pub struct FakeGrid {
    inner: Arc<Mutex<GridState>>,
}

#[derive(Default)]
struct GridState {
    object: Option<Map<String, Value>>,
    inherited: Map<String, Value>,
}

impl FakeGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every request on `server`.
    pub async fn mount(&self, server: &MockServer) {
        Mock::given(wiremock::matchers::any())
            .respond_with(self.clone())
            .mount(server)
            .await;
    }

    /// Define an attribute on the parent scope and push it to the live object.
    pub fn inherit(&self, name: &str, value: Value) {
        let mut grid = self.inner.lock().unwrap();
        grid.inherited.insert(name.to_string(), value.clone());
        if let Some(object) = grid.object.as_mut() {
            extattrs_mut(object).insert(name.to_string(), inherited_entry(value));
        }
    }

    /// Delete an attribute directly on the grid.
    pub fn remove_attribute(&self, name: &str) {
        let mut grid = self.inner.lock().unwrap();
        if let Some(object) = grid.object.as_mut() {
            extattrs_mut(object).remove(name);
        }
    }

    /// Current wire attributes of the live object.
    pub fn extattrs(&self) -> Value {
        let grid = self.inner.lock().unwrap();
        grid.object
            .as_ref()
            .and_then(|o| o.get("extattrs").cloned())
            .unwrap_or(Value::Null)
    }

    pub fn exists(&self) -> bool {
        self.inner.lock().unwrap().object.is_some()
    }
}

fn inherited_entry(value: Value) -> Value {
    json!({"value": value, "inheritance_source": {"_ref": "zone_auth/ZG5z:example.com/default"}})
}

fn extattrs_mut(object: &mut Map<String, Value>) -> &mut Map<String, Value> {
    let entry = object
        .entry("extattrs".to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    entry.as_object_mut().expect("extattrs was just made an object")
}

/// Mark entries whose value matches the parent scope as inherited again.
fn mark_inherited(extattrs: &mut Map<String, Value>, inherited: &Map<String, Value>) {
    for (name, value) in inherited {
        if extattrs.get(name).and_then(|entry| entry.get("value")) == Some(value) {
            extattrs.insert(name.clone(), inherited_entry(value.clone()));
        }
    }
}

impl Respond for FakeGrid {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let mut grid = self.inner.lock().unwrap();
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);

        match request.method.as_str() {
            "POST" => {
                let mut object = body.as_object().cloned().unwrap_or_default();
                let object_type = request
                    .url
                    .path()
                    .rsplit('/')
                    .next()
                    .unwrap_or_default()
                    .to_string();
                let name = object
                    .get("name")
                    .or_else(|| object.get("fqdn"))
                    .and_then(Value::as_str)
                    .unwrap_or("object")
                    .to_string();
                object.insert(
                    "_ref".to_string(),
                    json!(format!("{object_type}/ZG5zLmZha2U:{name}/default")),
                );
                let inherited = grid.inherited.clone();
                let extattrs = extattrs_mut(&mut object);
                for (key, value) in &inherited {
                    extattrs
                        .entry(key.clone())
                        .or_insert_with(|| inherited_entry(value.clone()));
                }
                grid.object = Some(object.clone());
                ResponseTemplate::new(201).set_body_json(json!({"result": object}))
            }
            "GET" => match &grid.object {
                Some(object) => {
                    ResponseTemplate::new(200).set_body_json(json!({"result": object}))
                }
                None => ResponseTemplate::new(404).set_body_json(json!({
                    "Error": "AdmConDataNotFoundError",
                    "code": "Client.Ibap.Data.NotFound",
                    "text": "Reference not found"
                })),
            },
            "PUT" => {
                let inherited = grid.inherited.clone();
                let Some(object) = grid.object.as_mut() else {
                    return ResponseTemplate::new(404);
                };
                if let Some(fields) = body.as_object() {
                    for (key, value) in fields {
                        object.insert(key.clone(), value.clone());
                    }
                }
                mark_inherited(extattrs_mut(object), &inherited);
                ResponseTemplate::new(200).set_body_json(json!({"result": object.clone()}))
            }
            "DELETE" => match grid.object.take() {
                Some(object) => ResponseTemplate::new(200).set_body_json(object["_ref"].clone()),
                None => ResponseTemplate::new(404),
            },
            _ => ResponseTemplate::new(405),
        }
    }
}
