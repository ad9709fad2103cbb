// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Resource handlers: create, read, update, delete and import of NIOS objects.
//!
//! One generic handler, [`WapiResource`], drives every model through the same
//! flow; the model supplies the conversions and the WAPI client is injected at
//! construction. Extensible attributes are reconciled on every step:
//!
//! ```text
//! create:  declared ──POST──▶ live ──remove_inherited──▶ state{extattrs, extattrs_all}
//! read:    state ──GET──▶ live ──remove_inherited(state.extattrs)──▶ state'
//! update:  plan.extattrs ∪ (state.extattrs_all − retracted) ──PUT──▶ live ──remove_inherited──▶ state'
//! delete:  state ──DELETE──▶ (gone; 404 counts as success)
//! import:  _ref ──GET──▶ live ──non-inherited keys──▶ state
//! ```
//!
//! [`Provider`] wraps the handlers behind the object-safe [`Resource`] trait so
//! callers can dispatch JSON documents by resource type name.

pub mod data_sources;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::constants::DEFAULT_DNS_VIEW;
use crate::diagnostics::{
    Diagnostic, Diagnostics, SUMMARY_EXTATTR_CONVERSION, SUMMARY_INVALID_CONFIGURATION,
    SUMMARY_MISSING_REFERENCE, SUMMARY_UNKNOWN_RESOURCE,
};
use crate::errors::ConversionError;
use crate::extattrs::{
    add_inherited_ext_attrs, declared_for_state, declared_from_live, expand_ext_attrs,
    flatten_ext_attrs, remove_inherited_ext_attrs, retract_removed_ext_attrs, ExtAttrs,
};
use crate::http_errors::wapi_error_diagnostic;
use crate::metrics::{record_operation_error, record_operation_success, record_reconcile_error};
use crate::models::record_cname::RecordCnameModel;
use crate::models::shared_record_group::SharedRecordGroupModel;
use crate::models::zone_auth::ZoneAuthModel;
use crate::models::ManagedModel;
use crate::wapi::WapiClient;

pub use data_sources::SearchFilter;

/// Attributes never compared when deciding whether an update is needed.
const COMPUTED_STATE_KEYS: &[&str] = &["ref", "extattrs_all"];

/// Generic CRUD handler for one managed model.
pub struct WapiResource<M: ManagedModel> {
    client: Arc<WapiClient>,
    default_view: String,
    _model: PhantomData<fn() -> M>,
}

impl<M: ManagedModel> WapiResource<M> {
    /// Create a handler using `client` for every request.
    pub fn new(client: Arc<WapiClient>, default_view: impl Into<String>) -> Self {
        Self {
            client,
            default_view: default_view.into(),
            _model: PhantomData,
        }
    }

    /// Create the object and return the resulting state.
    ///
    /// # Errors
    ///
    /// Returns diagnostics if validation fails, the WAPI call fails, or the
    /// returned extensible attributes cannot be converted.
    pub async fn create(&self, plan: &M) -> Result<M, Diagnostics> {
        let started = Instant::now();
        let result = self.create_inner(plan).await;
        observe(M::RESOURCE_TYPE, "create", started, &result);
        result
    }

    async fn create_inner(&self, plan: &M) -> Result<M, Diagnostics> {
        let plan = self.prepare(plan)?;

        let body = plan.expand(plan.ext_attrs().map(expand_ext_attrs));
        let response: M::Dto = self
            .client
            .create(M::OBJECT_TYPE, &body, M::RETURN_FIELDS)
            .await
            .map_err(|e| Diagnostics::from(wapi_error_diagnostic("create", M::RESOURCE_TYPE, &e)))?;

        let empty = ExtAttrs::new();
        let state = reconcile::<M>(
            "create",
            response,
            plan.ext_attrs().unwrap_or(&empty),
            plan.ext_attrs(),
        )?;
        info!(
            resource_type = M::RESOURCE_TYPE,
            reference = state.reference().unwrap_or_default(),
            "Created NIOS object"
        );
        Ok(state)
    }

    /// Refresh state from the WAPI.
    ///
    /// Returns `Ok(None)` when the object no longer exists; the caller removes it
    /// from state.
    ///
    /// # Errors
    ///
    /// Returns diagnostics if the state has no reference, the WAPI call fails, or
    /// the returned extensible attributes cannot be converted.
    pub async fn read(&self, state: &M) -> Result<Option<M>, Diagnostics> {
        let started = Instant::now();
        let result = self.read_inner(state).await;
        observe(M::RESOURCE_TYPE, "read", started, &result);
        result
    }

    async fn read_inner(&self, state: &M) -> Result<Option<M>, Diagnostics> {
        let reference = require_reference(state, "read")?;

        let response: M::Dto = match self.client.get(reference, M::RETURN_FIELDS).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => {
                warn!(
                    resource_type = M::RESOURCE_TYPE,
                    reference = %reference,
                    "Object no longer exists, removing from state"
                );
                return Ok(None);
            }
            Err(e) => {
                return Err(wapi_error_diagnostic("read", M::RESOURCE_TYPE, &e).into());
            }
        };

        let empty = ExtAttrs::new();
        reconcile::<M>(
            "read",
            response,
            state.ext_attrs().unwrap_or(&empty),
            state.ext_attrs(),
        )
        .map(Some)
    }

    /// Apply `plan` to the object recorded in `state`.
    ///
    /// The request carries the declared attributes plus every inherited attribute
    /// from the last snapshot, minus the ones the user stopped declaring.
    ///
    /// # Errors
    ///
    /// Returns diagnostics if validation fails, the state has no reference, the
    /// WAPI call fails, or the returned extensible attributes cannot be converted.
    pub async fn update(&self, plan: &M, state: &M) -> Result<M, Diagnostics> {
        let started = Instant::now();
        let result = self.update_inner(plan, state).await;
        observe(M::RESOURCE_TYPE, "update", started, &result);
        result
    }

    async fn update_inner(&self, plan: &M, state: &M) -> Result<M, Diagnostics> {
        let plan = self.prepare(plan)?;
        let reference = require_reference(state, "update")?;

        let empty = ExtAttrs::new();
        let declared = plan.ext_attrs().unwrap_or(&empty);
        let request_ext_attrs = if plan.ext_attrs().is_none() && state.ext_attrs_all().is_none() {
            None
        } else {
            let merged = merge_for_request(
                declared,
                state.ext_attrs().unwrap_or(&empty),
                state.ext_attrs_all().unwrap_or(&empty),
            );
            debug!(
                resource_type = M::RESOURCE_TYPE,
                declared = declared.len(),
                sent = merged.len(),
                "Merged inherited extensible attributes into update"
            );
            Some(expand_ext_attrs(&merged))
        };

        let body = plan.expand_for_update(request_ext_attrs);
        let response: M::Dto = self
            .client
            .update(reference, &body, M::RETURN_FIELDS)
            .await
            .map_err(|e| Diagnostics::from(wapi_error_diagnostic("update", M::RESOURCE_TYPE, &e)))?;

        let state = reconcile::<M>("update", response, declared, plan.ext_attrs())?;
        info!(
            resource_type = M::RESOURCE_TYPE,
            reference = state.reference().unwrap_or_default(),
            "Updated NIOS object"
        );
        Ok(state)
    }

    /// Delete the object recorded in `state`. An object that is already gone is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns diagnostics if the state has no reference or the WAPI call fails.
    pub async fn delete(&self, state: &M) -> Result<(), Diagnostics> {
        let started = Instant::now();
        let result = self.delete_inner(state).await;
        observe(M::RESOURCE_TYPE, "delete", started, &result);
        result
    }

    async fn delete_inner(&self, state: &M) -> Result<(), Diagnostics> {
        let reference = require_reference(state, "delete")?;
        match self.client.delete(reference).await {
            Ok(()) => {
                info!(
                    resource_type = M::RESOURCE_TYPE,
                    reference = %reference,
                    "Deleted NIOS object"
                );
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                debug!(
                    resource_type = M::RESOURCE_TYPE,
                    reference = %reference,
                    "Object already deleted"
                );
                Ok(())
            }
            Err(e) => Err(wapi_error_diagnostic("delete", M::RESOURCE_TYPE, &e).into()),
        }
    }

    /// Adopt an existing object by reference.
    ///
    /// With no prior declaration, attributes not marked as inherited by the WAPI
    /// become the declared set.
    ///
    /// # Errors
    ///
    /// Returns diagnostics if the object does not exist, the WAPI call fails, or
    /// the extensible attributes cannot be converted.
    pub async fn import(&self, reference: &str) -> Result<M, Diagnostics> {
        let started = Instant::now();
        let result = self.import_inner(reference).await;
        observe(M::RESOURCE_TYPE, "import", started, &result);
        result
    }

    async fn import_inner(&self, reference: &str) -> Result<M, Diagnostics> {
        let mut response: M::Dto = self
            .client
            .get(reference, M::RETURN_FIELDS)
            .await
            .map_err(|e| Diagnostics::from(wapi_error_diagnostic("import", M::RESOURCE_TYPE, &e)))?;

        let live = M::take_ext_attrs(&mut response);
        let declared =
            declared_from_live(&live).map_err(|e| conversion_diagnostics::<M>("import", &e))?;
        let all = flatten_ext_attrs(&live).map_err(|e| conversion_diagnostics::<M>("import", &e))?;

        let mut state = M::flatten(response);
        state.set_ext_attrs(declared_for_state(None, declared), Some(all));
        info!(
            resource_type = M::RESOURCE_TYPE,
            reference = %reference,
            "Imported NIOS object"
        );
        Ok(state)
    }

    /// Compute the planned state for `proposed` given the prior state.
    ///
    /// The planned `extattrs_all` is what the next update would send.
    ///
    /// # Errors
    ///
    /// Returns diagnostics if validation fails.
    pub fn plan(&self, proposed: &M, prior: Option<&M>) -> Result<M, Diagnostics> {
        let mut planned = self.prepare(proposed)?;
        let empty = ExtAttrs::new();
        let declared = planned.ext_attrs().cloned();
        let all = match prior {
            Some(prior) => merge_for_request(
                declared.as_ref().unwrap_or(&empty),
                prior.ext_attrs().unwrap_or(&empty),
                prior.ext_attrs_all().unwrap_or(&empty),
            ),
            None => declared.clone().unwrap_or_default(),
        };
        planned.set_ext_attrs(declared, Some(all));
        Ok(planned)
    }

    /// Validate `plan` and fill provider defaults.
    fn prepare(&self, plan: &M) -> Result<M, Diagnostics> {
        let diags = plan.validate();
        for warning in diags.warnings() {
            warn!(resource_type = M::RESOURCE_TYPE, "{warning}");
        }
        let mut plan = diags.into_result(plan.clone())?;
        plan.apply_default_view(&self.default_view);
        Ok(plan)
    }
}

/// Build the extensible attributes to send on update.
fn merge_for_request(declared: &ExtAttrs, prior_declared: &ExtAttrs, snapshot: &ExtAttrs) -> ExtAttrs {
    let inherited = retract_removed_ext_attrs(snapshot, prior_declared, declared);
    add_inherited_ext_attrs(declared, &inherited)
}

/// Turn a WAPI response into state, splitting declared and inherited attributes.
fn reconcile<M: ManagedModel>(
    operation: &str,
    mut response: M::Dto,
    prior_declared: &ExtAttrs,
    configured: Option<&ExtAttrs>,
) -> Result<M, Diagnostics> {
    let live = M::take_ext_attrs(&mut response);
    let split = remove_inherited_ext_attrs(prior_declared, &live)
        .map_err(|e| conversion_diagnostics::<M>(operation, &e))?;

    let mut state = M::flatten(response);
    state.set_ext_attrs(declared_for_state(configured, split.declared), Some(split.all));
    Ok(state)
}

fn conversion_diagnostics<M: ManagedModel>(operation: &str, error: &ConversionError) -> Diagnostics {
    record_reconcile_error(M::RESOURCE_TYPE, operation);
    Diagnostic::error(
        SUMMARY_EXTATTR_CONVERSION,
        format!("Unable to {operation} {}: {error}", M::RESOURCE_TYPE),
    )
    .with_attribute("extattrs")
    .into()
}

fn require_reference<'a, M: ManagedModel>(state: &'a M, operation: &str) -> Result<&'a str, Diagnostics> {
    state.reference().ok_or_else(|| {
        Diagnostics::from_error(
            SUMMARY_MISSING_REFERENCE,
            format!(
                "Unable to {operation} {}: state has no object reference",
                M::RESOURCE_TYPE
            ),
        )
    })
}

fn observe<T>(resource_type: &str, operation: &str, started: Instant, result: &Result<T, Diagnostics>) {
    match result {
        Ok(_) => record_operation_success(resource_type, operation, started.elapsed()),
        Err(diags) => {
            record_operation_error(resource_type, operation, started.elapsed());
            warn!(
                resource_type = resource_type,
                operation = operation,
                errors = diags.errors().count(),
                "Resource operation failed"
            );
        }
    }
}

/// Object-safe view of a resource handler working on JSON documents.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Resource type name.
    fn type_name(&self) -> &'static str;

    /// JSON schema of the resource attributes.
    fn schema(&self) -> Value;

    /// Validate a configuration document.
    fn validate(&self, config: &Value) -> Diagnostics;

    /// Planned state for `config` given the prior state document.
    fn plan(&self, config: &Value, prior: Option<&Value>) -> Result<Value, Diagnostics>;

    /// Whether applying `config` over `state` requires an update call.
    fn needs_update(&self, config: &Value, state: &Value) -> Result<bool, Diagnostics>;

    async fn create(&self, config: &Value) -> Result<Value, Diagnostics>;

    async fn read(&self, state: &Value) -> Result<Option<Value>, Diagnostics>;

    async fn update(&self, config: &Value, state: &Value) -> Result<Value, Diagnostics>;

    async fn delete(&self, state: &Value) -> Result<(), Diagnostics>;

    async fn import(&self, reference: &str) -> Result<Value, Diagnostics>;

    /// Data source lookup.
    async fn search(&self, filter: &SearchFilter) -> Result<Vec<Value>, Diagnostics>;
}

#[async_trait]
impl<M: ManagedModel> Resource for WapiResource<M> {
    fn type_name(&self) -> &'static str {
        M::RESOURCE_TYPE
    }

    fn schema(&self) -> Value {
        model_schema::<M>()
    }

    fn validate(&self, config: &Value) -> Diagnostics {
        match decode::<M>(config) {
            Ok(model) => model.validate(),
            Err(diags) => diags,
        }
    }

    fn plan(&self, config: &Value, prior: Option<&Value>) -> Result<Value, Diagnostics> {
        let proposed = decode::<M>(config)?;
        let prior = prior.map(decode::<M>).transpose()?;
        encode(&WapiResource::plan(self, &proposed, prior.as_ref())?)
    }

    fn needs_update(&self, config: &Value, state: &Value) -> Result<bool, Diagnostics> {
        let configured = encode(&self.prepare(&decode::<M>(config)?)?)?;
        Ok(differs(&configured, state))
    }

    async fn create(&self, config: &Value) -> Result<Value, Diagnostics> {
        let plan = decode::<M>(config)?;
        encode(&WapiResource::create(self, &plan).await?)
    }

    async fn read(&self, state: &Value) -> Result<Option<Value>, Diagnostics> {
        let state = decode::<M>(state)?;
        WapiResource::read(self, &state)
            .await?
            .map(|refreshed| encode(&refreshed))
            .transpose()
    }

    async fn update(&self, config: &Value, state: &Value) -> Result<Value, Diagnostics> {
        let plan = decode::<M>(config)?;
        let state = decode::<M>(state)?;
        encode(&WapiResource::update(self, &plan, &state).await?)
    }

    async fn delete(&self, state: &Value) -> Result<(), Diagnostics> {
        let state = decode::<M>(state)?;
        WapiResource::delete(self, &state).await
    }

    async fn import(&self, reference: &str) -> Result<Value, Diagnostics> {
        encode(&WapiResource::import(self, reference).await?)
    }

    async fn search(&self, filter: &SearchFilter) -> Result<Vec<Value>, Diagnostics> {
        WapiResource::search(self, filter)
            .await?
            .iter()
            .map(encode)
            .collect()
    }
}

/// Compare configured attributes against state, ignoring computed ones and
/// attributes left unset in configuration. Nested objects only compare the
/// keys that are configured, since the grid fills in defaults for the rest.
/// `extattrs` compares exactly, and a declared `extattrs` removed from
/// configuration counts as a difference.
fn differs(configured: &Value, state: &Value) -> bool {
    let empty = Map::new();
    let configured = configured.as_object().unwrap_or(&empty);
    let state = state.as_object().unwrap_or(&empty);

    let changed = configured
        .iter()
        .filter(|(key, _)| !COMPUTED_STATE_KEYS.contains(&key.as_str()))
        .any(|(key, value)| match key.as_str() {
            "extattrs" => state.get(key) != Some(value),
            _ => !covers(value, state.get(key)),
        });
    let extattrs_dropped = !configured.contains_key("extattrs")
        && state
            .get("extattrs")
            .and_then(Value::as_object)
            .is_some_and(|attrs| !attrs.is_empty());

    changed || extattrs_dropped
}

/// Whether `stored` holds every configured value. Arrays must match in length
/// and element by element.
fn covers(configured: &Value, stored: Option<&Value>) -> bool {
    match (configured, stored) {
        (Value::Null, None | Some(Value::Null)) => true,
        (Value::Object(wanted), Some(Value::Object(have))) => wanted
            .iter()
            .all(|(key, value)| covers(value, have.get(key))),
        (Value::Array(wanted), Some(Value::Array(have))) => {
            wanted.len() == have.len()
                && wanted
                    .iter()
                    .zip(have)
                    .all(|(value, stored)| covers(value, Some(stored)))
        }
        (value, stored) => stored == Some(value),
    }
}

fn decode<M: ManagedModel>(value: &Value) -> Result<M, Diagnostics> {
    serde_json::from_value(value.clone()).map_err(|e| {
        Diagnostics::from_error(
            SUMMARY_INVALID_CONFIGURATION,
            format!("Invalid {} document: {e}", M::RESOURCE_TYPE),
        )
    })
}

fn encode<M: ManagedModel>(model: &M) -> Result<Value, Diagnostics> {
    serde_json::to_value(model).map_err(|e| {
        Diagnostics::from_error(
            SUMMARY_INVALID_CONFIGURATION,
            format!("Unable to encode {} state: {e}", M::RESOURCE_TYPE),
        )
    })
}

fn model_schema<M: ManagedModel>() -> Value {
    schemars::schema_for!(M).to_value()
}

/// JSON schema of every resource model, keyed by resource type name.
#[must_use]
pub fn resource_schemas() -> BTreeMap<&'static str, Value> {
    BTreeMap::from([
        (ZoneAuthModel::RESOURCE_TYPE, model_schema::<ZoneAuthModel>()),
        (RecordCnameModel::RESOURCE_TYPE, model_schema::<RecordCnameModel>()),
        (
            SharedRecordGroupModel::RESOURCE_TYPE,
            model_schema::<SharedRecordGroupModel>(),
        ),
    ])
}

/// Registry of resource handlers sharing one WAPI client.
pub struct Provider {
    resources: BTreeMap<&'static str, Box<dyn Resource>>,
}

impl Provider {
    /// Register every resource type against `client`.
    pub fn new(client: Arc<WapiClient>, default_view: &str) -> Self {
        let handlers: Vec<Box<dyn Resource>> = vec![
            Box::new(WapiResource::<ZoneAuthModel>::new(client.clone(), default_view)),
            Box::new(WapiResource::<RecordCnameModel>::new(client.clone(), default_view)),
            Box::new(WapiResource::<SharedRecordGroupModel>::new(client, default_view)),
        ];
        Self {
            resources: handlers
                .into_iter()
                .map(|handler| (handler.type_name(), handler))
                .collect(),
        }
    }

    /// Provider using the `default` DNS view.
    pub fn with_default_view(client: Arc<WapiClient>) -> Self {
        Self::new(client, DEFAULT_DNS_VIEW)
    }

    /// Look up the handler for `type_name`.
    ///
    /// # Errors
    ///
    /// Returns a diagnostic naming the known types if `type_name` is not registered.
    pub fn resource(&self, type_name: &str) -> Result<&dyn Resource, Diagnostics> {
        self.resources
            .get(type_name)
            .map(AsRef::as_ref)
            .ok_or_else(|| {
                Diagnostics::from_error(
                    SUMMARY_UNKNOWN_RESOURCE,
                    format!(
                        "Resource type '{type_name}' is not supported; expected one of [{}]",
                        self.resource_types().collect::<Vec<_>>().join(", ")
                    ),
                )
            })
    }

    /// Registered resource type names, sorted.
    pub fn resource_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.keys().copied()
    }
}
