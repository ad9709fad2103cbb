// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Managed models for NIOS DNS objects.
//!
//! Each submodule defines, for one WAPI object:
//!
//! - the **model**: the managed (plan/state) representation, with a JSON schema
//!   derived through `schemars`,
//! - the **DTO**: the WAPI request/response body,
//! - explicit `expand` (model → DTO) and `flatten` (DTO → model) conversions.
//!
//! Nested WAPI structs ([`acl::AclEntry`], [`dnssec::DnssecKeyParams`],
//! [`shared_record_group::ZoneAssociation`]) are typed as well; there is no
//! generic map-walking conversion anywhere.
//!
//! # Resource Types
//!
//! - [`zone_auth::ZoneAuthModel`] - Authoritative zones (`zone_auth`)
//! - [`record_cname::RecordCnameModel`] - CNAME records (`record:cname`)
//! - [`shared_record_group::SharedRecordGroupModel`] - Shared record groups (`sharedrecordgroup`)

pub mod acl;
pub mod dnssec;
pub mod record_cname;
pub mod shared_record_group;
pub mod zone_auth;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

use crate::diagnostics::Diagnostics;
use crate::extattrs::{ExtAttrs, WapiExtAttrs};

/// Binding between a managed model and its WAPI object.
///
/// Implementations are pure: no I/O, no diagnostics besides [`validate`](Self::validate).
/// Extensible attributes are deliberately kept out of [`flatten`](Self::flatten);
/// the resource handler runs them through the reconciler and stores the result
/// with [`set_ext_attrs`](Self::set_ext_attrs).
pub trait ManagedModel:
    Serialize + DeserializeOwned + JsonSchema + Clone + Debug + Send + Sync + 'static
{
    /// WAPI request/response body.
    type Dto: Serialize + DeserializeOwned + Debug + Send + Sync;

    /// Resource type name (e.g. `nios_dns_record_cname`).
    const RESOURCE_TYPE: &'static str;

    /// WAPI object type (e.g. `record:cname`).
    const OBJECT_TYPE: &'static str;

    /// Fields requested with `_return_fields+` on every read.
    const RETURN_FIELDS: &'static [&'static str];

    /// Validate configured attributes against the schema rules.
    fn validate(&self) -> Diagnostics;

    /// Build the create payload. `extattrs` is the wire form to send, if any.
    fn expand(&self, extattrs: Option<WapiExtAttrs>) -> Self::Dto;

    /// Build the update payload. Defaults to [`expand`](Self::expand); objects with
    /// immutable fields drop them here.
    fn expand_for_update(&self, extattrs: Option<WapiExtAttrs>) -> Self::Dto {
        self.expand(extattrs)
    }

    /// Build a model from a WAPI response, leaving `extattrs`/`extattrs_all` unset.
    fn flatten(dto: Self::Dto) -> Self;

    /// Move the raw extensible attributes out of a response DTO.
    fn take_ext_attrs(dto: &mut Self::Dto) -> WapiExtAttrs;

    /// WAPI object reference (`_ref`) held in state.
    fn reference(&self) -> Option<&str>;

    /// Declared extensible attributes (`extattrs`).
    fn ext_attrs(&self) -> Option<&ExtAttrs>;

    /// Last full snapshot of extensible attributes (`extattrs_all`).
    fn ext_attrs_all(&self) -> Option<&ExtAttrs>;

    /// Store reconciled extensible attributes.
    fn set_ext_attrs(&mut self, declared: Option<ExtAttrs>, all: Option<ExtAttrs>);

    /// Fill the DNS view from provider configuration when unset. Objects without
    /// a view ignore it.
    fn apply_default_view(&mut self, _view: &str) {}
}

/// `Some(true)` when `configured` is set and the explicit flag is not.
///
/// NIOS ignores many overridable fields unless the matching `use_*` flag is set.
pub(crate) fn use_flag<T>(explicit: Option<bool>, configured: Option<&T>) -> Option<bool> {
    explicit.or_else(|| configured.map(|_| true))
}

/// Check the `extattrs` attribute shared by every model.
pub(crate) fn validate_ext_attrs(diags: &mut Diagnostics, extattrs: Option<&ExtAttrs>) {
    if let Some(attrs) = extattrs {
        crate::validation::check(
            diags,
            "extattrs",
            crate::validation::validate_ext_attr_names(attrs),
        );
    }
}
