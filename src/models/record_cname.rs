// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! CNAME records (`record:cname`).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{use_flag, validate_ext_attrs, ManagedModel};
use crate::constants::{OBJECT_RECORD_CNAME, RESOURCE_RECORD_CNAME};
use crate::diagnostics::{Diagnostics, SUMMARY_INVALID_ATTRIBUTE};
use crate::extattrs::{ExtAttrs, WapiExtAttrs};
use crate::validation::{check, validate_comment, validate_fqdn, validate_not_blank, validate_ttl};

/// Record origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordCreator {
    Static,
    Dynamic,
    /// Set by NIOS itself; cannot be configured.
    System,
}

/// Managed representation of a CNAME record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RecordCnameModel {
    /// WAPI object reference.
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Alias name (FQDN).
    pub name: String,

    /// Target name (FQDN).
    pub canonical: String,

    /// DNS view. Cannot be changed after creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,

    /// Use `ttl` instead of the zone default. Set automatically when `ttl` is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_ttl: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<RecordCreator>,

    /// GSS-TSIG principal that owns a dynamic record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ddns_principal: Option<String>,

    /// Protect the record from dynamic updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ddns_protected: Option<bool>,

    /// Exclude the record from scavenging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forbid_reclamation: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extattrs: Option<ExtAttrs>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extattrs_all: Option<ExtAttrs>,

    /// Zone containing the record. Computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,

    /// Alias name in punycode form. Computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_name: Option<String>,

    /// Target name in punycode form. Computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_canonical: Option<String>,

    /// Shared record group owning the record, if any. Computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_record_group: Option<String>,

    /// Creation time as a Unix timestamp. Computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<u64>,
}

/// WAPI `record:cname` body.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RecordCnameDto {
    #[serde(rename = "_ref", default, skip_serializing)]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_ttl: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<RecordCreator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ddns_principal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ddns_protected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forbid_reclamation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extattrs: Option<WapiExtAttrs>,
    #[serde(default, skip_serializing)]
    pub zone: Option<String>,
    #[serde(default, skip_serializing)]
    pub dns_name: Option<String>,
    #[serde(default, skip_serializing)]
    pub dns_canonical: Option<String>,
    #[serde(default, skip_serializing)]
    pub shared_record_group: Option<String>,
    #[serde(default, skip_serializing)]
    pub creation_time: Option<u64>,
}

impl ManagedModel for RecordCnameModel {
    type Dto = RecordCnameDto;

    const RESOURCE_TYPE: &'static str = RESOURCE_RECORD_CNAME;
    const OBJECT_TYPE: &'static str = OBJECT_RECORD_CNAME;
    const RETURN_FIELDS: &'static [&'static str] = &[
        "comment",
        "creation_time",
        "creator",
        "ddns_principal",
        "ddns_protected",
        "disable",
        "dns_canonical",
        "dns_name",
        "extattrs",
        "forbid_reclamation",
        "shared_record_group",
        "ttl",
        "use_ttl",
        "zone",
    ];

    fn validate(&self) -> Diagnostics {
        let mut diags = Diagnostics::new();

        check(&mut diags, "name", validate_fqdn(&self.name));
        check(&mut diags, "canonical", validate_fqdn(&self.canonical));
        if !self.name.is_empty()
            && self.name.trim_end_matches('.') == self.canonical.trim_end_matches('.')
        {
            diags.add_attribute_error(
                "canonical",
                SUMMARY_INVALID_ATTRIBUTE,
                "canonical must differ from name",
            );
        }

        if let Some(view) = &self.view {
            check(&mut diags, "view", validate_not_blank(view));
        }
        if let Some(ttl) = self.ttl {
            check(&mut diags, "ttl", validate_ttl(ttl));
        }
        if let Some(comment) = &self.comment {
            check(&mut diags, "comment", validate_comment(comment));
        }

        if self.creator == Some(RecordCreator::System) {
            diags.add_attribute_error(
                "creator",
                SUMMARY_INVALID_ATTRIBUTE,
                "must be one of [STATIC, DYNAMIC], got 'SYSTEM'",
            );
        }
        if let Some(principal) = &self.ddns_principal {
            check(&mut diags, "ddns_principal", validate_not_blank(principal));
            if self.creator != Some(RecordCreator::Dynamic) {
                diags.add_attribute_error(
                    "ddns_principal",
                    SUMMARY_INVALID_ATTRIBUTE,
                    "ddns_principal requires creator DYNAMIC",
                );
            }
        }

        validate_ext_attrs(&mut diags, self.extattrs.as_ref());
        diags
    }

    fn expand(&self, extattrs: Option<WapiExtAttrs>) -> RecordCnameDto {
        RecordCnameDto {
            reference: None,
            name: Some(self.name.clone()),
            canonical: Some(self.canonical.clone()),
            view: self.view.clone(),
            ttl: self.ttl,
            use_ttl: use_flag(self.use_ttl, self.ttl.as_ref()),
            comment: self.comment.clone(),
            disable: self.disable,
            creator: self.creator,
            ddns_principal: self.ddns_principal.clone(),
            ddns_protected: self.ddns_protected,
            forbid_reclamation: self.forbid_reclamation,
            extattrs,
            ..Default::default()
        }
    }

    fn expand_for_update(&self, extattrs: Option<WapiExtAttrs>) -> RecordCnameDto {
        RecordCnameDto {
            view: None,
            ..self.expand(extattrs)
        }
    }

    fn flatten(dto: RecordCnameDto) -> Self {
        Self {
            reference: dto.reference,
            name: dto.name.unwrap_or_default(),
            canonical: dto.canonical.unwrap_or_default(),
            view: dto.view,
            ttl: dto.ttl,
            use_ttl: dto.use_ttl,
            comment: dto.comment,
            disable: dto.disable,
            creator: dto.creator,
            ddns_principal: dto.ddns_principal,
            ddns_protected: dto.ddns_protected,
            forbid_reclamation: dto.forbid_reclamation,
            extattrs: None,
            extattrs_all: None,
            zone: dto.zone,
            dns_name: dto.dns_name,
            dns_canonical: dto.dns_canonical,
            shared_record_group: dto.shared_record_group,
            creation_time: dto.creation_time,
        }
    }

    fn take_ext_attrs(dto: &mut RecordCnameDto) -> WapiExtAttrs {
        dto.extattrs.take().unwrap_or_default()
    }

    fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    fn ext_attrs(&self) -> Option<&ExtAttrs> {
        self.extattrs.as_ref()
    }

    fn ext_attrs_all(&self) -> Option<&ExtAttrs> {
        self.extattrs_all.as_ref()
    }

    fn set_ext_attrs(&mut self, declared: Option<ExtAttrs>, all: Option<ExtAttrs>) {
        self.extattrs = declared;
        self.extattrs_all = all;
    }

    fn apply_default_view(&mut self, view: &str) {
        if self.view.is_none() {
            self.view = Some(view.to_string());
        }
    }
}

#[cfg(test)]
#[path = "record_cname_tests.rs"]
mod record_cname_tests;
