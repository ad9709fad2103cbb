// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared record groups (`sharedrecordgroup`).
//!
//! A shared record group holds records that are served in every associated zone.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{use_flag, validate_ext_attrs, ManagedModel};
use crate::constants::{OBJECT_SHARED_RECORD_GROUP, RESOURCE_SHARED_RECORD_GROUP};
use crate::diagnostics::{Diagnostics, SUMMARY_INVALID_ATTRIBUTE};
use crate::extattrs::{ExtAttrs, WapiExtAttrs};
use crate::validation::{check, validate_comment, validate_fqdn, validate_not_blank};

/// Zone the group's records are published in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ZoneAssociation {
    /// Zone name.
    pub fqdn: String,
    /// DNS view of the zone. NIOS uses the default view when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
}

/// Managed representation of a shared record group.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SharedRecordGroupModel {
    /// WAPI object reference.
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Group name, unique in the grid.
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Hostname policy applied to the group's records (e.g. `Allow Underscore`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_name_policy: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_record_name_policy: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_associations: Option<Vec<ZoneAssociation>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extattrs: Option<ExtAttrs>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extattrs_all: Option<ExtAttrs>,
}

/// WAPI `sharedrecordgroup` body.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SharedRecordGroupDto {
    #[serde(rename = "_ref", default, skip_serializing)]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_name_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_record_name_policy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_associations: Option<Vec<ZoneAssociation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extattrs: Option<WapiExtAttrs>,
}

impl ManagedModel for SharedRecordGroupModel {
    type Dto = SharedRecordGroupDto;

    const RESOURCE_TYPE: &'static str = RESOURCE_SHARED_RECORD_GROUP;
    const OBJECT_TYPE: &'static str = OBJECT_SHARED_RECORD_GROUP;
    const RETURN_FIELDS: &'static [&'static str] = &[
        "extattrs",
        "record_name_policy",
        "use_record_name_policy",
        "zone_associations",
    ];

    fn validate(&self) -> Diagnostics {
        let mut diags = Diagnostics::new();

        check(&mut diags, "name", validate_not_blank(&self.name));
        if let Some(comment) = &self.comment {
            check(&mut diags, "comment", validate_comment(comment));
        }
        if let Some(policy) = &self.record_name_policy {
            check(&mut diags, "record_name_policy", validate_not_blank(policy));
        }

        if let Some(associations) = &self.zone_associations {
            for (index, association) in associations.iter().enumerate() {
                check(
                    &mut diags,
                    &format!("zone_associations[{index}].fqdn"),
                    validate_fqdn(&association.fqdn),
                );
                if let Some(view) = &association.view {
                    check(
                        &mut diags,
                        &format!("zone_associations[{index}].view"),
                        validate_not_blank(view),
                    );
                }
            }
            for (index, association) in associations.iter().enumerate() {
                if associations[..index].contains(association) {
                    diags.add_attribute_error(
                        format!("zone_associations[{index}]"),
                        SUMMARY_INVALID_ATTRIBUTE,
                        format!("zone '{}' is associated more than once", association.fqdn),
                    );
                }
            }
        }

        validate_ext_attrs(&mut diags, self.extattrs.as_ref());
        diags
    }

    fn expand(&self, extattrs: Option<WapiExtAttrs>) -> SharedRecordGroupDto {
        SharedRecordGroupDto {
            reference: None,
            name: Some(self.name.clone()),
            comment: self.comment.clone(),
            record_name_policy: self.record_name_policy.clone(),
            use_record_name_policy: use_flag(
                self.use_record_name_policy,
                self.record_name_policy.as_ref(),
            ),
            zone_associations: self.zone_associations.clone(),
            extattrs,
        }
    }

    fn flatten(dto: SharedRecordGroupDto) -> Self {
        Self {
            reference: dto.reference,
            name: dto.name.unwrap_or_default(),
            comment: dto.comment,
            record_name_policy: dto.record_name_policy,
            use_record_name_policy: dto.use_record_name_policy,
            zone_associations: dto.zone_associations,
            extattrs: None,
            extattrs_all: None,
        }
    }

    fn take_ext_attrs(dto: &mut SharedRecordGroupDto) -> WapiExtAttrs {
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
}

#[cfg(test)]
#[path = "shared_record_group_tests.rs"]
mod shared_record_group_tests;
