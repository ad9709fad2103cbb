// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Authoritative DNS zones (`zone_auth`).
//!
//! # Example
//!
//! ```rust
//! use nios_dns::models::ManagedModel;
//! use nios_dns::models::zone_auth::ZoneAuthModel;
//!
//! let zone: ZoneAuthModel = serde_json::from_value(serde_json::json!({
//!     "fqdn": "example.com",
//!     "comment": "corporate zone",
//!     "soa_default_ttl": 3600,
//!     "extattrs": {"Site": "NYC"}
//! })).unwrap();
//!
//! assert!(zone.validate().is_empty());
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use super::acl::{expand_acl, flatten_acl, validate_acl, AclEntry, AclEntryDto};
use super::dnssec::DnssecKeyParams;
use super::{use_flag, validate_ext_attrs, ManagedModel};
use crate::constants::{OBJECT_ZONE_AUTH, RESOURCE_ZONE_AUTH};
use crate::diagnostics::{Diagnostic, Diagnostics, SUMMARY_INVALID_ATTRIBUTE};
use crate::extattrs::{ExtAttrs, WapiExtAttrs};
use crate::validation::{
    check, validate_comment, validate_fqdn, validate_not_blank, validate_trimmed, validate_ttl,
};

/// Zone format: forward zone or IPv4/IPv6 reverse-mapping zone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ZoneFormat {
    #[default]
    Forward,
    Ipv4,
    Ipv6,
}

/// Grid member serving the zone as primary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MemberServer {
    /// Grid member host name.
    pub name: String,
    /// Hide the member from the zone's NS records.
    #[serde(default)]
    pub stealth: bool,
}

/// Managed representation of an authoritative zone.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ZoneAuthModel {
    /// WAPI object reference.
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Zone name. For reverse zones, the network in CIDR notation (e.g. `10.0.0.0/24`).
    pub fqdn: String,

    /// DNS view. Cannot be changed after creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,

    /// Cannot be changed after creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_format: Option<ZoneFormat>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable: Option<bool>,

    /// Lock the zone against edits by other administrators.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,

    /// Name server group serving the zone. Mutually exclusive with `grid_primary`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ns_group: Option<String>,

    /// RFC 2317 prefix for classless reverse zones.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub soa_default_ttl: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub soa_expire: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub soa_negative_ttl: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub soa_refresh: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub soa_retry: Option<u32>,

    /// Override grid SOA timers. Set automatically when any `soa_*` timer is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_grid_zone_timer: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_query: Option<Vec<AclEntry>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_allow_query: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_transfer: Option<Vec<AclEntry>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_allow_transfer: Option<bool>,

    /// Clients allowed to send dynamic updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_update: Option<Vec<AclEntry>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dnssec_key_params: Option<DnssecKeyParams>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_dnssec_key_params: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_primary: Option<Vec<MemberServer>>,

    /// Declared extensible attributes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extattrs: Option<ExtAttrs>,

    /// Every extensible attribute on the zone, including inherited ones. Computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extattrs_all: Option<ExtAttrs>,

    /// Zone name in display form (IDN decoded). Computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_domain: Option<String>,

    /// Zone name in punycode form. Computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_fqdn: Option<String>,
}

/// WAPI `zone_auth` body.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ZoneAuthDto {
    #[serde(rename = "_ref", default, skip_serializing)]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_format: Option<ZoneFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ns_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soa_default_ttl: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soa_expire: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soa_negative_ttl: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soa_refresh: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soa_retry: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_grid_zone_timer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_query: Option<Vec<AclEntryDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_allow_query: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_transfer: Option<Vec<AclEntryDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_allow_transfer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_update: Option<Vec<AclEntryDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dnssec_key_params: Option<DnssecKeyParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_dnssec_key_params: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_primary: Option<Vec<MemberServer>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extattrs: Option<WapiExtAttrs>,
    #[serde(default, skip_serializing)]
    pub display_domain: Option<String>,
    #[serde(default, skip_serializing)]
    pub dns_fqdn: Option<String>,
}

impl ZoneAuthModel {
    fn soa_timers(&self) -> [(&'static str, Option<u32>); 5] {
        [
            ("soa_default_ttl", self.soa_default_ttl),
            ("soa_expire", self.soa_expire),
            ("soa_negative_ttl", self.soa_negative_ttl),
            ("soa_refresh", self.soa_refresh),
            ("soa_retry", self.soa_retry),
        ]
    }

    fn has_soa_timer(&self) -> bool {
        self.soa_timers().iter().any(|(_, value)| value.is_some())
    }
}

impl ManagedModel for ZoneAuthModel {
    type Dto = ZoneAuthDto;

    const RESOURCE_TYPE: &'static str = RESOURCE_ZONE_AUTH;
    const OBJECT_TYPE: &'static str = OBJECT_ZONE_AUTH;
    const RETURN_FIELDS: &'static [&'static str] = &[
        "allow_query",
        "allow_transfer",
        "allow_update",
        "comment",
        "disable",
        "display_domain",
        "dns_fqdn",
        "dnssec_key_params",
        "extattrs",
        "grid_primary",
        "locked",
        "ns_group",
        "prefix",
        "soa_default_ttl",
        "soa_expire",
        "soa_negative_ttl",
        "soa_refresh",
        "soa_retry",
        "use_allow_query",
        "use_allow_transfer",
        "use_dnssec_key_params",
        "use_grid_zone_timer",
        "zone_format",
    ];

    fn validate(&self) -> Diagnostics {
        let mut diags = Diagnostics::new();

        let format = self.zone_format.unwrap_or_default();
        check(&mut diags, "fqdn", validate_zone_name(&self.fqdn, format));

        if let Some(view) = &self.view {
            check(&mut diags, "view", validate_not_blank(view));
        }
        if let Some(comment) = &self.comment {
            check(&mut diags, "comment", validate_comment(comment));
        }
        if let Some(ns_group) = &self.ns_group {
            check(&mut diags, "ns_group", validate_not_blank(ns_group));
        }
        if let Some(prefix) = &self.prefix {
            check(&mut diags, "prefix", validate_trimmed(prefix));
            if format != ZoneFormat::Ipv4 {
                diags.add_attribute_error(
                    "prefix",
                    SUMMARY_INVALID_ATTRIBUTE,
                    "prefix is only valid for IPV4 reverse zones",
                );
            }
        }

        for (name, value) in self.soa_timers() {
            if let Some(ttl) = value {
                check(&mut diags, name, validate_ttl(ttl));
            }
        }
        if self.use_grid_zone_timer == Some(false) && self.has_soa_timer() {
            diags.push(
                Diagnostic::warning(
                    SUMMARY_INVALID_ATTRIBUTE,
                    "SOA timers are ignored by NIOS while use_grid_zone_timer is false",
                )
                .with_attribute("use_grid_zone_timer"),
            );
        }

        validate_acl("allow_query", self.allow_query.as_ref(), &mut diags);
        validate_acl("allow_transfer", self.allow_transfer.as_ref(), &mut diags);
        validate_acl("allow_update", self.allow_update.as_ref(), &mut diags);

        if let Some(params) = &self.dnssec_key_params {
            params.validate("dnssec_key_params", &mut diags);
        }

        if let Some(members) = &self.grid_primary {
            for (index, member) in members.iter().enumerate() {
                check(
                    &mut diags,
                    &format!("grid_primary[{index}].name"),
                    validate_fqdn(&member.name),
                );
            }
            if self.ns_group.is_some() && !members.is_empty() {
                diags.add_attribute_error(
                    "grid_primary",
                    SUMMARY_INVALID_ATTRIBUTE,
                    "grid_primary cannot be set together with ns_group",
                );
            }
        }

        validate_ext_attrs(&mut diags, self.extattrs.as_ref());
        diags
    }

    fn expand(&self, extattrs: Option<WapiExtAttrs>) -> ZoneAuthDto {
        ZoneAuthDto {
            reference: None,
            fqdn: Some(self.fqdn.clone()),
            view: self.view.clone(),
            zone_format: self.zone_format,
            comment: self.comment.clone(),
            disable: self.disable,
            locked: self.locked,
            ns_group: self.ns_group.clone(),
            prefix: self.prefix.clone(),
            soa_default_ttl: self.soa_default_ttl,
            soa_expire: self.soa_expire,
            soa_negative_ttl: self.soa_negative_ttl,
            soa_refresh: self.soa_refresh,
            soa_retry: self.soa_retry,
            use_grid_zone_timer: if self.has_soa_timer() {
                self.use_grid_zone_timer.or(Some(true))
            } else {
                self.use_grid_zone_timer
            },
            allow_query: expand_acl(self.allow_query.as_ref()),
            use_allow_query: use_flag(self.use_allow_query, self.allow_query.as_ref()),
            allow_transfer: expand_acl(self.allow_transfer.as_ref()),
            use_allow_transfer: use_flag(self.use_allow_transfer, self.allow_transfer.as_ref()),
            allow_update: expand_acl(self.allow_update.as_ref()),
            dnssec_key_params: self.dnssec_key_params.clone(),
            use_dnssec_key_params: use_flag(
                self.use_dnssec_key_params,
                self.dnssec_key_params.as_ref(),
            ),
            grid_primary: self.grid_primary.clone(),
            extattrs,
            display_domain: None,
            dns_fqdn: None,
        }
    }

    fn expand_for_update(&self, extattrs: Option<WapiExtAttrs>) -> ZoneAuthDto {
        ZoneAuthDto {
            fqdn: None,
            view: None,
            zone_format: None,
            ..self.expand(extattrs)
        }
    }

    fn flatten(dto: ZoneAuthDto) -> Self {
        Self {
            reference: dto.reference,
            fqdn: dto.fqdn.unwrap_or_default(),
            view: dto.view,
            zone_format: dto.zone_format,
            comment: dto.comment,
            disable: dto.disable,
            locked: dto.locked,
            ns_group: dto.ns_group,
            prefix: dto.prefix,
            soa_default_ttl: dto.soa_default_ttl,
            soa_expire: dto.soa_expire,
            soa_negative_ttl: dto.soa_negative_ttl,
            soa_refresh: dto.soa_refresh,
            soa_retry: dto.soa_retry,
            use_grid_zone_timer: dto.use_grid_zone_timer,
            allow_query: flatten_acl(dto.allow_query),
            use_allow_query: dto.use_allow_query,
            allow_transfer: flatten_acl(dto.allow_transfer),
            use_allow_transfer: dto.use_allow_transfer,
            allow_update: flatten_acl(dto.allow_update),
            dnssec_key_params: dto.dnssec_key_params,
            use_dnssec_key_params: dto.use_dnssec_key_params,
            grid_primary: dto.grid_primary,
            extattrs: None,
            extattrs_all: None,
            display_domain: dto.display_domain,
            dns_fqdn: dto.dns_fqdn,
        }
    }

    fn take_ext_attrs(dto: &mut ZoneAuthDto) -> WapiExtAttrs {
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

/// Validate the zone name against its format: an FQDN for forward zones, a
/// network of the matching address family for reverse zones.
fn validate_zone_name(fqdn: &str, format: ZoneFormat) -> Result<(), String> {
    let ipv6 = match format {
        ZoneFormat::Forward => return validate_fqdn(fqdn),
        ZoneFormat::Ipv4 => false,
        ZoneFormat::Ipv6 => true,
    };
    let (network, prefix) = fqdn
        .split_once('/')
        .ok_or_else(|| format!("'{fqdn}' must be a network in CIDR notation for reverse zones"))?;
    let address: IpAddr = network
        .parse()
        .map_err(|_| format!("'{fqdn}' is not a valid network"))?;
    if address.is_ipv6() != ipv6 {
        return Err(format!(
            "'{fqdn}' does not match zone_format {}",
            if ipv6 { "IPV6" } else { "IPV4" }
        ));
    }
    let max = if ipv6 { 128 } else { 32 };
    let bits: u8 = prefix
        .parse()
        .map_err(|_| format!("'{fqdn}' has an invalid prefix length"))?;
    if bits > max {
        return Err(format!("'{fqdn}' prefix length must be at most {max}"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "zone_auth_tests.rs"]
mod zone_auth_tests;
