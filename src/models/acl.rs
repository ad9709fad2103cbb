// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Access-control entries (`allow_query`, `allow_transfer`, `allow_update`).
//!
//! NIOS mixes two struct kinds in the same list, discriminated on the wire by
//! `_struct`:
//!
//! - `addressac`: an address or network with `ALLOW`/`DENY` permission
//! - `tsigac`: a TSIG key, either inline or by key name
//!
//! In managed state the discriminator is the `struct` attribute.
//!
//! # Example
//!
//! ```rust
//! use nios_dns::models::acl::{AclEntry, AclPermission};
//!
//! let entries: Vec<AclEntry> = serde_json::from_value(serde_json::json!([
//!     {"struct": "addressac", "address": "10.0.0.0/8"},
//!     {"struct": "addressac", "address": "Any", "permission": "DENY"},
//! ])).unwrap();
//!
//! assert_eq!(
//!     entries[0],
//!     AclEntry::Address { address: "10.0.0.0/8".to_string(), permission: AclPermission::Allow }
//! );
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostics, SUMMARY_MISSING_ATTRIBUTE};
use crate::validation::{check, validate_acl_address, validate_fqdn, validate_not_blank};

/// Permission granted by an address entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum AclPermission {
    #[default]
    Allow,
    Deny,
}

/// TSIG key algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum TsigAlgorithm {
    #[default]
    #[serde(rename = "HMAC-MD5")]
    HmacMd5,
    #[serde(rename = "HMAC-SHA256")]
    HmacSha256,
}

/// One access-control entry in managed state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "struct")]
pub enum AclEntry {
    /// Address or network match.
    #[serde(rename = "addressac")]
    Address {
        /// IPv4/IPv6 address, CIDR network, or `Any`.
        address: String,
        /// Defaults to `ALLOW`.
        #[serde(default)]
        permission: AclPermission,
    },
    /// TSIG key match.
    #[serde(rename = "tsigac")]
    TsigKey {
        /// Base64 key secret. Required unless `use_tsig_key_name` is set.
        #[serde(default)]
        tsig_key: Option<String>,
        /// Defaults to `HMAC-MD5`.
        #[serde(default)]
        tsig_key_alg: TsigAlgorithm,
        /// Key name (FQDN).
        #[serde(default)]
        tsig_key_name: Option<String>,
        /// Match by key name only, without the secret.
        #[serde(default)]
        use_tsig_key_name: bool,
    },
}

/// One access-control entry on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_struct")]
pub enum AclEntryDto {
    #[serde(rename = "addressac")]
    Address {
        address: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        permission: Option<AclPermission>,
    },
    #[serde(rename = "tsigac")]
    TsigKey {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tsig_key: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tsig_key_alg: Option<TsigAlgorithm>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tsig_key_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        use_tsig_key_name: Option<bool>,
    },
}

impl AclEntry {
    /// Validate one entry; `attribute` is the list attribute path (e.g. `allow_transfer[0]`).
    pub fn validate(&self, attribute: &str, diags: &mut Diagnostics) {
        match self {
            Self::Address { address, .. } => {
                check(
                    diags,
                    &format!("{attribute}.address"),
                    validate_acl_address(address),
                );
            }
            Self::TsigKey {
                tsig_key,
                tsig_key_name,
                use_tsig_key_name,
                ..
            } => {
                if *use_tsig_key_name {
                    match tsig_key_name {
                        Some(name) => check(
                            diags,
                            &format!("{attribute}.tsig_key_name"),
                            validate_fqdn(name),
                        ),
                        None => diags.add_attribute_error(
                            format!("{attribute}.tsig_key_name"),
                            SUMMARY_MISSING_ATTRIBUTE,
                            "tsig_key_name is required when use_tsig_key_name is true",
                        ),
                    }
                } else {
                    match tsig_key {
                        Some(key) => check(
                            diags,
                            &format!("{attribute}.tsig_key"),
                            validate_not_blank(key),
                        ),
                        None => diags.add_attribute_error(
                            format!("{attribute}.tsig_key"),
                            SUMMARY_MISSING_ATTRIBUTE,
                            "tsig_key is required unless use_tsig_key_name is true",
                        ),
                    }
                }
            }
        }
    }
}

/// Validate every entry of an ACL list attribute.
pub fn validate_acl(attribute: &str, entries: Option<&Vec<AclEntry>>, diags: &mut Diagnostics) {
    for (index, entry) in entries.into_iter().flatten().enumerate() {
        entry.validate(&format!("{attribute}[{index}]"), diags);
    }
}

/// Convert a managed ACL entry to its wire form.
#[must_use]
pub fn expand_acl_entry(entry: &AclEntry) -> AclEntryDto {
    match entry {
        AclEntry::Address {
            address,
            permission,
        } => AclEntryDto::Address {
            address: address.clone(),
            permission: Some(*permission),
        },
        AclEntry::TsigKey {
            tsig_key,
            tsig_key_alg,
            tsig_key_name,
            use_tsig_key_name,
        } => AclEntryDto::TsigKey {
            tsig_key: tsig_key.clone(),
            tsig_key_alg: Some(*tsig_key_alg),
            tsig_key_name: tsig_key_name.clone(),
            use_tsig_key_name: Some(*use_tsig_key_name),
        },
    }
}

/// Convert a wire ACL entry to its managed form, filling NIOS defaults.
#[must_use]
pub fn flatten_acl_entry(entry: AclEntryDto) -> AclEntry {
    match entry {
        AclEntryDto::Address {
            address,
            permission,
        } => AclEntry::Address {
            address,
            permission: permission.unwrap_or_default(),
        },
        AclEntryDto::TsigKey {
            tsig_key,
            tsig_key_alg,
            tsig_key_name,
            use_tsig_key_name,
        } => AclEntry::TsigKey {
            tsig_key,
            tsig_key_alg: tsig_key_alg.unwrap_or_default(),
            tsig_key_name,
            use_tsig_key_name: use_tsig_key_name.unwrap_or(false),
        },
    }
}

/// Expand an optional ACL list.
#[must_use]
pub fn expand_acl(entries: Option<&Vec<AclEntry>>) -> Option<Vec<AclEntryDto>> {
    entries.map(|list| list.iter().map(expand_acl_entry).collect())
}

/// Flatten an optional ACL list.
#[must_use]
pub fn flatten_acl(entries: Option<Vec<AclEntryDto>>) -> Option<Vec<AclEntry>> {
    entries.map(|list| list.into_iter().map(flatten_acl_entry).collect())
}

#[cfg(test)]
#[path = "acl_tests.rs"]
mod acl_tests;
