// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Extensible-attribute reconciliation.
//!
//! NIOS objects carry free-form key/value metadata ("extensible attributes").
//! Some of those attributes are declared by the user on the resource itself;
//! others are inherited from a parent scope (zone, network, view) and show up
//! on every read. Each managed resource therefore keeps two views in state:
//!
//! - `extattrs`: what the user declared. Never contains inherited keys.
//! - `extattrs_all`: everything the WAPI returned on the last read.
//!
//! The WAPI replaces the whole attribute set on update, so inherited keys must be
//! sent back with every write or the grid would treat their absence as a
//! deletion. The two operations below implement that contract:
//!
//! - [`remove_inherited_ext_attrs`] runs after every create/read/update response.
//! - [`add_inherited_ext_attrs`] runs before every update request.
//!
//! # Example
//!
//! ```rust
//! use nios_dns::extattrs::{add_inherited_ext_attrs, remove_inherited_ext_attrs, ExtAttrs};
//! use serde_json::json;
//!
//! let declared: ExtAttrs = serde_json::from_value(json!({"Site": "NYC"})).unwrap();
//! let live = serde_json::from_value(json!({
//!     "Site": {"value": "NYC"},
//!     "Owner": {"value": "infra-team", "inheritance_source": {"_ref": "zone_auth/ZG5z:example.com/default"}}
//! })).unwrap();
//!
//! let split = remove_inherited_ext_attrs(&declared, &live).unwrap();
//! assert_eq!(split.declared, declared);
//! assert_eq!(split.all.len(), 2);
//!
//! let request = add_inherited_ext_attrs(&declared, &split.all);
//! assert_eq!(request.len(), 2);
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, trace};

use crate::constants::{WAPI_EXTATTR_VALUE, WAPI_INHERITANCE_SOURCE};
use crate::errors::ConversionError;

/// Extensible attributes as kept in managed state, keyed by attribute name.
pub type ExtAttrs = BTreeMap<String, ExtAttrValue>;

/// Extensible attributes exactly as the WAPI sends them:
/// `{"Site": {"value": "NYC", "inheritance_source": {...}}}`.
///
/// Entries stay untyped until [`flatten_ext_attrs`] so that a malformed entry is
/// reported as a conversion error instead of failing the whole response decode.
pub type WapiExtAttrs = BTreeMap<String, Value>;

/// Value of a single extensible attribute.
///
/// NIOS attribute definitions are typed (STRING, INTEGER, EMAIL, URL, DATE, ENUM)
/// and may allow multiple values. Everything except INTEGER travels as text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ExtAttrValue {
    /// INTEGER attribute
    Integer(i64),
    /// STRING, EMAIL, URL, DATE or ENUM attribute
    Text(String),
    /// Multi-valued attribute
    List(Vec<ExtAttrScalar>),
}

/// One member of a multi-valued attribute.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ExtAttrScalar {
    Integer(i64),
    Text(String),
}

impl fmt::Display for ExtAttrScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&ExtAttrScalar> for Value {
    fn from(scalar: &ExtAttrScalar) -> Self {
        match scalar {
            ExtAttrScalar::Integer(i) => Value::from(*i),
            ExtAttrScalar::Text(s) => Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for ExtAttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::List(values) => {
                let members: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", members.join(", "))
            }
        }
    }
}

impl From<&str> for ExtAttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ExtAttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ExtAttrValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl ExtAttrValue {
    fn to_wire(&self) -> Value {
        match self {
            Self::Integer(i) => Value::from(*i),
            Self::Text(s) => Value::from(s.as_str()),
            Self::List(values) => Value::Array(values.iter().map(Value::from).collect()),
        }
    }

    fn from_wire(name: &str, value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::String(s) => Ok(Self::Text(s.clone())),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .ok_or_else(|| unsupported(name, value)),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(ExtAttrScalar::Text(s.clone())),
                    Value::Number(n) => n
                        .as_i64()
                        .map(ExtAttrScalar::Integer)
                        .ok_or_else(|| unsupported(name, value)),
                    _ => Err(unsupported(name, value)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
            _ => Err(unsupported(name, value)),
        }
    }
}

fn unsupported(name: &str, value: &Value) -> ConversionError {
    ConversionError::UnsupportedExtAttrValue {
        name: name.to_string(),
        found: value.to_string(),
    }
}

/// Result of [`remove_inherited_ext_attrs`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtAttrSplit {
    /// Attributes safe to store in the user-visible `extattrs` field.
    pub declared: ExtAttrs,
    /// Every live attribute, declared and inherited, for `extattrs_all`.
    pub all: ExtAttrs,
}

/// Convert the wire representation into typed attributes.
///
/// # Errors
///
/// Returns a [`ConversionError`] if an entry is not an object, has no `value`,
/// or holds a value that is not text, an integer, or a list of those.
pub fn flatten_ext_attrs(raw: &WapiExtAttrs) -> Result<ExtAttrs, ConversionError> {
    raw.iter()
        .map(|(name, entry)| -> Result<(String, ExtAttrValue), ConversionError> {
            let object = entry
                .as_object()
                .ok_or_else(|| ConversionError::MalformedExtAttr {
                    name: name.clone(),
                    found: entry.to_string(),
                })?;
            let value = object.get(WAPI_EXTATTR_VALUE).ok_or_else(|| {
                ConversionError::MissingExtAttrValue { name: name.clone() }
            })?;
            Ok((name.clone(), ExtAttrValue::from_wire(name, value)?))
        })
        .collect()
}

/// Convert typed attributes into the wire representation sent on create/update.
#[must_use]
pub fn expand_ext_attrs(attrs: &ExtAttrs) -> WapiExtAttrs {
    attrs
        .iter()
        .map(|(name, value)| {
            let mut entry = Map::new();
            entry.insert(WAPI_EXTATTR_VALUE.to_string(), value.to_wire());
            (name.clone(), Value::Object(entry))
        })
        .collect()
}

/// Keys the WAPI marks as inherited via `inheritance_source`.
///
/// Only used on import, where there is no prior declaration to partition by.
#[must_use]
pub fn inherited_keys(raw: &WapiExtAttrs) -> BTreeSet<String> {
    raw.iter()
        .filter(|(_, entry)| {
            entry
                .get(WAPI_INHERITANCE_SOURCE)
                .is_some_and(|source| !source.is_null())
        })
        .map(|(name, _)| name.clone())
        .collect()
}

/// Split the live attribute set into the declared part and the full snapshot.
///
/// Keys present in `prior_declared` are kept, with the value taken from the live
/// response. Every other key is treated as inherited: it is left out of
/// `declared` but kept in `all` so the next update can send it back.
///
/// A key the user declared but the WAPI no longer returns is dropped from both
/// views; the next plan will declare it again.
///
/// # Errors
///
/// Returns a [`ConversionError`] if the live set cannot be converted. Callers must
/// abort the current operation and leave prior state untouched.
pub fn remove_inherited_ext_attrs(
    prior_declared: &ExtAttrs,
    live_all: &WapiExtAttrs,
) -> Result<ExtAttrSplit, ConversionError> {
    let all = flatten_ext_attrs(live_all)?;

    let declared: ExtAttrs = all
        .iter()
        .filter(|(name, _)| prior_declared.contains_key(*name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    for name in prior_declared.keys().filter(|k| !all.contains_key(*k)) {
        debug!(
            attribute = %name,
            "Declared extensible attribute missing from WAPI response, treating as deleted"
        );
    }
    trace!(
        declared = declared.len(),
        inherited = all.len() - declared.len(),
        "Partitioned extensible attributes"
    );

    Ok(ExtAttrSplit { declared, all })
}

/// Merge inherited attributes back into the declared set for a write request.
///
/// The result holds every key of `declared` and `stored_all`; on a key present in
/// both, the declared value wins. Pure and idempotent.
#[must_use]
pub fn add_inherited_ext_attrs(declared: &ExtAttrs, stored_all: &ExtAttrs) -> ExtAttrs {
    let mut merged = declared.clone();
    for (name, value) in stored_all {
        merged
            .entry(name.clone())
            .or_insert_with(|| value.clone());
    }
    merged
}

/// Drop from `snapshot` the keys that were declared before and are no longer declared.
///
/// Without this, an attribute the user removes from configuration would still be
/// in `extattrs_all` and [`add_inherited_ext_attrs`] would send it back as if it
/// were inherited, so it could never be deleted.
#[must_use]
pub fn retract_removed_ext_attrs(
    snapshot: &ExtAttrs,
    prior_declared: &ExtAttrs,
    declared: &ExtAttrs,
) -> ExtAttrs {
    snapshot
        .iter()
        .filter(|(name, _)| !(prior_declared.contains_key(*name) && !declared.contains_key(*name)))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Attributes that are not marked inherited, for seeding `extattrs` on import.
///
/// # Errors
///
/// Returns a [`ConversionError`] if the live set cannot be converted.
pub fn declared_from_live(live_all: &WapiExtAttrs) -> Result<ExtAttrs, ConversionError> {
    let inherited = inherited_keys(live_all);
    let all = flatten_ext_attrs(live_all)?;
    Ok(all
        .into_iter()
        .filter(|(name, _)| !inherited.contains(name))
        .collect())
}

/// Map the declared view back to a nullable state value.
///
/// An unset `extattrs` in configuration must stay unset in state when nothing is
/// declared; an explicitly empty map stays an empty map.
#[must_use]
pub fn declared_for_state(configured: Option<&ExtAttrs>, declared: ExtAttrs) -> Option<ExtAttrs> {
    match configured {
        None if declared.is_empty() => None,
        _ => Some(declared),
    }
}

#[cfg(test)]
#[path = "extattrs_tests.rs"]
mod extattrs_tests;
