// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Attribute validators shared by all resource schemas.
//!
//! Each validator returns `Err(reason)` describing what is wrong; models collect
//! failures into [`Diagnostics`] with [`check`] so that every problem in a
//! configuration is reported at once instead of only the first.

use std::net::IpAddr;

use crate::constants::{MAX_COMMENT_LENGTH, MAX_FQDN_LENGTH, MAX_LABEL_LENGTH, MAX_TTL_SECS};
use crate::diagnostics::{Diagnostics, SUMMARY_INVALID_ATTRIBUTE, SUMMARY_MISSING_ATTRIBUTE};
use crate::extattrs::ExtAttrs;

/// Record `result` against `attribute` in `diags` if it failed.
pub fn check(diags: &mut Diagnostics, attribute: &str, result: Result<(), String>) {
    if let Err(reason) = result {
        diags.add_attribute_error(attribute, SUMMARY_INVALID_ATTRIBUTE, reason);
    }
}

/// Require an attribute to be configured, returning it for further checks.
pub fn require<'a, T>(diags: &mut Diagnostics, attribute: &str, value: Option<&'a T>) -> Option<&'a T> {
    if value.is_none() {
        diags.add_attribute_error(
            attribute,
            SUMMARY_MISSING_ATTRIBUTE,
            format!("The attribute '{attribute}' is required"),
        );
    }
    value
}

/// Validate a fully qualified domain name (trailing dot optional).
///
/// Labels may contain letters, digits, hyphens and underscores (for service
/// names like `_sip._tcp`), must not start or end with a hyphen and must be at
/// most 63 characters. A single `*` label is allowed in the leftmost position.
///
/// # Errors
///
/// Returns a description of the first violated rule.
pub fn validate_fqdn(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err("must not be empty".to_string());
    }
    if value != value.trim() {
        return Err("must not contain leading or trailing whitespace".to_string());
    }
    let name = value.strip_suffix('.').unwrap_or(value);
    if name.len() > MAX_FQDN_LENGTH {
        return Err(format!(
            "must be at most {MAX_FQDN_LENGTH} characters, got {}",
            name.len()
        ));
    }
    if name.chars().any(char::is_uppercase) {
        return Err(format!("'{value}' must be lowercase"));
    }

    for (index, label) in name.split('.').enumerate() {
        if label.is_empty() {
            return Err(format!("'{value}' contains an empty label"));
        }
        if label == "*" && index == 0 {
            continue;
        }
        if label.len() > MAX_LABEL_LENGTH {
            return Err(format!(
                "label '{label}' must be at most {MAX_LABEL_LENGTH} characters"
            ));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(format!("label '{label}' must not start or end with '-'"));
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(format!("label '{label}' contains invalid characters"));
        }
    }
    Ok(())
}

/// Validate a TTL in seconds.
///
/// # Errors
///
/// Returns an error if the TTL exceeds 2^31 - 1.
pub fn validate_ttl(ttl: u32) -> Result<(), String> {
    if ttl > MAX_TTL_SECS {
        return Err(format!("must be between 0 and {MAX_TTL_SECS}, got {ttl}"));
    }
    Ok(())
}

/// Validate a free-text comment.
///
/// # Errors
///
/// Returns an error if the comment is too long or has surrounding whitespace.
pub fn validate_comment(comment: &str) -> Result<(), String> {
    if comment.chars().count() > MAX_COMMENT_LENGTH {
        return Err(format!("must be at most {MAX_COMMENT_LENGTH} characters"));
    }
    validate_trimmed(comment)
}

/// Reject strings with leading or trailing whitespace.
///
/// # Errors
///
/// Returns an error if trimming would change the value.
pub fn validate_trimmed(value: &str) -> Result<(), String> {
    if value != value.trim() {
        return Err("must not contain leading or trailing whitespace".to_string());
    }
    Ok(())
}

/// Reject empty or whitespace-only strings.
///
/// # Errors
///
/// Returns an error if the value is blank.
pub fn validate_not_blank(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err("must not be empty".to_string());
    }
    validate_trimmed(value)
}

/// Require `value` to be one of `allowed`.
///
/// # Errors
///
/// Returns an error listing the accepted values.
pub fn validate_one_of(value: &str, allowed: &[&str]) -> Result<(), String> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "must be one of [{}], got '{value}'",
            allowed.join(", ")
        ))
    }
}

/// Require `value` to lie in `min..=max`.
///
/// # Errors
///
/// Returns an error describing the accepted range.
pub fn validate_range<T>(value: T, min: T, max: T) -> Result<(), String>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if value < min || value > max {
        return Err(format!("must be between {min} and {max}, got {value}"));
    }
    Ok(())
}

/// Validate an access-control address: an IP address, a CIDR network, or `Any`.
///
/// # Errors
///
/// Returns an error if the address cannot be parsed or the prefix is out of range.
pub fn validate_acl_address(address: &str) -> Result<(), String> {
    if address == "Any" {
        return Ok(());
    }
    let (ip, prefix) = match address.split_once('/') {
        Some((ip, prefix)) => (ip, Some(prefix)),
        None => (address, None),
    };
    let ip: IpAddr = ip
        .parse()
        .map_err(|_| format!("'{address}' is not a valid IP address or network"))?;
    if let Some(prefix) = prefix {
        let max = if ip.is_ipv4() { 32 } else { 128 };
        let bits: u8 = prefix
            .parse()
            .map_err(|_| format!("'{address}' has an invalid prefix length"))?;
        if bits > max {
            return Err(format!("'{address}' prefix length must be at most {max}"));
        }
    }
    Ok(())
}

/// Validate extensible attribute names.
///
/// # Errors
///
/// Returns an error naming the first blank or untrimmed attribute name.
pub fn validate_ext_attr_names(attrs: &ExtAttrs) -> Result<(), String> {
    for name in attrs.keys() {
        if name.trim().is_empty() {
            return Err("extensible attribute names must not be empty".to_string());
        }
        if name != name.trim() {
            return Err(format!(
                "extensible attribute name '{name}' must not contain leading or trailing whitespace"
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod validation_tests;
