// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP error code mapping to diagnostic reasons.
//!
//! This module maps HTTP status codes from the NIOS WAPI to standardized reasons
//! and turns [`WapiError`]s into user-facing [`Diagnostic`]s, so every handler
//! reports upstream failures the same way.
//!
//! # Usage
//!
//! ```rust
//! use nios_dns::http_errors::map_http_error_to_reason;
//!
//! let (reason, message) = map_http_error_to_reason(404);
//! assert_eq!(reason, "ObjectNotFound");
//!
//! let (reason, message) = map_http_error_to_reason(500);
//! assert_eq!(reason, "WapiInternalError");
//! ```

use crate::diagnostics::{Diagnostic, SUMMARY_CLIENT_ERROR};
use crate::errors::WapiError;

/// The request was malformed or rejected by WAPI validation (400).
pub const REASON_WAPI_BAD_REQUEST: &str = "WapiBadRequest";

/// Credentials were rejected or lack permission (401/403).
pub const REASON_WAPI_AUTH_FAILED: &str = "WapiAuthFailed";

/// The referenced object does not exist (404).
pub const REASON_OBJECT_NOT_FOUND: &str = "ObjectNotFound";

/// The grid master failed internally (500).
pub const REASON_WAPI_INTERNAL_ERROR: &str = "WapiInternalError";

/// The WAPI version does not support the operation (501).
pub const REASON_WAPI_NOT_IMPLEMENTED: &str = "WapiNotImplemented";

/// A proxy or load balancer in front of the grid master failed (502/503/504).
pub const REASON_GATEWAY_ERROR: &str = "GatewayError";

/// The grid master could not be reached or answered unexpectedly.
pub const REASON_WAPI_UNREACHABLE: &str = "WapiUnreachable";

/// Map HTTP status code to reason and message.
///
/// # HTTP Code Mapping
///
/// | HTTP Code | Reason | Meaning |
/// |-----------|--------|---------|
/// | 400 | `WapiBadRequest` | Invalid request or data conflict |
/// | 401 | `WapiAuthFailed` | Authentication required |
/// | 403 | `WapiAuthFailed` | Insufficient permissions |
/// | 404 | `ObjectNotFound` | Object not found |
/// | 500 | `WapiInternalError` | Internal server error |
/// | 501 | `WapiNotImplemented` | Unsupported by this WAPI version |
/// | 502 | `GatewayError` | Bad gateway |
/// | 503 | `GatewayError` | Service unavailable |
/// | 504 | `GatewayError` | Gateway timeout |
/// | Other | `WapiUnreachable` | Unexpected error |
#[must_use]
pub fn map_http_error_to_reason(status_code: u16) -> (&'static str, String) {
    match status_code {
        400 => (
            REASON_WAPI_BAD_REQUEST,
            "Invalid request to NIOS WAPI (400)".into(),
        ),
        401 => (
            REASON_WAPI_AUTH_FAILED,
            "NIOS WAPI authentication required (401)".into(),
        ),
        403 => (
            REASON_WAPI_AUTH_FAILED,
            "NIOS WAPI authorization failed (403)".into(),
        ),
        404 => (
            REASON_OBJECT_NOT_FOUND,
            "Object not found on the grid (404)".into(),
        ),
        500 => (
            REASON_WAPI_INTERNAL_ERROR,
            "NIOS WAPI internal error (500)".into(),
        ),
        501 => (
            REASON_WAPI_NOT_IMPLEMENTED,
            "Operation not supported by this WAPI version (501)".into(),
        ),
        502 => (
            REASON_GATEWAY_ERROR,
            "Bad gateway reaching the grid master (502)".into(),
        ),
        503 => (
            REASON_GATEWAY_ERROR,
            "Grid master unavailable (503)".into(),
        ),
        504 => (
            REASON_GATEWAY_ERROR,
            "Gateway timeout reaching the grid master (504)".into(),
        ),
        _ => (
            REASON_WAPI_UNREACHABLE,
            format!("Unexpected HTTP error from NIOS WAPI ({status_code})"),
        ),
    }
}

/// Map a connection failure (no HTTP status received) to reason and message.
#[must_use]
pub fn map_connection_error() -> (&'static str, String) {
    (
        REASON_WAPI_UNREACHABLE,
        "Cannot connect to the NIOS grid master".into(),
    )
}

/// Build the diagnostic reported when a WAPI call made on behalf of a resource fails.
///
/// # Arguments
///
/// * `operation` - Verb describing the handler step (`create`, `read`, `update`, `delete`)
/// * `resource_type` - Resource type name (e.g. `nios_dns_record_cname`)
/// * `error` - The error returned by the client
#[must_use]
pub fn wapi_error_diagnostic(operation: &str, resource_type: &str, error: &WapiError) -> Diagnostic {
    let (reason, message) = match error.status_code() {
        Some(status) => map_http_error_to_reason(status),
        None => map_connection_error(),
    };

    Diagnostic::error(
        SUMMARY_CLIENT_ERROR,
        format!("Unable to {operation} {resource_type}, got error: {error} ({reason}: {message})"),
    )
}

#[cfg(test)]
#[path = "http_errors_tests.rs"]
mod http_errors_tests;
