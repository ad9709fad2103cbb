// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the NIOS DNS provider.
//!
//! This module provides specialized error types for:
//! - WAPI HTTP operations (object create, read, update, delete, search)
//! - Conversion between the WAPI wire format and managed models
//! - Provider configuration
//! - State file persistence
//!
//! Handlers never surface these directly to users; they are folded into
//! [`Diagnostics`](crate::diagnostics::Diagnostics) with a stable summary.

use thiserror::Error;

use crate::wapi::retry::is_transient_status;

/// Errors that can occur while talking to the NIOS WAPI.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WapiError {
    /// Object not found (HTTP 404 from the WAPI)
    ///
    /// Returned when the referenced object no longer exists on the grid. Read and
    /// delete handlers treat this as "already absent".
    #[error("WAPI object '{reference}' not found on {host} (HTTP 404)")]
    NotFound {
        /// The object reference (`_ref`) or object type that was requested
        reference: String,
        /// The grid master host that returned the error
        host: String,
    },

    /// The WAPI answered with a non-success status code
    ///
    /// NIOS error bodies look like
    /// `{"Error": "AdmConDataError: ...", "code": "Client.Ibap.Data", "text": "..."}`;
    /// `code` and `text` are taken from that body when present.
    #[error("WAPI {method} {object} failed with HTTP {status}: {text}")]
    Api {
        /// HTTP method of the failed request
        method: String,
        /// Object type or reference addressed by the request
        object: String,
        /// HTTP status code
        status: u16,
        /// WAPI error code (e.g. `Client.Ibap.Data.Conflict`)
        code: Option<String>,
        /// Human-readable error text
        text: String,
    },

    /// HTTP connection failed (network unreachable, connection refused, TLS failure)
    #[error("HTTP connection to {host} failed: {reason}")]
    Connection {
        /// The grid master host that couldn't be reached
        host: String,
        /// Reason for the connection failure
        reason: String,
    },

    /// HTTP request timeout
    #[error("HTTP request to {host} timed out after {timeout_ms}ms")]
    Timeout {
        /// The grid master host that timed out
        host: String,
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// The response body could not be decoded into the expected DTO
    #[error("Failed to decode WAPI response for {object}: {reason}")]
    Decode {
        /// Object type or reference addressed by the request
        object: String,
        /// Decoder error message
        reason: String,
    },

    /// A request URL could not be built
    #[error("Invalid WAPI URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL or path
        url: String,
        /// Parser error message
        reason: String,
    },

    /// Retrying a transient failure ran out of time
    #[error("WAPI request gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Message of the last transient error
        last_error: String,
    },
}

impl WapiError {
    /// Returns `true` when the error means the object does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// HTTP status code carried by the error, if any.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` for transient failures worth retrying
    /// (HTTP 429/500/502/503/504, connection failures and timeouts).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api { status, .. } => is_transient_status(*status),
            Self::Connection { .. } | Self::Timeout { .. } => true,
            _ => false,
        }
    }
}

/// Errors converting between the WAPI wire format and managed models.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// An extensible attribute entry is not a JSON object
    #[error("Extensible attribute '{name}' is malformed: expected an object, found {found}")]
    MalformedExtAttr {
        /// Attribute name
        name: String,
        /// JSON rendering of what was found instead
        found: String,
    },

    /// An extensible attribute entry has no `value` key
    #[error("Extensible attribute '{name}' has no value")]
    MissingExtAttrValue {
        /// Attribute name
        name: String,
    },

    /// An extensible attribute value is not text, an integer or a list of those
    #[error("Extensible attribute '{name}' has an unsupported value: {found}")]
    UnsupportedExtAttrValue {
        /// Attribute name
        name: String,
        /// JSON rendering of the offending value
        found: String,
    },

    /// A managed model could not be decoded from or encoded to JSON
    #[error("Failed to convert {resource_type} attributes: {reason}")]
    Model {
        /// Resource type name (e.g. `nios_dns_record_cname`)
        resource_type: String,
        /// Decoder error message
        reason: String,
    },
}

/// Errors in provider configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting was not supplied
    #[error("Missing required provider setting '{field}' (set {env_var})")]
    MissingField {
        /// Setting name
        field: String,
        /// Environment variable that supplies it
        env_var: String,
    },

    /// A setting has an invalid value
    #[error("Invalid provider setting '{field}': {reason}")]
    InvalidValue {
        /// Setting name
        field: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {reason}")]
    HttpClient {
        /// Builder error message
        reason: String,
    },
}

/// Errors reading or writing the state file.
#[derive(Error, Debug)]
pub enum StateError {
    /// Filesystem error
    #[error("State file {path}: {source}")]
    Io {
        /// Path of the state file
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The state file is not valid JSON of the expected shape
    #[error("State file {path} is corrupt: {reason}")]
    Corrupt {
        /// Path of the state file
        path: String,
        /// Decoder error message
        reason: String,
    },

    /// The state file was written by an incompatible version
    #[error("State file {path} has unsupported version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Path of the state file
        path: String,
        /// Version found in the file
        found: u32,
        /// Version this build writes
        expected: u32,
    },
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
