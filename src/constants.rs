// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the NIOS DNS provider.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// WAPI Constants
// ============================================================================

/// Default WAPI version used when none is configured
pub const DEFAULT_WAPI_VERSION: &str = "v2.13.6";

/// Path prefix of every WAPI endpoint
pub const WAPI_PATH_PREFIX: &str = "wapi";

/// Query parameter that wraps every response in `{"result": ...}`
pub const WAPI_RETURN_AS_OBJECT: &str = "_return_as_object";

/// Query parameter that adds fields to the default return set
pub const WAPI_RETURN_FIELDS_PLUS: &str = "_return_fields+";

/// Prefix marking an extensible-attribute search filter (`*Site=NYC`)
pub const WAPI_EXTATTR_FILTER_PREFIX: &str = "*";

/// Key under which NIOS reports where an inherited extensible attribute comes from
pub const WAPI_INHERITANCE_SOURCE: &str = "inheritance_source";

/// Key holding an extensible attribute's value on the wire
pub const WAPI_EXTATTR_VALUE: &str = "value";

// ============================================================================
// WAPI Object Types
// ============================================================================

/// Authoritative zone object
pub const OBJECT_ZONE_AUTH: &str = "zone_auth";

/// CNAME record object
pub const OBJECT_RECORD_CNAME: &str = "record:cname";

/// Shared record group object
pub const OBJECT_SHARED_RECORD_GROUP: &str = "sharedrecordgroup";

// ============================================================================
// Resource Type Names
// ============================================================================

/// Resource type name for authoritative zones
pub const RESOURCE_ZONE_AUTH: &str = "nios_dns_zone_auth";

/// Resource type name for CNAME records
pub const RESOURCE_RECORD_CNAME: &str = "nios_dns_record_cname";

/// Resource type name for shared record groups
pub const RESOURCE_SHARED_RECORD_GROUP: &str = "nios_dns_shared_record_group";

// ============================================================================
// DNS Constants
// ============================================================================

/// DNS view used when a resource does not name one
pub const DEFAULT_DNS_VIEW: &str = "default";

/// Largest TTL NIOS accepts (2^31 - 1 seconds)
pub const MAX_TTL_SECS: u32 = 2_147_483_647;

/// Maximum length of a fully qualified domain name
pub const MAX_FQDN_LENGTH: usize = 253;

/// Maximum length of a single DNS label
pub const MAX_LABEL_LENGTH: usize = 63;

/// Maximum length of a WAPI comment field
pub const MAX_COMMENT_LENGTH: usize = 256;

// ============================================================================
// HTTP Client Constants
// ============================================================================

/// Default request timeout for WAPI calls (1 minute)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Default maximum time spent retrying a single WAPI call (2 minutes)
pub const DEFAULT_MAX_RETRY_ELAPSED_SECS: u64 = 120;

/// First delay between WAPI retries
pub const RETRY_INITIAL_DELAY_MILLIS: u64 = 50;

/// Ceiling on the delay between WAPI retries
pub const RETRY_MAX_DELAY_SECS: u64 = 10;

/// Jitter applied to every retry delay (±10%)
pub const RETRY_JITTER: f64 = 0.1;

// ============================================================================
// State Constants
// ============================================================================

/// Version written into state files
pub const STATE_FORMAT_VERSION: u32 = 1;

/// Default state file path used by the CLI
pub const DEFAULT_STATE_FILE: &str = "nios-dns.state.json";

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 2;
