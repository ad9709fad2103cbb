// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNSSEC key parameters of an authoritative zone (`dnssec_key_params`).
//!
//! The managed representation and the WAPI `dnsseckeyparams` struct share field
//! names, so one type serves both sides; unset fields are omitted from requests.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostics, SUMMARY_INVALID_ATTRIBUTE};
use crate::validation::{check, validate_range};

/// Largest NSEC3 salt length in octets.
const MAX_NSEC3_SALT_LENGTH: u32 = 256;

/// Largest NSEC3 iteration count accepted by NIOS.
const MAX_NSEC3_ITERATIONS: u32 = 2500;

/// RSA key size bounds in bits.
const MIN_RSA_KEY_SIZE: u32 = 512;
const MAX_RSA_KEY_SIZE: u32 = 4096;

/// DNSSEC signing algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum DnssecAlgorithm {
    #[serde(rename = "RSASHA1")]
    RsaSha1,
    #[serde(rename = "RSASHA256")]
    RsaSha256,
    #[serde(rename = "RSASHA512")]
    RsaSha512,
    #[serde(rename = "ECDSAP256SHA256")]
    EcdsaP256Sha256,
    #[serde(rename = "ECDSAP384SHA384")]
    EcdsaP384Sha384,
    #[serde(rename = "NSEC3RSASHA1")]
    Nsec3RsaSha1,
}

impl DnssecAlgorithm {
    /// Fixed key size for curve algorithms, `None` for RSA variants.
    #[must_use]
    pub fn fixed_size(self) -> Option<u32> {
        match self {
            Self::EcdsaP256Sha256 => Some(256),
            Self::EcdsaP384Sha384 => Some(384),
            _ => None,
        }
    }
}

/// Algorithm and key size pair used for KSK or ZSK generation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DnssecKeyAlgorithm {
    pub algorithm: DnssecAlgorithm,
    /// Key size in bits.
    pub size: u32,
}

/// How KSK rollover events are notified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KskRolloverNotification {
    All,
    None,
    RequireManualIntervention,
}

/// Authenticated denial-of-existence mechanism.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum NextSecureType {
    Nsec,
    Nsec3,
}

/// ZSK rollover method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZskRolloverMechanism {
    PrePublish,
    DoubleSign,
}

/// DNSSEC key parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DnssecKeyParams {
    /// Roll the KSK over automatically.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_ksk_auto_rollover: Option<bool>,

    /// KSK algorithms, in preference order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ksk_algorithms: Option<Vec<DnssecKeyAlgorithm>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ksk_email_notification_enabled: Option<bool>,

    /// KSK rollover interval in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ksk_rollover: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ksk_rollover_notification_config: Option<KskRolloverNotification>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ksk_snmp_notification_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_secure_type: Option<NextSecureType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(max = 2500))]
    pub nsec3_iterations: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 1, max = 256))]
    pub nsec3_salt_max_length: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 1, max = 256))]
    pub nsec3_salt_min_length: Option<u32>,

    /// RRSIG validity period in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_expiration: Option<u32>,

    /// ZSK algorithms, in preference order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zsk_algorithms: Option<Vec<DnssecKeyAlgorithm>>,

    /// ZSK rollover interval in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zsk_rollover: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zsk_rollover_mechanism: Option<ZskRolloverMechanism>,
}

impl DnssecKeyParams {
    /// Validate the parameters; `attribute` is the path of the enclosing attribute.
    pub fn validate(&self, attribute: &str, diags: &mut Diagnostics) {
        validate_algorithms(
            &format!("{attribute}.ksk_algorithms"),
            self.ksk_algorithms.as_deref(),
            diags,
        );
        validate_algorithms(
            &format!("{attribute}.zsk_algorithms"),
            self.zsk_algorithms.as_deref(),
            diags,
        );

        if let Some(iterations) = self.nsec3_iterations {
            check(
                diags,
                &format!("{attribute}.nsec3_iterations"),
                validate_range(iterations, 0, MAX_NSEC3_ITERATIONS),
            );
        }
        for (name, value) in [
            ("nsec3_salt_min_length", self.nsec3_salt_min_length),
            ("nsec3_salt_max_length", self.nsec3_salt_max_length),
        ] {
            if let Some(length) = value {
                check(
                    diags,
                    &format!("{attribute}.{name}"),
                    validate_range(length, 1, MAX_NSEC3_SALT_LENGTH),
                );
            }
        }
        if let (Some(min), Some(max)) = (self.nsec3_salt_min_length, self.nsec3_salt_max_length) {
            if min > max {
                diags.add_attribute_error(
                    format!("{attribute}.nsec3_salt_min_length"),
                    SUMMARY_INVALID_ATTRIBUTE,
                    format!("must not exceed nsec3_salt_max_length ({min} > {max})"),
                );
            }
        }

        for (name, value) in [
            ("ksk_rollover", self.ksk_rollover),
            ("zsk_rollover", self.zsk_rollover),
            ("signature_expiration", self.signature_expiration),
        ] {
            if value == Some(0) {
                diags.add_attribute_error(
                    format!("{attribute}.{name}"),
                    SUMMARY_INVALID_ATTRIBUTE,
                    "must be greater than 0 seconds",
                );
            }
        }
    }
}

fn validate_algorithms(
    attribute: &str,
    algorithms: Option<&[DnssecKeyAlgorithm]>,
    diags: &mut Diagnostics,
) {
    let Some(algorithms) = algorithms else {
        return;
    };
    if algorithms.is_empty() {
        diags.add_attribute_error(
            attribute,
            SUMMARY_INVALID_ATTRIBUTE,
            "must contain at least one algorithm",
        );
    }
    for (index, entry) in algorithms.iter().enumerate() {
        let path = format!("{attribute}[{index}].size");
        match entry.algorithm.fixed_size() {
            Some(size) if size != entry.size => diags.add_attribute_error(
                path,
                SUMMARY_INVALID_ATTRIBUTE,
                format!(
                    "{:?} keys are always {size} bits, got {}",
                    entry.algorithm, entry.size
                ),
            ),
            Some(_) => {}
            None => check(
                diags,
                &path,
                validate_range(entry.size, MIN_RSA_KEY_SIZE, MAX_RSA_KEY_SIZE),
            ),
        }
    }
}

#[cfg(test)]
#[path = "dnssec_tests.rs"]
mod dnssec_tests;
