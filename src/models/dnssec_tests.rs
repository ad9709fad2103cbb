// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `dnssec.rs`

#[cfg(test)]
mod tests {
    use crate::diagnostics::Diagnostics;
    use crate::models::dnssec::*;
    use serde_json::json;

    fn validate(params: &DnssecKeyParams) -> Diagnostics {
        let mut diags = Diagnostics::new();
        params.validate("dnssec_key_params", &mut diags);
        diags
    }

    #[test]
    fn test_wire_names() {
        let params: DnssecKeyParams = serde_json::from_value(json!({
            "ksk_algorithms": [{"algorithm": "RSASHA256", "size": 2048}],
            "zsk_algorithms": [{"algorithm": "ECDSAP256SHA256", "size": 256}],
            "ksk_rollover_notification_config": "REQUIRE_MANUAL_INTERVENTION",
            "next_secure_type": "NSEC3",
            "zsk_rollover_mechanism": "PRE_PUBLISH",
            "nsec3_iterations": 10
        }))
        .unwrap();

        assert_eq!(
            params.ksk_rollover_notification_config,
            Some(KskRolloverNotification::RequireManualIntervention)
        );
        assert_eq!(params.next_secure_type, Some(NextSecureType::Nsec3));
        assert_eq!(
            params.zsk_rollover_mechanism,
            Some(ZskRolloverMechanism::PrePublish)
        );
        assert_eq!(
            params.zsk_algorithms.as_ref().unwrap()[0].algorithm,
            DnssecAlgorithm::EcdsaP256Sha256
        );
    }

    #[test]
    fn test_unset_fields_are_omitted() {
        let params = DnssecKeyParams {
            next_secure_type: Some(NextSecureType::Nsec),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({"next_secure_type": "NSEC"})
        );
    }

    #[test]
    fn test_unknown_algorithm_is_rejected() {
        let result: Result<DnssecKeyAlgorithm, _> =
            serde_json::from_value(json!({"algorithm": "DSA", "size": 1024}));
        assert!(result.is_err());
    }

    #[test]
    fn test_valid_params() {
        let params = DnssecKeyParams {
            ksk_algorithms: Some(vec![DnssecKeyAlgorithm {
                algorithm: DnssecAlgorithm::RsaSha256,
                size: 2048,
            }]),
            zsk_algorithms: Some(vec![DnssecKeyAlgorithm {
                algorithm: DnssecAlgorithm::EcdsaP384Sha384,
                size: 384,
            }]),
            nsec3_salt_min_length: Some(1),
            nsec3_salt_max_length: Some(15),
            nsec3_iterations: Some(10),
            ksk_rollover: Some(31_536_000),
            zsk_rollover: Some(2_592_000),
            signature_expiration: Some(345_600),
            ..Default::default()
        };

        assert!(validate(&params).is_empty());
    }

    #[test]
    fn test_algorithm_size_rules() {
        let params = DnssecKeyParams {
            ksk_algorithms: Some(vec![
                DnssecKeyAlgorithm {
                    algorithm: DnssecAlgorithm::RsaSha1,
                    size: 256,
                },
                DnssecKeyAlgorithm {
                    algorithm: DnssecAlgorithm::EcdsaP256Sha256,
                    size: 384,
                },
            ]),
            zsk_algorithms: Some(vec![]),
            ..Default::default()
        };

        let diags = validate(&params);

        let attributes: Vec<_> = diags
            .iter()
            .map(|d| d.attribute.clone().unwrap_or_default())
            .collect();
        assert_eq!(
            attributes,
            vec![
                "dnssec_key_params.ksk_algorithms[0].size",
                "dnssec_key_params.ksk_algorithms[1].size",
                "dnssec_key_params.zsk_algorithms",
            ]
        );
    }

    #[test]
    fn test_nsec3_salt_bounds() {
        let params = DnssecKeyParams {
            nsec3_salt_min_length: Some(20),
            nsec3_salt_max_length: Some(10),
            nsec3_iterations: Some(5000),
            ..Default::default()
        };

        let diags = validate(&params);

        assert_eq!(diags.errors().count(), 2);
        assert!(diags
            .iter()
            .any(|d| d.attribute.as_deref() == Some("dnssec_key_params.nsec3_iterations")));
        assert!(diags
            .iter()
            .any(|d| d.detail.contains("must not exceed nsec3_salt_max_length")));
    }

    #[test]
    fn test_zero_periods_rejected() {
        let params = DnssecKeyParams {
            ksk_rollover: Some(0),
            signature_expiration: Some(0),
            ..Default::default()
        };

        assert_eq!(validate(&params).errors().count(), 2);
    }
}
