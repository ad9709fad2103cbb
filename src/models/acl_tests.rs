// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `acl.rs`

#[cfg(test)]
mod tests {
    use crate::diagnostics::Diagnostics;
    use crate::models::acl::*;
    use serde_json::json;

    #[test]
    fn test_model_defaults() {
        let entry: AclEntry =
            serde_json::from_value(json!({"struct": "tsigac", "tsig_key": "c2VjcmV0"})).unwrap();

        assert_eq!(
            entry,
            AclEntry::TsigKey {
                tsig_key: Some("c2VjcmV0".to_string()),
                tsig_key_alg: TsigAlgorithm::HmacMd5,
                tsig_key_name: None,
                use_tsig_key_name: false,
            }
        );
    }

    #[test]
    fn test_unknown_struct_is_rejected() {
        let result: Result<AclEntry, _> =
            serde_json::from_value(json!({"struct": "namedacl", "name": "internal"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_permission_is_rejected() {
        let result: Result<AclEntry, _> = serde_json::from_value(
            json!({"struct": "addressac", "address": "10.0.0.1", "permission": "MAYBE"}),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_expand_address_uses_struct_discriminator() {
        let entry = AclEntry::Address {
            address: "10.0.0.0/8".to_string(),
            permission: AclPermission::Deny,
        };

        let wire = serde_json::to_value(expand_acl_entry(&entry)).unwrap();

        assert_eq!(
            wire,
            json!({"_struct": "addressac", "address": "10.0.0.0/8", "permission": "DENY"})
        );
    }

    #[test]
    fn test_expand_tsig_key() {
        let entry = AclEntry::TsigKey {
            tsig_key: None,
            tsig_key_alg: TsigAlgorithm::HmacSha256,
            tsig_key_name: Some("transfer-key".to_string()),
            use_tsig_key_name: true,
        };

        let wire = serde_json::to_value(expand_acl_entry(&entry)).unwrap();

        assert_eq!(
            wire,
            json!({
                "_struct": "tsigac",
                "tsig_key_alg": "HMAC-SHA256",
                "tsig_key_name": "transfer-key",
                "use_tsig_key_name": true
            })
        );
    }

    #[test]
    fn test_flatten_fills_defaults() {
        let dto: AclEntryDto =
            serde_json::from_value(json!({"_struct": "addressac", "address": "Any"})).unwrap();

        assert_eq!(
            flatten_acl_entry(dto),
            AclEntry::Address {
                address: "Any".to_string(),
                permission: AclPermission::Allow,
            }
        );
    }

    #[test]
    fn test_flatten_list() {
        let wire: Vec<AclEntryDto> = serde_json::from_value(json!([
            {"_struct": "addressac", "address": "192.0.2.10", "permission": "ALLOW"},
            {"_struct": "tsigac", "tsig_key": "c2VjcmV0", "tsig_key_alg": "HMAC-MD5", "use_tsig_key_name": false}
        ]))
        .unwrap();

        let flattened = flatten_acl(Some(wire)).unwrap();

        assert_eq!(flattened.len(), 2);
        assert!(matches!(flattened[1], AclEntry::TsigKey { .. }));
        assert_eq!(flatten_acl(None), None);
    }

    #[test]
    fn test_validate_address_entries() {
        let entries = vec![
            AclEntry::Address {
                address: "10.0.0.0/8".to_string(),
                permission: AclPermission::Allow,
            },
            AclEntry::Address {
                address: "10.0.0.0/99".to_string(),
                permission: AclPermission::Allow,
            },
        ];
        let mut diags = Diagnostics::new();

        validate_acl("allow_transfer", Some(&entries), &mut diags);

        assert_eq!(diags.errors().count(), 1);
        assert_eq!(
            diags.iter().next().unwrap().attribute.as_deref(),
            Some("allow_transfer[1].address")
        );
    }

    #[test]
    fn test_validate_tsig_requirements() {
        let mut diags = Diagnostics::new();

        AclEntry::TsigKey {
            tsig_key: None,
            tsig_key_alg: TsigAlgorithm::HmacMd5,
            tsig_key_name: None,
            use_tsig_key_name: false,
        }
        .validate("allow_update[0]", &mut diags);
        AclEntry::TsigKey {
            tsig_key: None,
            tsig_key_alg: TsigAlgorithm::HmacMd5,
            tsig_key_name: None,
            use_tsig_key_name: true,
        }
        .validate("allow_update[1]", &mut diags);

        let attributes: Vec<_> = diags
            .iter()
            .map(|d| d.attribute.clone().unwrap_or_default())
            .collect();
        assert_eq!(
            attributes,
            vec!["allow_update[0].tsig_key", "allow_update[1].tsig_key_name"]
        );
    }
}
