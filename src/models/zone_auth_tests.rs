// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `zone_auth.rs`

#[cfg(test)]
mod tests {
    use crate::diagnostics::Severity;
    use crate::extattrs::{expand_ext_attrs, ExtAttrs};
    use crate::models::acl::{AclEntry, AclPermission};
    use crate::models::zone_auth::*;
    use crate::models::ManagedModel;
    use serde_json::json;

    fn zone(value: serde_json::Value) -> ZoneAuthModel {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_minimal_zone_is_valid() {
        let model = zone(json!({"fqdn": "example.com"}));
        assert!(model.validate().is_empty());
    }

    #[test]
    fn test_missing_fqdn_fails_to_deserialize() {
        let result: Result<ZoneAuthModel, _> = serde_json::from_value(json!({"view": "default"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_reverse_zone_names() {
        let ipv4 = zone(json!({"fqdn": "10.0.0.0/24", "zone_format": "IPV4"}));
        assert!(ipv4.validate().is_empty());

        let ipv6 = zone(json!({"fqdn": "2001:db8::/64", "zone_format": "IPV6"}));
        assert!(ipv6.validate().is_empty());

        let mismatched = zone(json!({"fqdn": "10.0.0.0/24", "zone_format": "IPV6"}));
        let diags = mismatched.validate();
        assert!(diags.has_error());
        assert_eq!(diags.iter().next().unwrap().attribute.as_deref(), Some("fqdn"));

        let not_cidr = zone(json!({"fqdn": "10.0.0.0", "zone_format": "IPV4"}));
        assert!(not_cidr.validate().has_error());
    }

    #[test]
    fn test_forward_zone_rejects_uppercase() {
        let model = zone(json!({"fqdn": "Example.com"}));
        assert!(model.validate().has_error());
    }

    #[test]
    fn test_validation_collects_every_error() {
        let model = zone(json!({
            "fqdn": "example.com",
            "comment": " padded",
            "soa_expire": 4_000_000_000u32,
            "prefix": "128/26",
            "allow_transfer": [{"struct": "addressac", "address": "not-an-ip"}],
            "ns_group": "default",
            "grid_primary": [{"name": "ns1.example.com"}]
        }));

        let diags = model.validate();

        let attributes: Vec<_> = diags
            .errors()
            .map(|d| d.attribute.clone().unwrap_or_default())
            .collect();
        assert_eq!(
            attributes,
            vec![
                "comment",
                "prefix",
                "soa_expire",
                "allow_transfer[0].address",
                "grid_primary",
            ]
        );
    }

    #[test]
    fn test_ignored_soa_timers_warn() {
        let model = zone(json!({
            "fqdn": "example.com",
            "soa_refresh": 3600,
            "use_grid_zone_timer": false
        }));

        let diags = model.validate();

        assert!(!diags.has_error());
        assert_eq!(diags.warnings().count(), 1);
        assert_eq!(diags.iter().next().unwrap().severity, Severity::Warning);
    }

    #[test]
    fn test_expand_sets_use_flags() {
        let model = zone(json!({
            "fqdn": "example.com",
            "soa_default_ttl": 3600,
            "allow_query": [{"struct": "addressac", "address": "Any"}],
            "dnssec_key_params": {"next_secure_type": "NSEC3"}
        }));

        let body = serde_json::to_value(model.expand(None)).unwrap();

        assert_eq!(body["use_grid_zone_timer"], json!(true));
        assert_eq!(body["use_allow_query"], json!(true));
        assert_eq!(body["use_dnssec_key_params"], json!(true));
        assert!(body.get("use_allow_transfer").is_none());
        assert_eq!(
            body["allow_query"],
            json!([{"_struct": "addressac", "address": "Any", "permission": "ALLOW"}])
        );
    }

    #[test]
    fn test_expand_keeps_explicit_use_flag() {
        let model = zone(json!({
            "fqdn": "example.com",
            "allow_transfer": [{"struct": "addressac", "address": "10.0.0.1"}],
            "use_allow_transfer": false
        }));

        let body = serde_json::to_value(model.expand(None)).unwrap();

        assert_eq!(body["use_allow_transfer"], json!(false));
    }

    #[test]
    fn test_expand_omits_computed_fields() {
        let mut model = zone(json!({"fqdn": "example.com", "view": "default"}));
        model.reference = Some("zone_auth/ZG5z:example.com/default".to_string());
        model.display_domain = Some("example.com".to_string());
        let extattrs: ExtAttrs = serde_json::from_value(json!({"Site": "NYC"})).unwrap();

        let body = serde_json::to_value(model.expand(Some(expand_ext_attrs(&extattrs)))).unwrap();

        assert_eq!(
            body,
            json!({
                "fqdn": "example.com",
                "view": "default",
                "extattrs": {"Site": {"value": "NYC"}}
            })
        );
    }

    #[test]
    fn test_expand_for_update_drops_immutable_fields() {
        let model = zone(json!({
            "fqdn": "10.0.0.0/24",
            "zone_format": "IPV4",
            "view": "internal",
            "comment": "reverse"
        }));

        let body = serde_json::to_value(model.expand_for_update(None)).unwrap();

        assert_eq!(body, json!({"comment": "reverse"}));
    }

    #[test]
    fn test_flatten_response() {
        let dto: ZoneAuthDto = serde_json::from_value(json!({
            "_ref": "zone_auth/ZG5zLnpvbmUkLl9kZWZhdWx0LmNvbS5leGFtcGxl:example.com/default",
            "fqdn": "example.com",
            "view": "default",
            "zone_format": "FORWARD",
            "display_domain": "example.com",
            "dns_fqdn": "example.com",
            "allow_transfer": [{"_struct": "addressac", "address": "10.0.0.0/8", "permission": "DENY"}],
            "grid_primary": [{"name": "ns1.example.com", "stealth": false}],
            "extattrs": {"Site": {"value": "NYC"}}
        }))
        .unwrap();

        let model = ZoneAuthModel::flatten(dto);

        assert_eq!(
            model.reference(),
            Some("zone_auth/ZG5zLnpvbmUkLl9kZWZhdWx0LmNvbS5leGFtcGxl:example.com/default")
        );
        assert_eq!(model.zone_format, Some(ZoneFormat::Forward));
        assert_eq!(model.dns_fqdn.as_deref(), Some("example.com"));
        assert_eq!(
            model.allow_transfer,
            Some(vec![AclEntry::Address {
                address: "10.0.0.0/8".to_string(),
                permission: AclPermission::Deny,
            }])
        );
        assert!(model.extattrs.is_none());
        assert!(model.extattrs_all.is_none());
    }

    #[test]
    fn test_take_ext_attrs() {
        let mut dto: ZoneAuthDto = serde_json::from_value(json!({
            "fqdn": "example.com",
            "extattrs": {"Site": {"value": "NYC"}}
        }))
        .unwrap();

        let raw = ZoneAuthModel::take_ext_attrs(&mut dto);

        assert_eq!(raw.len(), 1);
        assert!(dto.extattrs.is_none());
        assert!(ZoneAuthModel::take_ext_attrs(&mut dto).is_empty());
    }

    #[test]
    fn test_apply_default_view() {
        let mut model = zone(json!({"fqdn": "example.com"}));
        model.apply_default_view("internal");
        assert_eq!(model.view.as_deref(), Some("internal"));

        let mut explicit = zone(json!({"fqdn": "example.com", "view": "external"}));
        explicit.apply_default_view("internal");
        assert_eq!(explicit.view.as_deref(), Some("external"));
    }

    #[test]
    fn test_state_serialization_uses_ref_key() {
        let mut model = zone(json!({"fqdn": "example.com"}));
        model.reference = Some("zone_auth/abc:example.com/default".to_string());

        let value = serde_json::to_value(&model).unwrap();

        assert_eq!(value["ref"], json!("zone_auth/abc:example.com/default"));
        assert!(value.get("extattrs").is_none());
    }
}
