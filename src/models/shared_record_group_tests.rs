// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `shared_record_group.rs`

#[cfg(test)]
mod tests {
    use crate::models::shared_record_group::*;
    use crate::models::ManagedModel;
    use serde_json::json;

    fn group(value: serde_json::Value) -> SharedRecordGroupModel {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_valid_group() {
        let model = group(json!({
            "name": "branch-offices",
            "comment": "records shared by every branch zone",
            "zone_associations": [
                {"fqdn": "nyc.example.com"},
                {"fqdn": "lon.example.com", "view": "internal"}
            ]
        }));
        assert!(model.validate().is_empty());
    }

    #[test]
    fn test_blank_name_rejected() {
        let model = group(json!({"name": "  "}));

        let diags = model.validate();

        assert_eq!(diags.iter().next().unwrap().attribute.as_deref(), Some("name"));
    }

    #[test]
    fn test_duplicate_association_rejected() {
        let model = group(json!({
            "name": "branch-offices",
            "zone_associations": [
                {"fqdn": "nyc.example.com", "view": "default"},
                {"fqdn": "lon.example.com"},
                {"fqdn": "nyc.example.com", "view": "default"}
            ]
        }));

        let diags = model.validate();

        assert_eq!(diags.errors().count(), 1);
        assert_eq!(
            diags.iter().next().unwrap().attribute.as_deref(),
            Some("zone_associations[2]")
        );
    }

    #[test]
    fn test_same_zone_in_different_views_allowed() {
        let model = group(json!({
            "name": "branch-offices",
            "zone_associations": [
                {"fqdn": "nyc.example.com", "view": "internal"},
                {"fqdn": "nyc.example.com", "view": "external"}
            ]
        }));
        assert!(model.validate().is_empty());
    }

    #[test]
    fn test_invalid_association_fqdn() {
        let model = group(json!({
            "name": "branch-offices",
            "zone_associations": [{"fqdn": "bad zone"}]
        }));

        let diags = model.validate();

        assert_eq!(
            diags.iter().next().unwrap().attribute.as_deref(),
            Some("zone_associations[0].fqdn")
        );
    }

    #[test]
    fn test_expand_sets_policy_flag() {
        let model = group(json!({
            "name": "branch-offices",
            "record_name_policy": "Allow Underscore",
            "zone_associations": [{"fqdn": "nyc.example.com"}]
        }));

        let body = serde_json::to_value(model.expand(None)).unwrap();

        assert_eq!(
            body,
            json!({
                "name": "branch-offices",
                "record_name_policy": "Allow Underscore",
                "use_record_name_policy": true,
                "zone_associations": [{"fqdn": "nyc.example.com"}]
            })
        );
    }

    #[test]
    fn test_update_keeps_name() {
        let model = group(json!({"name": "renamed-group"}));

        let body = serde_json::to_value(model.expand_for_update(None)).unwrap();

        assert_eq!(body, json!({"name": "renamed-group"}));
    }

    #[test]
    fn test_flatten_response() {
        let dto: SharedRecordGroupDto = serde_json::from_value(json!({
            "_ref": "sharedrecordgroup/ZG5zLnNoYXJlZF9yZWNvcmRfZ3JvdXA:branch-offices",
            "name": "branch-offices",
            "zone_associations": [{"fqdn": "nyc.example.com", "view": "default"}],
            "use_record_name_policy": false,
            "extattrs": {}
        }))
        .unwrap();

        let model = SharedRecordGroupModel::flatten(dto);

        assert_eq!(
            model.reference(),
            Some("sharedrecordgroup/ZG5zLnNoYXJlZF9yZWNvcmRfZ3JvdXA:branch-offices")
        );
        assert_eq!(
            model.zone_associations,
            Some(vec![ZoneAssociation {
                fqdn: "nyc.example.com".to_string(),
                view: Some("default".to_string()),
            }])
        );
        assert_eq!(model.use_record_name_policy, Some(false));
    }

    #[test]
    fn test_default_view_is_ignored() {
        let mut model = group(json!({"name": "branch-offices"}));
        model.apply_default_view("internal");
        assert_eq!(model, group(json!({"name": "branch-offices"})));
    }
}
