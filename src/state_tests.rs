// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `state.rs`

#[cfg(test)]
mod tests {
    use crate::errors::StateError;
    use crate::state::{State, StateStore};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> StateStore {
        StateStore::new(dir.path().join("nios-dns.state.json"))
    }

    #[test]
    fn test_missing_file_is_empty_state() {
        let dir = TempDir::new().unwrap();

        let state = store(&dir).load().unwrap();

        assert_eq!(state, State::default());
        assert_eq!(state.version, 1);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut state = State::default();
        state.upsert(
            "nios_dns_record_cname",
            "www",
            json!({"ref": "record:cname/abc", "extattrs": {"Site": "NYC"}}),
        );

        store.save(&state).unwrap();

        assert_eq!(store.load().unwrap(), state);
        assert!(!dir.path().join("nios-dns.state.json.tmp").exists());
        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["resources"][0]["type"], json!("nios_dns_record_cname"));
    }

    #[test]
    fn test_save_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut state = State::default();
        state.upsert("nios_dns_zone_auth", "corp", json!({"fqdn": "corp.example.com"}));
        store.save(&state).unwrap();

        state.remove("nios_dns_zone_auth", "corp");
        store.save(&state).unwrap();

        assert!(store.load().unwrap().resources.is_empty());
    }

    #[test]
    fn test_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::write(store.path(), "{not json").unwrap();

        let err = store.load().unwrap_err();

        assert!(matches!(err, StateError::Corrupt { .. }));
    }

    #[test]
    fn test_unsupported_version() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::write(store.path(), r#"{"version": 7, "resources": []}"#).unwrap();

        let err = store.load().unwrap_err();

        assert!(matches!(
            err,
            StateError::UnsupportedVersion {
                found: 7,
                expected: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("missing").join("state.json"));

        let err = store.save(&State::default()).unwrap_err();

        assert!(matches!(err, StateError::Io { .. }));
    }

    #[test]
    fn test_upsert_get_remove() {
        let mut state = State::default();
        state.upsert("nios_dns_zone_auth", "corp", json!({"comment": "a"}));
        state.upsert("nios_dns_zone_auth", "corp", json!({"comment": "b"}));
        state.upsert("nios_dns_record_cname", "corp", json!({}));

        assert_eq!(state.resources.len(), 2);
        assert_eq!(
            state.get("nios_dns_zone_auth", "corp").unwrap().attributes,
            json!({"comment": "b"})
        );
        assert_eq!(state.counts_by_type().get("nios_dns_zone_auth"), Some(&1));

        assert!(state.remove("nios_dns_zone_auth", "corp").is_some());
        assert!(state.remove("nios_dns_zone_auth", "corp").is_none());
        assert!(state.get("nios_dns_zone_auth", "corp").is_none());
    }
}
