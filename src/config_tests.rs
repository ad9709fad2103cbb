// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `config.rs`

#[cfg(test)]
mod tests {
    use crate::config::ProviderConfig;
    use crate::errors::ConfigError;
    use serde_json::json;

    fn valid() -> ProviderConfig {
        ProviderConfig {
            host_url: "gm.example.com".to_string(),
            username: "admin".to_string(),
            password: "infoblox".to_string(),
            ..ProviderConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = ProviderConfig::default();

        assert_eq!(config.wapi_version, "v2.13.6");
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.max_retry_secs, 120);
        assert_eq!(config.default_view, "default");
        assert!(!config.insecure);
    }

    #[test]
    fn test_valid_config() {
        assert_eq!(valid().validate(), Ok(()));
    }

    #[test]
    fn test_missing_password_names_env_var() {
        let config = ProviderConfig {
            password: String::new(),
            ..valid()
        };

        let err = config.validate().unwrap_err();

        assert_eq!(
            err,
            ConfigError::MissingField {
                field: "password".to_string(),
                env_var: "NIOS_PASSWORD".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_values() {
        let bad_version = ProviderConfig {
            wapi_version: "2.13".to_string(),
            ..valid()
        };
        assert!(matches!(
            bad_version.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "wapi_version"
        ));

        let bad_host = ProviderConfig {
            host_url: "gm example.com".to_string(),
            ..valid()
        };
        assert!(matches!(
            bad_host.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "host_url"
        ));

        let zero_timeout = ProviderConfig {
            timeout_secs: 0,
            ..valid()
        };
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn test_build_client() {
        let client = valid().build_client().unwrap();

        assert_eq!(client.base_url().as_str(), "https://gm.example.com/wapi/v2.13.6/");
        assert_eq!(client.host(), "gm.example.com");
    }

    #[test]
    fn test_deserialize_applies_defaults_and_hides_password() {
        let config: ProviderConfig = serde_json::from_value(json!({
            "host_url": "gm.example.com",
            "username": "admin",
            "password": "s3cret"
        }))
        .unwrap();

        assert_eq!(config.wapi_version, "v2.13.6");
        assert_eq!(config.password, "s3cret");

        let rendered = serde_json::to_value(&config).unwrap();
        assert!(rendered.get("password").is_none());
        assert!(!format!("{config:?}").contains("s3cret"));
    }
}
