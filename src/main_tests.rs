// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `main.rs` - command-line parsing

#[cfg(test)]
mod tests {
    use crate::{parse_key_value, Cli, Command};
    use clap::{CommandFactory, Parser};

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("Site=NYC"),
            Ok(("Site".to_string(), "NYC".to_string()))
        );
        assert_eq!(
            parse_key_value("comment=a=b"),
            Ok(("comment".to_string(), "a=b".to_string()))
        );
        assert!(parse_key_value("Site").is_err());
        assert!(parse_key_value("=NYC").is_err());
    }

    #[test]
    fn test_search_arguments() {
        let cli = Cli::try_parse_from([
            "nios-dns",
            "search",
            "nios_dns_record_cname",
            "--filter",
            "view=default",
            "--extattr",
            "Site=NYC",
            "--extattr",
            "Owner=infra-team",
        ])
        .unwrap();

        match cli.command {
            Command::Search {
                resource_type,
                filters,
                extattr_filters,
            } => {
                assert_eq!(resource_type, "nios_dns_record_cname");
                assert_eq!(filters, vec![("view".to_string(), "default".to_string())]);
                assert_eq!(extattr_filters.len(), 2);
            }
            other => panic!("expected search, got {other:?}"),
        }
    }

    #[test]
    fn test_import_arguments() {
        let cli = Cli::try_parse_from([
            "nios-dns",
            "--state",
            "/tmp/state.json",
            "import",
            "nios_dns_zone_auth",
            "corp",
            "zone_auth/ZG5z:corp.example.com/default",
        ])
        .unwrap();

        assert_eq!(cli.state.to_str(), Some("/tmp/state.json"));
        assert!(matches!(cli.command, Command::Import { ref name, .. } if name == "corp"));
    }

    #[test]
    fn test_plan_takes_a_manifest() {
        let cli = Cli::try_parse_from(["nios-dns", "plan", "manifest.json"]).unwrap();

        assert!(
            matches!(cli.command, Command::Plan { ref manifest } if manifest.to_str() == Some("manifest.json"))
        );
    }

    #[test]
    fn test_show_metrics_flag() {
        let cli = Cli::try_parse_from(["nios-dns", "show", "--metrics"]).unwrap();

        assert!(matches!(cli.command, Command::Show { metrics: true }));
    }
}
