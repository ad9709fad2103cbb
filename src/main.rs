// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nios_dns::{
    apply::{self, Manifest},
    config::ProviderConfig,
    constants::{DEFAULT_STATE_FILE, TOKIO_WORKER_THREADS},
    metrics::gather_metrics,
    resources::{resource_schemas, Provider, SearchFilter},
    state::StateStore,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Manage NIOS DNS objects declaratively.
#[derive(Debug, Parser)]
#[command(name = "nios-dns", version, about)]
struct Cli {
    /// State file
    #[arg(long, env = "NIOS_STATE_FILE", default_value = DEFAULT_STATE_FILE, global = true)]
    state: PathBuf,

    #[command(flatten)]
    provider: ProviderConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show what apply would change, from stored state only
    Plan {
        /// Manifest file (JSON)
        manifest: PathBuf,
    },
    /// Create, update and delete objects so the grid matches a manifest
    Apply {
        /// Manifest file (JSON)
        manifest: PathBuf,
    },
    /// Re-read every managed object and update state
    Refresh,
    /// Delete every managed object
    Destroy,
    /// Adopt an existing object by reference
    Import {
        /// Resource type (e.g. nios_dns_zone_auth)
        resource_type: String,
        /// Instance name in state
        name: String,
        /// WAPI object reference (_ref)
        reference: String,
    },
    /// Print state
    Show {
        /// Print Prometheus metrics instead of state
        #[arg(long)]
        metrics: bool,
    },
    /// Print the JSON schema of every resource type
    Schema,
    /// Look up existing objects
    Search {
        /// Resource type (e.g. nios_dns_record_cname)
        resource_type: String,
        /// Field filter, NAME=VALUE
        #[arg(long = "filter", value_parser = parse_key_value)]
        filters: Vec<(String, String)>,
        /// Extensible attribute filter, NAME=VALUE
        #[arg(long = "extattr", value_parser = parse_key_value)]
        extattr_filters: Vec<(String, String)>,
    },
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("nios-dns")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

fn init_logging() {
    // Respects RUST_LOG environment variable if set, otherwise defaults to INFO level
    // Example: RUST_LOG=nios_dns=debug nios-dns refresh
    //
    // Respects RUST_LOG_FORMAT environment variable for output format
    // Example: RUST_LOG_FORMAT=json nios-dns apply manifest.json
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    // Logs go to stderr so command output on stdout stays parseable
    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_writer(std::io::stderr)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(cli: Cli) -> Result<()> {
    init_logging();
    debug!(state = %cli.state.display(), "Logging initialized");

    let store = StateStore::new(&cli.state);

    match cli.command {
        Command::Schema => print_json(&resource_schemas()),
        Command::Show { metrics: true } => {
            print!("{}", gather_metrics().context("Failed to gather metrics")?);
            Ok(())
        }
        Command::Show { metrics: false } => print_json(&store.load()?),
        Command::Plan { manifest } => {
            let manifest = load_manifest(&manifest)?;
            let provider = connect(&cli.provider)?;
            let changes = apply::plan(&provider, &manifest, &store.load()?)?;
            print_json(&changes)
        }
        Command::Apply { manifest } => {
            let manifest = load_manifest(&manifest)?;
            let provider = connect(&cli.provider)?;

            let mut state = store.load()?;
            let result = apply::apply(&provider, &manifest, &mut state).await;
            store.save(&state)?;
            let summary = result?;

            info!(
                created = summary.created.len(),
                updated = summary.updated.len(),
                deleted = summary.deleted.len(),
                unchanged = summary.unchanged.len(),
                "Apply complete"
            );
            print_json(&summary)
        }
        Command::Refresh => {
            let provider = connect(&cli.provider)?;
            let mut state = store.load()?;
            let result = apply::refresh(&provider, &mut state).await;
            store.save(&state)?;
            let removed = result?;
            info!(removed = removed.len(), "Refresh complete");
            print_json(&BTreeMap::from([("removed", removed)]))
        }
        Command::Destroy => {
            let provider = connect(&cli.provider)?;
            let mut state = store.load()?;
            let result = apply::destroy(&provider, &mut state).await;
            store.save(&state)?;
            let deleted = result?;
            info!(deleted = deleted.len(), "Destroy complete");
            print_json(&BTreeMap::from([("deleted", deleted)]))
        }
        Command::Import {
            resource_type,
            name,
            reference,
        } => {
            let provider = connect(&cli.provider)?;
            let mut state = store.load()?;
            let imported =
                apply::import(&provider, &mut state, &resource_type, &name, &reference).await?;
            store.save(&state)?;
            print_json(&imported)
        }
        Command::Search {
            resource_type,
            filters,
            extattr_filters,
        } => {
            let provider = connect(&cli.provider)?;
            let filter = SearchFilter {
                filters: filters.into_iter().collect(),
                extattr_filters: extattr_filters.into_iter().collect(),
            };
            let found = provider.resource(&resource_type)?.search(&filter).await?;
            print_json(&found)
        }
    }
}

fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    Ok(Manifest::from_json(&content)?)
}

fn connect(config: &ProviderConfig) -> Result<Provider> {
    let client = config
        .build_client()
        .context("Invalid provider configuration")?;
    info!(host = %client.host(), "Connecting to grid master");
    Ok(Provider::new(Arc::new(client), &config.default_view))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod main_tests;
