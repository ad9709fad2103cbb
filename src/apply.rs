// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Converge the grid towards a manifest.
//!
//! A manifest lists the resources that should exist:
//!
//! ```json
//! {
//!   "resources": [
//!     {"type": "nios_dns_zone_auth", "name": "corp", "config": {"fqdn": "corp.example.com"}},
//!     {"type": "nios_dns_record_cname", "name": "www", "config": {"name": "www.corp.example.com", "canonical": "web.corp.example.com"}}
//!   ]
//! }
//! ```
//!
//! [`plan`] previews the changes from stored state alone.
//! [`apply`] refreshes every instance already in state, creates the missing ones,
//! updates the ones whose configuration differs from state and deletes state
//! entries that left the manifest. Resources are processed in manifest order and
//! deleted in reverse state order, so a zone listed before its records is created
//! first and deleted last.
//!
//! State is updated in place after every successful step; on failure the caller
//! still holds every change made so far and should save it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::diagnostics::{Diagnostics, SUMMARY_INVALID_CONFIGURATION};
use crate::metrics::set_managed_resources;
use crate::resources::Provider;
use crate::state::State;

/// One desired resource.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManifestResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    pub config: Value,
}

/// Desired resources, in creation order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub resources: Vec<ManifestResource>,
}

impl Manifest {
    /// Parse a manifest document.
    ///
    /// # Errors
    ///
    /// Returns diagnostics if the document is not valid JSON of the expected shape
    /// or lists the same type and name twice.
    pub fn from_json(content: &str) -> Result<Self, Diagnostics> {
        let manifest: Self = serde_json::from_str(content).map_err(|e| {
            Diagnostics::from_error(SUMMARY_INVALID_CONFIGURATION, format!("Invalid manifest: {e}"))
        })?;

        let mut seen = BTreeSet::new();
        let mut diags = Diagnostics::new();
        for resource in &manifest.resources {
            if !seen.insert((resource.resource_type.as_str(), resource.name.as_str())) {
                diags.add_error(
                    SUMMARY_INVALID_CONFIGURATION,
                    format!(
                        "Duplicate resource {}.{} in manifest",
                        resource.resource_type, resource.name
                    ),
                );
            }
        }
        diags.into_result(manifest)
    }
}

/// Instances touched by [`apply`], as `type.name`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ApplySummary {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub deleted: Vec<String>,
    pub unchanged: Vec<String>,
}

fn address(resource_type: &str, name: &str) -> String {
    format!("{resource_type}.{name}")
}

/// Change [`plan`] expects [`apply`] to make.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlannedAction {
    Create,
    Update,
    Delete,
    NoOp,
}

/// One entry of a plan.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlannedChange {
    pub address: String,
    pub action: PlannedAction,
    /// Planned attributes, `extattrs_all` being what the next write will send
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned: Option<Value>,
}

/// Preview [`apply`] from stored state, without calling the grid.
///
/// # Errors
///
/// Returns diagnostics if validation fails.
pub fn plan(
    provider: &Provider,
    manifest: &Manifest,
    state: &State,
) -> Result<Vec<PlannedChange>, Diagnostics> {
    let diags = validate_manifest(provider, manifest);
    if diags.has_error() {
        return Err(diags);
    }

    let mut changes = Vec::new();
    for desired in &manifest.resources {
        let handler = provider.resource(&desired.resource_type)?;
        let prior = state
            .get(&desired.resource_type, &desired.name)
            .map(|r| &r.attributes);
        let action = match prior {
            Some(prior) if handler.needs_update(&desired.config, prior)? => PlannedAction::Update,
            Some(_) => PlannedAction::NoOp,
            None => PlannedAction::Create,
        };
        changes.push(PlannedChange {
            address: address(&desired.resource_type, &desired.name),
            action,
            planned: Some(handler.plan(&desired.config, prior)?),
        });
    }

    let wanted: BTreeSet<(&str, &str)> = manifest
        .resources
        .iter()
        .map(|r| (r.resource_type.as_str(), r.name.as_str()))
        .collect();
    changes.extend(
        state
            .resources
            .iter()
            .rev()
            .filter(|r| !wanted.contains(&(r.resource_type.as_str(), r.name.as_str())))
            .map(|r| PlannedChange {
                address: address(&r.resource_type, &r.name),
                action: PlannedAction::Delete,
                planned: None,
            }),
    );
    Ok(changes)
}

/// Validate every manifest entry without touching the grid.
pub fn validate_manifest(provider: &Provider, manifest: &Manifest) -> Diagnostics {
    let mut diags = Diagnostics::new();
    for resource in &manifest.resources {
        match provider.resource(&resource.resource_type) {
            Ok(handler) => diags.extend(handler.validate(&resource.config)),
            Err(unknown) => diags.extend(unknown),
        }
    }
    diags
}

/// Converge the grid and `state` towards `manifest`.
///
/// # Errors
///
/// Returns diagnostics if validation fails (nothing is changed) or a handler
/// fails (changes made before the failure are kept in `state`).
pub async fn apply(
    provider: &Provider,
    manifest: &Manifest,
    state: &mut State,
) -> Result<ApplySummary, Diagnostics> {
    let diags = validate_manifest(provider, manifest);
    if diags.has_error() {
        return Err(diags);
    }
    for warning in diags.warnings() {
        warn!("{warning}");
    }

    let mut summary = ApplySummary::default();

    for desired in &manifest.resources {
        let handler = provider.resource(&desired.resource_type)?;
        let addr = address(&desired.resource_type, &desired.name);

        let current = match state.get(&desired.resource_type, &desired.name) {
            Some(existing) => handler.read(&existing.attributes).await?,
            None => None,
        };

        match current {
            Some(current) if !handler.needs_update(&desired.config, &current)? => {
                debug!(resource = %addr, "No changes");
                state.upsert(&desired.resource_type, &desired.name, current);
                summary.unchanged.push(addr);
            }
            Some(current) => {
                let updated = handler.update(&desired.config, &current).await?;
                state.upsert(&desired.resource_type, &desired.name, updated);
                info!(resource = %addr, "Updated");
                summary.updated.push(addr);
            }
            None => {
                let created = handler.create(&desired.config).await?;
                state.upsert(&desired.resource_type, &desired.name, created);
                info!(resource = %addr, "Created");
                summary.created.push(addr);
            }
        }
    }

    let wanted: BTreeSet<(&str, &str)> = manifest
        .resources
        .iter()
        .map(|r| (r.resource_type.as_str(), r.name.as_str()))
        .collect();
    let orphans: Vec<(String, String)> = state
        .resources
        .iter()
        .rev()
        .filter(|r| !wanted.contains(&(r.resource_type.as_str(), r.name.as_str())))
        .map(|r| (r.resource_type.clone(), r.name.clone()))
        .collect();

    for (resource_type, name) in orphans {
        delete_one(provider, state, &resource_type, &name).await?;
        summary.deleted.push(address(&resource_type, &name));
    }

    publish_counts(provider, state);
    Ok(summary)
}

/// Re-read every instance in `state`, dropping the ones deleted outside nios-dns.
///
/// # Errors
///
/// Returns diagnostics if a read fails.
pub async fn refresh(provider: &Provider, state: &mut State) -> Result<Vec<String>, Diagnostics> {
    let mut removed = Vec::new();
    let entries: Vec<(String, String, Value)> = state
        .resources
        .iter()
        .map(|r| (r.resource_type.clone(), r.name.clone(), r.attributes.clone()))
        .collect();

    for (resource_type, name, attributes) in entries {
        let handler = provider.resource(&resource_type)?;
        match handler.read(&attributes).await? {
            Some(refreshed) => state.upsert(&resource_type, &name, refreshed),
            None => {
                state.remove(&resource_type, &name);
                removed.push(address(&resource_type, &name));
            }
        }
    }

    publish_counts(provider, state);
    Ok(removed)
}

/// Delete every instance in `state`, last created first.
///
/// # Errors
///
/// Returns diagnostics if a delete fails.
pub async fn destroy(provider: &Provider, state: &mut State) -> Result<Vec<String>, Diagnostics> {
    let mut deleted = Vec::new();
    while let Some(last) = state.resources.last() {
        let (resource_type, name) = (last.resource_type.clone(), last.name.clone());
        delete_one(provider, state, &resource_type, &name).await?;
        deleted.push(address(&resource_type, &name));
    }

    publish_counts(provider, state);
    Ok(deleted)
}

/// Adopt an existing object into state under `resource_type.name`.
///
/// # Errors
///
/// Returns diagnostics if the address is already in state, the type is unknown,
/// or the import fails.
pub async fn import(
    provider: &Provider,
    state: &mut State,
    resource_type: &str,
    name: &str,
    reference: &str,
) -> Result<Value, Diagnostics> {
    if state.get(resource_type, name).is_some() {
        return Err(Diagnostics::from_error(
            SUMMARY_INVALID_CONFIGURATION,
            format!(
                "Resource {} is already managed; remove it from state before importing",
                address(resource_type, name)
            ),
        ));
    }

    let imported = provider.resource(resource_type)?.import(reference).await?;
    state.upsert(resource_type, name, imported.clone());
    publish_counts(provider, state);
    Ok(imported)
}

async fn delete_one(
    provider: &Provider,
    state: &mut State,
    resource_type: &str,
    name: &str,
) -> Result<(), Diagnostics> {
    if let Some(existing) = state.get(resource_type, name) {
        provider
            .resource(resource_type)?
            .delete(&existing.attributes)
            .await?;
    }
    state.remove(resource_type, name);
    info!(resource = %address(resource_type, name), "Deleted");
    Ok(())
}

fn publish_counts(provider: &Provider, state: &State) {
    let counts = state.counts_by_type();
    for resource_type in provider.resource_types() {
        set_managed_resources(
            resource_type,
            counts.get(resource_type).copied().unwrap_or(0),
        );
    }
}

#[cfg(test)]
#[path = "apply_tests.rs"]
mod apply_tests;
