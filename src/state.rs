// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Local state file.
//!
//! State is a JSON document listing every managed resource with the attributes
//! recorded after its last create, read, update or import:
//!
//! ```json
//! {
//!   "version": 1,
//!   "resources": [
//!     {"type": "nios_dns_record_cname", "name": "www", "attributes": {"ref": "record:cname/...", "extattrs": {...}, "extattrs_all": {...}}}
//!   ]
//! }
//! ```
//!
//! Writes go to a sibling temporary file which is then renamed over the target,
//! so a crash never leaves a half-written state file behind.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::STATE_FORMAT_VERSION;
use crate::errors::StateError;

/// One managed resource instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    /// Resource type name (e.g. `nios_dns_zone_auth`)
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Instance name, unique per resource type
    pub name: String,
    /// Attributes as last reconciled
    pub attributes: Value,
}

/// Contents of the state file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub version: u32,
    #[serde(default)]
    pub resources: Vec<ResourceState>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            version: STATE_FORMAT_VERSION,
            resources: Vec::new(),
        }
    }
}

impl State {
    /// Look up an instance by type and name.
    #[must_use]
    pub fn get(&self, resource_type: &str, name: &str) -> Option<&ResourceState> {
        self.resources
            .iter()
            .find(|r| r.resource_type == resource_type && r.name == name)
    }

    /// Insert or replace an instance.
    pub fn upsert(&mut self, resource_type: &str, name: &str, attributes: Value) {
        match self
            .resources
            .iter_mut()
            .find(|r| r.resource_type == resource_type && r.name == name)
        {
            Some(existing) => existing.attributes = attributes,
            None => self.resources.push(ResourceState {
                resource_type: resource_type.to_string(),
                name: name.to_string(),
                attributes,
            }),
        }
    }

    /// Remove an instance, returning it if it was present.
    pub fn remove(&mut self, resource_type: &str, name: &str) -> Option<ResourceState> {
        let index = self
            .resources
            .iter()
            .position(|r| r.resource_type == resource_type && r.name == name)?;
        Some(self.resources.remove(index))
    }

    /// Number of instances per resource type.
    #[must_use]
    pub fn counts_by_type(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for resource in &self.resources {
            *counts.entry(resource.resource_type.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

/// State file on disk.
#[derive(Clone, Debug)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load state. A missing file is an empty state.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Io`] if the file cannot be read,
    /// [`StateError::Corrupt`] if it is not a state document, and
    /// [`StateError::UnsupportedVersion`] if it was written with another format version.
    pub fn load(&self) -> Result<State, StateError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No state file, starting empty");
            return Ok(State::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|source| self.io_error(source))?;
        let state: State = serde_json::from_str(&content).map_err(|e| StateError::Corrupt {
            path: self.display(),
            reason: e.to_string(),
        })?;
        if state.version != STATE_FORMAT_VERSION {
            return Err(StateError::UnsupportedVersion {
                path: self.display(),
                found: state.version,
                expected: STATE_FORMAT_VERSION,
            });
        }

        debug!(
            path = %self.path.display(),
            resources = state.resources.len(),
            "Loaded state"
        );
        Ok(state)
    }

    /// Write state atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Io`] if the temporary file cannot be written or renamed.
    pub fn save(&self, state: &State) -> Result<(), StateError> {
        let content = serde_json::to_string_pretty(state).map_err(|e| StateError::Corrupt {
            path: self.display(),
            reason: e.to_string(),
        })?;

        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, content).map_err(|source| self.io_error(source))?;
        fs::rename(&tmp_path, &self.path).map_err(|source| {
            let _ = fs::remove_file(&tmp_path);
            self.io_error(source)
        })?;

        info!(
            path = %self.path.display(),
            resources = state.resources.len(),
            "Saved state"
        );
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn display(&self) -> String {
        self.path.display().to_string()
    }

    fn io_error(&self, source: std::io::Error) -> StateError {
        StateError::Io {
            path: self.display(),
            source,
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod state_tests;
