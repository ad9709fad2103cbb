// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Data sources: read-only lookups of existing NIOS objects.
//!
//! A data source result is never written back, so there is no declared set to
//! partition by: `extattrs` and `extattrs_all` both hold the full live set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::debug;

use super::{conversion_diagnostics, observe, WapiResource};
use crate::diagnostics::Diagnostics;
use crate::extattrs::flatten_ext_attrs;
use crate::http_errors::wapi_error_diagnostic;
use crate::models::ManagedModel;
use crate::wapi::ext_attr_filter;

/// Search criteria for a data source lookup.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    /// Plain field filters, sent as `name=value`.
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
    /// Extensible attribute filters, sent as `*Name=value`.
    #[serde(default)]
    pub extattr_filters: BTreeMap<String, String>,
}

impl SearchFilter {
    /// Query parameters in the order they are sent.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.filters
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .chain(
                self.extattr_filters
                    .iter()
                    .map(|(name, value)| ext_attr_filter(name, value)),
            )
            .collect()
    }
}

impl<M: ManagedModel> WapiResource<M> {
    /// Find objects matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns diagnostics if the WAPI call fails or an object's extensible
    /// attributes cannot be converted.
    pub async fn search(&self, filter: &SearchFilter) -> Result<Vec<M>, Diagnostics> {
        let started = Instant::now();
        let result = self.search_inner(filter).await;
        observe(M::RESOURCE_TYPE, "search", started, &result);
        result
    }

    async fn search_inner(&self, filter: &SearchFilter) -> Result<Vec<M>, Diagnostics> {
        let found: Vec<M::Dto> = self
            .client
            .search(M::OBJECT_TYPE, &filter.to_query_pairs(), M::RETURN_FIELDS)
            .await
            .map_err(|e| Diagnostics::from(wapi_error_diagnostic("search", M::RESOURCE_TYPE, &e)))?;

        debug!(
            resource_type = M::RESOURCE_TYPE,
            count = found.len(),
            "Data source lookup complete"
        );

        found
            .into_iter()
            .map(|mut dto| {
                let live = M::take_ext_attrs(&mut dto);
                let all = flatten_ext_attrs(&live)
                    .map_err(|e| conversion_diagnostics::<M>("search", &e))?;
                let mut model = M::flatten(dto);
                model.set_ext_attrs(Some(all.clone()), Some(all));
                Ok(model)
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "data_sources_tests.rs"]
mod data_sources_tests;
