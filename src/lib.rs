// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # nios-dns - Declarative NIOS DNS resources
//!
//! nios-dns manages DNS objects on an Infoblox NIOS grid through the NIOS Web API
//! (WAPI): authoritative zones, CNAME records and shared record groups.
//!
//! ## Overview
//!
//! NIOS objects carry extensible attributes, and some of them are inherited from
//! parent scopes rather than set on the object. The WAPI replaces the whole
//! attribute set on update, so a naive client would either wipe inherited
//! attributes on every write or report them as drift on every read. Each managed
//! resource therefore keeps two views in state, `extattrs` (declared) and
//! `extattrs_all` (everything the grid returned), reconciled by [`extattrs`].
//!
//! ## Modules
//!
//! - [`extattrs`] - Extensible-attribute reconciliation
//! - [`models`] - Managed models, WAPI DTOs and their conversions
//! - [`resources`] - Create/read/update/delete/import handlers and data sources
//! - [`apply`] - Manifest-driven apply, refresh, destroy and import
//! - [`wapi`] - WAPI client with retry
//! - [`state`] - Local state file
//! - [`config`] - Provider configuration
//! - [`diagnostics`] - User-facing errors and warnings
//!
//! ## Example
//!
//! ```rust,no_run
//! use nios_dns::config::ProviderConfig;
//! use nios_dns::models::record_cname::RecordCnameModel;
//! use nios_dns::resources::WapiResource;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProviderConfig {
//!     host_url: "gm.example.com".to_string(),
//!     username: "admin".to_string(),
//!     password: "infoblox".to_string(),
//!     ..ProviderConfig::default()
//! };
//! let client = Arc::new(config.build_client()?);
//! let cnames = WapiResource::<RecordCnameModel>::new(client, &config.default_view);
//!
//! let plan: RecordCnameModel = serde_json::from_value(serde_json::json!({
//!     "name": "www.example.com",
//!     "canonical": "web.example.com",
//!     "extattrs": {"Site": "NYC"}
//! }))?;
//! let state = cnames.create(&plan).await?;
//! println!("inherited and declared: {:?}", state.extattrs_all);
//! # Ok(())
//! # }
//! ```

pub mod apply;
pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod errors;
pub mod extattrs;
pub mod http_errors;
pub mod metrics;
pub mod models;
pub mod resources;
pub mod state;
pub mod validation;
pub mod wapi;
