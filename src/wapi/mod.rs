// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed client for the NIOS Web API (WAPI).
//!
//! The WAPI is a REST API rooted at `https://<grid-master>/wapi/<version>/`:
//!
//! - `POST <object>` creates an object and returns it
//! - `GET <_ref>` / `PUT <_ref>` / `DELETE <_ref>` address one object by reference
//! - `GET <object>?<filters>` searches objects
//!
//! Every read asks for `_return_fields+=<fields>&_return_as_object=1`, so the
//! response is wrapped as `{"result": ...}`.
//!
//! # Example
//!
//! ```rust,no_run
//! use nios_dns::wapi::WapiClient;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), nios_dns::errors::WapiError> {
//! let client = WapiClient::new(
//!     Arc::new(reqwest::Client::new()),
//!     "https://gm.example.com",
//!     "v2.13.6",
//!     "admin",
//!     "infoblox",
//! )?
//! .with_max_retry_elapsed(Duration::from_secs(30));
//!
//! let zones: Vec<serde_json::Value> = client
//!     .search("zone_auth", &[("fqdn".to_string(), "example.com".to_string())], &["comment"])
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod retry;

mod request;

use reqwest::{Client as HttpClient, Method};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::constants::{
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_MAX_RETRY_ELAPSED_SECS, WAPI_EXTATTR_FILTER_PREFIX,
    WAPI_PATH_PREFIX, WAPI_RETURN_AS_OBJECT, WAPI_RETURN_FIELDS_PLUS,
};
use crate::errors::WapiError;
use request::wapi_request;

/// `{"result": ...}` envelope produced by `_return_as_object=1`.
#[derive(Debug, Deserialize)]
struct ResultEnvelope<T> {
    result: T,
}

/// Client for one grid master.
///
/// Cheap to clone; the HTTP connection pool is shared through an `Arc`.
#[derive(Clone)]
pub struct WapiClient {
    pub(crate) http: Arc<HttpClient>,
    base_url: Url,
    pub(crate) host: String,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) timeout: Duration,
    pub(crate) max_retry_elapsed: Duration,
}

impl fmt::Debug for WapiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WapiClient")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("max_retry_elapsed", &self.max_retry_elapsed)
            .finish_non_exhaustive()
    }
}

impl WapiClient {
    /// Create a client for `host_url` (scheme optional, defaults to `https`).
    ///
    /// # Errors
    ///
    /// Returns [`WapiError::InvalidUrl`] if the host URL cannot be parsed.
    pub fn new(
        http: Arc<HttpClient>,
        host_url: &str,
        wapi_version: &str,
        username: &str,
        password: &str,
    ) -> Result<Self, WapiError> {
        let base_url = build_base_url(host_url, wapi_version)?;
        let host = base_url.host_str().unwrap_or(host_url).to_string();

        Ok(Self {
            http,
            base_url,
            host,
            username: username.to_string(),
            password: password.to_string(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            max_retry_elapsed: Duration::from_secs(DEFAULT_MAX_RETRY_ELAPSED_SECS),
        })
    }

    /// Set the total time spent retrying transient failures.
    #[must_use]
    pub fn with_max_retry_elapsed(mut self, max_retry_elapsed: Duration) -> Self {
        self.max_retry_elapsed = max_retry_elapsed;
        self
    }

    /// Record the HTTP timeout configured on the underlying client, for error reporting.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL, e.g. `https://gm.example.com/wapi/v2.13.6/`.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Grid master host name.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Create an object and return it with `return_fields`.
    ///
    /// # Errors
    ///
    /// Returns a [`WapiError`] if the request fails or the response cannot be decoded.
    pub async fn create<B, T>(
        &self,
        object: &str,
        body: &B,
        return_fields: &[&str],
    ) -> Result<T, WapiError>
    where
        B: Serialize + fmt::Debug,
        T: DeserializeOwned,
    {
        let url = self.object_url(object, &[], return_fields)?;
        let text = wapi_request(self, Method::POST, &url, object, Some(body)).await?;
        decode_result(object, &text)
    }

    /// Read one object by reference.
    ///
    /// # Errors
    ///
    /// Returns [`WapiError::NotFound`] if the object no longer exists, or another
    /// [`WapiError`] if the request fails.
    pub async fn get<T: DeserializeOwned>(
        &self,
        reference: &str,
        return_fields: &[&str],
    ) -> Result<T, WapiError> {
        let url = self.object_url(reference, &[], return_fields)?;
        let text = wapi_request(self, Method::GET, &url, reference, None::<&()>).await?;
        decode_result(reference, &text)
    }

    /// Update one object by reference and return it with `return_fields`.
    ///
    /// # Errors
    ///
    /// Returns a [`WapiError`] if the request fails or the response cannot be decoded.
    pub async fn update<B, T>(
        &self,
        reference: &str,
        body: &B,
        return_fields: &[&str],
    ) -> Result<T, WapiError>
    where
        B: Serialize + fmt::Debug,
        T: DeserializeOwned,
    {
        let url = self.object_url(reference, &[], return_fields)?;
        let text = wapi_request(self, Method::PUT, &url, reference, Some(body)).await?;
        decode_result(reference, &text)
    }

    /// Delete one object by reference.
    ///
    /// # Errors
    ///
    /// Returns [`WapiError::NotFound`] if the object does not exist, or another
    /// [`WapiError`] if the request fails.
    pub async fn delete(&self, reference: &str) -> Result<(), WapiError> {
        let url = self.resolve(reference)?;
        wapi_request(self, Method::DELETE, &url, reference, None::<&()>).await?;
        debug!(reference = %reference, "Deleted WAPI object");
        Ok(())
    }

    /// Search objects of one type.
    ///
    /// `filters` are sent verbatim as query parameters (use [`ext_attr_filter`] for
    /// extensible attributes).
    ///
    /// # Errors
    ///
    /// Returns a [`WapiError`] if the request fails or the response cannot be decoded.
    pub async fn search<T: DeserializeOwned>(
        &self,
        object: &str,
        filters: &[(String, String)],
        return_fields: &[&str],
    ) -> Result<Vec<T>, WapiError> {
        let url = self.object_url(object, filters, return_fields)?;
        let text = wapi_request(self, Method::GET, &url, object, None::<&()>).await?;
        decode_result(object, &text)
    }

    /// Resolve an object type or reference against the base URL.
    fn resolve(&self, path: &str) -> Result<Url, WapiError> {
        // "./" keeps references such as "record:cname/..." from parsing as a scheme.
        self.base_url
            .join(&format!("./{}", path.trim_start_matches('/')))
            .map_err(|e| WapiError::InvalidUrl {
                url: path.to_string(),
                reason: e.to_string(),
            })
    }

    fn object_url(
        &self,
        path: &str,
        filters: &[(String, String)],
        return_fields: &[&str],
    ) -> Result<Url, WapiError> {
        let mut url = self.resolve(path)?;
        {
            let mut query = url.query_pairs_mut();
            for (name, value) in filters {
                query.append_pair(name, value);
            }
            if !return_fields.is_empty() {
                query.append_pair(WAPI_RETURN_FIELDS_PLUS, &return_fields.join(","));
            }
            query.append_pair(WAPI_RETURN_AS_OBJECT, "1");
        }
        Ok(url)
    }
}

/// Query parameter name and value matching an extensible attribute (`*Site=NYC`).
#[must_use]
pub fn ext_attr_filter(name: &str, value: &str) -> (String, String) {
    (
        format!("{WAPI_EXTATTR_FILTER_PREFIX}{name}"),
        value.to_string(),
    )
}

/// Build `https://<host>/wapi/<version>/` from a host or URL.
///
/// # Errors
///
/// Returns [`WapiError::InvalidUrl`] if the result is not a valid URL.
pub fn build_base_url(host_url: &str, wapi_version: &str) -> Result<Url, WapiError> {
    let trimmed = host_url.trim().trim_end_matches('/');
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let raw = format!(
        "{with_scheme}/{WAPI_PATH_PREFIX}/{}/",
        wapi_version.trim_matches('/')
    );
    let url = Url::parse(&raw).map_err(|e| WapiError::InvalidUrl {
        url: raw.clone(),
        reason: e.to_string(),
    })?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(WapiError::InvalidUrl {
            url: raw,
            reason: "missing host".to_string(),
        });
    }
    Ok(url)
}

fn decode_result<T: DeserializeOwned>(object: &str, text: &str) -> Result<T, WapiError> {
    serde_json::from_str::<ResultEnvelope<T>>(text)
        .map(|envelope| envelope.result)
        .map_err(|e| WapiError::Decode {
            object: object.to_string(),
            reason: e.to_string(),
        })
}
