// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Raw WAPI request execution with retry.

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, error, info, trace, warn};
use url::Url;

use super::retry::{is_transient_status, RetrySchedule};
use super::WapiClient;
use crate::errors::WapiError;
use crate::metrics::{record_wapi_request, record_wapi_retry};

/// WAPI error body: `{"Error": "...", "code": "Client.Ibap.Data", "text": "..."}`.
#[derive(Debug, Deserialize)]
struct WapiErrorBody {
    #[serde(rename = "Error")]
    error: Option<String>,
    code: Option<String>,
    text: Option<String>,
}

/// Execute a request against the WAPI with automatic retry.
///
/// # Retry Behavior
/// - Retries on HTTP 429, 500, 502, 503, 504 and on connection failures or timeouts
/// - POST is never retried after a connection failure or timeout: the grid may
///   have committed the object, and a second POST would fail as a duplicate
/// - Exponential backoff: 50ms initial, 2x multiplier, 10s cap
/// - Gives up once the client's max retry time has elapsed
///
/// # Arguments
/// * `client` - WAPI client holding the HTTP client and credentials
/// * `method` - HTTP method
/// * `url` - Full request URL, query string included
/// * `object` - Object type or reference, used in errors and logs
/// * `body` - Optional JSON body for POST/PUT requests
///
/// # Errors
///
/// Returns [`WapiError::NotFound`] on HTTP 404, [`WapiError::Api`] on any other
/// non-retryable status, [`WapiError::Connection`] or [`WapiError::Timeout`] when
/// a POST fails in flight, and [`WapiError::RetriesExhausted`] when transient
/// failures persist past the retry budget.
pub(crate) async fn wapi_request<T: Serialize + std::fmt::Debug>(
    client: &WapiClient,
    method: Method,
    url: &Url,
    object: &str,
    body: Option<&T>,
) -> Result<String, WapiError> {
    let mut schedule = RetrySchedule::new(client.max_retry_elapsed);
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        match wapi_request_internal(client, &method, url, object, body).await {
            Ok(response) => {
                if attempt > 1 {
                    debug!(
                        method = %method,
                        object = %object,
                        attempt = attempt,
                        elapsed = ?schedule.elapsed(),
                        "WAPI call succeeded after retries"
                    );
                }
                return Ok(response);
            }
            Err(e) => {
                if !e.is_retryable() {
                    if !e.is_not_found() {
                        error!(
                            method = %method,
                            object = %object,
                            error = %e,
                            "Non-retryable WAPI error, failing immediately"
                        );
                    }
                    return Err(e);
                }

                if method == Method::POST && e.status_code().is_none() {
                    error!(
                        method = %method,
                        object = %object,
                        error = %e,
                        "Create outcome unknown, not retrying"
                    );
                    return Err(e);
                }

                if let Some(duration) = schedule.next() {
                    warn!(
                        method = %method,
                        object = %object,
                        attempt = attempt,
                        retry_after = ?duration,
                        error = %e,
                        "Retryable WAPI error, will retry"
                    );
                    record_wapi_retry(method.as_str());
                    tokio::time::sleep(duration).await;
                } else {
                    error!(
                        method = %method,
                        object = %object,
                        attempt = attempt,
                        elapsed = ?schedule.elapsed(),
                        error = %e,
                        "Retry budget spent, giving up"
                    );
                    return Err(WapiError::RetriesExhausted {
                        attempts: attempt,
                        last_error: e.to_string(),
                    });
                }
            }
        }
    }
}

/// Single request attempt without retry.
async fn wapi_request_internal<T: Serialize + std::fmt::Debug>(
    client: &WapiClient,
    method: &Method,
    url: &Url,
    object: &str,
    body: Option<&T>,
) -> Result<String, WapiError> {
    info!(method = %method, object = %object, "WAPI request");
    trace!(url = %url, body = ?body, "WAPI request details");

    let mut request = client
        .http
        .request(method.clone(), url.clone())
        .basic_auth(&client.username, Some(&client.password));
    if let Some(body_data) = body {
        request = request.json(body_data);
    }

    let started = Instant::now();
    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                record_wapi_request(method.as_str(), "timeout", started.elapsed());
                WapiError::Timeout {
                    host: client.host.clone(),
                    timeout_ms: u64::try_from(client.timeout.as_millis()).unwrap_or(u64::MAX),
                }
            } else {
                record_wapi_request(method.as_str(), "connection_error", started.elapsed());
                WapiError::Connection {
                    host: client.host.clone(),
                    reason: e.to_string(),
                }
            };
            return Err(error);
        }
    };

    let status = response.status();
    let text = response.text().await.map_err(|e| WapiError::Connection {
        host: client.host.clone(),
        reason: format!("failed to read response body: {e}"),
    })?;
    record_wapi_request(method.as_str(), status.as_str(), started.elapsed());

    if status == StatusCode::NOT_FOUND {
        return Err(WapiError::NotFound {
            reference: object.to_string(),
            host: client.host.clone(),
        });
    }

    if !status.is_success() {
        let parsed = serde_json::from_str::<WapiErrorBody>(&text).ok();
        let (code, message) = match parsed {
            Some(body) => (body.code, body.text.or(body.error)),
            None => (None, None),
        };
        let text = message.unwrap_or_else(|| {
            if text.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            } else {
                text
            }
        });
        if !is_transient_status(status.as_u16()) {
            debug!(
                method = %method,
                object = %object,
                status = %status,
                code = ?code,
                "WAPI returned an error response"
            );
        }
        return Err(WapiError::Api {
            method: method.to_string(),
            object: object.to_string(),
            status: status.as_u16(),
            code,
            text,
        });
    }

    debug!(
        method = %method,
        object = %object,
        status = %status,
        response_len = text.len(),
        "WAPI request successful"
    );

    Ok(text)
}
