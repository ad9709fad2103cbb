// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the NIOS DNS provider.
//!
//! All metrics carry the namespace prefix `nios_dns_`.
//!
//! # Metrics Categories
//!
//! - **WAPI Metrics** - HTTP requests to the grid master, their latency and retries
//! - **Resource Operation Metrics** - create/read/update/delete/import outcomes
//! - **Reconciliation Metrics** - extensible-attribute conversion failures
//!
//! # Example
//!
//! ```rust,no_run
//! use nios_dns::metrics::{gather_metrics, record_operation_success};
//!
//! record_operation_success("nios_dns_zone_auth", "create", std::time::Duration::from_millis(120));
//! println!("{}", gather_metrics().unwrap());
//! ```

use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all provider metrics
const METRICS_NAMESPACE: &str = "nios_dns";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// WAPI Metrics
// ============================================================================

/// Total number of WAPI requests by method and outcome
///
/// Labels:
/// - `method`: HTTP method (`GET`, `POST`, `PUT`, `DELETE`)
/// - `status`: HTTP status code, or `connection_error`/`timeout`
pub static WAPI_REQUESTS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_wapi_requests_total"),
        "Total number of WAPI requests by method and status",
    );
    let counter = CounterVec::new(opts, &["method", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of individual WAPI requests in seconds
pub static WAPI_REQUEST_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_wapi_request_duration_seconds"),
        "Duration of WAPI requests in seconds by method",
    )
    .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]);
    let histogram = HistogramVec::new(opts, &["method"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Total number of WAPI request retries after transient failures
pub static WAPI_RETRIES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_wapi_retries_total"),
        "Total number of WAPI request retries by method",
    );
    let counter = CounterVec::new(opts, &["method"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Resource Operation Metrics
// ============================================================================

/// Total number of resource operations by resource type, operation and outcome
///
/// Labels:
/// - `resource_type`: e.g. `nios_dns_zone_auth`
/// - `operation`: `create`, `read`, `update`, `delete`, `import`, `search`
/// - `status`: `success` or `error`
pub static RESOURCE_OPERATIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_resource_operations_total"),
        "Total number of resource operations by resource type, operation and status",
    );
    let counter = CounterVec::new(opts, &["resource_type", "operation", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of resource operations in seconds, retries included
pub static RESOURCE_OPERATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_resource_operation_duration_seconds"),
        "Duration of resource operations in seconds by resource type and operation",
    )
    .buckets(vec![0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]);
    let histogram = HistogramVec::new(opts, &["resource_type", "operation"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Number of resources tracked in state by resource type
pub static RESOURCES_MANAGED: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_resources_managed"),
        "Number of resources tracked in state by resource type",
    );
    let gauge = GaugeVec::new(opts, &["resource_type"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

// ============================================================================
// Reconciliation Metrics
// ============================================================================

/// Total number of extensible-attribute reconciliation failures
///
/// Labels:
/// - `resource_type`: e.g. `nios_dns_record_cname`
/// - `operation`: operation that was aborted
pub static EXTATTR_RECONCILE_ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_extattr_reconcile_errors_total"),
        "Total number of extensible attribute conversion failures by resource type and operation",
    );
    let counter = CounterVec::new(opts, &["resource_type", "operation"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record one WAPI request attempt
///
/// # Arguments
/// * `method` - HTTP method
/// * `status` - HTTP status code or failure kind
/// * `duration` - Time until the response (or failure) was received
pub fn record_wapi_request(method: &str, status: &str, duration: Duration) {
    WAPI_REQUESTS_TOTAL
        .with_label_values(&[method, status])
        .inc();
    WAPI_REQUEST_DURATION_SECONDS
        .with_label_values(&[method])
        .observe(duration.as_secs_f64());
}

/// Record a retry of a WAPI request
pub fn record_wapi_retry(method: &str) {
    WAPI_RETRIES_TOTAL.with_label_values(&[method]).inc();
}

/// Record a successful resource operation
///
/// # Arguments
/// * `resource_type` - Resource type name
/// * `operation` - Operation name (e.g. `create`)
/// * `duration` - Duration of the whole operation
pub fn record_operation_success(resource_type: &str, operation: &str, duration: Duration) {
    RESOURCE_OPERATIONS_TOTAL
        .with_label_values(&[resource_type, operation, "success"])
        .inc();
    RESOURCE_OPERATION_DURATION_SECONDS
        .with_label_values(&[resource_type, operation])
        .observe(duration.as_secs_f64());
}

/// Record a failed resource operation
pub fn record_operation_error(resource_type: &str, operation: &str, duration: Duration) {
    RESOURCE_OPERATIONS_TOTAL
        .with_label_values(&[resource_type, operation, "error"])
        .inc();
    RESOURCE_OPERATION_DURATION_SECONDS
        .with_label_values(&[resource_type, operation])
        .observe(duration.as_secs_f64());
}

/// Record an extensible-attribute conversion failure
pub fn record_reconcile_error(resource_type: &str, operation: &str) {
    EXTATTR_RECONCILE_ERRORS_TOTAL
        .with_label_values(&[resource_type, operation])
        .inc();
}

/// Set the number of resources of one type tracked in state
#[allow(clippy::cast_precision_loss)]
pub fn set_managed_resources(resource_type: &str, count: usize) {
    RESOURCES_MANAGED
        .with_label_values(&[resource_type])
        .set(count as f64);
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_wapi_request() {
        record_wapi_request("GET", "200", Duration::from_millis(20));

        let counter = WAPI_REQUESTS_TOTAL.with_label_values(&["GET", "200"]);
        assert!(counter.get() > 0.0);

        let histogram = WAPI_REQUEST_DURATION_SECONDS.with_label_values(&["GET"]);
        assert!(histogram.get_sample_count() > 0);
    }

    #[test]
    fn test_record_operation_outcomes() {
        let resource_type = "test_operation_outcomes";

        record_operation_success(resource_type, "create", Duration::from_millis(500));
        record_operation_error(resource_type, "update", Duration::from_millis(250));

        let success =
            RESOURCE_OPERATIONS_TOTAL.with_label_values(&[resource_type, "create", "success"]);
        let error = RESOURCE_OPERATIONS_TOTAL.with_label_values(&[resource_type, "update", "error"]);
        assert!(success.get() > 0.0);
        assert!(error.get() > 0.0);
    }

    #[test]
    fn test_set_managed_resources() {
        set_managed_resources("test_managed", 3);

        #[allow(clippy::float_cmp)]
        {
            assert_eq!(
                RESOURCES_MANAGED.with_label_values(&["test_managed"]).get(),
                3.0
            );
        }
    }

    #[test]
    fn test_gather_metrics() {
        record_reconcile_error("GatherTest", "read");
        record_wapi_retry("PUT");

        let metrics_text = gather_metrics().expect("Gathering metrics should succeed");

        assert!(
            metrics_text.contains("nios_dns_extattr_reconcile_errors_total"),
            "Metrics should contain reconcile error counter"
        );
        assert!(metrics_text.contains("nios_dns_wapi_retries_total"));
    }
}
