// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the reconciliation engine.
//!
//! All metrics use the namespace prefix `dnscontrol`. A run is short-lived, so
//! nothing is served over HTTP: the registry is encoded in text exposition
//! format and written to `--metrics-file` when the run ends.
//!
//! # Metrics Categories
//!
//! - **Planning Metrics** - Zones planned and their outcome
//! - **Provider Call Metrics** - Calls by operation and outcome, with latency
//! - **Correction Metrics** - Corrections executed by provider and outcome
//!
//! # Example
//!
//! ```rust,no_run
//! use dnscontrol::metrics::record_correction;
//!
//! record_correction("cloudflare", "success");
//! ```

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all metrics
const METRICS_NAMESPACE: &str = "dnscontrol";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Planning Metrics
// ============================================================================

/// Total number of (zone, provider) pairs planned
///
/// Labels:
/// - `provider`: Provider instance name
/// - `status`: Outcome (`planned`, `failed`)
pub static ZONES_PLANNED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_zones_planned_total"),
        "Total number of zone plans by provider and status",
    );
    let counter = CounterVec::new(opts, &["provider", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Provider Call Metrics
// ============================================================================

/// Total number of provider calls
///
/// Labels:
/// - `provider`: Provider instance name
/// - `operation`: Driver operation (e.g., `list_zones`, `get_zone_records`)
/// - `status`: Outcome (`success`, `transient`, `permanent`, `timeout`, ...)
pub static PROVIDER_CALLS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_provider_calls_total"),
        "Total number of provider calls by provider, operation and status",
    );
    let counter = CounterVec::new(opts, &["provider", "operation", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of provider calls in seconds
///
/// Labels:
/// - `provider`: Provider instance name
/// - `operation`: Driver operation
pub static PROVIDER_CALL_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_provider_call_duration_seconds"),
        "Duration of provider calls in seconds by provider and operation",
    )
    .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 120.0]);
    let histogram = HistogramVec::new(opts, &["provider", "operation"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Correction Metrics
// ============================================================================

/// Total number of corrections handled in phase 2
///
/// Labels:
/// - `provider`: Provider or registrar instance name
/// - `status`: Outcome (`success`, `error`, `skipped`, `previewed`)
pub static CORRECTIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_corrections_total"),
        "Total number of corrections by provider and status",
    );
    let counter = CounterVec::new(opts, &["provider", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record one provider call attempt
///
/// # Arguments
/// * `provider` - Provider instance name
/// * `operation` - Driver operation
/// * `status` - `success` or an error kind
/// * `duration` - Time spent in the call
pub fn record_provider_call(provider: &str, operation: &str, status: &str, duration: Duration) {
    PROVIDER_CALLS_TOTAL
        .with_label_values(&[provider, operation, status])
        .inc();
    PROVIDER_CALL_DURATION_SECONDS
        .with_label_values(&[provider, operation])
        .observe(duration.as_secs_f64());
}

/// Record the outcome of planning one (zone, provider)
pub fn record_zone_planned(provider: &str, ok: bool) {
    let status = if ok { "planned" } else { "failed" };
    ZONES_PLANNED_TOTAL
        .with_label_values(&[provider, status])
        .inc();
}

/// Record the outcome of one correction
///
/// # Arguments
/// * `provider` - Provider or registrar instance name
/// * `status` - `success`, `error`, `skipped` or `previewed`
pub fn record_correction(provider: &str, status: &str) {
    CORRECTIONS_TOTAL
        .with_label_values(&[provider, status])
        .inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Returns
/// Prometheus-formatted metrics as a String
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

/// Encode all metrics and write them to `path`.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub async fn write_metrics_file(path: &Path) -> anyhow::Result<()> {
    use anyhow::Context;

    let text = gather_metrics()?;
    tokio::fs::write(path, text)
        .await
        .with_context(|| format!("Failed to write metrics to {}", path.display()))
}
