//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use super::{
    DUPLICATES_SKIPPED_TOTAL, ENVELOPES_RECEIVED_TOTAL, HOOK_FAILURES_TOTAL,
    MALFORMED_ENVELOPES_TOTAL, PAYLOAD_FIELD_ERRORS_TOTAL, RESOLUTIONS_TOTAL, STORE_ENTRIES,
    STORE_EXPIRED_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording envelope metrics
pub struct EnvelopeMetrics;

impl EnvelopeMetrics {
    pub fn record_received() {
        ENVELOPES_RECEIVED_TOTAL.inc();
    }

    pub fn record_duplicate() {
        DUPLICATES_SKIPPED_TOTAL.inc();
    }

    pub fn record_malformed() {
        MALFORMED_ENVELOPES_TOTAL.inc();
    }

    /// Record how an invocation was resolved
    pub fn record_resolution(outcome: &str) {
        RESOLUTIONS_TOTAL.with_label_values(&[outcome]).inc();
    }
}

/// Helper struct for recording processing hook metrics
pub struct HookMetrics;

impl HookMetrics {
    /// Record a hook failure
    pub fn record_failure(displayed: bool) {
        let label = if displayed { "true" } else { "false" };
        HOOK_FAILURES_TOTAL.with_label_values(&[label]).inc();
    }
}

/// Helper struct for recording payload parsing metrics
pub struct PayloadMetrics;

impl PayloadMetrics {
    pub fn record_field_error(field: &str) {
        PAYLOAD_FIELD_ERRORS_TOTAL.with_label_values(&[field]).inc();
    }
}

/// Helper struct for recording store metrics
pub struct StoreMetrics;

impl StoreMetrics {
    pub fn set_entries(count: usize) {
        STORE_ENTRIES.set(count as i64);
    }

    pub fn record_expired(count: usize) {
        STORE_EXPIRED_TOTAL.inc_by(count as u64);
    }
}
