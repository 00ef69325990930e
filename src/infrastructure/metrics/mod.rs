//! Prometheus metrics for the extender pipeline.
//!
//! - Envelope metrics (received, duplicates, malformed)
//! - Resolution metrics (how each invocation ended)
//! - Hook failure metrics
//! - Payload field error metrics

mod helpers;

pub use helpers::{encode_metrics, EnvelopeMetrics, HookMetrics, PayloadMetrics, StoreMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, IntCounter, IntCounterVec,
    IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "push_extender";

lazy_static! {
    // ============================================================================
    // Envelope Metrics
    // ============================================================================

    /// Total delivery envelopes handed to the pipeline
    pub static ref ENVELOPES_RECEIVED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_envelopes_received_total", METRIC_PREFIX),
        "Total delivery envelopes received"
    ).unwrap();

    /// Envelopes skipped because the payload was invalid or already processed
    pub static ref DUPLICATES_SKIPPED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_duplicates_skipped_total", METRIC_PREFIX),
        "Total envelopes skipped as invalid or duplicate"
    ).unwrap();

    /// Envelopes whose top-level payload could not be decoded
    pub static ref MALFORMED_ENVELOPES_TOTAL: IntCounter = register_int_counter!(
        format!("{}_malformed_envelopes_total", METRIC_PREFIX),
        "Total envelopes with an undecodable payload"
    ).unwrap();

    // ============================================================================
    // Resolution Metrics
    // ============================================================================

    /// Invocations by final outcome
    pub static ref RESOLUTIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_resolutions_total", METRIC_PREFIX),
        "Total invocations by resolution",
        &["outcome"]
    ).unwrap();

    // ============================================================================
    // Hook Metrics
    // ============================================================================

    /// Processing hook failures, labelled by whether a display had already happened
    pub static ref HOOK_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_hook_failures_total", METRIC_PREFIX),
        "Total processing hook failures",
        &["displayed"]
    ).unwrap();

    // ============================================================================
    // Payload Metrics
    // ============================================================================

    /// Payload fields that failed to parse
    pub static ref PAYLOAD_FIELD_ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_payload_field_errors_total", METRIC_PREFIX),
        "Total payload field parse errors",
        &["field"]
    ).unwrap();

    // ============================================================================
    // Store Metrics
    // ============================================================================

    /// Processed notifications currently remembered
    pub static ref STORE_ENTRIES: IntGauge = register_int_gauge!(
        format!("{}_store_entries", METRIC_PREFIX),
        "Processed notifications currently held by the store"
    ).unwrap();

    /// Entries removed by retention cleanup
    pub static ref STORE_EXPIRED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_store_expired_total", METRIC_PREFIX),
        "Total store entries removed by retention cleanup"
    ).unwrap();
}
