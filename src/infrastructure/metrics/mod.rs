//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - Live flash subscriber gauge
//! - Broadcast events by outcome (sequenced / dropped) and per-subscriber delivery failures
//! - Persisted notifications by kind
//! - Push sends by outcome

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Number of live flash subscribers held by the hub
pub static FLASH_SUBSCRIBERS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new("flash_subscribers_active", "Number of live flash subscribers")
            .namespace("chattr"),
    )
    .expect("Failed to create FLASH_SUBSCRIBERS_ACTIVE metric")
});

/// Broadcast events by outcome ("sequenced", "dropped")
pub static FLASH_EVENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("flash_events_total", "Broadcast events handed to the hub").namespace("chattr"),
        &["outcome"],
    )
    .expect("Failed to create FLASH_EVENTS_TOTAL metric")
});

/// Subscribers dropped because a write failed or timed out
pub static FLASH_DELIVERY_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new(
            "flash_delivery_failures_total",
            "Subscriber writes that failed or timed out",
        )
        .namespace("chattr"),
    )
    .expect("Failed to create FLASH_DELIVERY_FAILURES_TOTAL metric")
});

/// Persisted notifications by kind
pub static NOTIFICATIONS_CREATED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("notifications_created_total", "Notification rows persisted").namespace("chattr"),
        &["kind"],
    )
    .expect("Failed to create NOTIFICATIONS_CREATED_TOTAL metric")
});

/// Push attempts by outcome ("sent", "stubbed", "failed", "timeout", "skipped")
pub static PUSH_SENDS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("push_sends_total", "Push notification attempts").namespace("chattr"),
        &["outcome"],
    )
    .expect("Failed to create PUSH_SENDS_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(FLASH_SUBSCRIBERS_ACTIVE.clone()))
        .expect("Failed to register FLASH_SUBSCRIBERS_ACTIVE");
    registry
        .register(Box::new(FLASH_EVENTS_TOTAL.clone()))
        .expect("Failed to register FLASH_EVENTS_TOTAL");
    registry
        .register(Box::new(FLASH_DELIVERY_FAILURES_TOTAL.clone()))
        .expect("Failed to register FLASH_DELIVERY_FAILURES_TOTAL");
    registry
        .register(Box::new(NOTIFICATIONS_CREATED_TOTAL.clone()))
        .expect("Failed to register NOTIFICATIONS_CREATED_TOTAL");
    registry
        .register(Box::new(PUSH_SENDS_TOTAL.clone()))
        .expect("Failed to register PUSH_SENDS_TOTAL");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Update the live subscriber gauge
pub fn set_flash_subscribers(count: usize) {
    Lazy::force(&REGISTRY);
    FLASH_SUBSCRIBERS_ACTIVE.set(count as i64);
}

/// Record a publish attempt ("sequenced" or "dropped")
pub fn record_flash_event(outcome: &str) {
    Lazy::force(&REGISTRY);
    FLASH_EVENTS_TOTAL.with_label_values(&[outcome]).inc();
}

/// Record a subscriber dropped during fan-out
pub fn record_flash_delivery_failure() {
    Lazy::force(&REGISTRY);
    FLASH_DELIVERY_FAILURES_TOTAL.inc();
}

/// Record a persisted notification
pub fn record_notification_created(kind: &str) {
    Lazy::force(&REGISTRY);
    NOTIFICATIONS_CREATED_TOTAL.with_label_values(&[kind]).inc();
}

/// Record a push attempt outcome
pub fn record_push_send(outcome: &str) {
    Lazy::force(&REGISTRY);
    PUSH_SENDS_TOTAL.with_label_values(&[outcome]).inc();
}
