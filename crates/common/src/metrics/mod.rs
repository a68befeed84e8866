//! Metrics and observability utilities
//!
//! Prometheus metrics for inbound requests and for every call made to an
//! external collaborator.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Medicast metrics
pub const METRICS_PREFIX: &str = "medicast";

/// Buckets for external call latency. Extraction jobs and speech synthesis
/// routinely take tens of seconds.
pub const EXTERNAL_CALL_BUCKETS: &[f64] = &[
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
    30.00,  // 30s
    60.00,  // 1m
    120.0,  // 2m
    300.0,  // 5m
];

/// External collaborators, used as the `service` label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Extraction,
    Completion,
    Speech,
    Storage,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Extraction => "extraction",
            Service::Completion => "completion",
            Service::Speech => "speech",
            Service::Storage => "storage",
        }
    }
}

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    describe_counter!(
        format!("{}_external_calls_total", METRICS_PREFIX),
        Unit::Count,
        "Total calls to external services"
    );

    describe_histogram!(
        format!("{}_external_call_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "External service call latency in seconds"
    );

    describe_counter!(
        format!("{}_podcasts_generated_total", METRICS_PREFIX),
        Unit::Count,
        "Podcast episodes uploaded to storage"
    );

    describe_counter!(
        format!("{}_audio_bytes_total", METRICS_PREFIX),
        Unit::Bytes,
        "Synthesized audio bytes uploaded"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Times one call to an external service
pub struct ExternalCall {
    start: Instant,
    service: Service,
}

impl ExternalCall {
    pub fn start(service: Service) -> Self {
        Self {
            start: Instant::now(),
            service,
        }
    }

    /// Record the call and return its duration in milliseconds for logging
    pub fn finish(self, success: bool) -> u64 {
        let elapsed = self.start.elapsed();
        let status = if success { "success" } else { "error" };

        counter!(
            format!("{}_external_calls_total", METRICS_PREFIX),
            "service" => self.service.as_str(),
            "status" => status
        )
        .increment(1);

        histogram!(
            format!("{}_external_call_duration_seconds", METRICS_PREFIX),
            "service" => self.service.as_str()
        )
        .record(elapsed.as_secs_f64());

        elapsed.as_millis() as u64
    }
}

/// Helper to record a stored podcast episode
pub fn record_podcast(audio_bytes: usize) {
    counter!(format!("{}_podcasts_generated_total", METRICS_PREFIX)).increment(1);
    counter!(format!("{}_audio_bytes_total", METRICS_PREFIX)).increment(audio_bytes as u64);
}
