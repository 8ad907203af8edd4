//! Prometheus metrics for posts-service.
//!
//! Exposes mutation collectors and an HTTP handler for the `/metrics` endpoint.

use actix_web::HttpResponse;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static::lazy_static! {
    /// Post mutations by operation and outcome
    static ref POST_MUTATIONS: IntCounterVec = register_int_counter_vec!(
        "posts_mutations_total",
        "Post mutations by operation and outcome",
        &["operation", "outcome"]
    ).expect("Prometheus metrics registration should succeed at startup");

    /// Rewrites rejected because the stored version moved on
    static ref POST_VERSION_CONFLICTS: IntCounterVec = register_int_counter_vec!(
        "posts_version_conflicts_total",
        "Post rewrites rejected by the optimistic version check",
        &["operation"]
    ).expect("Prometheus metrics registration should succeed at startup");

    /// HTTP latency by route pattern, not raw path, to keep label cardinality bounded
    static ref HTTP_REQUEST_DURATION: HistogramVec = register_histogram_vec!(
        "posts_http_request_duration_seconds",
        "HTTP request latency",
        &["method", "route", "status"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    ).expect("Prometheus metrics registration should succeed at startup");
}

pub fn record_mutation(operation: &str, ok: bool) {
    let outcome = if ok { "success" } else { "rejected" };
    POST_MUTATIONS
        .with_label_values(&[operation, outcome])
        .inc();
}

pub fn record_version_conflict(operation: &str) {
    POST_VERSION_CONFLICTS.with_label_values(&[operation]).inc();
}

pub fn observe_http_request(method: &str, route: &str, status: u16, seconds: f64) {
    HTTP_REQUEST_DURATION
        .with_label_values(&[method, route, &status.to_string()])
        .observe(seconds);
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
