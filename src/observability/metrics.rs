//! Metrics collection and exposition.
//!
//! # Metrics
//! - `routegraph_requests_total` (counter): requests by method, route, status
//! - `routegraph_request_duration_seconds` (histogram): latency distribution
//! - `routegraph_registered_entries` (gauge): entries per kind
//! - `routegraph_registered_routes` (gauge): routes across all groups

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::registry::RegistrySnapshot;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

/// Record one finished request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("routegraph_requests_total", &labels).increment(1);
    metrics::histogram!("routegraph_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Publish registry sizes.
pub fn record_registry(snapshot: &RegistrySnapshot) {
    for (kind, count) in [
        ("controller", snapshot.controllers.len()),
        ("middleware", snapshot.middlewares.len()),
        ("validation", snapshot.validations.len()),
    ] {
        metrics::gauge!("routegraph_registered_entries", "kind" => kind).set(count as f64);
    }
    metrics::gauge!("routegraph_registered_routes").set(snapshot.route_count() as f64);
}

/// Middleware recording every request against its matched route template.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    record_request(&method, &route, response.status().as_u16(), start);
    response
}
