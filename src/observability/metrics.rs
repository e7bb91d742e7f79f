//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dispatch_passes_total` (counter): passes started by the dispatcher
//! - `path_matches_total` (counter): matched paths by `path`
//! - `handler_errors_total` (counter): failed handlers by `path`
//! - `http_requests_total` (counter): requests by `method`, `status`
//! - `http_request_duration_seconds` (histogram): latency by `method`
//! - `settings_reloads_total` (counter): dispatch settings swapped at runtime
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Starts the Prometheus exporter on `addr`. Requires a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_pass() {
    counter!("dispatch_passes_total").increment(1);
}

pub fn record_match(path: &str) {
    counter!("path_matches_total", "path" => path.to_string()).increment(1);
}

pub fn record_handler_error(path: &str) {
    counter!("handler_errors_total", "path" => path.to_string()).increment(1);
}

pub fn record_settings_reload() {
    counter!("settings_reloads_total").increment(1);
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("http_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_recorder_is_noop() {
        record_pass();
        record_match("p");
        record_handler_error("p");
        record_request("GET", 200, Instant::now());
        record_settings_reload();
    }
}
