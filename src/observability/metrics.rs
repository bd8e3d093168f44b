//! Metrics collection and exposition.
//!
//! # Metrics
//! - `reachability_probes_total` (counter): probes by outcome
//! - `reachability_probe_duration_seconds` (histogram): probe latency
//! - `reachability_reachable` (gauge): 1=reachable, 0=unreachable
//! - `reachability_rearms_total` (counter): timer re-arms by mode
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and serve it on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one completed probe.
pub fn record_probe(outcome: &'static str, elapsed: Duration) {
    metrics::counter!("reachability_probes_total", "outcome" => outcome).increment(1);
    metrics::histogram!("reachability_probe_duration_seconds").record(elapsed.as_secs_f64());
}

/// Record the currently published reachability.
pub fn record_reachability(reachable: bool) {
    metrics::gauge!("reachability_reachable").set(if reachable { 1.0 } else { 0.0 });
}

/// Record a timer re-arm.
pub fn record_rearm(mode: &'static str) {
    metrics::counter!("reachability_rearms_total", "mode" => mode).increment(1);
}
