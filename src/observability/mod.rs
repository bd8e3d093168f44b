//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! prober, scheduler, engine produce:
//!     → tracing events (structured fields: url, status, period_ms, mode)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Every probe runs inside a span carrying its own probe ID
//! - Metrics are recorder-agnostic; the exporter is opt-in

pub mod logging;
pub mod metrics;
