//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the poller.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Root configuration for the reachability poller.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReachabilityConfig {
    /// Value published before the first probe resolves.
    pub initial_connection_state: bool,

    /// Deadline for each probe in milliseconds.
    pub timeout_ms: u64,

    /// Probe target.
    pub reachability_url: String,

    /// Status codes counted as reachable.
    pub expected_response_status: Vec<u16>,

    /// Foreground polling period in milliseconds.
    pub interval_ms: u64,

    /// Background polling period in milliseconds.
    /// Only used when a background adapter is attached to the engine.
    pub background_interval_ms: u64,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ReachabilityConfig {
    fn default() -> Self {
        Self {
            initial_connection_state: true,
            timeout_ms: 3000,
            reachability_url: "https://clients3.google.com/generate_204".to_string(),
            expected_response_status: vec![204],
            interval_ms: 1000,
            background_interval_ms: 10_000,
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ReachabilityConfig {
    /// Derive the probe settings.
    ///
    /// Fails only if `reachability_url` does not parse; callers normally run
    /// [`validate_config`](crate::config::validation::validate_config) first.
    pub fn probe_config(&self) -> Result<ProbeConfig, url::ParseError> {
        Ok(ProbeConfig {
            url: Url::parse(&self.reachability_url)?,
            timeout: Duration::from_millis(self.timeout_ms),
            expected_status_codes: self.expected_response_status.iter().copied().collect(),
        })
    }

    /// Derive the schedule settings.
    pub fn schedule_config(&self) -> ScheduleConfig {
        ScheduleConfig {
            foreground_interval: Duration::from_millis(self.interval_ms),
            background_interval: Duration::from_millis(self.background_interval_ms),
        }
    }
}

/// Settings for a single probe. Immutable once handed to a prober.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    pub url: Url,
    pub timeout: Duration,
    pub expected_status_codes: BTreeSet<u16>,
}

impl ProbeConfig {
    /// Whether `status` counts as reachable.
    pub fn is_expected(&self, status: u16) -> bool {
        self.expected_status_codes.contains(&status)
    }
}

/// The two polling periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub foreground_interval: Duration,
    pub background_interval: Duration,
}

impl ScheduleConfig {
    /// Period for the given host mode.
    pub fn period(&self, is_background: bool) -> Duration {
        if is_background {
            self.background_interval
        } else {
            self.foreground_interval
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
