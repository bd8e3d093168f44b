//! reachd: internet reachability poller.
//!
//! Probes a URL on a fixed interval and prints every reachability
//! transition. With `--once` it probes a single time and exits 0 when
//! reachable, 1 otherwise.
//!
//! # Signals
//! - `SIGUSR1`: switch to the background interval
//! - `SIGUSR2`: switch back to the foreground interval
//! - `Ctrl+C`: stop
//!
//! Edits to the `--config` file are applied live.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tokio::sync::{mpsc, watch};

use reachability::config::watcher::ConfigWatcher;
use reachability::config::{load_config, validate_config, ConfigError, ReachabilityConfig};
use reachability::observability::{logging, metrics};
use reachability::ReachabilityEngine;

#[derive(Parser, Debug)]
#[command(name = "reachd")]
#[command(about = "Poll a URL and report whether the internet is reachable", long_about = None)]
struct Cli {
    /// TOML configuration file; watched for changes.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Probe target.
    #[arg(long)]
    url: Option<String>,

    /// Foreground polling period in milliseconds.
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Background polling period in milliseconds.
    #[arg(long)]
    background_interval_ms: Option<u64>,

    /// Deadline for each probe in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Status codes counted as reachable, comma separated.
    #[arg(long = "expect", value_delimiter = ',')]
    expected_status: Vec<u16>,

    /// Log level (overridden by RUST_LOG).
    #[arg(long)]
    log_level: Option<String>,

    /// Probe once and exit.
    #[arg(long)]
    once: bool,

    /// Print transitions as JSON lines.
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// Flags win over file values, including after a reload.
    fn apply(&self, config: &mut ReachabilityConfig) {
        if let Some(url) = &self.url {
            config.reachability_url = url.clone();
        }
        if let Some(interval) = self.interval_ms {
            config.interval_ms = interval;
        }
        if let Some(interval) = self.background_interval_ms {
            config.background_interval_ms = interval;
        }
        if let Some(timeout) = self.timeout_ms {
            config.timeout_ms = timeout;
        }
        if !self.expected_status.is_empty() {
            config.expected_response_status = self.expected_status.clone();
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
    }

    fn load(&self) -> Result<ReachabilityConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ReachabilityConfig::default(),
        };
        self.apply(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

/// One printed transition.
#[derive(Debug, Serialize)]
struct ReachabilityEvent<'a> {
    reachable: bool,
    url: &'a str,
    mode: &'static str,
    probes: u64,
}

fn report(engine: &ReachabilityEngine, url: &str, reachable: bool, json: bool) {
    let event = ReachabilityEvent {
        reachable,
        url,
        mode: engine.mode().as_str(),
        probes: engine.probes_published(),
    };
    if json {
        match serde_json::to_string(&event) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::error!(error = %e, "Failed to encode event"),
        }
    } else {
        let verdict = if event.reachable { "reachable" } else { "unreachable" };
        println!("{verdict} ({}, {} probes) {}", event.mode, event.probes, event.url);
    }
}

async fn next_reload(
    updates: &mut Option<mpsc::UnboundedReceiver<ReachabilityConfig>>,
) -> Option<ReachabilityConfig> {
    match updates {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.load()?;

    logging::init_logging(&config.observability.log_level)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "reachd starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let engine = ReachabilityEngine::new(config.clone())?;
    let mut url = config.reachability_url.clone();

    if cli.once {
        let reachable = engine.probe_once().await;
        report(&engine, &url, reachable, cli.json);
        return Ok(if reachable { ExitCode::SUCCESS } else { ExitCode::FAILURE });
    }

    #[cfg(unix)]
    let engine = engine.with_background_setup(reachability::background::signals::SignalAdapter);

    let mut state: watch::Receiver<bool> = engine.subscribe();
    engine.start()?;
    report(&engine, &url, *state.borrow_and_update(), cli.json);

    // The watcher stops delivering once dropped, so keep it alive here.
    let (_watcher, mut updates) = match &cli.config {
        Some(path) => {
            let (watcher, rx) = ConfigWatcher::new(path);
            match watcher.run() {
                Ok(handle) => (Some(handle), Some(rx)),
                Err(e) => {
                    tracing::warn!(error = %e, "Config watcher unavailable, hot reload disabled");
                    (None, None)
                }
            }
        }
        None => (None, None),
    };

    loop {
        tokio::select! {
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let reachable = *state.borrow_and_update();
                report(&engine, &url, reachable, cli.json);
            }
            Some(mut reloaded) = next_reload(&mut updates) => {
                cli.apply(&mut reloaded);
                let next_url = reloaded.reachability_url.clone();
                match engine.reconfigure(reloaded) {
                    Ok(()) => url = next_url,
                    Err(e) => tracing::error!(error = %e, "Rejected reloaded configuration"),
                }
            }
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                }
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    engine.stop();
    tracing::info!("Shutdown complete");
    Ok(ExitCode::SUCCESS)
}
