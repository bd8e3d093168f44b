//! Active internet reachability polling.
//!
//! Repeatedly probes a URL under a deadline and publishes a boolean
//! "reachable" signal, polling faster while the host is in the foreground
//! than while it is in the background.

pub mod background;
pub mod config;
pub mod engine;
pub mod observability;
pub mod probe;
pub mod schedule;
pub mod state;

pub use background::{AppMode, BackgroundSetup, ModeCallback, Teardown};
pub use config::ReachabilityConfig;
pub use engine::{EngineError, EngineStatus, ReachabilityEngine};
pub use probe::{HttpProbe, ProbeError};
