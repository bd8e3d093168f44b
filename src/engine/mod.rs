//! Reachability engine.
//!
//! # Data Flow
//! ```text
//! start()
//!     → ConnectivityStateHolder seeded with initial_connection_state
//!     → IntervalScheduler armed with the foreground interval
//!     → BackgroundSetup registered (optional)
//!
//! every tick:
//!     → spawn probe task (child cancellation token, deadline)
//!     → state.set(result) → watch observers notified on change
//!
//! mode change (adapter callback):
//!     → disarm + arm with foreground/background interval
//!
//! reconfigure(config):
//!     → validate → new Prober → disarm + arm for the current mode
//!
//! stop() / drop:
//!     → disarm → cancel in-flight probes → adapter teardown (once)
//! ```
//!
//! # State Machine
//! ```text
//! Idle → Running(Foreground) ⇄ Running(Background) → Stopped
//! ```
//! There is no error state: a failed probe is just `false`.
//!
//! # Design Decisions
//! - Single-flight is NOT enforced; overlapping probes are allowed and the
//!   last one to resolve wins
//! - The control mutex guards every disarm/arm pair, keeping one live timer
//! - Probe tasks capture their own `Prober`, so a reconfigure never changes a
//!   probe that is already running

pub mod error;
pub mod poller;

pub use error::{EngineError, EngineResult};
pub use poller::{EngineStatus, ReachabilityEngine};
