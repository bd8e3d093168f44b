//! Scheduling subsystem.
//!
//! # Data Flow
//! ```text
//! engine.start() / mode change / reconfigure
//!     → scheduler.rs arm(period, on_tick)   (old timer aborted first)
//!     → every period: on_tick()
//!     → engine spawns one probe task, never awaited by the timer
//! ```
//!
//! # Design Decisions
//! - Time comes from Tokio's clock, so tests drive it with a paused runtime
//! - Exactly one live timer per scheduler

pub mod scheduler;

pub use scheduler::{IntervalScheduler, TickFn, TimerHandle};
