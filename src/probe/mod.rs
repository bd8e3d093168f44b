//! Reachability probing subsystem.
//!
//! # Data Flow
//! ```text
//! tick
//!     → prober.rs (child cancellation token + deadline)
//!     → transport.rs (one uncached GET, raw status code)
//!     → prober.rs (status ∈ expected set?)
//!     → bool
//! ```
//!
//! # Design Decisions
//! - Failure is the unreachable signal, not an exception: every
//!   `ProbeError` is logged and folded into `false`
//! - No retries inside a probe; the next tick is the retry
//! - The network sits behind the `HttpProbe` trait so tests can script it

pub mod error;
pub mod prober;
pub mod transport;

pub use error::{BoxError, ProbeError};
pub use prober::Prober;
pub use transport::{HttpProbe, ReqwestProbe};
