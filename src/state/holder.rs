//! Published connectivity value.
//!
//! # Responsibilities
//! - Hold the current reachability, seeded from the configured initial value
//! - Notify observers when the value changes
//!
//! # Design Decisions
//! - Backed by a `watch` channel: observers always see the latest value and
//!   never queue stale transitions
//! - Duplicate consecutive values do not wake observers
//! - Only the engine writes; `set` is crate-private

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use crate::observability::metrics;

/// Latest reachability plus change notification.
#[derive(Debug)]
pub struct ConnectivityStateHolder {
    tx: watch::Sender<bool>,
    /// Number of probe results published so far.
    version: AtomicU64,
}

impl ConnectivityStateHolder {
    pub fn new(initial: bool) -> Self {
        let (tx, _) = watch::channel(initial);
        metrics::record_reachability(initial);
        Self {
            tx,
            version: AtomicU64::new(0),
        }
    }

    /// Current value.
    pub fn get(&self) -> bool {
        *self.tx.borrow()
    }

    /// Number of completed probes published since construction.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Observe the value. The receiver starts with the current value marked
    /// as seen.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Publish a probe result. Returns whether the value changed.
    pub(crate) fn set(&self, reachable: bool) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == reachable {
                false
            } else {
                *current = reachable;
                true
            }
        });
        self.version.fetch_add(1, Ordering::AcqRel);

        if changed {
            tracing::info!(reachable, "Connectivity changed");
            metrics::record_reachability(reachable);
        }
        changed
    }
}
