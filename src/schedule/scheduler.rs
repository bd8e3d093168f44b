//! Single recurring timer.
//!
//! # Responsibilities
//! - Own the one live timer of an engine
//! - Fire `on_tick` every period, first tick one full period after arming
//! - Replace the timer atomically on re-arm (disarm, then arm)
//!
//! # Design Decisions
//! - The live handle sits in a mutex-guarded slot; a tick only fires while
//!   its timer is still the one in the slot, checked under that lock, so a
//!   tick that was due but not yet delivered is dropped by `disarm`
//! - No in-place period change: a new period is a new timer
//! - Ticks never wait for the previous tick's work

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Work run on every tick. Must not block and must not call back into the
/// scheduler that fired it.
pub type TickFn = Arc<dyn Fn() + Send + Sync>;

/// The live timer: its identity, period and driving task.
#[derive(Debug)]
pub struct TimerHandle {
    id: u64,
    period: Duration,
    task: JoinHandle<()>,
}

impl TimerHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

type Slot = Arc<Mutex<Option<TimerHandle>>>;

fn lock(slot: &Mutex<Option<TimerHandle>>) -> MutexGuard<'_, Option<TimerHandle>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns at most one recurring timer at a time.
#[derive(Debug)]
pub struct IntervalScheduler {
    runtime: Handle,
    slot: Slot,
    next_id: AtomicU64,
}

impl IntervalScheduler {
    /// Timers are spawned on `runtime`, so `arm` may be called from any thread.
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            slot: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(1),
        }
    }

    /// Start a timer firing `on_tick` every `period`, replacing any live one.
    ///
    /// Returns the new timer's ID.
    pub fn arm(&self, period: Duration, on_tick: TickFn) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut slot = lock(&self.slot);

        if let Some(previous) = slot.take() {
            previous.task.abort();
            tracing::trace!(timer_id = previous.id, "Timer disarmed for re-arm");
        }

        let task = self.runtime.spawn(run_timer(self.slot.clone(), id, period, on_tick));
        *slot = Some(TimerHandle { id, period, task });

        tracing::debug!(timer_id = id, period_ms = period.as_millis() as u64, "Timer armed");
        id
    }

    /// Stop the live timer. No tick fires after this returns.
    ///
    /// Returns false if nothing was armed.
    pub fn disarm(&self) -> bool {
        match lock(&self.slot).take() {
            Some(handle) => {
                handle.task.abort();
                tracing::debug!(timer_id = handle.id, "Timer disarmed");
                true
            }
            None => false,
        }
    }

    /// Runtime the timers run on.
    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }

    pub fn is_armed(&self) -> bool {
        lock(&self.slot).is_some()
    }

    /// Period of the live timer, if any.
    pub fn active_period(&self) -> Option<Duration> {
        lock(&self.slot).as_ref().map(TimerHandle::period)
    }

    /// ID of the live timer, if any.
    pub fn active_id(&self) -> Option<u64> {
        lock(&self.slot).as_ref().map(TimerHandle::id)
    }
}

impl Drop for IntervalScheduler {
    fn drop(&mut self) {
        self.disarm();
    }
}

async fn run_timer(slot: Slot, id: u64, period: Duration, on_tick: TickFn) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let fired = {
            let current = lock(&slot);
            match current.as_ref() {
                Some(handle) if handle.id == id => {
                    tracing::trace!(timer_id = id, "Tick");
                    on_tick();
                    true
                }
                _ => false,
            }
        };
        if !fired {
            break;
        }
    }
}
