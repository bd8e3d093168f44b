//! The reachability polling engine.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::background::{AppMode, BackgroundSetup, ModeCallback, Registration};
use crate::config::{validate_config, ReachabilityConfig, ScheduleConfig, ValidationError};
use crate::engine::error::{EngineError, EngineResult};
use crate::observability::metrics;
use crate::probe::{HttpProbe, Prober, ReqwestProbe};
use crate::schedule::{IntervalScheduler, TickFn};
use crate::state::ConnectivityStateHolder;

/// Lifecycle position of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    /// Constructed, no timer yet.
    Idle,
    /// Exactly one timer armed with the period for this mode.
    Running(AppMode),
    /// Terminal: timer disarmed, adapter torn down.
    Stopped,
}

/// Polls a URL and publishes whether it was reachable.
///
/// Dropping the engine stops it.
pub struct ReachabilityEngine {
    inner: Arc<Inner>,
}

struct Inner {
    state: Arc<ConnectivityStateHolder>,
    transport: Arc<dyn HttpProbe>,
    /// Root of every probe's cancellation token.
    shutdown: CancellationToken,
    control: Mutex<Control>,
}

struct Control {
    status: EngineStatus,
    config: ReachabilityConfig,
    prober: Arc<Prober>,
    schedule: ScheduleConfig,
    background: Option<Arc<dyn BackgroundSetup>>,
    scheduler: Option<IntervalScheduler>,
    registration: Option<Registration>,
}

fn build(
    transport: &Arc<dyn HttpProbe>,
    config: &ReachabilityConfig,
) -> EngineResult<(Arc<Prober>, ScheduleConfig)> {
    validate_config(config).map_err(EngineError::InvalidConfig)?;
    let probe_config = config.probe_config().map_err(|e| {
        EngineError::InvalidConfig(vec![ValidationError::InvalidUrl {
            url: config.reachability_url.clone(),
            reason: e.to_string(),
        }])
    })?;
    Ok((
        Arc::new(Prober::new(transport.clone(), probe_config)),
        config.schedule_config(),
    ))
}

impl ReachabilityEngine {
    /// Create an engine probing over HTTP(S) with reqwest.
    pub fn new(config: ReachabilityConfig) -> EngineResult<Self> {
        Self::with_transport(config, Arc::new(ReqwestProbe::new()?))
    }

    /// Create an engine probing through `transport`.
    pub fn with_transport(
        config: ReachabilityConfig,
        transport: Arc<dyn HttpProbe>,
    ) -> EngineResult<Self> {
        let (prober, schedule) = build(&transport, &config)?;
        let state = Arc::new(ConnectivityStateHolder::new(config.initial_connection_state));

        Ok(Self {
            inner: Arc::new(Inner {
                state,
                transport,
                shutdown: CancellationToken::new(),
                control: Mutex::new(Control {
                    status: EngineStatus::Idle,
                    config,
                    prober,
                    schedule,
                    background: None,
                    scheduler: None,
                    registration: None,
                }),
            }),
        })
    }

    /// Attach the host's foreground/background signal. Registered on `start`.
    pub fn with_background_setup(self, setup: impl BackgroundSetup + 'static) -> Self {
        self.inner.lock_control().background = Some(Arc::new(setup));
        self
    }

    /// Arm the foreground timer and register the background adapter, if any.
    ///
    /// The first probe runs one full interval after this returns.
    pub fn start(&self) -> EngineResult<()> {
        let runtime = Handle::try_current().map_err(|_| EngineError::NoRuntime)?;

        let background = {
            let mut control = self.inner.lock_control();
            match control.status {
                EngineStatus::Idle => {}
                EngineStatus::Running(_) => return Err(EngineError::AlreadyRunning),
                EngineStatus::Stopped => return Err(EngineError::Stopped),
            }

            control.scheduler = Some(IntervalScheduler::new(runtime));
            self.inner.rearm(&mut control, AppMode::Foreground);

            tracing::info!(
                url = %control.prober.config().url,
                interval_ms = control.schedule.foreground_interval.as_millis() as u64,
                timeout_ms = control.prober.config().timeout.as_millis() as u64,
                background = control.background.is_some(),
                "Reachability engine started"
            );
            control.background.clone()
        };

        // The adapter may invoke the callback synchronously, so it is
        // registered without holding the control lock.
        if let Some(setup) = background {
            let registration = Registration::new(setup.register(Inner::mode_callback(&self.inner)));
            let leftover = {
                let mut control = self.inner.lock_control();
                if control.status == EngineStatus::Stopped {
                    Some(registration)
                } else {
                    control.registration = Some(registration);
                    None
                }
            };
            drop(leftover);
        }

        Ok(())
    }

    /// Swap in a new configuration and re-arm for the current mode.
    ///
    /// Probes already in flight finish under the old configuration. The
    /// published value is not re-seeded.
    pub fn reconfigure(&self, config: ReachabilityConfig) -> EngineResult<()> {
        let (prober, schedule) = build(&self.inner.transport, &config)?;

        let mut control = self.inner.lock_control();
        if control.status == EngineStatus::Stopped {
            return Err(EngineError::Stopped);
        }

        control.config = config;
        control.prober = prober;
        control.schedule = schedule;

        if let EngineStatus::Running(mode) = control.status {
            self.inner.rearm(&mut control, mode);
        }
        tracing::info!(
            url = %control.prober.config().url,
            interval_ms = control.schedule.foreground_interval.as_millis() as u64,
            background_interval_ms = control.schedule.background_interval.as_millis() as u64,
            "Reachability engine reconfigured"
        );
        Ok(())
    }

    /// Disarm the timer, cancel in-flight probes and tear down the background
    /// registration. Safe to call repeatedly.
    pub fn stop(&self) {
        let registration = {
            let mut control = self.inner.lock_control();
            if control.status == EngineStatus::Stopped {
                return;
            }
            control.status = EngineStatus::Stopped;
            if let Some(scheduler) = control.scheduler.take() {
                scheduler.disarm();
            }
            self.inner.shutdown.cancel();
            control.registration.take()
        };
        drop(registration);

        tracing::info!("Reachability engine stopped");
    }

    /// Run one probe now, outside the tick cycle, and publish its result.
    pub async fn probe_once(&self) -> bool {
        let prober = self.inner.lock_control().prober.clone();
        run_probe(&prober, &self.inner.state, &self.inner.shutdown).await
    }

    /// Latest published reachability.
    pub fn is_reachable(&self) -> bool {
        self.inner.state.get()
    }

    /// Observe reachability changes.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.state.subscribe()
    }

    /// Number of probe results published so far.
    pub fn probes_published(&self) -> u64 {
        self.inner.state.version()
    }

    pub fn status(&self) -> EngineStatus {
        self.inner.lock_control().status
    }

    /// Mode of the live timer; foreground unless a background adapter said otherwise.
    pub fn mode(&self) -> AppMode {
        match self.status() {
            EngineStatus::Running(mode) => mode,
            _ => AppMode::Foreground,
        }
    }

    /// Period of the live timer, `None` unless running.
    pub fn active_period(&self) -> Option<Duration> {
        self.inner
            .lock_control()
            .scheduler
            .as_ref()
            .and_then(IntervalScheduler::active_period)
    }

    pub fn config(&self) -> ReachabilityConfig {
        self.inner.lock_control().config.clone()
    }
}

impl Drop for ReachabilityEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Inner {
    fn lock_control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Disarm and arm with the period for `mode`. Holds the control lock for
    /// the whole pair so two re-arms cannot interleave.
    fn rearm(&self, control: &mut Control, mode: AppMode) {
        let Some(scheduler) = control.scheduler.as_ref() else {
            return;
        };
        let period = control.schedule.period(mode == AppMode::Background);
        let on_tick = self.tick_fn(&control.prober, scheduler.runtime());

        scheduler.arm(period, on_tick);
        control.status = EngineStatus::Running(mode);
        metrics::record_rearm(mode.as_str());
    }

    /// Each tick spawns its own probe; ticks never wait on each other.
    fn tick_fn(&self, prober: &Arc<Prober>, runtime: &Handle) -> TickFn {
        let prober = prober.clone();
        let state = self.state.clone();
        let shutdown = self.shutdown.clone();
        let runtime = runtime.clone();

        Arc::new(move || {
            let prober = prober.clone();
            let state = state.clone();
            let shutdown = shutdown.clone();
            runtime.spawn(async move {
                run_probe(&prober, &state, &shutdown).await;
            });
        })
    }

    fn mode_callback(inner: &Arc<Inner>) -> ModeCallback {
        let weak: Weak<Inner> = Arc::downgrade(inner);
        Arc::new(move |is_background: bool| {
            if let Some(inner) = weak.upgrade() {
                inner.on_mode_change(AppMode::from_background(is_background));
            }
        })
    }

    fn on_mode_change(&self, mode: AppMode) {
        let mut control = self.lock_control();
        let EngineStatus::Running(previous) = control.status else {
            tracing::debug!(%mode, "Mode change ignored, engine not running");
            return;
        };

        self.rearm(&mut control, mode);
        tracing::info!(
            from = %previous,
            to = %mode,
            period_ms = control.schedule.period(mode == AppMode::Background).as_millis() as u64,
            "Host mode changed, timer re-armed"
        );
    }
}

/// Probe and publish. A probe cut short by shutdown publishes nothing.
async fn run_probe(
    prober: &Prober,
    state: &ConnectivityStateHolder,
    shutdown: &CancellationToken,
) -> bool {
    let reachable = prober.probe(shutdown).await;
    if !shutdown.is_cancelled() {
        state.set(reachable);
    }
    reachable
}
