//! Unix signal adapter.
//!
//! Lets a supervisor (or a shell) flip the poller between modes:
//! `SIGUSR1` → background, `SIGUSR2` → foreground.

use tokio::runtime::Handle;
use tokio::signal::unix::{signal, SignalKind};

use crate::background::{BackgroundSetup, ModeCallback, Teardown};

/// Background mode driven by `SIGUSR1`/`SIGUSR2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalAdapter;

impl BackgroundSetup for SignalAdapter {
    fn register(&self, on_mode_change: ModeCallback) -> Option<Teardown> {
        let runtime = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!(error = %e, "Signal adapter needs a Tokio runtime, background mode disabled");
                return None;
            }
        };

        // Signal streams must be created inside the runtime context.
        let _guard = runtime.enter();
        let (mut to_background, mut to_foreground) =
            match (signal(SignalKind::user_defined1()), signal(SignalKind::user_defined2())) {
                (Ok(bg), Ok(fg)) => (bg, fg),
                (Err(e), _) | (_, Err(e)) => {
                    tracing::error!(error = %e, "Failed to install mode signal handlers");
                    return None;
                }
            };

        let task = runtime.spawn(async move {
            loop {
                let is_background = tokio::select! {
                    received = to_background.recv() => match received {
                        Some(()) => true,
                        None => break,
                    },
                    received = to_foreground.recv() => match received {
                        Some(()) => false,
                        None => break,
                    },
                };
                tracing::info!(is_background, "Mode signal received");
                on_mode_change(is_background);
            }
        });

        tracing::info!("Listening for SIGUSR1 (background) and SIGUSR2 (foreground)");
        Some(Teardown::new(move || task.abort()))
    }
}
