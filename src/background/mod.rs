//! Foreground/background mode signal.
//!
//! # Data Flow
//! ```text
//! engine.start()
//!     → BackgroundSetup::register(on_mode_change)   (platform hook, external)
//!     → Registration held by the engine
//!
//! host goes to background / foreground
//!     → on_mode_change(is_background)
//!     → engine disarms and re-arms with the matching period
//!
//! engine.stop() or drop
//!     → Registration dropped → teardown runs exactly once
//! ```
//!
//! # Design Decisions
//! - The engine never implements platform detection; it only subscribes
//! - A setup may return no teardown when there is nothing to undo

#[cfg(unix)]
pub mod signals;

use std::fmt;
use std::sync::Arc;

/// Which polling period applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    #[default]
    Foreground,
    Background,
}

impl AppMode {
    pub fn from_background(is_background: bool) -> Self {
        if is_background {
            AppMode::Background
        } else {
            AppMode::Foreground
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AppMode::Foreground => "foreground",
            AppMode::Background => "background",
        }
    }
}

impl fmt::Display for AppMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invoked by the adapter on every transition; `true` means background.
pub type ModeCallback = Arc<dyn Fn(bool) + Send + Sync>;

/// Undoes a platform registration.
pub struct Teardown(Box<dyn FnOnce() + Send>);

impl Teardown {
    pub fn new(f: impl FnOnce() + Send + 'static) -> Self {
        Self(Box::new(f))
    }

    fn run(self) {
        (self.0)()
    }
}

impl fmt::Debug for Teardown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Teardown")
    }
}

/// Hooks the host's foreground/background transitions.
pub trait BackgroundSetup: Send + Sync {
    /// Arrange for `on_mode_change` to be called on every transition.
    fn register(&self, on_mode_change: ModeCallback) -> Option<Teardown>;
}

impl<F> BackgroundSetup for F
where
    F: Fn(ModeCallback) -> Option<Teardown> + Send + Sync,
{
    fn register(&self, on_mode_change: ModeCallback) -> Option<Teardown> {
        self(on_mode_change)
    }
}

/// A live registration. Dropping it runs the teardown.
#[derive(Debug, Default)]
pub(crate) struct Registration {
    teardown: Option<Teardown>,
}

impl Registration {
    pub(crate) fn new(teardown: Option<Teardown>) -> Self {
        Self { teardown }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            tracing::debug!("Tearing down background mode registration");
            teardown.run();
        }
    }
}
