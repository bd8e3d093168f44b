//! Hot reload of the configuration file.
//!
//! The parent directory is watched rather than the file itself. Editors and
//! deployment tools commonly save by renaming a temp file over the original,
//! which replaces the inode; a directory watch keeps seeing the new file.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use notify::event::ModifyKind;
use notify::{Event, EventHandler, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{parse_config, ConfigError};
use crate::config::schema::ReachabilityConfig;

/// Forwards every valid edit of one config file over a channel.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<ReachabilityConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end for reloaded configs.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<ReachabilityConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching. Events flow for as long as the returned watcher lives.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let file_name = self
            .path
            .file_name()
            .map(OsString::from)
            .ok_or_else(|| notify::Error::generic("config path has no file name"))?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let handler = ReloadHandler {
            path: self.path,
            file_name,
            tx: self.update_tx,
            last_sent: None,
            closed: false,
        };
        tracing::info!(path = ?handler.path, dir = ?dir, "Config watcher started");

        let mut watcher = notify::recommended_watcher(handler)?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        Ok(watcher)
    }
}

/// What a directory event means for the watched file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Ignore,
    Reload,
    Removed,
}

struct ReloadHandler {
    path: PathBuf,
    file_name: OsString,
    tx: mpsc::UnboundedSender<ReachabilityConfig>,
    last_sent: Option<ReachabilityConfig>,
    closed: bool,
}

impl ReloadHandler {
    fn classify(&self, event: &Event) -> Change {
        let touches_file = event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(self.file_name.as_os_str()));
        if !touches_file {
            return Change::Ignore;
        }

        match event.kind {
            // A rename reports both ends; only the end that still exists matters.
            EventKind::Modify(ModifyKind::Name(_)) => {
                if self.path.exists() {
                    Change::Reload
                } else {
                    Change::Removed
                }
            }
            EventKind::Create(_) | EventKind::Modify(_) => Change::Reload,
            EventKind::Remove(_) => Change::Removed,
            _ => Change::Ignore,
        }
    }

    fn reload(&mut self) {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = ?self.path, "Config file vanished mid-save");
                return;
            }
            Err(e) => {
                tracing::error!(path = ?self.path, error = %ConfigError::from(e), "Failed to read config");
                return;
            }
        };
        // An in-place write truncates first; the follow-up event carries the text.
        if content.trim().is_empty() {
            tracing::debug!(path = ?self.path, "Config file empty, waiting for write to finish");
            return;
        }

        let config = match parse_config(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(
                    path = ?self.path,
                    error = %e,
                    "Failed to reload config, keeping current configuration"
                );
                return;
            }
        };
        if self.last_sent.as_ref() == Some(&config) {
            return;
        }

        tracing::info!(path = ?self.path, "Config file changed, reloading");
        if self.tx.send(config.clone()).is_err() {
            tracing::info!(path = ?self.path, "Config receiver dropped, ignoring further changes");
            self.closed = true;
            return;
        }
        self.last_sent = Some(config);
    }
}

impl EventHandler for ReloadHandler {
    fn handle_event(&mut self, event: notify::Result<Event>) {
        if self.closed {
            return;
        }
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                tracing::error!(error = %e, "Config watch error");
                return;
            }
        };

        match self.classify(&event) {
            Change::Ignore => {}
            Change::Reload => self.reload(),
            Change::Removed => {
                tracing::warn!(path = ?self.path, "Config file removed, keeping current configuration")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, RemoveKind, RenameMode};

    fn handler(dir: &Path) -> (ReloadHandler, mpsc::UnboundedReceiver<ReachabilityConfig>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handler = ReloadHandler {
            path: dir.join("reachd.toml"),
            file_name: OsString::from("reachd.toml"),
            tx,
            last_sent: None,
            closed: false,
        };
        (handler, rx)
    }

    #[test]
    fn test_classify_filters_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let (handler, _rx) = handler(dir.path());
        let content = || EventKind::Modify(ModifyKind::Data(DataChange::Content));

        let other = Event::new(content()).add_path(dir.path().join("notes.txt"));
        assert_eq!(handler.classify(&other), Change::Ignore);

        let ours = Event::new(content()).add_path(handler.path.clone());
        assert_eq!(handler.classify(&ours), Change::Reload);

        let created = Event::new(EventKind::Create(CreateKind::File)).add_path(handler.path.clone());
        assert_eq!(handler.classify(&created), Change::Reload);

        let read = Event::new(EventKind::Access(AccessKind::Read)).add_path(handler.path.clone());
        assert_eq!(handler.classify(&read), Change::Ignore);

        let removed = Event::new(EventKind::Remove(RemoveKind::File)).add_path(handler.path.clone());
        assert_eq!(handler.classify(&removed), Change::Removed);
    }

    #[test]
    fn test_rename_over_file_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let (handler, _rx) = handler(dir.path());
        fs::write(&handler.path, "interval_ms = 250\n").unwrap();

        let renamed = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(dir.path().join("reachd.toml.swp"))
            .add_path(handler.path.clone());
        assert_eq!(handler.classify(&renamed), Change::Reload);

        fs::remove_file(&handler.path).unwrap();
        assert_eq!(handler.classify(&renamed), Change::Removed);
    }

    #[test]
    fn test_reload_skips_empty_invalid_and_duplicate_content() {
        let dir = tempfile::tempdir().unwrap();
        let (mut handler, mut rx) = handler(dir.path());

        fs::write(&handler.path, "").unwrap();
        handler.reload();
        fs::write(&handler.path, "interval_ms = 0\n").unwrap();
        handler.reload();
        assert!(rx.try_recv().is_err());

        fs::write(&handler.path, "interval_ms = 250\n").unwrap();
        handler.reload();
        handler.reload();
        assert_eq!(rx.try_recv().unwrap().interval_ms, 250);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_stops_after_receiver_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let (mut handler, rx) = handler(dir.path());
        drop(rx);

        fs::write(&handler.path, "interval_ms = 250\n").unwrap();
        handler.reload();
        assert!(handler.closed);
        assert!(handler.last_sent.is_none());
    }
}
