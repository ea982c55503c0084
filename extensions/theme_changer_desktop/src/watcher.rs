//! Polling watcher
//!
//! Desktop platforms have no portable push notification for appearance
//! changes, so the watcher wakes up on an interval and fires its trigger with
//! [`SignalKind::Poll`]. Most ticks see no change; the controller discards
//! those.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use theme_changer_core::{SignalKind, ThemeError, Trigger};
use tracing::{debug, trace, warn};

/// Watcher configuration
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// Milliseconds between polls
    pub interval_ms: u64,
}

impl WatcherConfig {
    /// Lower bound so a bad config cannot spin a core
    pub const MIN_INTERVAL_MS: u64 = 50;

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(Self::MIN_INTERVAL_MS))
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self { interval_ms: 1000 }
    }
}

/// A running poll thread
pub struct SchemeWatcher {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl SchemeWatcher {
    /// Spawn the poll thread
    pub fn spawn(config: &WatcherConfig, trigger: Trigger) -> Result<Self, ThemeError> {
        let interval = config.interval();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name("theme-watcher".to_string())
            .spawn(move || {
                debug!("theme watcher started ({:?} interval)", interval);
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            trace!("theme watcher tick");
                            trigger(SignalKind::Poll);
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("theme watcher stopped");
            })
            .map_err(|e| ThemeError::environment(format!("failed to spawn theme watcher: {e}")))?;

        Ok(Self {
            stop_tx,
            handle: Some(handle),
        })
    }

    /// Signal the thread to stop and wait for it.
    ///
    /// When called from the watcher thread itself (the last controller
    /// reference dropped inside a tick) the thread is only signalled.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                warn!("theme watcher thread panicked");
            }
        }
    }
}

impl Drop for SchemeWatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
