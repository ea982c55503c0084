//! Desktop OS theme source
//!
//! Queries the appearance via `dark-light` (macOS `AppleInterfaceStyle`,
//! Windows `AppsUseLightTheme`, the XDG portal `color-scheme` on Linux) and
//! re-checks it with one [`SchemeWatcher`] per registration.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rustc_hash::FxHashMap;
use theme_changer_core::{
    OsAppearance, SignalHandle, SystemThemeSource, ThemeError, Trigger,
};
use tracing::debug;

use crate::watcher::{SchemeWatcher, WatcherConfig};

/// Appearance query used by [`DesktopThemeSource`]
pub type Detector = Arc<dyn Fn() -> OsAppearance + Send + Sync>;

/// Detect the current desktop appearance
pub fn detect_system_appearance() -> OsAppearance {
    match dark_light::detect() {
        dark_light::Mode::Dark => OsAppearance::Dark,
        dark_light::Mode::Light => OsAppearance::Light,
        dark_light::Mode::Default => OsAppearance::Unspecified,
    }
}

/// [`SystemThemeSource`] for desktop platforms
pub struct DesktopThemeSource {
    config: WatcherConfig,
    detector: Detector,
    watchers: Mutex<FxHashMap<SignalHandle, SchemeWatcher>>,
    next_handle: AtomicU64,
}

impl DesktopThemeSource {
    pub fn new(config: WatcherConfig) -> Self {
        Self::with_detector(config, Arc::new(detect_system_appearance))
    }

    /// Use a custom appearance query instead of `dark-light`
    pub fn with_detector(config: WatcherConfig, detector: Detector) -> Self {
        Self {
            config,
            detector,
            watchers: Mutex::new(FxHashMap::default()),
            next_handle: AtomicU64::new(1),
        }
    }

    /// Number of running watchers
    pub fn active_watchers(&self) -> usize {
        self.lock_watchers().len()
    }

    fn lock_watchers(&self) -> MutexGuard<'_, FxHashMap<SignalHandle, SchemeWatcher>> {
        self.watchers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for DesktopThemeSource {
    fn default() -> Self {
        Self::new(WatcherConfig::default())
    }
}

impl SystemThemeSource for DesktopThemeSource {
    fn appearance(&self) -> Result<OsAppearance, ThemeError> {
        Ok((self.detector)())
    }

    fn register(&self, trigger: Trigger) -> Result<SignalHandle, ThemeError> {
        let watcher = SchemeWatcher::spawn(&self.config, trigger)?;
        let handle = SignalHandle::new(self.next_handle.fetch_add(1, Ordering::SeqCst));
        self.lock_watchers().insert(handle, watcher);
        debug!("DesktopThemeSource::register - watcher {}", handle.id());
        Ok(handle)
    }

    fn unregister(&self, handle: SignalHandle) -> Result<(), ThemeError> {
        // Take the watcher out first; stopping joins the thread.
        let watcher = self.lock_watchers().remove(&handle);
        match watcher {
            Some(watcher) => {
                watcher.stop();
                debug!("DesktopThemeSource::unregister - watcher {}", handle.id());
                Ok(())
            }
            None => Err(ThemeError::environment(format!(
                "no watcher registered for handle {}",
                handle.id()
            ))),
        }
    }
}
