//! Theme controller
//!
//! Owns the last observed OS theme, reads and writes the stored preference,
//! and decides when a theme change is observable to listeners.
//!
//! Two paths emit `onChangeTheme`:
//! - [`ThemeController::set_theme`] always emits, even if nothing changed.
//! - OS-driven re-evaluation emits only while the preference is `System` and
//!   the OS theme differs from the last one observed. Signal sources fire far
//!   more often than the theme actually changes (every foreground, every
//!   configuration change, every poll tick).
//!
//! Every environment failure (store or signal source) is logged and absorbed.
//! The only error a caller can see is an invalid theme string.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace, warn};

use crate::config::ControllerConfig;
use crate::emitter::{Subscription, ThemeEmitter};
use crate::error::Result;
use crate::signal::{SignalHandle, SignalKind, SystemThemeSource, Trigger};
use crate::store::PreferenceStore;
use crate::theme::{EffectiveTheme, ThemeChangeEvent, ThemePreference};

/// OS-change tracking lifecycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LifecycleState {
    #[default]
    Uninitialized,
    Active,
    TornDown,
}

#[derive(Default)]
struct ControllerState {
    lifecycle: LifecycleState,
    last_observed_os_theme: Option<EffectiveTheme>,
    registration: Option<SignalHandle>,
}

struct ControllerInner {
    config: ControllerConfig,
    store: Arc<dyn PreferenceStore>,
    source: Arc<dyn SystemThemeSource>,
    emitter: ThemeEmitter,
    /// Serializes the dedup cache and store access; triggers may arrive
    /// from a watcher thread. Event sequence numbers are taken under it.
    state: Mutex<ControllerState>,
}

/// Resolves the user's theme preference against the OS theme and notifies
/// listeners of effective theme changes.
///
/// Cloning is cheap; clones share state.
#[derive(Clone)]
pub struct ThemeController {
    inner: Arc<ControllerInner>,
}

impl ThemeController {
    pub fn new(store: Arc<dyn PreferenceStore>, source: Arc<dyn SystemThemeSource>) -> Self {
        Self::with_config(ControllerConfig::default(), store, source)
    }

    pub fn with_config(
        config: ControllerConfig,
        store: Arc<dyn PreferenceStore>,
        source: Arc<dyn SystemThemeSource>,
    ) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                config,
                store,
                source,
                emitter: ThemeEmitter::new(),
                state: Mutex::new(ControllerState::default()),
            }),
        }
    }

    // ========== Lifecycle ==========

    /// Seed the OS theme cache and start listening for re-check signals.
    ///
    /// Never fails. If registration is refused, explicit calls keep working
    /// but nothing re-evaluates automatically until a later `initialize()`
    /// succeeds. Calling this while active replaces the previous registration.
    pub fn initialize(&self) {
        let previous = self.inner.lock_state().registration.take();
        if let Some(handle) = previous {
            self.inner.unregister(handle);
        }

        let os_theme = self.inner.current_os_theme();
        {
            let mut state = self.inner.lock_state();
            state.last_observed_os_theme = Some(os_theme);
            state.lifecycle = LifecycleState::Active;
        }

        let weak = Arc::downgrade(&self.inner);
        let trigger: Trigger = Arc::new(move |kind| {
            if let Some(inner) = weak.upgrade() {
                inner.reevaluate(kind);
            }
        });

        // Registration happens outside the state lock: a source may deliver
        // from its own thread as soon as it is registered.
        match self.inner.source.register(trigger) {
            Ok(handle) => {
                let (kept, stale) = {
                    let mut state = self.inner.lock_state();
                    if state.lifecycle == LifecycleState::Active {
                        // A concurrent initialize may have stored its own.
                        (true, state.registration.replace(handle))
                    } else {
                        (false, Some(handle))
                    }
                };
                if let Some(stale) = stale {
                    self.inner.unregister(stale);
                }
                if kept {
                    debug!(
                        "ThemeController::initialize - registered (handle {}), os theme {}",
                        handle.id(),
                        os_theme
                    );
                } else {
                    debug!(
                        "ThemeController::initialize - torn down while registering, \
                         dropped handle {}",
                        handle.id()
                    );
                }
            }
            Err(e) => {
                warn!(
                    "ThemeController::initialize - signal registration failed, \
                     OS changes will not be tracked: {}",
                    e
                );
            }
        }
    }

    /// Stop listening for re-check signals and clear the OS theme cache.
    ///
    /// Safe from any state, any number of times.
    pub fn teardown(&self) {
        let registration = {
            let mut state = self.inner.lock_state();
            state.last_observed_os_theme = None;
            if state.lifecycle == LifecycleState::Active {
                state.lifecycle = LifecycleState::TornDown;
            }
            state.registration.take()
        };

        // Unregistering may join a watcher thread that is waiting on the
        // state lock, so the lock must not be held here.
        if let Some(handle) = registration {
            self.inner.unregister(handle);
            debug!("ThemeController::teardown - unregistered handle {}", handle.id());
        }
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.inner.lock_state().lifecycle
    }

    /// The OS theme seen at the last initialization or re-evaluation
    pub fn last_observed_os_theme(&self) -> Option<EffectiveTheme> {
        self.inner.lock_state().last_observed_os_theme
    }

    // ========== Preference ==========

    /// Persist a preference and emit a change event.
    ///
    /// Emits unconditionally, even if the effective theme is unchanged.
    pub fn set_theme(&self, preference: ThemePreference) {
        let (seq, event) = {
            let _state = self.inner.lock_state();
            self.inner.write_preference(preference);
            let effective = preference.resolve(self.inner.current_os_theme());
            (
                self.inner.emitter.next_sequence(),
                ThemeChangeEvent::new(preference, effective),
            )
        };

        debug!(
            "ThemeController::set_theme - {} (effective {})",
            event.theme, event.effective_theme
        );
        self.inner.emitter.emit(seq, &event);
    }

    /// [`set_theme`](Self::set_theme) for untyped input.
    ///
    /// Fails with [`ThemeError::InvalidArgument`](crate::ThemeError::InvalidArgument)
    /// unless `value` is exactly `"light"`, `"dark"` or `"system"`; the stored
    /// preference is left untouched in that case.
    pub fn set_theme_str(&self, value: &str) -> Result<()> {
        let preference = value.parse::<ThemePreference>()?;
        self.set_theme(preference);
        Ok(())
    }

    /// The stored preference, `System` if nothing usable is stored
    pub fn get_theme(&self) -> ThemePreference {
        let _state = self.inner.lock_state();
        self.inner.read_preference()
    }

    /// The stored preference resolved against a fresh OS query
    pub fn get_effective_theme(&self) -> EffectiveTheme {
        let _state = self.inner.lock_state();
        self.inner
            .read_preference()
            .resolve(self.inner.current_os_theme())
    }

    /// The OS theme right now (never the cached value)
    pub fn get_system_theme(&self) -> EffectiveTheme {
        self.inner.current_os_theme()
    }

    // ========== Events ==========

    /// Subscribe to `onChangeTheme` events
    pub fn add_listener<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ThemeChangeEvent) + Send + Sync + 'static,
    {
        self.inner.emitter.add_listener(listener)
    }
}

impl ControllerInner {
    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_os_theme(&self) -> EffectiveTheme {
        match self.source.appearance() {
            Ok(appearance) => appearance.normalize(),
            Err(e) => {
                warn!("OS theme query failed, assuming light: {}", e);
                EffectiveTheme::Light
            }
        }
    }

    /// Callers must hold the state lock
    fn read_preference(&self) -> ThemePreference {
        match self.store.get(&self.config.store_key) {
            Ok(Some(value)) => value.parse().unwrap_or_else(|e| {
                warn!(
                    "Ignoring stored theme under {:?}: {}",
                    self.config.store_key, e
                );
                ThemePreference::System
            }),
            Ok(None) => ThemePreference::System,
            Err(e) => {
                warn!("Preference store read failed, assuming system: {}", e);
                ThemePreference::System
            }
        }
    }

    /// Callers must hold the state lock
    fn write_preference(&self, preference: ThemePreference) {
        if let Err(e) = self.store.set(&self.config.store_key, preference.as_str()) {
            warn!("Preference store write failed for {}: {}", preference, e);
        }
    }

    fn unregister(&self, handle: SignalHandle) {
        if let Err(e) = self.source.unregister(handle) {
            warn!("Signal unregister failed for handle {}: {}", handle.id(), e);
        }
    }

    /// Re-check the OS theme after a signal and emit if a `System`
    /// preference now resolves differently.
    fn reevaluate(&self, kind: SignalKind) {
        let event = {
            let mut state = self.lock_state();
            if state.lifecycle != LifecycleState::Active {
                trace!("reevaluate({:?}) ignored in {:?}", kind, state.lifecycle);
                return;
            }

            let current = self.current_os_theme();
            let stored = self.read_preference();
            let changed = state.last_observed_os_theme != Some(current);
            state.last_observed_os_theme = Some(current);

            if stored.is_system() && changed {
                Some((
                    self.emitter.next_sequence(),
                    ThemeChangeEvent::new(ThemePreference::System, current),
                ))
            } else {
                trace!(
                    "reevaluate({:?}) - no change (stored {}, os {})",
                    kind,
                    stored,
                    current
                );
                None
            }
        };

        if let Some((seq, event)) = event {
            debug!(
                "OS theme changed to {} while following system",
                event.effective_theme
            );
            self.emitter.emit(seq, &event);
        }
    }
}
