//! OS theme signal sources
//!
//! A [`SystemThemeSource`] answers "what is the OS appearance right now" and
//! calls a registered [`Trigger`] whenever it is worth asking again: an OS
//! appearance change, the app returning to the foreground, or a poll tick.
//! Triggers may fire without any actual change; the controller deduplicates.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::{Result, ThemeError};
use crate::theme::OsAppearance;

/// Why a trigger fired
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// The OS reported an appearance/configuration change
    AppearanceChanged,
    /// The app came back to the foreground
    Foreground,
    /// A periodic re-check with no OS notification behind it
    Poll,
}

/// Callback invoked by a signal source
pub type Trigger = Arc<dyn Fn(SignalKind) + Send + Sync>;

/// Identifies one registration with a signal source
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SignalHandle(u64);

impl SignalHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Source of the OS appearance and of re-check notifications
pub trait SystemThemeSource: Send + Sync {
    /// Query the current OS appearance
    fn appearance(&self) -> Result<OsAppearance>;

    /// Start delivering re-check notifications to `trigger`
    fn register(&self, trigger: Trigger) -> Result<SignalHandle>;

    /// Stop delivering notifications for `handle`
    fn unregister(&self, handle: SignalHandle) -> Result<()>;
}

/// Signal source driven explicitly by the host.
///
/// Hosts that already receive appearance and lifecycle callbacks (a mobile
/// binding, a windowing event loop) push them in through
/// [`set_appearance`](Self::set_appearance), [`notify_changed`](Self::notify_changed)
/// and [`notify_foreground`](Self::notify_foreground).
pub struct ManualThemeSource {
    appearance: RwLock<OsAppearance>,
    triggers: Mutex<FxHashMap<SignalHandle, Trigger>>,
    next_handle: AtomicU64,
    attached: AtomicBool,
}

impl ManualThemeSource {
    pub fn new(appearance: OsAppearance) -> Self {
        Self {
            appearance: RwLock::new(appearance),
            triggers: Mutex::new(FxHashMap::default()),
            next_handle: AtomicU64::new(1),
            attached: AtomicBool::new(true),
        }
    }

    /// Update the appearance without notifying anyone
    pub fn set_appearance(&self, appearance: OsAppearance) {
        *self
            .appearance
            .write()
            .unwrap_or_else(PoisonError::into_inner) = appearance;
    }

    /// Mark the host context as attached or detached.
    ///
    /// While detached, queries and registrations fail, the way a native
    /// module behaves before its host context is ready.
    pub fn set_attached(&self, attached: bool) {
        self.attached.store(attached, Ordering::SeqCst);
    }

    /// Update the appearance and notify every registered trigger
    pub fn change_appearance(&self, appearance: OsAppearance) {
        self.set_appearance(appearance);
        self.notify_changed();
    }

    /// Fire [`SignalKind::AppearanceChanged`] on every registered trigger
    pub fn notify_changed(&self) -> usize {
        self.fire(SignalKind::AppearanceChanged)
    }

    /// Fire [`SignalKind::Foreground`] on every registered trigger
    pub fn notify_foreground(&self) -> usize {
        self.fire(SignalKind::Foreground)
    }

    /// Number of live registrations
    pub fn registered_count(&self) -> usize {
        self.lock_triggers().len()
    }

    fn fire(&self, kind: SignalKind) -> usize {
        // Snapshot so triggers can (un)register without deadlocking.
        let triggers: Vec<Trigger> = self.lock_triggers().values().cloned().collect();
        trace!("ManualThemeSource::fire {:?} -> {} trigger(s)", kind, triggers.len());
        for trigger in &triggers {
            trigger(kind);
        }
        triggers.len()
    }

    fn lock_triggers(&self) -> std::sync::MutexGuard<'_, FxHashMap<SignalHandle, Trigger>> {
        self.triggers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_attached(&self) -> Result<()> {
        if self.attached.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ThemeError::environment("host context not attached"))
        }
    }
}

impl Default for ManualThemeSource {
    fn default() -> Self {
        Self::new(OsAppearance::Light)
    }
}

impl SystemThemeSource for ManualThemeSource {
    fn appearance(&self) -> Result<OsAppearance> {
        self.check_attached()?;
        Ok(*self.appearance.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn register(&self, trigger: Trigger) -> Result<SignalHandle> {
        self.check_attached()?;
        let handle = SignalHandle::new(self.next_handle.fetch_add(1, Ordering::SeqCst));
        self.lock_triggers().insert(handle, trigger);
        Ok(handle)
    }

    fn unregister(&self, handle: SignalHandle) -> Result<()> {
        match self.lock_triggers().remove(&handle) {
            Some(_) => Ok(()),
            None => Err(ThemeError::environment(format!(
                "signal handle {} is not registered",
                handle.id()
            ))),
        }
    }
}
