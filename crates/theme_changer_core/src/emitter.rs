//! `onChangeTheme` event delivery
//!
//! Fire-and-forget pub/sub: every registered listener gets every event, in
//! registration order. With no listeners an event is simply dropped.
//!
//! Events carry a sequence number taken when the change was decided. Decisions
//! can be made on different threads and delivered in a different order, so a
//! listener is never handed an event older than one already being delivered.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use indexmap::IndexMap;
use tracing::trace;

use crate::theme::ThemeChangeEvent;

/// Name hosts use when bridging events to a scripting layer
pub const CHANGE_THEME_EVENT: &str = "onChangeTheme";

/// A listener callback
pub type Listener = Arc<dyn Fn(&ThemeChangeEvent) + Send + Sync>;

/// Unique identifier for a registered listener
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
struct EmitterInner {
    next_id: AtomicU64,
    next_seq: AtomicU64,
    /// Highest sequence number handed to [`ThemeEmitter::emit`]
    latest_seq: AtomicU64,
    listeners: RwLock<IndexMap<ListenerId, Listener>>,
}

impl EmitterInner {
    fn remove(&self, id: ListenerId) -> bool {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .shift_remove(&id)
            .is_some()
    }
}

/// Listener registry for theme change events
#[derive(Clone, Default)]
pub struct ThemeEmitter {
    inner: Arc<EmitterInner>,
}

impl ThemeEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; keep the returned [`Subscription`] to remove it later
    pub fn add_listener<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ThemeChangeEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.inner.next_id.fetch_add(1, Ordering::SeqCst));
        self.inner
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(listener));

        Subscription {
            id,
            emitter: Arc::downgrade(&self.inner),
        }
    }

    /// Reserve the sequence number for the next event.
    ///
    /// Take it while holding whatever lock decided the change, so sequence
    /// order matches decision order.
    pub fn next_sequence(&self) -> u64 {
        self.inner.next_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Deliver an event to every listener, returning how many received it.
    ///
    /// An event older than one already emitted is dropped, and delivery stops
    /// early if a newer event is emitted while listeners are still running.
    pub fn emit(&self, seq: u64, event: &ThemeChangeEvent) -> usize {
        let latest = self.inner.latest_seq.fetch_max(seq, Ordering::SeqCst);
        if latest > seq {
            trace!("{} #{} superseded by #{}", CHANGE_THEME_EVENT, seq, latest);
            return 0;
        }

        // Listeners run outside the lock so they may add/remove listeners.
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        trace!(
            "{} #{} {:?} -> {} listener(s)",
            CHANGE_THEME_EVENT,
            seq,
            event,
            listeners.len()
        );

        let mut delivered = 0;
        for listener in &listeners {
            if self.inner.latest_seq.load(Ordering::SeqCst) > seq {
                trace!("{} #{} superseded mid-delivery", CHANGE_THEME_EVENT, seq);
                break;
            }
            listener(event);
            delivered += 1;
        }
        delivered
    }

    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Handle for a registered listener.
///
/// Dropping the handle leaves the listener registered; call
/// [`remove`](Self::remove) to unsubscribe.
#[derive(Debug)]
pub struct Subscription {
    id: ListenerId,
    emitter: Weak<EmitterInner>,
}

impl Subscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Unsubscribe. Returns false if the listener was already gone.
    pub fn remove(self) -> bool {
        match self.emitter.upgrade() {
            Some(inner) => inner.remove(self.id),
            None => false,
        }
    }
}
