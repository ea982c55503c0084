use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use pretty_assertions::assert_eq;
use theme_changer_core::{
    EffectiveTheme, LifecycleState, ManualThemeSource, MemoryStore, OsAppearance,
    PreferenceStore, ThemeChangeEvent, ThemeController, ThemeError, ThemePreference,
};

struct Harness {
    store: Arc<MemoryStore>,
    source: Arc<ManualThemeSource>,
    controller: ThemeController,
    events: Arc<Mutex<Vec<ThemeChangeEvent>>>,
}

impl Harness {
    fn new(os: OsAppearance) -> Self {
        Self::with_store(MemoryStore::new(), os)
    }

    fn with_store(store: MemoryStore, os: OsAppearance) -> Self {
        let store = Arc::new(store);
        let source = Arc::new(ManualThemeSource::new(os));
        let controller = ThemeController::new(store.clone(), source.clone());

        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        controller.add_listener(move |e| events_clone.lock().unwrap().push(*e));

        Self {
            store,
            source,
            controller,
            events,
        }
    }

    fn events(&self) -> Vec<ThemeChangeEvent> {
        self.events.lock().unwrap().clone()
    }
}

fn event(theme: ThemePreference, effective: EffectiveTheme) -> ThemeChangeEvent {
    ThemeChangeEvent::new(theme, effective)
}

#[test]
fn fresh_store_reads_as_system() {
    let h = Harness::new(OsAppearance::Dark);
    assert_eq!(h.controller.get_theme(), ThemePreference::System);
    assert_eq!(h.controller.get_effective_theme(), EffectiveTheme::Dark);
}

#[test]
fn invalid_theme_is_rejected_and_preference_unchanged() {
    let h = Harness::new(OsAppearance::Light);
    h.controller.set_theme(ThemePreference::Dark);

    let err = h.controller.set_theme_str("blue").unwrap_err();
    assert_eq!(err, ThemeError::InvalidArgument("blue".to_string()));
    assert_eq!(h.controller.get_theme(), ThemePreference::Dark);
    assert_eq!(h.events().len(), 1);
}

#[test]
fn set_theme_str_accepts_valid_names() {
    let h = Harness::new(OsAppearance::Dark);
    h.controller.set_theme_str("light").unwrap();
    h.controller.set_theme_str("system").unwrap();

    assert_eq!(
        h.events(),
        vec![
            event(ThemePreference::Light, EffectiveTheme::Light),
            event(ThemePreference::System, EffectiveTheme::Dark),
        ]
    );
    assert_eq!(h.store.get("theme").unwrap().as_deref(), Some("system"));
}

#[test]
fn set_theme_always_emits() {
    let h = Harness::new(OsAppearance::Light);
    h.controller.set_theme(ThemePreference::Dark);
    h.controller.set_theme(ThemePreference::Dark);

    assert_eq!(
        h.events(),
        vec![
            event(ThemePreference::Dark, EffectiveTheme::Dark),
            event(ThemePreference::Dark, EffectiveTheme::Dark),
        ]
    );
}

#[test]
fn set_theme_queries_os_instead_of_cache() {
    let h = Harness::new(OsAppearance::Light);
    h.controller.initialize();

    // Change the OS without notifying: the cache is now stale.
    h.source.set_appearance(OsAppearance::Dark);
    h.controller.set_theme(ThemePreference::System);

    assert_eq!(
        h.events(),
        vec![event(ThemePreference::System, EffectiveTheme::Dark)]
    );
    assert_eq!(
        h.controller.last_observed_os_theme(),
        Some(EffectiveTheme::Light)
    );
}

#[test]
fn os_signals_are_deduplicated() {
    let h = Harness::new(OsAppearance::Light);
    h.controller.initialize();
    assert!(h.events().is_empty());

    h.source.notify_changed();
    h.source.notify_foreground();
    assert!(h.events().is_empty());

    h.source.change_appearance(OsAppearance::Dark);
    h.source.notify_foreground();

    assert_eq!(
        h.events(),
        vec![event(ThemePreference::System, EffectiveTheme::Dark)]
    );
    assert_eq!(
        h.controller.last_observed_os_theme(),
        Some(EffectiveTheme::Dark)
    );
}

#[test]
fn foreground_signal_catches_change_made_in_background() {
    let h = Harness::new(OsAppearance::Dark);
    h.controller.initialize();

    h.source.set_appearance(OsAppearance::Light);
    h.source.notify_foreground();

    assert_eq!(
        h.events(),
        vec![event(ThemePreference::System, EffectiveTheme::Light)]
    );
}

#[test]
fn explicit_preference_suppresses_os_events() {
    let h = Harness::with_store(MemoryStore::with_value("theme", "dark"), OsAppearance::Light);
    h.controller.initialize();

    h.source.change_appearance(OsAppearance::Dark);

    assert!(h.events().is_empty());
    assert_eq!(
        h.controller.last_observed_os_theme(),
        Some(EffectiveTheme::Dark)
    );
}

#[test]
fn switching_back_to_system_does_not_replay_stale_os_change() {
    let h = Harness::with_store(MemoryStore::with_value("theme", "light"), OsAppearance::Light);
    h.controller.initialize();

    // OS flips while an explicit preference is active; cache follows silently.
    h.source.change_appearance(OsAppearance::Dark);
    h.controller.set_theme(ThemePreference::System);
    h.source.notify_changed();

    assert_eq!(
        h.events(),
        vec![event(ThemePreference::System, EffectiveTheme::Dark)]
    );
}

#[test]
fn unspecified_os_appearance_resolves_light() {
    let h = Harness::new(OsAppearance::Unspecified);
    assert_eq!(h.controller.get_system_theme(), EffectiveTheme::Light);
    assert_eq!(h.controller.get_effective_theme(), EffectiveTheme::Light);
}

#[test]
fn teardown_is_safe_before_initialize_and_twice() {
    let h = Harness::new(OsAppearance::Light);
    h.controller.teardown();
    assert_eq!(h.controller.lifecycle(), LifecycleState::Uninitialized);

    h.controller.initialize();
    h.controller.teardown();
    h.controller.teardown();
    assert_eq!(h.controller.lifecycle(), LifecycleState::TornDown);
    assert_eq!(h.controller.last_observed_os_theme(), None);
    assert_eq!(h.source.registered_count(), 0);
}

#[test]
fn torn_down_controller_ignores_signals_but_serves_queries() {
    let h = Harness::new(OsAppearance::Light);
    h.controller.initialize();
    h.controller.teardown();

    h.source.change_appearance(OsAppearance::Dark);
    assert!(h.events().is_empty());

    assert_eq!(h.controller.get_system_theme(), EffectiveTheme::Dark);
    h.controller.set_theme(ThemePreference::Light);
    assert_eq!(
        h.events(),
        vec![event(ThemePreference::Light, EffectiveTheme::Light)]
    );
}

#[test]
fn failed_registration_is_swallowed() {
    let h = Harness::new(OsAppearance::Light);
    h.source.set_attached(false);

    h.controller.initialize();
    assert_eq!(h.source.registered_count(), 0);

    h.source.set_attached(true);
    h.source.change_appearance(OsAppearance::Dark);
    assert!(h.events().is_empty());

    // Explicit calls still work in the degraded mode.
    assert_eq!(h.controller.get_effective_theme(), EffectiveTheme::Dark);
    h.controller.set_theme(ThemePreference::Light);
    assert_eq!(h.events().len(), 1);

    // A later initialize recovers automatic tracking.
    h.controller.initialize();
    h.source.change_appearance(OsAppearance::Light);
    h.controller.set_theme(ThemePreference::System);
    h.source.change_appearance(OsAppearance::Dark);
    assert_eq!(
        h.events().last(),
        Some(&event(ThemePreference::System, EffectiveTheme::Dark))
    );
}

#[test]
fn unavailable_store_degrades_to_system() {
    let h = Harness::with_store(MemoryStore::with_value("theme", "dark"), OsAppearance::Light);
    h.store.set_available(false);

    assert_eq!(h.controller.get_theme(), ThemePreference::System);
    assert_eq!(h.controller.get_effective_theme(), EffectiveTheme::Light);

    // Write fails, the event still goes out.
    h.controller.set_theme(ThemePreference::Dark);
    assert_eq!(
        h.events(),
        vec![event(ThemePreference::Dark, EffectiveTheme::Dark)]
    );

    h.store.set_available(true);
    assert_eq!(h.controller.get_theme(), ThemePreference::Dark);
}

#[test]
fn removed_subscription_stops_delivery() {
    let h = Harness::new(OsAppearance::Light);
    let count = Arc::new(Mutex::new(0));
    let count_clone = count.clone();
    let sub = h
        .controller
        .add_listener(move |_| *count_clone.lock().unwrap() += 1);

    h.controller.set_theme(ThemePreference::Dark);
    assert!(sub.remove());
    h.controller.set_theme(ThemePreference::Light);

    assert_eq!(*count.lock().unwrap(), 1);
    assert_eq!(h.events().len(), 2);
}

#[test]
fn listener_can_query_controller_during_emit() {
    let h = Harness::new(OsAppearance::Dark);
    let controller = h.controller.clone();
    let seen = Arc::new(Mutex::new(None));
    let seen_clone = seen.clone();
    h.controller.add_listener(move |_| {
        *seen_clone.lock().unwrap() = Some(controller.get_effective_theme());
    });

    h.controller.initialize();
    h.source.change_appearance(OsAppearance::Light);

    assert_eq!(*seen.lock().unwrap(), Some(EffectiveTheme::Light));
}

#[test]
fn failing_os_query_reads_as_light() {
    let h = Harness::new(OsAppearance::Dark);
    h.source.set_attached(false);

    assert_eq!(h.controller.get_system_theme(), EffectiveTheme::Light);
    assert_eq!(h.controller.get_effective_theme(), EffectiveTheme::Light);

    h.controller.initialize();
    assert_eq!(
        h.controller.last_observed_os_theme(),
        Some(EffectiveTheme::Light)
    );
    assert_eq!(h.controller.lifecycle(), LifecycleState::Active);
}

#[test]
fn stale_os_event_never_lands_after_newer_set_theme() {
    let store = Arc::new(MemoryStore::new());
    let source = Arc::new(ManualThemeSource::new(OsAppearance::Light));
    let controller = ThemeController::new(store, source.clone());

    // Holds up the OS-driven delivery until set_theme has completed.
    let (entered_tx, entered_rx) = mpsc::channel::<()>();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let entered_tx = Mutex::new(entered_tx);
    let release_rx = Mutex::new(release_rx);
    controller.add_listener(move |e| {
        if e.theme == ThemePreference::System {
            entered_tx.lock().unwrap().send(()).unwrap();
            release_rx.lock().unwrap().recv().unwrap();
        }
    });

    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    controller.add_listener(move |e| events_clone.lock().unwrap().push(*e));

    controller.initialize();

    let os_thread = {
        let source = source.clone();
        thread::spawn(move || source.change_appearance(OsAppearance::Dark))
    };
    entered_rx.recv().unwrap();

    controller.set_theme(ThemePreference::Light);
    release_tx.send(()).unwrap();
    os_thread.join().unwrap();

    assert_eq!(
        *events.lock().unwrap(),
        vec![event(ThemePreference::Light, EffectiveTheme::Light)]
    );
    assert_eq!(controller.get_theme(), ThemePreference::Light);
    assert_eq!(controller.get_effective_theme(), EffectiveTheme::Light);
    controller.teardown();
}
