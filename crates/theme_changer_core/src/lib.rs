//! Theme Changer Core
//!
//! Lets an application read and set a user's theme preference (`light`,
//! `dark` or `system`) and be notified whenever the *effective* theme, the
//! preference resolved against the OS appearance, changes.
//!
//! # Overview
//!
//! - **[`ThemeController`]**: the only stateful piece. Resolves preferences,
//!   tracks the OS theme, and emits `onChangeTheme` events.
//! - **Collaborators**: each platform supplies a [`PreferenceStore`] and a
//!   [`SystemThemeSource`]. The controller logic is written once.
//! - **Events**: [`ThemeChangeEvent`] delivered through a [`ThemeEmitter`].
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use theme_changer_core::{
//!     EffectiveTheme, ManualThemeSource, MemoryStore, OsAppearance, ThemeController,
//!     ThemePreference,
//! };
//!
//! let source = Arc::new(ManualThemeSource::new(OsAppearance::Light));
//! let controller = ThemeController::new(Arc::new(MemoryStore::new()), source.clone());
//! controller.initialize();
//!
//! let sub = controller.add_listener(|event| {
//!     println!("theme={} effective={}", event.theme, event.effective_theme);
//! });
//!
//! assert_eq!(controller.get_theme(), ThemePreference::System);
//! controller.set_theme(ThemePreference::Dark);
//! assert_eq!(controller.get_effective_theme(), EffectiveTheme::Dark);
//!
//! sub.remove();
//! controller.teardown();
//! ```
//!
//! # Errors
//!
//! Only [`ThemeController::set_theme_str`] can fail, with
//! [`ThemeError::InvalidArgument`]. Store and signal failures are logged and
//! degrade to defaults (`system` preference, `light` OS theme).

pub mod config;
pub mod controller;
pub mod emitter;
pub mod error;
pub mod signal;
pub mod store;
pub mod theme;

// Re-export commonly used types
pub use config::{ControllerConfig, DEFAULT_STORE_KEY};
pub use controller::{LifecycleState, ThemeController};
pub use emitter::{ListenerId, Subscription, ThemeEmitter, CHANGE_THEME_EVENT};
pub use error::{Result, ThemeError};
pub use signal::{ManualThemeSource, SignalHandle, SignalKind, SystemThemeSource, Trigger};
pub use store::{MemoryStore, PreferenceStore};
pub use theme::{EffectiveTheme, OsAppearance, ThemeChangeEvent, ThemePreference};
