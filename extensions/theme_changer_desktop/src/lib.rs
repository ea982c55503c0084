//! Theme Changer Desktop Platform
//!
//! Desktop implementations of the theme_changer collaborators:
//! - [`DesktopThemeSource`]: OS appearance via `dark-light`, re-checked by a
//!   polling [`SchemeWatcher`]
//! - [`FileStore`]: the preference kept in a per-app settings file

pub mod source;
pub mod store;
pub mod watcher;

pub use source::{detect_system_appearance, DesktopThemeSource, Detector};
pub use store::{FileStore, SETTINGS_FILE};
pub use watcher::{SchemeWatcher, WatcherConfig};

use std::sync::Arc;

use theme_changer_core::{ControllerConfig, ThemeController, ThemeError};

/// Build a controller wired to the desktop collaborators for `app_id`.
///
/// The controller is returned uninitialized; call
/// [`ThemeController::initialize`] to start tracking OS changes.
pub fn desktop_controller(
    app_id: &str,
    controller: ControllerConfig,
    watcher: WatcherConfig,
) -> Result<ThemeController, ThemeError> {
    let store = FileStore::for_app(app_id)?;
    let source = DesktopThemeSource::new(watcher);
    Ok(ThemeController::with_config(
        controller,
        Arc::new(store),
        Arc::new(source),
    ))
}
