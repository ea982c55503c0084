//! Per-app settings file
//!
//! One TOML table of string values at
//! `<config dir>/<app id>/settings.toml`, the desktop counterpart of an
//! Android `<package>.settings` preferences file.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use theme_changer_core::{PreferenceStore, ThemeError};
use tracing::debug;

/// File name inside the app's config directory
pub const SETTINGS_FILE: &str = "settings.toml";

/// [`PreferenceStore`] backed by a TOML file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store scoped to `app_id` under the user's config directory
    pub fn for_app(app_id: &str) -> Result<Self, ThemeError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ThemeError::environment("no user config directory on this platform"))?;
        Ok(Self::in_dir(config_dir, app_id))
    }

    /// Store scoped to `app_id` under `base`
    pub fn in_dir(base: impl AsRef<Path>, app_id: &str) -> Self {
        Self::new(base.as_ref().join(app_id).join(SETTINGS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, ThemeError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(ThemeError::environment(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };

        toml::from_str(&content).map_err(|e| {
            ThemeError::environment(format!("failed to parse {}: {e}", self.path.display()))
        })
    }

    fn save(&self, values: &BTreeMap<String, String>) -> Result<(), ThemeError> {
        let content = toml::to_string(values)
            .map_err(|e| ThemeError::environment(format!("failed to serialize settings: {e}")))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ThemeError::environment(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        // Write-then-rename so a crash never leaves a half-written file.
        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, content)
            .and_then(|()| fs::rename(&tmp, &self.path))
            .map_err(|e| {
                ThemeError::environment(format!("failed to write {}: {e}", self.path.display()))
            })
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, ThemeError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ThemeError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)?;
        debug!("FileStore: {} = {:?} ({})", key, value, self.path.display());
        Ok(())
    }
}
