//! Persistent preference storage
//!
//! The controller only ever touches one string key. Hosts back this with
//! whatever per-app storage the platform offers (SharedPreferences,
//! UserDefaults, a settings file).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use rustc_hash::FxHashMap;

use crate::error::{Result, ThemeError};

/// Synchronous string-by-key store
pub trait PreferenceStore: Send + Sync {
    /// Read a value, `None` if the key was never written
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-process store, lost on exit
#[derive(Debug)]
pub struct MemoryStore {
    values: RwLock<FxHashMap<String, String>>,
    available: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(FxHashMap::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Create a store pre-populated with one value
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        store
    }

    /// Simulate the backing storage going away (or coming back).
    ///
    /// While unavailable, every read and write fails with
    /// [`ThemeError::TransientEnvironment`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ThemeError::environment("memory store marked unavailable"))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;
        Ok(self
            .values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_available()?;
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
