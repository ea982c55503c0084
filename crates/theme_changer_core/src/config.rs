//! Controller configuration

use serde::{Deserialize, Serialize};

/// Key the preference is stored under unless configured otherwise
pub const DEFAULT_STORE_KEY: &str = "theme";

/// Theme controller configuration
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Preference store key holding the theme string
    pub store_key: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            store_key: DEFAULT_STORE_KEY.to_string(),
        }
    }
}
