//! Theme data model
//!
//! - [`ThemePreference`]: what the user picked (persisted)
//! - [`EffectiveTheme`]: what is actually applied (always derived)
//! - [`OsAppearance`]: what the OS reported, before normalization
//! - [`ThemeChangeEvent`]: the payload delivered to `onChangeTheme` listeners

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ThemeError;

/// The user's theme preference
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    /// Follow the OS appearance
    #[default]
    System,
}

impl ThemePreference {
    /// All accepted preferences, in the order hosts usually present them
    pub const ALL: [ThemePreference; 3] = [Self::Light, Self::Dark, Self::System];

    /// The persisted string form
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    /// Resolve this preference against the OS theme.
    ///
    /// `System` passes the OS theme through; `Light` and `Dark` ignore it.
    pub fn resolve(self, os_theme: EffectiveTheme) -> EffectiveTheme {
        match self {
            Self::Light => EffectiveTheme::Light,
            Self::Dark => EffectiveTheme::Dark,
            Self::System => os_theme,
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, Self::System)
    }
}

impl FromStr for ThemePreference {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            other => Err(ThemeError::InvalidArgument(other.to_string())),
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The theme actually in effect (light or dark, never "system")
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveTheme {
    #[default]
    Light,
    Dark,
}

impl EffectiveTheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for EffectiveTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw appearance reported by an OS signal source.
///
/// Platforms can report "no preference" (Android `UI_MODE_NIGHT_UNDEFINED`,
/// iOS `.unspecified`, an unset desktop setting). Those normalize to light.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OsAppearance {
    Light,
    Dark,
    #[default]
    Unspecified,
}

impl OsAppearance {
    /// Normalize to an effective theme, defaulting to light
    pub fn normalize(self) -> EffectiveTheme {
        match self {
            Self::Dark => EffectiveTheme::Dark,
            Self::Light | Self::Unspecified => EffectiveTheme::Light,
        }
    }
}

/// Payload of an `onChangeTheme` event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeChangeEvent {
    pub theme: ThemePreference,
    pub effective_theme: EffectiveTheme,
}

impl ThemeChangeEvent {
    pub fn new(theme: ThemePreference, effective_theme: EffectiveTheme) -> Self {
        Self {
            theme,
            effective_theme,
        }
    }
}
