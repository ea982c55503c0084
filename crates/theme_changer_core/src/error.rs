//! Theme controller error types

use thiserror::Error;

/// Theme-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThemeError {
    /// A theme value outside `light`/`dark`/`system` was passed in
    #[error("Theme must be 'light', 'dark', or 'system' (got {0:?})")]
    InvalidArgument(String),

    /// Preference store or OS signal source is not available right now.
    ///
    /// The controller absorbs these; they never reach callers.
    #[error("Environment unavailable: {0}")]
    TransientEnvironment(String),
}

impl ThemeError {
    pub fn environment(message: impl Into<String>) -> Self {
        Self::TransientEnvironment(message.into())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

/// Result type for theme operations
pub type Result<T> = std::result::Result<T, ThemeError>;
