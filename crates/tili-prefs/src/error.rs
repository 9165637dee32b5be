//! Error types for TILI preferences
//!
//! Covers:
//! - Unknown or mistyped configuration flags
//! - Durable storage failures
//! - Settings file parsing
//! - Needs selection rules

use crate::config::{Flag, ValueKind};

/// Main preferences error type
#[derive(Debug, thiserror::Error)]
pub enum PrefsError {
    /// Flag name not recognised
    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    /// Need id not present in the catalog
    #[error("unknown accessibility need: {0}")]
    UnknownNeed(String),

    /// Welcome preset id not recognised
    #[error("unknown welcome preset: {0}")]
    UnknownPreset(String),

    /// Value kind does not match the flag
    #[error("type mismatch for {flag}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Flag being written
        flag: Flag,
        /// Kind the flag accepts
        expected: ValueKind,
        /// Kind supplied
        found: ValueKind,
    },

    /// Value has the right kind but is out of domain
    #[error("invalid value for {flag}: {reason}")]
    InvalidValue {
        /// Flag being written
        flag: Flag,
        /// Why the value was refused
        reason: String,
    },

    /// First-time setup requires at least one need
    #[error("at least one accessibility need must be selected")]
    EmptySelection,

    /// Durable storage failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl PrefsError {
    /// Whether the caller can fix the input and retry
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Storage(StorageError::Io(_)))
    }
}

/// Durable storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Underlying I/O failed
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    /// Stored configuration could not be parsed
    #[error("corrupt stored configuration: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Key contains characters the backend cannot store
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// Settings file errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Settings file could not be read
    #[error("cannot read settings: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file is not valid TOML for [`crate::TiliSettings`]
    #[error("cannot parse settings: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefs_error_display() {
        let err = PrefsError::UnknownNeed("cant-fly".to_string());
        assert!(err.to_string().contains("cant-fly"));
    }

    #[test]
    fn type_mismatch_mentions_kinds() {
        let err = PrefsError::TypeMismatch {
            flag: Flag::FontSize,
            expected: ValueKind::FontSize,
            found: ValueKind::Bool,
        };
        let text = err.to_string();
        assert!(text.contains("fontSize"));
        assert!(text.contains("bool"));
    }

    #[test]
    fn io_storage_errors_are_not_recoverable() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        assert!(!PrefsError::Storage(StorageError::Io(io)).is_recoverable());
        assert!(PrefsError::EmptySelection.is_recoverable());
    }
}
