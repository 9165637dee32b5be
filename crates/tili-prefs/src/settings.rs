//! Engine settings
//!
//! Timing and storage knobs shared by every crate. Loaded from TOML; every
//! field is optional and falls back to its default.
//!
//! ```toml
//! storage_key = "tili_accessibility_preferences"
//! storage_dir = "/var/lib/tili"
//! restart_delay_ms = 100
//! narration_stagger_ms = 500
//! ```

use crate::error::SettingsError;
use crate::store::DEFAULT_STORAGE_KEY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TiliSettings {
    /// Namespace key for the stored configuration
    pub storage_key: String,
    /// Directory for file-backed storage; in-memory when unset
    pub storage_dir: Option<PathBuf>,
    /// Delay before restarting an ended recognition session
    pub restart_delay_ms: u64,
    /// Gap between parts of a chained narration
    pub narration_stagger_ms: u64,
    /// Delay before announcing page context after navigation
    pub focus_settle_delay_ms: u64,
    /// Delay before describing the element focused by Tab
    pub tab_announce_delay_ms: u64,
    /// Maximum characters spoken by a "read" command
    pub read_limit_chars: usize,
    /// Recognition alternatives requested per result
    pub max_alternatives: u32,
}

impl Default for TiliSettings {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            storage_dir: None,
            restart_delay_ms: 100,
            narration_stagger_ms: 500,
            focus_settle_delay_ms: 500,
            tab_announce_delay_ms: 100,
            read_limit_chars: 500,
            max_alternatives: 1,
        }
    }
}

impl TiliSettings {
    /// Create default settings
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse settings from TOML text
    ///
    /// # Errors
    /// `SettingsError::Parse` on malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(text)?)
    }

    /// Load settings from a TOML file
    ///
    /// # Errors
    /// `SettingsError::Io` if the file cannot be read, `Parse` if invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// With storage directory
    #[inline]
    #[must_use]
    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = Some(dir.into());
        self
    }

    /// With restart delay
    #[inline]
    #[must_use]
    pub fn with_restart_delay(mut self, delay: Duration) -> Self {
        self.restart_delay_ms = millis(delay);
        self
    }

    /// Restart delay
    #[inline]
    #[must_use]
    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }

    /// Narration stagger
    #[inline]
    #[must_use]
    pub fn narration_stagger(&self) -> Duration {
        Duration::from_millis(self.narration_stagger_ms)
    }

    /// Focus settle delay
    #[inline]
    #[must_use]
    pub fn focus_settle_delay(&self) -> Duration {
        Duration::from_millis(self.focus_settle_delay_ms)
    }

    /// Tab announce delay
    #[inline]
    #[must_use]
    pub fn tab_announce_delay(&self) -> Duration {
        Duration::from_millis(self.tab_announce_delay_ms)
    }
}

fn millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}
