//! TILI Preferences - Needs-driven accessibility configuration
//!
//! Maps a handful of declared accessibility needs to a full configuration of
//! behavioural flags:
//! - Static needs catalog with declarative effects
//! - Pure resolver with reset-then-apply semantics and combination rules
//! - Preference store with persistence, change listeners and
//!   document-root projection
//! - Needs selection sessions for first-time setup and profile editing
//! - Welcome presets for one-tap display and audio setups
//!
//! # Example
//!
//! ```rust,ignore
//! use tili_prefs::prelude::*;
//!
//! let store = PreferenceStore::in_memory();
//! let config = store.complete_setup(["cant-see"])?;
//!
//! assert!(config.voice_navigation);
//! assert_eq!(config.font_size, FontSize::Large);
//! ```

#![warn(missing_docs)]

pub mod catalog;
pub mod config;
pub mod document;
pub mod error;
pub mod preset;
pub mod resolver;
pub mod selection;
pub mod settings;
pub mod storage;
pub mod store;

// Re-exports for convenience
pub use catalog::{AccessibilityNeed, CombinationRule, NeedCategory, COMBINATION_RULES, NEEDS};
pub use config::{Configuration, Contrast, Flag, FontSize, NeedId, Value, ValueKind};
pub use document::{DocumentRoot, NullDocumentRoot};
pub use error::{PrefsError, SettingsError, StorageError};
pub use preset::WelcomeMode;
pub use resolver::{resolve, NeedsResolver};
pub use selection::{Channel, ConfirmOutcome, Feedback, NeedsSelection, SelectionMode};
pub use settings::TiliSettings;
pub use storage::{FileStorage, MemoryStorage, PreferenceStorage};
pub use store::{Listener, ListenerId, PreferenceStore, DEFAULT_STORAGE_KEY};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with TILI preferences
    pub use crate::{
        Configuration, Contrast, Flag, FontSize, NeedsResolver, NeedsSelection, PreferenceStore,
        PrefsError, TiliSettings, Value, WelcomeMode,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
