//! Structured voice commands

use crate::section::Section;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a command asks the controller to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Go to a section
    Navigate,
    /// Trigger the focused element
    Activate,
    /// Focus the next element
    Next,
    /// Focus the previous element
    Previous,
    /// Read the main content
    Read,
    /// Say where the user is
    AnnounceLocation,
    /// List available commands
    Help,
    /// Ask the user to confirm logout
    LogoutConfirm,
    /// End the session
    Logout,
    /// Utterance not understood
    Error,
}

impl Action {
    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Navigate => "navigate",
            Self::Activate => "activate",
            Self::Next => "next",
            Self::Previous => "previous",
            Self::Read => "read",
            Self::AnnounceLocation => "announce-location",
            Self::Help => "help",
            Self::LogoutConfirm => "logout-confirm",
            Self::Logout => "logout",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interpreted utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Requested action
    pub action: Action,
    /// Section for `navigate`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Section>,
    /// Text to narrate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// False only for `error`
    pub valid: bool,
}

impl Command {
    /// Valid command without target or message
    #[must_use]
    pub fn new(action: Action) -> Self {
        Self {
            action,
            target: None,
            message: None,
            valid: action != Action::Error,
        }
    }

    /// Navigate to `section`
    #[must_use]
    pub fn navigate(section: Section) -> Self {
        Self {
            target: Some(section),
            ..Self::new(Action::Navigate)
        }
    }

    /// Invalid command with corrective `message`
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Action::Error).with_message(message)
    }

    /// With narration text
    #[inline]
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
