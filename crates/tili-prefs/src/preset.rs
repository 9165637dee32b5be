//! Welcome presets
//!
//! Three one-tap starting points offered on first launch. Each preset is a
//! small set of display and audio flags, applied on top of whatever the
//! needs resolver produced.

use crate::config::{Contrast, Flag, FontSize, Value};
use crate::error::PrefsError;
use std::fmt;
use std::str::FromStr;

/// Preset offered by the welcome flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WelcomeMode {
    /// Spoken feedback, large high-contrast text
    Audio,
    /// Extra large high-contrast text, no audio
    Visual,
    /// Focus mode with large text, no audio
    Simple,
}

impl WelcomeMode {
    /// Every preset in display order
    pub const ALL: [WelcomeMode; 3] = [Self::Audio, Self::Visual, Self::Simple];

    /// Stable id ("audio", "visual", "simple")
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Visual => "visual",
            Self::Simple => "simple",
        }
    }

    /// Display title
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Audio => "Audio-Guided Mode",
            Self::Visual => "Large Text & High Contrast",
            Self::Simple => "Simple Step-by-Step",
        }
    }

    /// One-line description
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Audio => "Hear spoken feedback for navigation and actions",
            Self::Visual => "Enhanced visibility with larger fonts and strong colors",
            Self::Simple => "Clear, focused interface with one task at a time",
        }
    }

    /// Flags the preset writes, in application order
    #[must_use]
    pub fn settings(self) -> [(Flag, Value); 3] {
        match self {
            Self::Audio => [
                (Flag::AudioFeedback, Value::Bool(true)),
                (Flag::FontSize, Value::FontSize(FontSize::Large)),
                (Flag::Contrast, Value::Contrast(Contrast::High)),
            ],
            Self::Visual => [
                (Flag::FontSize, Value::FontSize(FontSize::XLarge)),
                (Flag::Contrast, Value::Contrast(Contrast::High)),
                (Flag::AudioFeedback, Value::Bool(false)),
            ],
            Self::Simple => [
                (Flag::FocusMode, Value::Bool(true)),
                (Flag::FontSize, Value::FontSize(FontSize::Large)),
                (Flag::AudioFeedback, Value::Bool(false)),
            ],
        }
    }
}

impl fmt::Display for WelcomeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for WelcomeMode {
    type Err = PrefsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.id() == id)
            .ok_or_else(|| PrefsError::UnknownPreset(s.trim().to_string()))
    }
}
