//! Accessibility configuration record
//!
//! [`Configuration`] is a flat, named record. Every field has a [`Flag`] name
//! and a typed [`Value`], which is how the needs catalog, the resolver and the
//! store address individual settings.

use crate::error::PrefsError;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Identifier of an accessibility need (e.g. `cant-see`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NeedId(String);

impl NeedId {
    /// Create need id from any string
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NeedId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NeedId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for NeedId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Text size preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    /// Small text
    Small,
    /// Default text size
    #[default]
    Medium,
    /// Large text
    Large,
    /// Extra large text
    XLarge,
}

impl FontSize {
    /// Attribute value used on the document root
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::XLarge => "xlarge",
        }
    }

    /// Next larger preset, saturating at `XLarge`
    #[must_use]
    pub fn larger(self) -> Self {
        match self {
            Self::Small => Self::Medium,
            Self::Medium => Self::Large,
            Self::Large | Self::XLarge => Self::XLarge,
        }
    }

    /// Next smaller preset, saturating at `Small`
    #[must_use]
    pub fn smaller(self) -> Self {
        match self {
            Self::Small | Self::Medium => Self::Small,
            Self::Large => Self::Medium,
            Self::XLarge => Self::Large,
        }
    }
}

impl FromStr for FontSize {
    type Err = PrefsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            "xlarge" => Ok(Self::XLarge),
            other => Err(PrefsError::InvalidValue {
                flag: Flag::FontSize,
                reason: format!("unknown font size '{other}'"),
            }),
        }
    }
}

/// Contrast mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Contrast {
    /// Regular palette
    #[default]
    Normal,
    /// High contrast palette
    High,
}

impl Contrast {
    /// Attribute value used on the document root
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::High => "high",
        }
    }

    /// The other mode
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Normal => Self::High,
            Self::High => Self::Normal,
        }
    }
}

impl FromStr for Contrast {
    type Err = PrefsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            other => Err(PrefsError::InvalidValue {
                flag: Flag::Contrast,
                reason: format!("unknown contrast '{other}'"),
            }),
        }
    }
}

/// Name of a single configuration field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Flag {
    /// Text size preset
    FontSize,
    /// Contrast mode
    Contrast,
    /// Disable transitions
    ReducedMotion,
    /// Single-task focus layout
    FocusMode,
    /// Terse spoken feedback
    AudioFeedback,
    /// Verbose spoken narration
    DescriptiveAudio,
    /// On-screen confirmation of actions
    VisualConfirmations,
    /// Continuous voice command listening
    VoiceNavigation,
    /// Voice dictation into fields
    VoiceInput,
    /// Spatial narration of element position
    SpatialGuidance,
    /// Enhanced focus handling
    KeyboardNavigation,
    /// Global Alt-key shortcuts
    KeyboardShortcuts,
    /// Read page content on arrival
    AutoReadContent,
    /// Vibration feedback
    HapticFeedback,
    /// Markup tuned for screen readers
    ScreenReaderOptimized,
    /// Save forms without explicit submit
    AutoSave,
    /// Speech synthesis rate
    SpeechRate,
    /// Speech synthesis pitch
    SpeechPitch,
    /// Speech synthesis volume
    SpeechVolume,
    /// Interface language code
    Language,
    /// Pre-auth selector has been completed
    HasConfigured,
    /// Welcome dialog still pending
    ShowWelcome,
}

/// Kind of value a flag accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// `true` / `false`
    Bool,
    /// [`FontSize`]
    FontSize,
    /// [`Contrast`]
    Contrast,
    /// Floating point number
    Number,
    /// Free text
    Text,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::FontSize => "font size",
            Self::Contrast => "contrast",
            Self::Number => "number",
            Self::Text => "text",
        };
        f.write_str(name)
    }
}

impl Flag {
    /// Every flag, in declaration order
    pub const ALL: [Flag; 22] = [
        Flag::FontSize,
        Flag::Contrast,
        Flag::ReducedMotion,
        Flag::FocusMode,
        Flag::AudioFeedback,
        Flag::DescriptiveAudio,
        Flag::VisualConfirmations,
        Flag::VoiceNavigation,
        Flag::VoiceInput,
        Flag::SpatialGuidance,
        Flag::KeyboardNavigation,
        Flag::KeyboardShortcuts,
        Flag::AutoReadContent,
        Flag::HapticFeedback,
        Flag::ScreenReaderOptimized,
        Flag::AutoSave,
        Flag::SpeechRate,
        Flag::SpeechPitch,
        Flag::SpeechVolume,
        Flag::Language,
        Flag::HasConfigured,
        Flag::ShowWelcome,
    ];

    /// Stored (camelCase) name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FontSize => "fontSize",
            Self::Contrast => "contrast",
            Self::ReducedMotion => "reducedMotion",
            Self::FocusMode => "focusMode",
            Self::AudioFeedback => "audioFeedback",
            Self::DescriptiveAudio => "descriptiveAudio",
            Self::VisualConfirmations => "visualConfirmations",
            Self::VoiceNavigation => "voiceNavigation",
            Self::VoiceInput => "voiceInput",
            Self::SpatialGuidance => "spatialGuidance",
            Self::KeyboardNavigation => "keyboardNavigation",
            Self::KeyboardShortcuts => "keyboardShortcuts",
            Self::AutoReadContent => "autoReadContent",
            Self::HapticFeedback => "hapticFeedback",
            Self::ScreenReaderOptimized => "screenReaderOptimized",
            Self::AutoSave => "autoSave",
            Self::SpeechRate => "speechRate",
            Self::SpeechPitch => "speechPitch",
            Self::SpeechVolume => "speechVolume",
            Self::Language => "language",
            Self::HasConfigured => "hasConfigured",
            Self::ShowWelcome => "showWelcome",
        }
    }

    /// Kind of value this flag accepts
    #[must_use]
    pub fn kind(self) -> ValueKind {
        match self {
            Self::FontSize => ValueKind::FontSize,
            Self::Contrast => ValueKind::Contrast,
            Self::SpeechRate | Self::SpeechPitch | Self::SpeechVolume => ValueKind::Number,
            Self::Language => ValueKind::Text,
            _ => ValueKind::Bool,
        }
    }

    /// Whether the resolver owns this flag
    ///
    /// Derived flags are reset to their defaults on every resolution.
    /// `language`, `hasConfigured` and `showWelcome` belong to the caller.
    #[must_use]
    pub fn is_derived(self) -> bool {
        !matches!(self, Self::Language | Self::HasConfigured | Self::ShowWelcome)
    }

    /// Whether changing this flag affects the document-root projection
    #[must_use]
    pub fn is_presentational(self) -> bool {
        matches!(
            self,
            Self::FontSize | Self::Contrast | Self::ReducedMotion | Self::FocusMode
        )
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flag {
    type Err = PrefsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Flag::ALL
            .iter()
            .copied()
            .find(|flag| flag.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PrefsError::UnknownFlag(wanted.to_string()))
    }
}

/// Typed configuration value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean flag
    Bool(bool),
    /// Text size preset
    FontSize(FontSize),
    /// Contrast mode
    Contrast(Contrast),
    /// Speech tuning number
    Number(f32),
    /// Free text (language code)
    Text(Cow<'static, str>),
}

impl Value {
    /// Kind of this value
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::FontSize(_) => ValueKind::FontSize,
            Self::Contrast(_) => ValueKind::Contrast,
            Self::Number(_) => ValueKind::Number,
            Self::Text(_) => ValueKind::Text,
        }
    }

    /// Parse a raw string as a value for `flag`
    ///
    /// # Errors
    /// `PrefsError::InvalidValue` when the text does not fit the flag's kind.
    pub fn parse_for(flag: Flag, raw: &str) -> Result<Self, PrefsError> {
        let raw = raw.trim();
        match flag.kind() {
            ValueKind::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" | "on" | "yes" | "1" => Ok(Self::Bool(true)),
                "false" | "off" | "no" | "0" => Ok(Self::Bool(false)),
                other => Err(PrefsError::InvalidValue {
                    flag,
                    reason: format!("'{other}' is not a boolean"),
                }),
            },
            ValueKind::FontSize => raw.parse().map(Self::FontSize),
            ValueKind::Contrast => raw.parse().map(Self::Contrast),
            ValueKind::Number => raw
                .parse::<f32>()
                .map(Self::Number)
                .map_err(|e| PrefsError::InvalidValue {
                    flag,
                    reason: e.to_string(),
                }),
            ValueKind::Text => Ok(Self::Text(Cow::Owned(raw.to_string()))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::FontSize(size) => f.write_str(size.as_str()),
            Self::Contrast(contrast) => f.write_str(contrast.as_str()),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Full accessibility configuration
///
/// Serialized with the camelCase field names of the stored preferences
/// record. Missing fields fall back to their defaults on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct Configuration {
    pub font_size: FontSize,
    pub contrast: Contrast,
    pub reduced_motion: bool,
    pub focus_mode: bool,

    pub audio_feedback: bool,
    pub descriptive_audio: bool,
    pub visual_confirmations: bool,
    pub voice_navigation: bool,
    pub voice_input: bool,
    pub spatial_guidance: bool,
    pub keyboard_navigation: bool,
    pub keyboard_shortcuts: bool,
    pub auto_read_content: bool,
    pub haptic_feedback: bool,
    pub screen_reader_optimized: bool,
    pub auto_save: bool,

    pub speech_rate: f32,
    pub speech_pitch: f32,
    pub speech_volume: f32,
    pub language: String,

    /// Selected needs, selection order, no duplicates
    pub accessibility_needs: IndexSet<NeedId>,
    pub has_configured: bool,
    pub show_welcome: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            font_size: FontSize::Medium,
            contrast: Contrast::Normal,
            reduced_motion: false,
            focus_mode: false,
            audio_feedback: false,
            descriptive_audio: false,
            visual_confirmations: true,
            voice_navigation: false,
            voice_input: false,
            spatial_guidance: false,
            keyboard_navigation: true,
            keyboard_shortcuts: false,
            auto_read_content: false,
            haptic_feedback: false,
            screen_reader_optimized: false,
            auto_save: false,
            speech_rate: 1.0,
            speech_pitch: 1.0,
            speech_volume: 1.0,
            language: "en".to_string(),
            accessibility_needs: IndexSet::new(),
            has_configured: false,
            show_welcome: true,
        }
    }
}

impl Configuration {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any spoken output is enabled
    #[inline]
    #[must_use]
    pub fn audio_enabled(&self) -> bool {
        self.audio_feedback || self.descriptive_audio
    }

    /// BCP 47 locale used for speech
    #[must_use]
    pub fn speech_locale(&self) -> &'static str {
        if self.language.eq_ignore_ascii_case("fr") || self.language.starts_with("fr-") {
            "fr-FR"
        } else {
            "en-US"
        }
    }

    /// Read a single field
    #[must_use]
    pub fn get(&self, flag: Flag) -> Value {
        match flag {
            Flag::FontSize => Value::FontSize(self.font_size),
            Flag::Contrast => Value::Contrast(self.contrast),
            Flag::SpeechRate => Value::Number(self.speech_rate),
            Flag::SpeechPitch => Value::Number(self.speech_pitch),
            Flag::SpeechVolume => Value::Number(self.speech_volume),
            Flag::Language => Value::Text(Cow::Owned(self.language.clone())),
            other => Value::Bool(self.bool_value(other).unwrap_or(false)),
        }
    }

    /// Write a single field
    ///
    /// Speech tuning numbers are clamped to the ranges speech engines accept.
    ///
    /// # Errors
    /// - `PrefsError::TypeMismatch` if `value` does not fit `flag`
    /// - `PrefsError::InvalidValue` for non-finite numbers or empty language
    pub fn set(&mut self, flag: Flag, value: Value) -> Result<(), PrefsError> {
        match (flag, value) {
            (Flag::FontSize, Value::FontSize(size)) => self.font_size = size,
            (Flag::Contrast, Value::Contrast(contrast)) => self.contrast = contrast,
            (Flag::SpeechRate | Flag::SpeechPitch | Flag::SpeechVolume, Value::Number(n)) => {
                if !n.is_finite() {
                    return Err(PrefsError::InvalidValue {
                        flag,
                        reason: "number must be finite".to_string(),
                    });
                }
                match flag {
                    Flag::SpeechRate => self.speech_rate = n.clamp(0.1, 10.0),
                    Flag::SpeechPitch => self.speech_pitch = n.clamp(0.0, 2.0),
                    _ => self.speech_volume = n.clamp(0.0, 1.0),
                }
            }
            (Flag::Language, Value::Text(text)) => {
                if text.trim().is_empty() {
                    return Err(PrefsError::InvalidValue {
                        flag,
                        reason: "language must not be empty".to_string(),
                    });
                }
                self.language = text.trim().to_string();
            }
            (flag, Value::Bool(b)) if flag.kind() == ValueKind::Bool => {
                if let Some(field) = self.bool_field(flag) {
                    *field = b;
                }
            }
            (flag, value) => {
                return Err(PrefsError::TypeMismatch {
                    flag,
                    expected: flag.kind(),
                    found: value.kind(),
                });
            }
        }
        Ok(())
    }

    /// Copy every field the resolver does not own from `other`
    pub(crate) fn carry_caller_fields(&mut self, other: &Configuration) {
        self.language.clone_from(&other.language);
        self.has_configured = other.has_configured;
        self.show_welcome = other.show_welcome;
    }

    fn bool_value(&self, flag: Flag) -> Option<bool> {
        let value = match flag {
            Flag::ReducedMotion => self.reduced_motion,
            Flag::FocusMode => self.focus_mode,
            Flag::AudioFeedback => self.audio_feedback,
            Flag::DescriptiveAudio => self.descriptive_audio,
            Flag::VisualConfirmations => self.visual_confirmations,
            Flag::VoiceNavigation => self.voice_navigation,
            Flag::VoiceInput => self.voice_input,
            Flag::SpatialGuidance => self.spatial_guidance,
            Flag::KeyboardNavigation => self.keyboard_navigation,
            Flag::KeyboardShortcuts => self.keyboard_shortcuts,
            Flag::AutoReadContent => self.auto_read_content,
            Flag::HapticFeedback => self.haptic_feedback,
            Flag::ScreenReaderOptimized => self.screen_reader_optimized,
            Flag::AutoSave => self.auto_save,
            Flag::HasConfigured => self.has_configured,
            Flag::ShowWelcome => self.show_welcome,
            _ => return None,
        };
        Some(value)
    }

    fn bool_field(&mut self, flag: Flag) -> Option<&mut bool> {
        let field = match flag {
            Flag::ReducedMotion => &mut self.reduced_motion,
            Flag::FocusMode => &mut self.focus_mode,
            Flag::AudioFeedback => &mut self.audio_feedback,
            Flag::DescriptiveAudio => &mut self.descriptive_audio,
            Flag::VisualConfirmations => &mut self.visual_confirmations,
            Flag::VoiceNavigation => &mut self.voice_navigation,
            Flag::VoiceInput => &mut self.voice_input,
            Flag::SpatialGuidance => &mut self.spatial_guidance,
            Flag::KeyboardNavigation => &mut self.keyboard_navigation,
            Flag::KeyboardShortcuts => &mut self.keyboard_shortcuts,
            Flag::AutoReadContent => &mut self.auto_read_content,
            Flag::HapticFeedback => &mut self.haptic_feedback,
            Flag::ScreenReaderOptimized => &mut self.screen_reader_optimized,
            Flag::AutoSave => &mut self.auto_save,
            Flag::HasConfigured => &mut self.has_configured,
            Flag::ShowWelcome => &mut self.show_welcome,
            _ => return None,
        };
        Some(field)
    }
}
