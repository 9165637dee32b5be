//! Accessibility needs catalog
//!
//! The catalog is plain data: every selectable need is an
//! [`AccessibilityNeed`] record with a declarative effect, and every pairwise
//! override is a [`CombinationRule`]. The resolver folds over these tables;
//! nothing here branches on need ids.

use crate::config::{Contrast, Flag, FontSize, NeedId, Value};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Grouping shown by the needs selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NeedCategory {
    /// No specific need
    None,
    /// Vision
    Visual,
    /// Hearing
    Hearing,
    /// Movement and control
    Motor,
    /// Speech
    Communication,
    /// Thinking and memory
    Cognitive,
    /// Temporary or situational
    Situational,
}

impl NeedCategory {
    /// All categories in display order
    pub const ALL: [NeedCategory; 7] = [
        NeedCategory::None,
        NeedCategory::Visual,
        NeedCategory::Hearing,
        NeedCategory::Motor,
        NeedCategory::Communication,
        NeedCategory::Cognitive,
        NeedCategory::Situational,
    ];

    /// Heading used when grouping needs
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "Standard",
            Self::Visual => "Vision",
            Self::Hearing => "Hearing",
            Self::Motor => "Movement and Control",
            Self::Communication => "Communication",
            Self::Cognitive => "Thinking and Memory",
            Self::Situational => "Temporary or Situational",
        }
    }
}

impl fmt::Display for NeedCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A selectable accessibility need
#[derive(Debug, Clone, PartialEq)]
pub struct AccessibilityNeed {
    /// Stable identifier
    pub id: &'static str,
    /// Short first-person label
    pub label: &'static str,
    /// Selector grouping
    pub category: NeedCategory,
    /// What selecting this need changes
    pub description: &'static str,
    /// Flags forced on
    pub enables: &'static [Flag],
    /// Explicit overrides, applied after `enables`
    pub sets: &'static [(Flag, Value)],
}

impl AccessibilityNeed {
    /// Owned id
    #[inline]
    #[must_use]
    pub fn need_id(&self) -> NeedId {
        NeedId::from(self.id)
    }
}

/// Override applied when two needs are selected together
#[derive(Debug, Clone, PartialEq)]
pub struct CombinationRule {
    /// Unordered pair of need ids
    pub needs: (&'static str, &'static str),
    /// Values forced when both are present
    pub effects: &'static [(Flag, Value)],
}

impl CombinationRule {
    /// Whether both needs of the pair are selected
    #[must_use]
    pub fn applies<'a>(&self, mut selected: impl Iterator<Item = &'a str> + Clone) -> bool {
        let (a, b) = self.needs;
        selected.clone().any(|id| id == a) && selected.any(|id| id == b)
    }
}

/// Sentinel need for users without specific requirements
pub const NO_NEEDS: &str = "no-needs";

/// Every selectable need, in resolution order
pub static NEEDS: &[AccessibilityNeed] = &[
    AccessibilityNeed {
        id: NO_NEEDS,
        label: "I can see, hear, and use my hands normally",
        category: NeedCategory::None,
        description: "Use the standard interface without adaptations.",
        enables: &[],
        sets: &[],
    },
    AccessibilityNeed {
        id: "cant-see",
        label: "I can't see the screen",
        category: NeedCategory::Visual,
        description: "Everything is read aloud, and you can move around by voice or keyboard.",
        enables: &[
            Flag::VoiceNavigation,
            Flag::DescriptiveAudio,
            Flag::AudioFeedback,
            Flag::KeyboardNavigation,
            Flag::SpatialGuidance,
            Flag::AutoReadContent,
            Flag::ScreenReaderOptimized,
        ],
        sets: &[(Flag::FontSize, Value::FontSize(FontSize::Large))],
    },
    AccessibilityNeed {
        id: "low-vision",
        label: "I have difficulty seeing small text",
        category: NeedCategory::Visual,
        description: "Larger text, stronger colors, and spoken confirmations.",
        enables: &[Flag::AudioFeedback],
        sets: &[
            (Flag::FontSize, Value::FontSize(FontSize::XLarge)),
            (Flag::Contrast, Value::Contrast(Contrast::High)),
        ],
    },
    AccessibilityNeed {
        id: "cant-hear",
        label: "I can't hear sounds",
        category: NeedCategory::Hearing,
        description: "All feedback is shown on screen instead of spoken.",
        enables: &[Flag::VisualConfirmations],
        sets: &[(Flag::AudioFeedback, Value::Bool(false))],
    },
    AccessibilityNeed {
        id: "hard-of-hearing",
        label: "I have difficulty hearing",
        category: NeedCategory::Hearing,
        description: "Visual confirmations alongside louder, slower speech.",
        enables: &[Flag::VisualConfirmations],
        sets: &[
            (Flag::SpeechVolume, Value::Number(1.0)),
            (Flag::SpeechRate, Value::Number(0.9)),
        ],
    },
    AccessibilityNeed {
        id: "cant-use-hands",
        label: "I can't use my hands",
        category: NeedCategory::Motor,
        description: "Control the application entirely with your voice.",
        enables: &[
            Flag::VoiceNavigation,
            Flag::VoiceInput,
            Flag::AudioFeedback,
            Flag::AutoSave,
        ],
        sets: &[],
    },
    AccessibilityNeed {
        id: "limited-dexterity",
        label: "I have limited hand movement",
        category: NeedCategory::Motor,
        description: "Keyboard shortcuts reduce the number of precise movements needed.",
        enables: &[
            Flag::KeyboardNavigation,
            Flag::KeyboardShortcuts,
            Flag::AutoSave,
        ],
        sets: &[(Flag::ReducedMotion, Value::Bool(true))],
    },
    AccessibilityNeed {
        id: "cant-speak",
        label: "I can't speak",
        category: NeedCategory::Communication,
        description: "Voice commands are turned off; use the keyboard instead.",
        enables: &[Flag::KeyboardNavigation, Flag::KeyboardShortcuts],
        sets: &[
            (Flag::VoiceNavigation, Value::Bool(false)),
            (Flag::VoiceInput, Value::Bool(false)),
        ],
    },
    AccessibilityNeed {
        id: "needs-simplicity",
        label: "I prefer simple, step-by-step screens",
        category: NeedCategory::Cognitive,
        description: "One task at a time, calmer animations, and slower speech.",
        enables: &[Flag::FocusMode, Flag::VisualConfirmations, Flag::AutoSave],
        sets: &[
            (Flag::ReducedMotion, Value::Bool(true)),
            (Flag::SpeechRate, Value::Number(0.8)),
        ],
    },
    AccessibilityNeed {
        id: "noisy-environment",
        label: "I'm in a noisy place",
        category: NeedCategory::Situational,
        description: "Feedback is shown on screen because sound may be missed.",
        enables: &[Flag::VisualConfirmations],
        sets: &[(Flag::AudioFeedback, Value::Bool(false))],
    },
    AccessibilityNeed {
        id: "quiet-environment",
        label: "I can't use sound right now",
        category: NeedCategory::Situational,
        description: "The application stays silent.",
        enables: &[Flag::VisualConfirmations],
        sets: &[
            (Flag::AudioFeedback, Value::Bool(false)),
            (Flag::DescriptiveAudio, Value::Bool(false)),
        ],
    },
];

/// Pairwise overrides, applied in order after every need
pub static COMBINATION_RULES: &[CombinationRule] = &[
    CombinationRule {
        needs: ("cant-hear", "cant-see"),
        effects: &[
            (Flag::HapticFeedback, Value::Bool(true)),
            (Flag::VoiceInput, Value::Bool(true)),
            (Flag::VisualConfirmations, Value::Bool(true)),
            (Flag::DescriptiveAudio, Value::Bool(true)),
            (Flag::SpatialGuidance, Value::Bool(true)),
        ],
    },
    CombinationRule {
        needs: ("cant-hear", "cant-use-hands"),
        effects: &[
            (Flag::VoiceInput, Value::Bool(true)),
            (Flag::VisualConfirmations, Value::Bool(true)),
            (Flag::AudioFeedback, Value::Bool(false)),
            (Flag::SpatialGuidance, Value::Bool(true)),
        ],
    },
    CombinationRule {
        needs: ("cant-see", "cant-speak"),
        effects: &[
            (Flag::KeyboardNavigation, Value::Bool(true)),
            (Flag::KeyboardShortcuts, Value::Bool(true)),
            (Flag::DescriptiveAudio, Value::Bool(true)),
            (Flag::SpatialGuidance, Value::Bool(true)),
        ],
    },
];

static BY_ID: Lazy<HashMap<&'static str, &'static AccessibilityNeed>> =
    Lazy::new(|| NEEDS.iter().map(|need| (need.id, need)).collect());

/// Look up a need by id
#[inline]
#[must_use]
pub fn find(id: &str) -> Option<&'static AccessibilityNeed> {
    BY_ID.get(id).copied()
}

/// Whether `id` names a catalog need
#[inline]
#[must_use]
pub fn contains(id: &str) -> bool {
    BY_ID.contains_key(id)
}

/// Needs grouped by category, categories in display order
#[must_use]
pub fn grouped() -> Vec<(NeedCategory, Vec<&'static AccessibilityNeed>)> {
    NeedCategory::ALL
        .iter()
        .map(|&category| {
            let needs: Vec<&'static AccessibilityNeed> =
                NEEDS.iter().filter(|n| n.category == category).collect();
            (category, needs)
        })
        .filter(|(_, needs)| !needs.is_empty())
        .collect()
}
