//! Accessibility assistant quick actions
//!
//! A floating panel of one-tap actions: read or explain the page, step the
//! text size, flip contrast and hear keyboard help. Each action writes
//! through the preference store and confirms by speech.

use crate::page::PageSurface;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tili_prefs::{Contrast, Flag, TiliSettings, Value};
use tili_speech::{AnnouncementEngine, Politeness};

/// Keyboard guidance spoken by [`QuickAction::Help`]
pub const KEYBOARD_GUIDANCE: &str = "Press Tab to navigate between elements. Press Enter to \
activate buttons. Press Escape to close dialogs.";

/// One-tap assistant action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuickAction {
    /// Speak the start of the main content
    ReadPage,
    /// Say which page this is
    ExplainPage,
    /// One font size step up
    IncreaseText,
    /// One font size step down
    DecreaseText,
    /// Switch between normal and high contrast
    ToggleContrast,
    /// Keyboard guidance
    Help,
}

impl QuickAction {
    /// Every action in panel order
    pub const ALL: [QuickAction; 6] = [
        Self::ReadPage,
        Self::ExplainPage,
        Self::IncreaseText,
        Self::DecreaseText,
        Self::ToggleContrast,
        Self::Help,
    ];

    /// Stable id
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::ReadPage => "read-page",
            Self::ExplainPage => "explain-page",
            Self::IncreaseText => "increase-text",
            Self::DecreaseText => "decrease-text",
            Self::ToggleContrast => "toggle-contrast",
            Self::Help => "help",
        }
    }

    /// Button label, also spoken on focus
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::ReadPage => "Read this page",
            Self::ExplainPage => "Explain this page",
            Self::IncreaseText => "Increase text size",
            Self::DecreaseText => "Decrease text size",
            Self::ToggleContrast => "Toggle high contrast",
            Self::Help => "Get help",
        }
    }
}

impl fmt::Display for QuickAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Assistant panel bound to a page and the announcement engine
pub struct AccessibilityAssistant {
    engine: AnnouncementEngine,
    page: Arc<dyn PageSurface>,
    read_limit: usize,
    open: AtomicBool,
}

impl fmt::Debug for AccessibilityAssistant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessibilityAssistant")
            .field("read_limit", &self.read_limit)
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}

impl AccessibilityAssistant {
    /// Closed assistant reading up to the default limit
    pub fn new(engine: AnnouncementEngine, page: Arc<dyn PageSurface>) -> Self {
        Self {
            engine,
            page,
            read_limit: TiliSettings::default().read_limit_chars,
            open: AtomicBool::new(false),
        }
    }

    /// Characters spoken by [`QuickAction::ReadPage`]
    #[inline]
    #[must_use]
    pub fn with_read_limit(mut self, limit: usize) -> Self {
        self.read_limit = limit;
        self
    }

    /// Whether the panel is showing
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Open or close the panel; returns the new state
    pub fn toggle(&self) -> bool {
        let open = !self.open.fetch_xor(true, Ordering::SeqCst);
        tracing::debug!(open, "assistant toggled");
        open
    }

    /// Speak the label of the focused control
    pub fn focus(&self, action: QuickAction) -> bool {
        self.engine.speak(action.label())
    }

    /// Run `action`; returns whether anything changed or was narrated
    ///
    /// Text size steps stop silently at the smallest and largest sizes.
    pub fn perform(&self, action: QuickAction) -> bool {
        tracing::info!(%action, "assistant action");
        match action {
            QuickAction::ReadPage => {
                let text: String = self.page.main_text().chars().take(self.read_limit).collect();
                let text = text.trim();
                if text.is_empty() {
                    self.engine.speak("There is no content to read on this page.")
                } else {
                    self.engine.speak(text)
                }
            }
            QuickAction::ExplainPage => {
                let title = self
                    .page
                    .page_title()
                    .unwrap_or_else(|| "current page".to_string());
                self.engine.speak(format!(
                    "You are on the {title}. This page shows your main content and navigation options."
                ))
            }
            QuickAction::IncreaseText => self.step_text(true),
            QuickAction::DecreaseText => self.step_text(false),
            QuickAction::ToggleContrast => {
                let store = self.engine.store();
                let contrast = store.modify(|config| {
                    config.contrast = config.contrast.toggled();
                    Some(config.contrast)
                });
                let name = match contrast {
                    Some(Contrast::High) => "High",
                    _ => "Normal",
                };
                self.engine.announce_action(&format!("{name} contrast mode activated"));
                true
            }
            QuickAction::Help => self.engine.speak(KEYBOARD_GUIDANCE),
        }
    }

    /// Switch audio feedback, confirming on the live region too
    pub fn set_audio_feedback(&self, on: bool) {
        self.set_switch(Flag::AudioFeedback, on, "Audio feedback");
    }

    /// Switch focus mode, confirming on the live region too
    pub fn set_focus_mode(&self, on: bool) {
        self.set_switch(Flag::FocusMode, on, "Focus mode");
    }

    fn set_switch(&self, flag: Flag, on: bool, name: &str) {
        if let Err(e) = self.engine.store().set(flag, Value::Bool(on)) {
            tracing::error!(%flag, error = %e, "assistant switch refused");
            return;
        }
        let state = if on { "enabled" } else { "disabled" };
        self.engine.announce_live(&format!("{name} {state}"), Politeness::Polite);
    }

    fn step_text(&self, larger: bool) -> bool {
        let stepped = self.engine.store().modify(|config| {
            let next = if larger {
                config.font_size.larger()
            } else {
                config.font_size.smaller()
            };
            (next != config.font_size).then(|| {
                config.font_size = next;
                next
            })
        });
        let Some(size) = stepped else {
            tracing::debug!(larger, "text size already at the limit");
            return false;
        };
        tracing::debug!(size = size.as_str(), "text size stepped");
        let direction = if larger { "increased" } else { "decreased" };
        self.engine.announce_action(&format!("Text size {direction}"));
        true
    }
}
