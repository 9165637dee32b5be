//! Keyboard shortcuts and focus narration
//!
//! | Key            | Effect                                   | Requires            |
//! |----------------|------------------------------------------|---------------------|
//! | Alt+D/P/O/M/S  | navigate to a section                    | `keyboardShortcuts` |
//! | Alt+H          | speak the shortcut list                  | `keyboardShortcuts` |
//! | `?`            | speak the shortcut list                  | either keyboard flag |
//! | Escape         | close the open dialog                    | either keyboard flag |
//! | Tab            | describe the newly focused element       | `descriptiveAudio`  |
//!
//! Character keys typed inside text inputs are never treated as shortcuts.

use crate::page::{Navigator, PageSurface};
use crate::section::Section;
use std::sync::Arc;
use std::time::Duration;
use tili_prefs::TiliSettings;
use tili_speech::{AnnouncementEngine, Politeness, TimerHandle};

/// Spoken list of shortcuts
pub const SHORTCUT_HELP: &str = "Keyboard shortcuts: Alt plus D for Dashboard, Alt plus P for \
Projects, Alt plus O for Documents, Alt plus M for Meetings, Alt plus S for Settings, Alt plus H \
or question mark for this help, and Escape to close dialogs.";

const ENABLED_NOTICE: &str = "Keyboard shortcuts are enabled. Press Alt + H for help.";
const ENABLED_NOTICE_DELAY: Duration = Duration::from_secs(1);

/// Key identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Printable character
    Char(char),
    /// Escape
    Escape,
    /// Tab
    Tab,
    /// Enter
    Enter,
    /// Any other key
    Other,
}

/// Key press delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyEvent {
    /// Key pressed
    pub key: Key,
    /// Alt held
    pub alt: bool,
    /// Shift held
    pub shift: bool,
    /// Focus is inside a text input
    pub in_text_input: bool,
}

impl KeyEvent {
    /// Plain key press
    #[must_use]
    pub fn new(key: Key) -> Self {
        Self {
            key,
            alt: false,
            shift: false,
            in_text_input: false,
        }
    }

    /// Alt plus `c`
    #[must_use]
    pub fn alt(c: char) -> Self {
        Self {
            alt: true,
            ..Self::new(Key::Char(c))
        }
    }

    /// With shift held
    #[inline]
    #[must_use]
    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Typed inside a text input
    #[inline]
    #[must_use]
    pub fn in_text_input(mut self) -> Self {
        self.in_text_input = true;
        self
    }
}

/// What a key press did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not handled; let the host process it
    Ignored,
    /// Navigated to a section
    Navigated(Section),
    /// Shortcut help spoken
    HelpShown,
    /// Open dialog closed
    DialogClosed,
    /// Focus description scheduled
    DescriptionScheduled(TimerHandle),
}

impl KeyOutcome {
    /// Whether the host should suppress its default handling
    #[inline]
    #[must_use]
    pub fn is_handled(&self) -> bool {
        !matches!(self, Self::Ignored | Self::DescriptionScheduled(_))
    }
}

/// Section reached with Alt plus `c`
#[must_use]
pub fn shortcut_section(c: char) -> Option<Section> {
    match c.to_ascii_lowercase() {
        'd' => Some(Section::Dashboard),
        'p' => Some(Section::Projects),
        'o' => Some(Section::Documents),
        'm' => Some(Section::Meetings),
        's' => Some(Section::Settings),
        _ => None,
    }
}

/// Keyboard handler bound to one page
pub struct KeyboardShortcuts {
    engine: AnnouncementEngine,
    page: Arc<dyn PageSurface>,
    navigator: Arc<dyn Navigator>,
    tab_delay: Duration,
}

impl std::fmt::Debug for KeyboardShortcuts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyboardShortcuts")
            .field("tab_delay", &self.tab_delay)
            .finish_non_exhaustive()
    }
}

impl KeyboardShortcuts {
    /// Create handler with the default Tab delay
    pub fn new(
        engine: AnnouncementEngine,
        page: Arc<dyn PageSurface>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            engine,
            page,
            navigator,
            tab_delay: TiliSettings::default().tab_announce_delay(),
        }
    }

    /// With Tab description delay
    #[inline]
    #[must_use]
    pub fn with_tab_delay(mut self, delay: Duration) -> Self {
        self.tab_delay = delay;
        self
    }

    /// Handle one key press
    pub fn handle_key(&self, event: &KeyEvent) -> KeyOutcome {
        let (navigation, shortcuts, descriptive) = self.engine.store().read(|c| {
            (c.keyboard_navigation, c.keyboard_shortcuts, c.descriptive_audio)
        });
        if !navigation && !shortcuts {
            return KeyOutcome::Ignored;
        }

        match event.key {
            Key::Char(_) if event.in_text_input => KeyOutcome::Ignored,
            Key::Char(c) if event.alt => {
                if !shortcuts {
                    return KeyOutcome::Ignored;
                }
                if c.eq_ignore_ascii_case(&'h') {
                    return self.show_help();
                }
                match shortcut_section(c) {
                    Some(section) => {
                        tracing::debug!(%section, "keyboard navigation");
                        self.navigator.navigate(section);
                        self.engine.announce_live(
                            &format!("Navigating to {}", section.label()),
                            Politeness::Polite,
                        );
                        KeyOutcome::Navigated(section)
                    }
                    None => KeyOutcome::Ignored,
                }
            }
            // Shift state varies by layout
            Key::Char('?') => self.show_help(),
            Key::Escape => {
                if self.page.close_dialog() {
                    self.engine.announce_live("Dialog closed", Politeness::Polite);
                    KeyOutcome::DialogClosed
                } else {
                    KeyOutcome::Ignored
                }
            }
            Key::Tab if descriptive => {
                KeyOutcome::DescriptionScheduled(self.schedule_focus_description())
            }
            _ => KeyOutcome::Ignored,
        }
    }

    /// Move focus to the main content region
    pub fn skip_to_main(&self) -> bool {
        if !self.page.focus_main() {
            return false;
        }
        self.engine
            .announce_live("Skipped to main content", Politeness::Polite);
        true
    }

    /// Tell the user shortcuts are on, after a short delay
    pub fn announce_enabled(&self) -> Option<TimerHandle> {
        if !self.engine.store().read(|c| c.keyboard_shortcuts) {
            return None;
        }
        let engine = self.engine.clone();
        Some(self.engine.timer().schedule(
            ENABLED_NOTICE_DELAY,
            Box::new(move || {
                engine.announce_live(ENABLED_NOTICE, Politeness::Polite);
            }),
        ))
    }

    fn show_help(&self) -> KeyOutcome {
        self.engine.announce_live(SHORTCUT_HELP, Politeness::Polite);
        KeyOutcome::HelpShown
    }

    fn schedule_focus_description(&self) -> TimerHandle {
        let engine = self.engine.clone();
        let page = Arc::clone(&self.page);
        self.engine.timer().schedule(
            self.tab_delay,
            Box::new(move || {
                if let Some(element) = page.focused() {
                    engine.speak(element.spoken());
                }
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortcut_letters() {
        assert_eq!(shortcut_section('D'), Some(Section::Dashboard));
        assert_eq!(shortcut_section('o'), Some(Section::Documents));
        assert_eq!(shortcut_section('l'), None);
    }

    #[test]
    fn event_builders() {
        let event = KeyEvent::alt('p').in_text_input();
        assert!(event.alt && event.in_text_input && !event.shift);
        assert_eq!(event.key, Key::Char('p'));
    }

    #[test]
    fn only_consumed_keys_are_handled() {
        assert!(!KeyOutcome::Ignored.is_handled());
        assert!(KeyOutcome::HelpShown.is_handled());
    }
}
