//! First-launch welcome flow
//!
//! Offers the [`WelcomeMode`] presets. Choosing one applies it at once and
//! confirms by speech; continuing is only possible after a choice, skipping
//! always is. Both hide the welcome flow for good.

use parking_lot::Mutex;
use tili_prefs::{PrefsError, WelcomeMode};
use tili_speech::AnnouncementEngine;

/// Welcome flow state
#[derive(Debug)]
pub struct WelcomeSetup {
    engine: AnnouncementEngine,
    selected: Mutex<Option<WelcomeMode>>,
}

impl WelcomeSetup {
    /// Flow with nothing chosen yet
    #[must_use]
    pub fn new(engine: AnnouncementEngine) -> Self {
        Self {
            engine,
            selected: Mutex::new(None),
        }
    }

    /// Whether the flow should be shown
    #[must_use]
    pub fn should_show(&self) -> bool {
        self.engine.store().read(|config| config.show_welcome)
    }

    /// Preset chosen so far
    #[must_use]
    pub fn selected(&self) -> Option<WelcomeMode> {
        *self.selected.lock()
    }

    /// Speak a preset's title as it takes focus
    pub fn focus(&self, mode: WelcomeMode) -> bool {
        self.engine.speak(mode.title())
    }

    /// Apply `mode` and confirm it
    ///
    /// # Errors
    /// The store refused one of the preset's values.
    pub fn select(&self, mode: WelcomeMode) -> Result<(), PrefsError> {
        self.engine.store().set_many(mode.settings())?;
        *self.selected.lock() = Some(mode);
        tracing::info!(%mode, "welcome preset applied");
        self.engine.speak(format!(
            "{} selected. You can change this anytime in settings.",
            mode.title()
        ));
        Ok(())
    }

    /// Finish with the chosen preset
    ///
    /// Returns `None` and changes nothing if no preset was chosen.
    pub fn complete(&self) -> Option<WelcomeMode> {
        let mode = self.selected()?;
        self.engine.store().set_show_welcome(false);
        self.engine.speak("Welcome setup complete. Welcome to TILI.");
        Some(mode)
    }

    /// Leave the defaults in place and hide the flow
    pub fn skip(&self) {
        tracing::info!("welcome setup skipped");
        self.engine.store().set_show_welcome(false);
    }
}
