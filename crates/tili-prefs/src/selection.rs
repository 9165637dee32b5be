//! Needs selection sessions
//!
//! Two flows share one model:
//! - first-time setup before login, which must end with at least one need
//! - profile editing from settings, with save, cancel and clear-all
//!
//! Operations return [`Feedback`] for the caller to narrate; this module
//! never speaks on its own.

use crate::catalog;
use crate::config::{Configuration, NeedId};
use crate::error::PrefsError;
use crate::store::PreferenceStore;
use indexmap::IndexSet;

/// Where feedback should be delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Spoken, subject to audio gating
    Speech,
    /// Live region, always delivered
    Live,
}

/// Message produced by a selection operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    /// Text to narrate
    pub text: String,
    /// Delivery channel
    pub channel: Channel,
}

impl Feedback {
    fn speech(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            channel: Channel::Speech,
        }
    }

    fn live(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            channel: Channel::Live,
        }
    }
}

/// Result of confirming a selection
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmOutcome {
    /// Selection resolved and stored
    Committed {
        /// Stored configuration
        config: Configuration,
        /// Confirmation message
        feedback: Feedback,
    },
    /// Selection refused; nothing stored
    Rejected(Feedback),
}

impl ConfirmOutcome {
    /// Message to narrate
    #[must_use]
    pub fn feedback(&self) -> &Feedback {
        match self {
            Self::Committed { feedback, .. } | Self::Rejected(feedback) => feedback,
        }
    }

    /// Whether the store was updated
    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

/// Which flow a selection belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Mandatory pre-login setup
    FirstTimeSetup,
    /// Editing an existing profile
    ProfileEdit,
}

const WELCOME: &str = "Welcome to TILI. Before you begin, please tell us how you prefer to interact. \
This helps us adapt the application to your needs. You can select multiple options, \
and you can change these settings anytime.";
const INSTRUCTIONS: &str = "Use Tab to navigate between options, Space to select, and Enter to continue. \
You must select at least one option to proceed.";
const EMPTY_SELECTION: &str = "Please select at least one option before continuing. \
If none of these apply to you, select \"I can see, hear, and use my hands normally\".";
const CONFIGURED: &str = "Your accessibility profile has been configured. \
The application will now adapt to your needs. You can change these settings anytime in Settings. \
Proceeding to login.";

/// In-progress needs selection
#[derive(Debug, Clone)]
pub struct NeedsSelection {
    mode: SelectionMode,
    selected: IndexSet<NeedId>,
    initial: IndexSet<NeedId>,
    dirty: bool,
}

impl NeedsSelection {
    /// Empty pre-login selection
    #[must_use]
    pub fn first_time() -> Self {
        Self {
            mode: SelectionMode::FirstTimeSetup,
            selected: IndexSet::new(),
            initial: IndexSet::new(),
            dirty: false,
        }
    }

    /// Profile edit starting from the stored needs
    #[must_use]
    pub fn edit(current: &Configuration) -> Self {
        Self {
            mode: SelectionMode::ProfileEdit,
            selected: current.accessibility_needs.clone(),
            initial: current.accessibility_needs.clone(),
            dirty: false,
        }
    }

    /// Flow of this selection
    #[inline]
    #[must_use]
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Selected ids in selection order
    pub fn selected(&self) -> impl Iterator<Item = &NeedId> {
        self.selected.iter()
    }

    /// Whether `id` is currently selected
    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|n| n.as_str() == id)
    }

    /// Whether anything changed since the session began
    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Opening narration for the pre-login selector, in order
    #[must_use]
    pub fn intro() -> [Feedback; 2] {
        [Feedback::speech(WELCOME), Feedback::speech(INSTRUCTIONS)]
    }

    /// Select or unselect a need
    ///
    /// # Errors
    /// `PrefsError::UnknownNeed` if `id` is not in the catalog.
    pub fn toggle(&mut self, id: &str) -> Result<Feedback, PrefsError> {
        let need = catalog::find(id).ok_or_else(|| PrefsError::UnknownNeed(id.to_string()))?;
        let added = if self.is_selected(id) {
            self.selected.shift_remove(&need.need_id());
            false
        } else {
            self.selected.insert(need.need_id());
            true
        };
        self.dirty = true;

        Ok(match (self.mode, added) {
            (SelectionMode::FirstTimeSetup, true) => {
                Feedback::speech(format!("Selected: {}", need.label))
            }
            (SelectionMode::FirstTimeSetup, false) => {
                Feedback::speech(format!("Unselected: {}", need.label))
            }
            (SelectionMode::ProfileEdit, true) => Feedback::live(format!("Added: {}", need.label)),
            (SelectionMode::ProfileEdit, false) => {
                Feedback::live(format!("Removed: {}", need.label))
            }
        })
    }

    /// Unselect everything
    pub fn clear_all(&mut self) -> Feedback {
        self.selected.clear();
        self.dirty = true;
        Feedback::live("All accessibility needs cleared")
    }

    /// Commit the selection to `store`
    ///
    /// First-time setup refuses an empty selection and sets `hasConfigured`;
    /// profile edits apply whatever is selected.
    pub fn confirm(&mut self, store: &PreferenceStore) -> ConfirmOutcome {
        match self.mode {
            SelectionMode::FirstTimeSetup => match store.complete_setup(self.selected.iter()) {
                Ok(config) => {
                    self.mark_saved();
                    ConfirmOutcome::Committed {
                        config,
                        feedback: Feedback::speech(CONFIGURED),
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "setup refused");
                    ConfirmOutcome::Rejected(Feedback::speech(EMPTY_SELECTION))
                }
            },
            SelectionMode::ProfileEdit => {
                let config = store.apply_accessibility_needs(self.selected.iter());
                let count = config.accessibility_needs.len();
                let noun = if count == 1 { "need" } else { "needs" };
                self.mark_saved();
                ConfirmOutcome::Committed {
                    config,
                    feedback: Feedback::live(format!(
                        "Accessibility profile updated. {count} {noun} selected."
                    )),
                }
            }
        }
    }

    /// Discard edits; feedback only when something changed
    pub fn cancel(&mut self) -> Option<Feedback> {
        let was_dirty = self.dirty;
        self.selected = self.initial.clone();
        self.dirty = false;
        was_dirty.then(|| Feedback::live("Changes discarded"))
    }

    fn mark_saved(&mut self) {
        self.initial = self.selected.clone();
        self.dirty = false;
    }
}
