//! TILI Input - Voice commands, recognition and keyboard access
//!
//! Input side of the accessibility engine:
//! - Section catalog with spoken names and spatial hints
//! - Rule-ordered voice command interpreter with two-step logout
//! - Continuous recognition controller that follows `voiceNavigation`
//! - Keyboard shortcuts and focus narration
//! - Confirm-before-commit dictation for form fields
//! - Assistant quick actions and the first-launch welcome presets
//!
//! # Example
//!
//! ```rust,ignore
//! use tili_input::prelude::*;
//!
//! let controller = ContinuousRecognitionController::new(
//!     engine, recognizer, page, navigator, ControllerSettings::default(),
//! );
//! controller.attach();
//! controller.handle_event(RecognitionEvent::final_result("go to projects"));
//! ```

#![warn(missing_docs)]

pub mod assistant;
pub mod command;
pub mod controller;
pub mod dictation;
pub mod interpreter;
pub mod keyboard;
pub mod page;
pub mod recognizer;
pub mod section;
pub mod welcome;

// Re-exports for convenience
pub use assistant::{AccessibilityAssistant, QuickAction, KEYBOARD_GUIDANCE};
pub use command::{Action, Command};
pub use controller::{
    ContinuousRecognitionController, ControllerSettings, ListeningState, RecognitionStats,
};
pub use dictation::{DictationSession, DictationState};
pub use interpreter::{CommandInterpreter, InterpretContext, HELP_MESSAGE};
pub use keyboard::{shortcut_section, Key, KeyEvent, KeyOutcome, KeyboardShortcuts};
pub use page::{ElementRef, Navigator, PageSurface};
pub use recognizer::{RecognitionError, RecognitionEvent, RecognitionOptions, SpeechRecognizer};
pub use section::{guide_to_section, NavigationTarget, Section};
pub use welcome::WelcomeSetup;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with TILI input
    pub use crate::{
        Action, Command, CommandInterpreter, ContinuousRecognitionController,
        ControllerSettings, DictationSession, KeyEvent, KeyboardShortcuts, ListeningState,
        Navigator, PageSurface, RecognitionEvent, Section, SpeechRecognizer,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
