//! Voice command interpretation
//!
//! Utterances are lowercased and stripped of punctuation. Keywords match
//! anywhere in the text, inside longer words too ("reading" reads). Rules are
//! tried in a fixed order and the first match wins:
//!
//! 1. "go to" / "navigate to" / "open" plus a section
//! 2. an utterance that is exactly a section name
//! 3. "click" / "activate" / "press"
//! 4. "next" / "forward", "previous" / "back"
//! 5. "where am i" / "where" / "location"
//! 6. "what can i do" / "help" / "commands"
//! 7. "read" / "describe"
//! 8. "logout" / "sign out" / "exit"
//! 9. anything else is an error
//!
//! Logout takes two utterances: rule 8 (or a navigation to the logout
//! section) arms a confirmation, and only an immediately following
//! "confirm logout" produces [`Action::Logout`].

use crate::command::{Action, Command};
use crate::section::Section;

/// Page state the interpreter needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterpretContext {
    /// Name of the current page
    pub current_location: String,
    /// Whether an element holds focus
    pub has_focus: bool,
}

impl InterpretContext {
    /// Create context
    #[must_use]
    pub fn new(current_location: impl Into<String>, has_focus: bool) -> Self {
        Self {
            current_location: current_location.into(),
            has_focus,
        }
    }
}

const NAVIGATION_PHRASES: &[&str] = &["go to", "navigate to", "open"];
const ACTIVATE_PHRASES: &[&str] = &["click", "activate", "press"];
const NEXT_PHRASES: &[&str] = &["next", "forward"];
const PREVIOUS_PHRASES: &[&str] = &["previous", "back"];
const LOCATION_PHRASES: &[&str] = &["where am i", "where", "location"];
const HELP_PHRASES: &[&str] = &["what can i do", "help", "commands"];
const READ_PHRASES: &[&str] = &["read", "describe"];
const LOGOUT_PHRASES: &[&str] = &["logout", "sign out", "exit"];
const CONFIRM_LOGOUT: &str = "confirm logout";

/// Spoken list of commands
pub const HELP_MESSAGE: &str = "Available commands: say a section name like Dashboard, Projects, \
Documents, Meetings or Settings to navigate. Say next or previous to move between elements, \
click to activate the focused element, read to hear the page content, where am I to hear your \
location, and logout to sign out.";

/// Stateful interpreter; holds the pending logout confirmation
#[derive(Debug, Clone, Default)]
pub struct CommandInterpreter {
    pending_logout: bool,
}

impl CommandInterpreter {
    /// Create interpreter with no pending confirmation
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a logout confirmation is armed
    #[inline]
    #[must_use]
    pub fn is_logout_pending(&self) -> bool {
        self.pending_logout
    }

    /// Interpret one final utterance
    pub fn interpret(&mut self, utterance: &str, context: &InterpretContext) -> Command {
        let text = normalize(utterance);
        let was_pending = std::mem::take(&mut self.pending_logout);

        if was_pending && text.contains(CONFIRM_LOGOUT) {
            return Command::new(Action::Logout).with_message("Logging out.");
        }
        if was_pending {
            tracing::debug!("logout confirmation disarmed");
        }

        let command = match_rules(&text, context);
        if command.action == Action::LogoutConfirm {
            self.pending_logout = true;
        }
        command
    }
}

fn match_rules(text: &str, context: &InterpretContext) -> Command {
    // 1
    if contains_any(text, NAVIGATION_PHRASES) {
        return match Section::mentioned_in(text) {
            Some(section) => navigate_or_confirm(section),
            None => Command::error(format!(
                "I did not understand which section to open. Valid sections are {}.",
                Section::spoken_list()
            )),
        };
    }

    // 2
    if let Some(section) = Section::from_name(text) {
        return navigate_or_confirm(section);
    }

    // 3
    if contains_any(text, ACTIVATE_PHRASES) {
        return if context.has_focus {
            Command::new(Action::Activate)
        } else {
            Command::error(
                "Nothing is focused. Say \"next\" to move to an element, or say a section name.",
            )
        };
    }

    // 4
    if contains_any(text, NEXT_PHRASES) {
        return Command::new(Action::Next);
    }
    if contains_any(text, PREVIOUS_PHRASES) {
        return Command::new(Action::Previous);
    }

    // 5
    if contains_any(text, LOCATION_PHRASES) {
        let location = if context.current_location.is_empty() {
            "current"
        } else {
            context.current_location.as_str()
        };
        return Command::new(Action::AnnounceLocation)
            .with_message(format!("You are on the {location} page."));
    }

    // 6
    if contains_any(text, HELP_PHRASES) {
        return Command::new(Action::Help).with_message(HELP_MESSAGE);
    }

    // 7
    if contains_any(text, READ_PHRASES) {
        return Command::new(Action::Read);
    }

    // 8
    if contains_any(text, LOGOUT_PHRASES) {
        return logout_confirm();
    }

    // 9
    Command::error(
        "Command not recognized. Say \"help\" to hear available commands, or say a section name.",
    )
}

fn navigate_or_confirm(section: Section) -> Command {
    if section == Section::Logout {
        logout_confirm()
    } else {
        Command::navigate(section)
    }
}

fn logout_confirm() -> Command {
    Command::new(Action::LogoutConfirm)
        .with_message("Are you sure you want to log out? Say \"confirm logout\" to continue.")
}

/// Lowercase text with punctuation dropped and whitespace collapsed
fn normalize(utterance: &str) -> String {
    let cleaned: String = utterance
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '\'' {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn contains_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| text.contains(p))
}
