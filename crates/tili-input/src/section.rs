//! Application sections and their navigation hints

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tili_speech::AnnouncementEngine;

/// Top-level section reachable by voice or keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// Overview page
    Dashboard,
    /// Project list
    Projects,
    /// Document library
    Documents,
    /// Meeting calendar
    Meetings,
    /// User settings
    Settings,
    /// Sign-out control
    Logout,
}

/// Where a section's entry point sits, for spatial narration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationTarget {
    /// Position of the entry point
    pub position: &'static str,
    /// How to get there from the navigation menu
    pub direction: &'static str,
}

impl Section {
    /// Every section in menu order
    pub const ALL: [Section; 6] = [
        Section::Dashboard,
        Section::Projects,
        Section::Documents,
        Section::Meetings,
        Section::Settings,
        Section::Logout,
    ];

    /// Identifier, also the navigation tag on the page
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Projects => "projects",
            Self::Documents => "documents",
            Self::Meetings => "meetings",
            Self::Settings => "settings",
            Self::Logout => "logout",
        }
    }

    /// Display name
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Projects => "Projects",
            Self::Documents => "Documents",
            Self::Meetings => "Meetings",
            Self::Settings => "Settings",
            Self::Logout => "Logout",
        }
    }

    /// Section whose name is exactly `name` (lowercase)
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }

    /// Section whose name appears earliest in `text` (lowercase)
    #[must_use]
    pub fn mentioned_in(text: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .filter_map(|s| text.find(s.as_str()).map(|at| (at, s)))
            .min_by_key(|(at, _)| *at)
            .map(|(_, s)| s)
    }

    /// Spatial hint for the section's entry point
    #[must_use]
    pub fn navigation_target(self) -> NavigationTarget {
        match self {
            Self::Dashboard => NavigationTarget {
                position: "first item in the main navigation menu",
                direction: "at the top of the left sidebar",
            },
            Self::Projects => NavigationTarget {
                position: "second item in the main navigation menu",
                direction: "just below Dashboard in the left sidebar",
            },
            Self::Documents => NavigationTarget {
                position: "third item in the main navigation menu",
                direction: "just below Projects in the left sidebar",
            },
            Self::Meetings => NavigationTarget {
                position: "fourth item in the main navigation menu",
                direction: "just below Documents in the left sidebar",
            },
            Self::Settings => NavigationTarget {
                position: "fifth item in the main navigation menu",
                direction: "near the bottom of the left sidebar",
            },
            Self::Logout => NavigationTarget {
                position: "last item in the main navigation menu",
                direction: "at the very bottom of the left sidebar",
            },
        }
    }

    /// Comma-separated section names, for corrective messages
    #[must_use]
    pub fn spoken_list() -> String {
        let names: Vec<&str> = Self::ALL.iter().map(|s| s.as_str()).collect();
        tili_speech::join_list(&names)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let word = s.trim().to_ascii_lowercase();
        Self::from_name(&word).ok_or_else(|| format!("unknown section '{}'", s.trim()))
    }
}

/// Narrate how to reach `section`'s entry point
///
/// Gated like every spatial narration.
pub fn guide_to_section(engine: &AnnouncementEngine, section: Section) -> bool {
    let target = section.navigation_target();
    engine.guide_to_button(section.label(), target.position, target.direction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_map_to_sections() {
        assert_eq!(Section::from_name("meetings"), Some(Section::Meetings));
        assert_eq!(Section::from_name("meeting"), None);
        assert_eq!(Section::from_name("help"), None);
        assert_eq!("Settings".parse::<Section>().unwrap(), Section::Settings);
    }

    #[test]
    fn earliest_mention_wins() {
        assert_eq!(
            Section::mentioned_in("open settings then projects"),
            Some(Section::Settings)
        );
        assert_eq!(
            Section::mentioned_in("show my documents"),
            Some(Section::Documents)
        );
        assert_eq!(Section::mentioned_in("open the help commands"), None);
    }

    #[test]
    fn spoken_list_names_every_section() {
        assert_eq!(
            Section::spoken_list(),
            "dashboard, projects, documents, meetings, settings and logout"
        );
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Section::Documents).unwrap();
        assert_eq!(json, "\"documents\"");
    }
}
