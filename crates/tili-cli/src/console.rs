//! Terminal backends and a scripted site for simulations

use parking_lot::Mutex;
use std::sync::Arc;
use tili_input::{ElementRef, Navigator, PageSurface, Section};
use tili_speech::{LiveRegion, OnEnd, Politeness, SpeechSynthesizer, Utterance};

/// Ordered record of everything narrated
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    lines: Arc<Mutex<Vec<String>>>,
}

impl Transcript {
    /// Empty transcript
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line
    pub fn push(&self, line: impl Into<String>) {
        self.lines.lock().push(line.into());
    }

    /// Recorded lines
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Lines joined with newlines
    #[must_use]
    pub fn render(&self) -> String {
        self.lines.lock().join("\n")
    }
}

/// Synthesizer that writes utterances to a transcript
///
/// Speech "finishes" as soon as it is written.
#[derive(Debug, Clone)]
pub struct ConsoleSynthesizer {
    transcript: Transcript,
}

impl ConsoleSynthesizer {
    /// Synthesizer writing to `transcript`
    #[must_use]
    pub fn new(transcript: Transcript) -> Self {
        Self { transcript }
    }
}

impl SpeechSynthesizer for ConsoleSynthesizer {
    fn speak(&self, utterance: Utterance, on_end: Option<OnEnd>) {
        tracing::debug!(rate = utterance.rate, locale = utterance.locale, "speak");
        self.transcript.push(format!("speak: {}", utterance.text));
        if let Some(on_end) = on_end {
            on_end();
        }
    }

    fn cancel_all(&self) {}
}

/// Live region that writes announcements to a transcript
#[derive(Debug, Clone)]
pub struct ConsoleLiveRegion {
    transcript: Transcript,
}

impl ConsoleLiveRegion {
    /// Live region writing to `transcript`
    #[must_use]
    pub fn new(transcript: Transcript) -> Self {
        Self { transcript }
    }
}

impl LiveRegion for ConsoleLiveRegion {
    fn announce(&self, text: &str, politeness: Politeness) {
        self.transcript.push(format!("live ({politeness}): {text}"));
    }
}

#[derive(Debug)]
struct SiteState {
    section: Section,
    focused: Option<usize>,
    logged_out: bool,
}

/// Small fixed application: one page per section, two buttons each
#[derive(Debug)]
pub struct ScriptedSite {
    state: Mutex<SiteState>,
}

impl Default for ScriptedSite {
    fn default() -> Self {
        Self::new(Section::Dashboard)
    }
}

impl ScriptedSite {
    /// Site showing `section`
    #[must_use]
    pub fn new(section: Section) -> Self {
        Self {
            state: Mutex::new(SiteState {
                section,
                focused: None,
                logged_out: false,
            }),
        }
    }

    /// Section on screen
    #[must_use]
    pub fn section(&self) -> Section {
        self.state.lock().section
    }

    /// Whether the session was ended
    #[must_use]
    pub fn is_logged_out(&self) -> bool {
        self.state.lock().logged_out
    }

    fn buttons(section: Section) -> [ElementRef; 2] {
        let (first, second) = match section {
            Section::Dashboard => ("New project", "View calendar"),
            Section::Projects => ("Create project", "Filter projects"),
            Section::Documents => ("Upload document", "Search documents"),
            Section::Meetings => ("Schedule meeting", "Join meeting"),
            Section::Settings => ("Accessibility profile", "Save settings"),
            Section::Logout => ("Sign in", "Help"),
        };
        [
            ElementRef::new(slug(first), first, "button"),
            ElementRef::new(slug(second), second, "button"),
        ]
    }
}

fn slug(label: &str) -> String {
    label.to_lowercase().replace(' ', "-")
}

impl PageSurface for ScriptedSite {
    fn current_location(&self) -> String {
        self.section().as_str().to_string()
    }

    fn focused(&self) -> Option<ElementRef> {
        let state = self.state.lock();
        let index = state.focused?;
        Self::buttons(state.section).get(index).cloned()
    }

    fn focusable(&self) -> Vec<ElementRef> {
        Self::buttons(self.section()).to_vec()
    }

    fn element_for(&self, section: Section) -> Option<ElementRef> {
        Some(ElementRef::new(
            format!("nav-{section}"),
            section.label(),
            "link",
        ))
    }

    fn focus(&self, element: &ElementRef) -> bool {
        let mut state = self.state.lock();
        let position = Self::buttons(state.section)
            .iter()
            .position(|e| e.id == element.id);
        if position.is_some() {
            state.focused = position;
        }
        position.is_some()
    }

    fn activate(&self, element: &ElementRef) -> bool {
        tracing::info!(id = %element.id, "activated");
        true
    }

    fn page_title(&self) -> Option<String> {
        Some(self.section().label().to_string())
    }

    fn main_text(&self) -> String {
        format!(
            "{} overview. Use the buttons below to get started.",
            self.section().label()
        )
    }

    fn close_dialog(&self) -> bool {
        false
    }

    fn focus_main(&self) -> bool {
        true
    }
}

impl Navigator for ScriptedSite {
    fn navigate(&self, section: Section) {
        let mut state = self.state.lock();
        state.section = section;
        state.focused = None;
    }

    fn logout(&self) {
        self.state.lock().logged_out = true;
    }
}
