//! Testing utilities for the TILI workspace
//!
//! Recording fakes for every capability trait, plus a harness wiring a store,
//! an announcement engine and a virtual-time timer together.

#![allow(missing_docs)]

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tili_input::{
    ElementRef, Navigator, PageSurface, RecognitionError, RecognitionOptions, Section,
    SpeechRecognizer,
};
use tili_prefs::{
    DocumentRoot, MemoryStorage, PreferenceStorage, PreferenceStore, DEFAULT_STORAGE_KEY,
};
use tili_speech::{
    AnnouncementEngine, EngineTiming, LiveRegion, OnEnd, Politeness, SpeechSynthesizer,
    TimerQueue, Utterance,
};

/// Synthesizer that records utterances and holds completions until told
#[derive(Default)]
pub struct RecordingSynthesizer {
    utterances: Mutex<Vec<Utterance>>,
    pending: Mutex<Vec<OnEnd>>,
    cancels: AtomicUsize,
}

impl RecordingSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.utterances.lock().iter().map(|u| u.text.clone()).collect()
    }

    pub fn utterances(&self) -> Vec<Utterance> {
        self.utterances.lock().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.utterances.lock().last().map(|u| u.text.clone())
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }

    pub fn pending_completions(&self) -> usize {
        self.pending.lock().len()
    }

    /// Run every held completion, cancelled ones included
    pub fn finish_all(&self) -> usize {
        let callbacks = std::mem::take(&mut *self.pending.lock());
        let count = callbacks.len();
        for callback in callbacks {
            callback();
        }
        count
    }

    /// Run only the newest held completion
    pub fn finish_latest(&self) -> bool {
        let callback = {
            let mut pending = self.pending.lock();
            let callback = pending.pop();
            pending.clear();
            callback
        };
        callback.map(|callback| callback()).is_some()
    }

    pub fn clear(&self) {
        self.utterances.lock().clear();
        self.pending.lock().clear();
    }
}

impl SpeechSynthesizer for RecordingSynthesizer {
    fn speak(&self, utterance: Utterance, on_end: Option<OnEnd>) {
        self.utterances.lock().push(utterance);
        if let Some(on_end) = on_end {
            self.pending.lock().push(on_end);
        }
    }

    fn cancel_all(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }
}

/// Live region that records every announcement
#[derive(Debug, Default)]
pub struct RecordingLiveRegion {
    announcements: Mutex<Vec<(String, Politeness)>>,
}

impl RecordingLiveRegion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.announcements
            .lock()
            .iter()
            .map(|(text, _)| text.clone())
            .collect()
    }

    pub fn announcements(&self) -> Vec<(String, Politeness)> {
        self.announcements.lock().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.announcements.lock().last().map(|(text, _)| text.clone())
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.announcements
            .lock()
            .iter()
            .any(|(text, _)| text.contains(needle))
    }

    pub fn clear(&self) {
        self.announcements.lock().clear();
    }
}

impl LiveRegion for RecordingLiveRegion {
    fn announce(&self, text: &str, politeness: Politeness) {
        self.announcements.lock().push((text.to_string(), politeness));
    }
}

/// Document root keeping the latest value of each attribute
#[derive(Debug, Default)]
pub struct RecordingDocumentRoot {
    attributes: Mutex<HashMap<String, String>>,
    styles: Mutex<HashMap<String, String>>,
}

impl RecordingDocumentRoot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.lock().get(name).cloned()
    }

    pub fn style(&self, name: &str) -> Option<String> {
        self.styles.lock().get(name).cloned()
    }
}

impl DocumentRoot for RecordingDocumentRoot {
    fn set_attribute(&self, name: &str, value: &str) {
        self.attributes
            .lock()
            .insert(name.to_string(), value.to_string());
    }

    fn set_style_property(&self, name: &str, value: &str) {
        self.styles.lock().insert(name.to_string(), value.to_string());
    }
}

/// Recognizer that tracks session count and can refuse to start
#[derive(Debug, Default)]
pub struct FakeRecognizer {
    active: AtomicBool,
    starts: AtomicUsize,
    stops: AtomicUsize,
    max_live: AtomicUsize,
    fail_with: Mutex<Option<RecognitionError>>,
    last_options: Mutex<Option<RecognitionOptions>>,
}

impl FakeRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every start fails with `error` until [`FakeRecognizer::allow`]
    pub fn fail_with(&self, error: RecognitionError) {
        *self.fail_with.lock() = Some(error);
    }

    pub fn deny_permission(&self) {
        self.fail_with(RecognitionError::NotAllowed);
    }

    pub fn allow(&self) {
        *self.fail_with.lock() = None;
    }

    /// Platform ends the session on its own
    pub fn end_session(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    /// Most sessions ever alive at once
    pub fn max_live_sessions(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }

    pub fn last_options(&self) -> Option<RecognitionOptions> {
        self.last_options.lock().clone()
    }
}

impl SpeechRecognizer for FakeRecognizer {
    fn start(&self, options: &RecognitionOptions) -> Result<(), RecognitionError> {
        if let Some(error) = self.fail_with.lock().clone() {
            return Err(error);
        }
        if self.active.swap(true, Ordering::SeqCst) {
            self.max_live.fetch_max(2, Ordering::SeqCst);
            return Err(RecognitionError::AlreadyStarted);
        }
        self.max_live.fetch_max(1, Ordering::SeqCst);
        self.starts.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock() = Some(options.clone());
        Ok(())
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.active.store(false, Ordering::SeqCst);
    }
}

/// In-memory page with a tab order, navigation tags and a dialog
#[derive(Debug)]
pub struct FakePage {
    location: Mutex<String>,
    title: Mutex<Option<String>>,
    main_text: Mutex<String>,
    elements: Vec<ElementRef>,
    focused: Mutex<Option<usize>>,
    sections: Mutex<HashSet<Section>>,
    dialog_open: AtomicBool,
    main_focused: AtomicBool,
    activated: Mutex<Vec<String>>,
}

impl FakePage {
    /// Page at `location` exposing every section
    pub fn new(location: &str) -> Self {
        Self {
            location: Mutex::new(location.to_string()),
            title: Mutex::new(None),
            main_text: Mutex::new(String::new()),
            elements: Vec::new(),
            focused: Mutex::new(None),
            sections: Mutex::new(Section::ALL.into_iter().collect()),
            dialog_open: AtomicBool::new(false),
            main_focused: AtomicBool::new(false),
            activated: Mutex::new(Vec::new()),
        }
    }

    /// With buttons named `labels`, ids derived from the labels
    #[must_use]
    pub fn with_buttons(mut self, labels: &[&str]) -> Self {
        self.elements = labels
            .iter()
            .map(|label| ElementRef::new(label.to_lowercase(), *label, "button"))
            .collect();
        self
    }

    #[must_use]
    pub fn with_title(self, title: &str) -> Self {
        *self.title.lock() = Some(title.to_string());
        self
    }

    #[must_use]
    pub fn with_main_text(self, text: &str) -> Self {
        *self.main_text.lock() = text.to_string();
        self
    }

    #[must_use]
    pub fn with_dialog_open(self) -> Self {
        self.dialog_open.store(true, Ordering::SeqCst);
        self
    }

    /// Hide the navigation entry for `section`
    pub fn remove_section(&self, section: Section) {
        self.sections.lock().remove(&section);
    }

    pub fn set_location(&self, location: &str) {
        *self.location.lock() = location.to_string();
    }

    pub fn focus_index(&self, index: usize) {
        *self.focused.lock() = Some(index);
    }

    pub fn focused_index(&self) -> Option<usize> {
        *self.focused.lock()
    }

    pub fn activated(&self) -> Vec<String> {
        self.activated.lock().clone()
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog_open.load(Ordering::SeqCst)
    }

    pub fn is_main_focused(&self) -> bool {
        self.main_focused.load(Ordering::SeqCst)
    }
}

impl PageSurface for FakePage {
    fn current_location(&self) -> String {
        self.location.lock().clone()
    }

    fn focused(&self) -> Option<ElementRef> {
        let index = (*self.focused.lock())?;
        self.elements.get(index).cloned()
    }

    fn focusable(&self) -> Vec<ElementRef> {
        self.elements.clone()
    }

    fn element_for(&self, section: Section) -> Option<ElementRef> {
        self.sections
            .lock()
            .contains(&section)
            .then(|| ElementRef::new(format!("nav-{section}"), section.label(), "link"))
    }

    fn focus(&self, element: &ElementRef) -> bool {
        match self.elements.iter().position(|e| e.id == element.id) {
            Some(index) => {
                *self.focused.lock() = Some(index);
                true
            }
            None => false,
        }
    }

    fn activate(&self, element: &ElementRef) -> bool {
        self.activated.lock().push(element.id.clone());
        true
    }

    fn page_title(&self) -> Option<String> {
        self.title.lock().clone()
    }

    fn main_text(&self) -> String {
        self.main_text.lock().clone()
    }

    fn close_dialog(&self) -> bool {
        self.dialog_open.swap(false, Ordering::SeqCst)
    }

    fn focus_main(&self) -> bool {
        self.main_focused.store(true, Ordering::SeqCst);
        true
    }
}

/// Navigator that records routing and logout calls
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    navigations: Mutex<Vec<Section>>,
    logouts: AtomicUsize,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn navigations(&self) -> Vec<Section> {
        self.navigations.lock().clone()
    }

    pub fn logouts(&self) -> usize {
        self.logouts.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, section: Section) {
        self.navigations.lock().push(section);
    }

    fn logout(&self) {
        self.logouts.fetch_add(1, Ordering::SeqCst);
    }
}

/// Store, engine and fakes wired together
pub struct Harness {
    pub storage: Arc<MemoryStorage>,
    pub root: Arc<RecordingDocumentRoot>,
    pub store: Arc<PreferenceStore>,
    pub synth: Arc<RecordingSynthesizer>,
    pub live: Arc<RecordingLiveRegion>,
    pub timer: Arc<TimerQueue>,
    pub engine: AnnouncementEngine,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_timing(EngineTiming::default())
    }

    pub fn with_timing(timing: EngineTiming) -> Self {
        let storage = Arc::new(MemoryStorage::new());
        let root = Arc::new(RecordingDocumentRoot::new());
        let store = Arc::new(PreferenceStore::open(
            Arc::clone(&storage) as Arc<dyn PreferenceStorage>,
            Arc::clone(&root) as Arc<dyn DocumentRoot>,
            DEFAULT_STORAGE_KEY,
        ));
        let synth = Arc::new(RecordingSynthesizer::new());
        let live = Arc::new(RecordingLiveRegion::new());
        let timer = Arc::new(TimerQueue::new());
        let engine = AnnouncementEngine::new(
            Arc::clone(&store),
            Arc::clone(&synth) as Arc<dyn SpeechSynthesizer>,
            Arc::clone(&live) as Arc<dyn LiveRegion>,
            Arc::clone(&timer) as Arc<dyn tili_speech::Timer>,
            timing,
        );
        Self {
            storage,
            root,
            store,
            synth,
            live,
            timer,
            engine,
        }
    }

    /// Harness whose store has applied `needs`
    pub fn with_needs(needs: &[&str]) -> Self {
        let harness = Self::new();
        harness.store.apply_accessibility_needs(needs.iter().copied());
        harness
    }

    /// Advance virtual time
    pub fn advance(&self, by: Duration) -> usize {
        self.timer.advance(by)
    }

    pub fn advance_ms(&self, ms: u64) -> usize {
        self.advance(Duration::from_millis(ms))
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
