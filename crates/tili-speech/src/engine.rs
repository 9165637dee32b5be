//! Announcement engine
//!
//! Turns semantic events into narration and dispatches it to the speech
//! synthesizer and the live region, gated by the current configuration:
//!
//! | Family                          | Requires                               |
//! |---------------------------------|----------------------------------------|
//! | `speak` and everything built on it | `audioFeedback` or `descriptiveAudio` |
//! | spatial guidance, form and button guidance, page structure | `spatialGuidance` |
//! | page context                    | `spatialGuidance` or `descriptiveAudio` |
//! | live announcements              | nothing; speech follows `speak` gating |
//!
//! Speech is last-write-wins. Every `speak` cancels whatever is playing and
//! bumps a generation counter; a completion callback only runs if its
//! utterance is still the newest one.

use crate::backend::{LiveRegion, OnEnd, Politeness, SpeechSynthesizer, Utterance};
use crate::narration::{count_phrase, join_list, sentences, Narration};
use crate::timer::{Timer, TimerHandle};
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tili_prefs::{Channel, Configuration, Feedback, PreferenceStore, TiliSettings};

/// Delays used by chained and deferred narration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineTiming {
    /// Gap between parts of a sequence
    pub stagger: Duration,
    /// Default delay for deferred announcements
    pub settle: Duration,
}

impl Default for EngineTiming {
    fn default() -> Self {
        Self::from(&TiliSettings::default())
    }
}

impl From<&TiliSettings> for EngineTiming {
    fn from(settings: &TiliSettings) -> Self {
        Self {
            stagger: settings.narration_stagger(),
            settle: settings.focus_settle_delay(),
        }
    }
}

/// Count of one kind of item shown on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemCount {
    /// How many
    pub count: usize,
    /// Noun for one item
    pub singular: String,
    /// Noun for several items
    pub plural: String,
}

impl ItemCount {
    /// Create item count
    #[must_use]
    pub fn new(count: usize, singular: impl Into<String>, plural: impl Into<String>) -> Self {
        Self {
            count,
            singular: singular.into(),
            plural: plural.into(),
        }
    }
}

/// Context narrated when arriving on a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContext {
    /// Page name
    pub page: String,
    /// Collections shown on the page, possibly empty
    pub counts: Vec<ItemCount>,
    /// What the user can do next
    pub hint: Option<String>,
}

/// Landmark outline of a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageStructure {
    /// Page title
    pub title: String,
    /// Region names in reading order
    pub regions: Vec<String>,
}

/// Form field to guide the user to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldGuide {
    /// Field label
    pub label: String,
    /// Input kind ("text", "email", "date")
    pub kind: String,
    /// Whether the form needs a value
    pub required: bool,
    /// Position among the form's fields
    pub ordinal: Option<(usize, usize)>,
    /// Where the field sits
    pub position: Option<String>,
    /// What to do once there
    pub hint: Option<String>,
}

/// Narration engine
///
/// Cheap to clone; clones share speech state.
#[derive(Clone)]
pub struct AnnouncementEngine {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<PreferenceStore>,
    synth: Arc<dyn SpeechSynthesizer>,
    live: Arc<dyn LiveRegion>,
    timer: Arc<dyn Timer>,
    timing: EngineTiming,
    generation: AtomicU64,
}

impl fmt::Debug for AnnouncementEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnouncementEngine")
            .field("timing", &self.inner.timing)
            .field("generation", &self.inner.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl AnnouncementEngine {
    /// Create engine over its collaborators
    pub fn new(
        store: Arc<PreferenceStore>,
        synth: Arc<dyn SpeechSynthesizer>,
        live: Arc<dyn LiveRegion>,
        timer: Arc<dyn Timer>,
        timing: EngineTiming,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                synth,
                live,
                timer,
                timing,
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Preference store the engine reads
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<PreferenceStore> {
        &self.inner.store
    }

    /// Timer used for deferred narration
    #[inline]
    #[must_use]
    pub fn timer(&self) -> &Arc<dyn Timer> {
        &self.inner.timer
    }

    /// Configured delays
    #[inline]
    #[must_use]
    pub fn timing(&self) -> EngineTiming {
        self.inner.timing
    }

    /// Speak `text`, replacing any speech in flight
    ///
    /// Returns whether speech was produced.
    pub fn speak(&self, text: impl Into<String>) -> bool {
        self.speak_with(text, None)
    }

    /// Speak `text` and run `on_end` when it finishes
    ///
    /// `on_end` is dropped without running if the utterance is superseded
    /// or if audio output is disabled.
    pub fn speak_with(&self, text: impl Into<String>, on_end: Option<OnEnd>) -> bool {
        let text = text.into();
        let utterance = self
            .inner
            .store
            .read(|config| config.audio_enabled().then(|| utterance_for(config, &text)));
        let Some(utterance) = utterance else {
            tracing::debug!("speech suppressed, audio output disabled");
            return false;
        };

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.synth.cancel_all();

        let on_end = on_end.map(|callback| {
            let weak = Arc::downgrade(&self.inner);
            Box::new(move || {
                let current = weak
                    .upgrade()
                    .is_some_and(|inner| inner.generation.load(Ordering::SeqCst) == generation);
                if current {
                    callback();
                } else {
                    tracing::trace!(generation, "completion of superseded speech ignored");
                }
            }) as OnEnd
        });

        tracing::trace!(generation, text = %utterance.text, "speaking");
        self.inner.synth.speak(utterance, on_end);
        true
    }

    /// Stop speech in flight; pending completions never fire
    pub fn cancel(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.synth.cancel_all();
    }

    /// "Navigating to {page}"
    pub fn announce_navigation(&self, page: &str) -> bool {
        self.speak(format!("Navigating to {page}"))
    }

    /// Speak an action confirmation verbatim
    pub fn announce_action(&self, action: &str) -> bool {
        self.speak(action)
    }

    /// Describe an element
    pub fn describe_element(&self, narration: &Narration) -> bool {
        self.speak(narration.compose())
    }

    /// Write to the live region, and speak too when audio is enabled
    ///
    /// Returns whether speech was produced; the live region is always
    /// updated.
    pub fn announce_live(&self, text: &str, politeness: Politeness) -> bool {
        tracing::debug!(%politeness, text, "live announcement");
        self.inner.live.announce(text, politeness);
        self.speak(text)
    }

    /// Narrate where an element is and how to reach it
    pub fn provide_spatial_guidance(&self, narration: &Narration) -> bool {
        if !self.spatial_enabled() {
            return false;
        }
        self.speak(narration.compose())
    }

    /// Guide the user to a form field
    pub fn guide_form_field(&self, field: &FieldGuide) -> bool {
        if !self.spatial_enabled() {
            return false;
        }
        let mut narration = Narration::new(format!("{}, {} field", field.label, field.kind));
        if let Some((index, total)) = field.ordinal {
            narration = narration.with_ordinal(index, total);
        }
        if let Some(position) = &field.position {
            narration = narration.with_position(position.clone());
        }
        narration = narration.with_purpose(if field.required {
            "This field is required"
        } else {
            "This field is optional"
        });
        if let Some(hint) = &field.hint {
            narration = narration.with_hint(hint.clone());
        }
        self.speak(narration.compose())
    }

    /// Guide the user to a button
    pub fn guide_to_button(&self, label: &str, position: &str, direction: &str) -> bool {
        if !self.spatial_enabled() {
            return false;
        }
        let narration = Narration::new(format!("{label} button"))
            .with_position(position)
            .with_direction(direction)
            .with_hint("Press Enter to activate it");
        self.speak(narration.compose())
    }

    /// Outline the page's regions
    pub fn announce_page_structure(&self, structure: &PageStructure) -> bool {
        if !self.spatial_enabled() {
            return false;
        }
        let count = count_phrase(structure.regions.len(), "region", "regions");
        let outline = if structure.regions.is_empty() {
            format!("This page has {count}")
        } else {
            format!("This page has {count}: {}", join_list(&structure.regions))
        };
        let title = format!("{} page", structure.title);
        self.speak(sentences([title.as_str(), outline.as_str()]))
    }

    /// Narrate the page the user just arrived on
    pub fn announce_context(&self, context: &PageContext) -> bool {
        let enabled = self
            .inner
            .store
            .read(|c| c.spatial_guidance || c.descriptive_audio);
        if !enabled {
            tracing::debug!("context narration disabled");
            return false;
        }

        let location = format!("You are on the {} page", context.page);
        let counts: Vec<String> = context
            .counts
            .iter()
            .map(|c| count_phrase(c.count, &c.singular, &c.plural))
            .collect();
        let shows = if counts.is_empty() {
            String::new()
        } else {
            format!("It shows {}", join_list(&counts))
        };
        let hint = context.hint.as_deref().unwrap_or_default();
        self.speak(sentences([location.as_str(), shows.as_str(), hint]))
    }

    /// Speak `parts` one after another with the stagger delay between them
    ///
    /// Any other speech abandons the rest of the sequence. Returns whether
    /// the first part was spoken.
    pub fn speak_sequence<I, S>(&self, parts: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parts: VecDeque<String> = parts.into_iter().map(Into::into).collect();
        self.speak_chain(parts)
    }

    /// Speak `text` after `delay`; gating is checked when the delay expires
    pub fn announce_deferred(&self, text: impl Into<String>, delay: Duration) -> TimerHandle {
        let text = text.into();
        let weak = Arc::downgrade(&self.inner);
        self.inner.timer.schedule(
            delay,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    AnnouncementEngine { inner }.speak(text);
                }
            }),
        )
    }

    /// Deliver selection feedback on its channel
    pub fn announce_feedback(&self, feedback: &Feedback) -> bool {
        match feedback.channel {
            Channel::Speech => self.speak(feedback.text.clone()),
            Channel::Live => self.announce_live(&feedback.text, Politeness::Polite),
        }
    }

    fn speak_chain(&self, mut parts: VecDeque<String>) -> bool {
        let Some(first) = parts.pop_front() else {
            return false;
        };
        if parts.is_empty() {
            return self.speak(first);
        }

        let weak = Arc::downgrade(&self.inner);
        self.speak_with(
            first,
            Some(Box::new(move || schedule_next(&weak, parts))),
        )
    }

    fn spatial_enabled(&self) -> bool {
        let enabled = self.inner.store.read(|c| c.spatial_guidance);
        if !enabled {
            tracing::debug!("spatial guidance disabled");
        }
        enabled
    }
}

fn schedule_next(weak: &Weak<Inner>, parts: VecDeque<String>) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let generation = inner.generation.load(Ordering::SeqCst);
    let next = Weak::clone(weak);
    inner.timer.schedule(
        inner.timing.stagger,
        Box::new(move || {
            let Some(inner) = next.upgrade() else {
                return;
            };
            if inner.generation.load(Ordering::SeqCst) != generation {
                tracing::trace!("sequence abandoned");
                return;
            }
            AnnouncementEngine { inner }.speak_chain(parts);
        }),
    );
}

fn utterance_for(config: &Configuration, text: &str) -> Utterance {
    Utterance {
        text: text.to_string(),
        rate: config.speech_rate,
        pitch: config.speech_pitch,
        volume: config.speech_volume,
        locale: config.speech_locale(),
    }
}
