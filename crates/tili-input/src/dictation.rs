//! Voice dictation for a single form field
//!
//! A transcript is never written straight into the field. It is read back
//! and held as pending until the user confirms it:
//!
//! ```text
//! Idle ──start──▶ Listening ──final transcript──▶ Pending(text)
//!  ▲                  │                              │    │
//!  └──cancel / end────┘        repeat ◀──────────────┘    │ confirm
//!                                                          ▼
//!                                                   Committed(text)
//! ```
//!
//! While pending, the spoken words "confirm", "repeat" and "cancel" act like
//! the corresponding calls.

use crate::recognizer::{RecognitionError, RecognitionEvent, RecognitionOptions, SpeechRecognizer};
use parking_lot::Mutex;
use std::sync::Arc;
use tili_speech::{AnnouncementEngine, Politeness};

/// Dictation progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictationState {
    /// Not listening
    Idle,
    /// Waiting for the user to speak
    Listening,
    /// Transcript heard, awaiting confirmation
    Pending(String),
    /// Transcript accepted
    Committed(String),
}

/// Dictation into one named field
pub struct DictationSession {
    field: String,
    engine: AnnouncementEngine,
    recognizer: Arc<dyn SpeechRecognizer>,
    state: Mutex<DictationState>,
}

impl std::fmt::Debug for DictationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DictationSession")
            .field("field", &self.field)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl DictationSession {
    /// Idle session for `field`
    pub fn new(
        field: impl Into<String>,
        engine: AnnouncementEngine,
        recognizer: Arc<dyn SpeechRecognizer>,
    ) -> Self {
        Self {
            field: field.into(),
            engine,
            recognizer,
            state: Mutex::new(DictationState::Idle),
        }
    }

    /// Field label
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> DictationState {
        self.state.lock().clone()
    }

    /// Start listening; returns whether a session began
    ///
    /// Allowed from `Idle` and `Committed`.
    pub fn start(&self) -> bool {
        {
            let mut state = self.state.lock();
            if !matches!(*state, DictationState::Idle | DictationState::Committed(_)) {
                return false;
            }
            *state = DictationState::Listening;
        }
        self.listen()
    }

    /// Accept the pending transcript
    pub fn confirm(&self) -> Option<String> {
        let text = {
            let mut state = self.state.lock();
            let DictationState::Pending(text) = &*state else {
                return None;
            };
            let text = text.clone();
            *state = DictationState::Committed(text.clone());
            text
        };
        self.recognizer.stop();
        tracing::info!(field = %self.field, "dictation committed");
        self.engine.announce_live(
            &format!("{} set to: {text}", self.field),
            Politeness::Polite,
        );
        Some(text)
    }

    /// Discard the pending transcript and listen again
    pub fn repeat(&self) -> bool {
        {
            let mut state = self.state.lock();
            if !matches!(*state, DictationState::Listening | DictationState::Pending(_)) {
                return false;
            }
            *state = DictationState::Listening;
        }
        self.recognizer.stop();
        self.listen()
    }

    /// Abandon dictation; returns whether anything was in progress
    pub fn cancel(&self) -> bool {
        {
            let mut state = self.state.lock();
            if !matches!(*state, DictationState::Listening | DictationState::Pending(_)) {
                return false;
            }
            *state = DictationState::Idle;
        }
        self.recognizer.stop();
        self.engine
            .announce_live("Input cancelled", Politeness::Polite);
        true
    }

    /// Deliver a recognizer event
    pub fn handle_event(&self, event: RecognitionEvent) {
        match event {
            RecognitionEvent::Result {
                transcript,
                is_final: true,
            } => self.on_transcript(transcript.trim()),
            RecognitionEvent::Result { .. } => {}
            RecognitionEvent::Error(error) => self.on_error(&error),
            RecognitionEvent::End => {
                let mut state = self.state.lock();
                if *state == DictationState::Listening {
                    *state = DictationState::Idle;
                }
            }
        }
    }

    fn on_transcript(&self, transcript: &str) {
        let current = self.state();
        match current {
            DictationState::Listening if !transcript.is_empty() => {
                *self.state.lock() = DictationState::Pending(transcript.to_string());
                tracing::debug!(field = %self.field, "dictation pending confirmation");
                self.engine.announce_live(
                    &format!(
                        "You said: {transcript}. Say \"confirm\" to accept, or \"repeat\" to try again."
                    ),
                    Politeness::Polite,
                );
            }
            DictationState::Pending(_) => {
                let word = transcript
                    .trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase();
                match word.as_str() {
                    "confirm" => {
                        self.confirm();
                    }
                    "repeat" => {
                        self.repeat();
                    }
                    "cancel" => {
                        self.cancel();
                    }
                    _ => tracing::trace!("ignored utterance while confirming"),
                }
            }
            _ => {}
        }
    }

    fn on_error(&self, error: &RecognitionError) {
        tracing::warn!(field = %self.field, %error, "dictation error");
        if error.is_fatal() {
            let mut state = self.state.lock();
            if *state == DictationState::Listening {
                *state = DictationState::Idle;
            }
        }
        self.engine
            .announce_live(&error.announcement(), Politeness::Assertive);
    }

    fn listen(&self) -> bool {
        let options = RecognitionOptions {
            continuous: false,
            locale: self.engine.store().read(|c| c.speech_locale()),
            ..RecognitionOptions::default()
        };
        match self.recognizer.start(&options) {
            Ok(()) => {
                self.engine.announce_live(
                    &format!("Listening for {}. Speak now.", self.field),
                    Politeness::Polite,
                );
                true
            }
            Err(error) => {
                tracing::warn!(field = %self.field, %error, "failed to start dictation");
                *self.state.lock() = DictationState::Idle;
                self.engine.announce_live(
                    "Failed to start voice input. Please try again.",
                    Politeness::Assertive,
                );
                false
            }
        }
    }
}
