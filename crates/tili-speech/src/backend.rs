//! Output capabilities: speech synthesis and the live region

use std::fmt;

/// Callback run once an utterance finishes playing
pub type OnEnd = Box<dyn FnOnce() + Send>;

/// A single request to the speech synthesizer
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    /// Text to speak
    pub text: String,
    /// Speaking rate, 1.0 is normal
    pub rate: f32,
    /// Voice pitch, 1.0 is normal
    pub pitch: f32,
    /// Volume in `0.0..=1.0`
    pub volume: f32,
    /// BCP 47 locale
    pub locale: &'static str,
}

impl Utterance {
    /// Utterance with neutral tuning
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
            locale: "en-US",
        }
    }
}

/// Speech synthesis backend
///
/// Backends call `on_end` when the utterance finishes. Calling it after a
/// cancel is allowed; the engine ignores completions of superseded speech.
pub trait SpeechSynthesizer: Send + Sync {
    /// Start speaking
    fn speak(&self, utterance: Utterance, on_end: Option<OnEnd>);

    /// Stop everything that is playing or queued
    fn cancel_all(&self);
}

/// Live region urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Politeness {
    /// Read when the user is idle
    #[default]
    Polite,
    /// Interrupts current output
    Assertive,
}

impl fmt::Display for Politeness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Polite => "polite",
            Self::Assertive => "assertive",
        })
    }
}

/// Passive text region read by assistive technology
pub trait LiveRegion: Send + Sync {
    /// Replace the region's text
    fn announce(&self, text: &str, politeness: Politeness);
}

/// Synthesizer with no audio device
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSynthesizer;

impl SpeechSynthesizer for NullSynthesizer {
    fn speak(&self, utterance: Utterance, on_end: Option<OnEnd>) {
        tracing::trace!(text = %utterance.text, "speech discarded");
        if let Some(on_end) = on_end {
            on_end();
        }
    }

    fn cancel_all(&self) {}
}

/// Live region that discards every update
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLiveRegion;

impl LiveRegion for NullLiveRegion {
    fn announce(&self, _text: &str, _politeness: Politeness) {}
}
