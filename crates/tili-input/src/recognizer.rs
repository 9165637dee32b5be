//! Speech recognition capability

/// Recognition session parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOptions {
    /// Keep listening across utterances
    pub continuous: bool,
    /// Deliver partial transcripts
    pub interim_results: bool,
    /// BCP 47 locale
    pub locale: &'static str,
    /// Alternatives per result
    pub max_alternatives: u32,
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self {
            continuous: true,
            interim_results: true,
            locale: "en-US",
            max_alternatives: 1,
        }
    }
}

/// Recognition failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecognitionError {
    /// Session heard nothing
    #[error("no speech detected")]
    NoSpeech,

    /// Microphone permission refused
    #[error("microphone access denied")]
    NotAllowed,

    /// Session aborted by the platform
    #[error("recognition aborted")]
    Aborted,

    /// No working microphone
    #[error("audio capture failed")]
    AudioCapture,

    /// Recognition service unreachable
    #[error("network error")]
    Network,

    /// `start` called on a running session
    #[error("recognition already started")]
    AlreadyStarted,

    /// Platform has no recognizer
    #[error("speech recognition unsupported")]
    Unsupported,

    /// Anything else, with the platform's code
    #[error("recognition error: {0}")]
    Other(String),
}

impl RecognitionError {
    /// Map a platform error code ("no-speech", "not-allowed", ...)
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "no-speech" => Self::NoSpeech,
            "not-allowed" | "service-not-allowed" => Self::NotAllowed,
            "aborted" => Self::Aborted,
            "audio-capture" => Self::AudioCapture,
            "network" => Self::Network,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether listening must stop until the user starts it again
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::NotAllowed | Self::Unsupported)
    }

    /// Live-region text for this error
    #[must_use]
    pub fn announcement(&self) -> String {
        match self {
            Self::NoSpeech => "No speech detected. Please try again.".to_string(),
            Self::NotAllowed => {
                "Microphone access denied. Please enable microphone permissions.".to_string()
            }
            Self::Unsupported => "Voice recognition is not supported on this device.".to_string(),
            other => format!("Voice recognition problem: {other}. Listening continues."),
        }
    }
}

/// Event pushed back by a recognizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// Transcript, partial or final
    Result {
        /// Best alternative
        transcript: String,
        /// Whether the utterance is complete
        is_final: bool,
    },
    /// Session error
    Error(RecognitionError),
    /// Session ended
    End,
}

impl RecognitionEvent {
    /// Final transcript event
    #[must_use]
    pub fn final_result(transcript: impl Into<String>) -> Self {
        Self::Result {
            transcript: transcript.into(),
            is_final: true,
        }
    }

    /// Partial transcript event
    #[must_use]
    pub fn interim(transcript: impl Into<String>) -> Self {
        Self::Result {
            transcript: transcript.into(),
            is_final: false,
        }
    }
}

/// Speech recognition backend
///
/// Events are delivered by the host to the owning controller's
/// `handle_event`.
pub trait SpeechRecognizer: Send + Sync {
    /// Begin a session
    ///
    /// # Errors
    /// The platform refused to start; `NotAllowed` is fatal.
    fn start(&self, options: &RecognitionOptions) -> Result<(), RecognitionError>;

    /// End the current session, if any
    fn stop(&self);
}
