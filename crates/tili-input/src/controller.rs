//! Continuous recognition controller
//!
//! Keeps one recognition session alive while voice navigation is wanted and
//! executes interpreted commands against the page.
//!
//! ```text
//!            start / voiceNavigation on
//!   Idle ───────────────────────────────▶ Listening
//!    ▲  ◀─────────────────────────────────  │   ▲
//!    │   stop / voiceNavigation off /       │   │ restart delay
//!    │   permission denied                  │   │
//!    │                   End / start error ▼   │
//!    └─────────────── stop ───────── Restarting
//! ```
//!
//! A session that fails to start with a recoverable error is retried after
//! the restart delay. A permission denial also blocks preference-driven starts until the user
//! calls [`ContinuousRecognitionController::start`] explicitly.

use crate::command::{Action, Command};
use crate::interpreter::{CommandInterpreter, InterpretContext};
use crate::page::{Navigator, PageSurface};
use crate::recognizer::{RecognitionError, RecognitionEvent, RecognitionOptions, SpeechRecognizer};
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tili_prefs::{Configuration, ListenerId, TiliSettings};
use tili_speech::{AnnouncementEngine, Narration, Politeness, TimerHandle};

/// Recognition lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListeningState {
    /// No session
    Idle,
    /// Session running
    Listening,
    /// Session ended, restart scheduled
    Restarting,
}

impl fmt::Display for ListeningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Listening => "listening",
            Self::Restarting => "restarting",
        })
    }
}

/// Controller tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Delay before restarting an ended session
    pub restart_delay: Duration,
    /// Delay before announcing the page reached by navigation
    pub focus_settle_delay: Duration,
    /// Characters spoken by "read"
    pub read_limit: usize,
    /// Recognition alternatives
    pub max_alternatives: u32,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from(&TiliSettings::default())
    }
}

impl From<&TiliSettings> for ControllerSettings {
    fn from(settings: &TiliSettings) -> Self {
        Self {
            restart_delay: settings.restart_delay(),
            focus_settle_delay: settings.focus_settle_delay(),
            read_limit: settings.read_limit_chars,
            max_alternatives: settings.max_alternatives,
        }
    }
}

/// Session counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecognitionStats {
    /// Sessions started from `Idle`
    pub sessions_started: u64,
    /// Automatic restarts
    pub restarts: u64,
    /// Error events and failed starts
    pub errors: u64,
    /// Final utterances interpreted
    pub commands: u64,
}

const ACTIVATED_CONTINUOUS: &str = "Voice navigation activated. The app is listening continuously. \
Say section names like \"Dashboard\" or \"Projects\" to navigate. Say \"help\" for all commands.";
const ACTIVATED: &str =
    "Voice navigation activated. Say commands like \"go to dashboard\" or \"click\" to interact.";
const DEACTIVATED: &str = "Voice navigation deactivated";
const START_FAILED: &str =
    "Failed to start voice navigation. Please check microphone permissions.";

#[derive(Debug)]
struct ControllerState {
    phase: ListeningState,
    desired: bool,
    auto_blocked: bool,
    last_preference: Option<bool>,
    restart: Option<TimerHandle>,
    stats: RecognitionStats,
}

struct ControllerInner {
    engine: AnnouncementEngine,
    recognizer: Arc<dyn SpeechRecognizer>,
    page: Arc<dyn PageSurface>,
    navigator: Arc<dyn Navigator>,
    settings: ControllerSettings,
    state: Mutex<ControllerState>,
    interpreter: Mutex<CommandInterpreter>,
    subscription: Mutex<Option<ListenerId>>,
}

/// Long-lived voice navigation session
#[derive(Clone)]
pub struct ContinuousRecognitionController {
    inner: Arc<ControllerInner>,
}

impl fmt::Debug for ContinuousRecognitionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContinuousRecognitionController")
            .field("state", &*self.inner.state.lock())
            .field("settings", &self.inner.settings)
            .finish_non_exhaustive()
    }
}

impl ContinuousRecognitionController {
    /// Create an idle controller
    pub fn new(
        engine: AnnouncementEngine,
        recognizer: Arc<dyn SpeechRecognizer>,
        page: Arc<dyn PageSurface>,
        navigator: Arc<dyn Navigator>,
        settings: ControllerSettings,
    ) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                engine,
                recognizer,
                page,
                navigator,
                settings,
                state: Mutex::new(ControllerState {
                    phase: ListeningState::Idle,
                    desired: false,
                    auto_blocked: false,
                    last_preference: None,
                    restart: None,
                    stats: RecognitionStats::default(),
                }),
                interpreter: Mutex::new(CommandInterpreter::new()),
                subscription: Mutex::new(None),
            }),
        }
    }

    /// Follow `voiceNavigation` from the store, starting now if it is on
    pub fn attach(&self) {
        let store = Arc::clone(self.inner.engine.store());
        {
            let mut subscription = self.inner.subscription.lock();
            if subscription.is_some() {
                return;
            }
            let weak = Arc::downgrade(&self.inner);
            let id = store.subscribe(Arc::new(move |config: &Configuration| {
                if let Some(inner) = weak.upgrade() {
                    inner.follow_preference(config.voice_navigation);
                }
            }));
            *subscription = Some(id);
        }
        let enabled = store.read(|c| c.voice_navigation);
        self.inner.follow_preference(enabled);
    }

    /// Stop following the store; returns whether it was attached
    pub fn detach(&self) -> bool {
        let id = self.inner.subscription.lock().take();
        id.is_some_and(|id| self.inner.engine.store().unsubscribe(id))
    }

    /// Start listening at the user's request
    ///
    /// Clears a permission block. No-op unless idle.
    pub fn start(&self) {
        self.inner.state.lock().auto_blocked = false;
        self.inner.begin();
    }

    /// Stop listening; no-op when idle
    pub fn stop(&self) {
        self.inner.stop_listening();
    }

    /// Deliver a recognizer event
    ///
    /// Returns the command interpreted from a final transcript.
    pub fn handle_event(&self, event: RecognitionEvent) -> Option<Command> {
        match event {
            RecognitionEvent::Result {
                transcript,
                is_final,
            } => {
                if !is_final {
                    tracing::trace!(%transcript, "interim transcript");
                    return None;
                }
                if self.state() == ListeningState::Idle {
                    tracing::debug!("transcript ignored while idle");
                    return None;
                }
                Some(self.inner.dispatch(&transcript))
            }
            RecognitionEvent::Error(error) => {
                self.inner.on_error(&error);
                None
            }
            RecognitionEvent::End => {
                self.inner.on_end();
                None
            }
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> ListeningState {
        self.inner.state.lock().phase
    }

    /// Session counters
    #[must_use]
    pub fn stats(&self) -> RecognitionStats {
        self.inner.state.lock().stats
    }

    /// Whether a permission denial is holding back preference-driven starts
    #[must_use]
    pub fn is_auto_start_blocked(&self) -> bool {
        self.inner.state.lock().auto_blocked
    }
}

impl ControllerInner {
    fn follow_preference(self: &Arc<Self>, enabled: bool) {
        let blocked = {
            let mut state = self.state.lock();
            if state.last_preference == Some(enabled) {
                return;
            }
            state.last_preference = Some(enabled);
            state.auto_blocked
        };

        if !enabled {
            self.stop_listening();
        } else if blocked {
            tracing::info!("voice navigation enabled but blocked by permission denial");
        } else {
            self.begin();
        }
    }

    fn options(&self) -> (RecognitionOptions, bool) {
        self.engine.store().read(|config| {
            let options = RecognitionOptions {
                continuous: true,
                interim_results: true,
                locale: config.speech_locale(),
                max_alternatives: self.settings.max_alternatives,
            };
            (options, config.voice_input)
        })
    }

    fn begin(self: &Arc<Self>) {
        {
            let mut state = self.state.lock();
            if state.phase != ListeningState::Idle {
                return;
            }
            state.phase = ListeningState::Listening;
            state.desired = true;
        }

        let (options, continuous_input) = self.options();
        match self.recognizer.start(&options) {
            Ok(()) => {
                self.state.lock().stats.sessions_started += 1;
                tracing::info!(locale = options.locale, "voice navigation listening");
                let message = if continuous_input {
                    ACTIVATED_CONTINUOUS
                } else {
                    ACTIVATED
                };
                self.engine.announce_live(message, Politeness::Polite);
            }
            Err(error) => self.start_failed(&error),
        }
    }

    fn restart(self: &Arc<Self>) {
        {
            let mut state = self.state.lock();
            state.restart = None;
            if state.phase != ListeningState::Restarting || !state.desired {
                return;
            }
            state.phase = ListeningState::Listening;
        }

        let (options, _) = self.options();
        match self.recognizer.start(&options) {
            Ok(()) => {
                let restarts = {
                    let mut state = self.state.lock();
                    state.stats.restarts += 1;
                    state.stats.restarts
                };
                tracing::debug!(restarts, "recognition restarted");
            }
            Err(error) => self.start_failed(&error),
        }
    }

    fn start_failed(self: &Arc<Self>, error: &RecognitionError) {
        if error.is_fatal() {
            {
                let mut state = self.state.lock();
                state.phase = ListeningState::Idle;
                state.desired = false;
                state.auto_blocked = true;
                state.stats.errors += 1;
            }
            tracing::warn!(%error, "failed to start recognition");
            self.engine.announce_live(START_FAILED, Politeness::Assertive);
            return;
        }

        {
            let mut state = self.state.lock();
            state.phase = ListeningState::Restarting;
            state.stats.errors += 1;
        }
        tracing::warn!(%error, "recognition start failed, retrying");
        self.engine.announce_live(&error.announcement(), Politeness::Polite);
        self.schedule_restart();
    }

    fn stop_listening(&self) {
        let (was, restart) = {
            let mut state = self.state.lock();
            let was = state.phase;
            state.phase = ListeningState::Idle;
            state.desired = false;
            (was, state.restart.take())
        };
        if let Some(handle) = restart {
            self.engine.timer().cancel(handle);
        }
        if was == ListeningState::Idle {
            return;
        }
        if was == ListeningState::Listening {
            self.recognizer.stop();
        }
        tracing::info!(from = %was, "voice navigation stopped");
        self.engine.announce_live(DEACTIVATED, Politeness::Polite);
    }

    fn on_error(&self, error: &RecognitionError) {
        let fatal = error.is_fatal();
        let restart = {
            let mut state = self.state.lock();
            state.stats.errors += 1;
            if fatal {
                state.phase = ListeningState::Idle;
                state.desired = false;
                state.auto_blocked = true;
                state.restart.take()
            } else {
                None
            }
        };

        if fatal {
            tracing::error!(%error, "recognition stopped");
            if let Some(handle) = restart {
                self.engine.timer().cancel(handle);
            }
            self.recognizer.stop();
        } else {
            tracing::warn!(%error, "recognition error");
        }

        let politeness = if fatal {
            Politeness::Assertive
        } else {
            Politeness::Polite
        };
        self.engine.announce_live(&error.announcement(), politeness);
    }

    fn on_end(self: &Arc<Self>) {
        let restart = {
            let mut state = self.state.lock();
            match state.phase {
                ListeningState::Listening if state.desired => {
                    state.phase = ListeningState::Restarting;
                    true
                }
                ListeningState::Listening => {
                    state.phase = ListeningState::Idle;
                    false
                }
                // Duplicate end events never stack restarts
                ListeningState::Restarting | ListeningState::Idle => false,
            }
        };
        if restart {
            self.schedule_restart();
        }
    }

    fn schedule_restart(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let handle = self.engine.timer().schedule(
            self.settings.restart_delay,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.restart();
                }
            }),
        );
        self.state.lock().restart = Some(handle);
    }

    fn dispatch(self: &Arc<Self>, transcript: &str) -> Command {
        let context = InterpretContext::new(
            self.page.current_location(),
            self.page.focused().is_some(),
        );
        let command = self.interpreter.lock().interpret(transcript, &context);
        self.state.lock().stats.commands += 1;
        tracing::info!(
            action = %command.action,
            target = ?command.target,
            valid = command.valid,
            "voice command"
        );
        self.execute(&command, &context);
        command
    }

    fn execute(self: &Arc<Self>, command: &Command, context: &InterpretContext) {
        match command.action {
            Action::Navigate => match command.target {
                Some(section) if self.page.element_for(section).is_some() => {
                    self.navigator.navigate(section);
                    self.engine.announce_navigation(section.label());
                    self.schedule_arrival();
                }
                Some(section) => {
                    tracing::warn!(%section, "navigation target unavailable");
                    self.engine.announce_live(
                        &format!(
                            "{} is not available. Please say \"help\" to hear available sections.",
                            section.label()
                        ),
                        Politeness::Polite,
                    );
                }
                None => {}
            },
            Action::Activate => match self.page.focused() {
                Some(element) => {
                    if !self.page.activate(&element) {
                        tracing::debug!(id = %element.id, "focused element ignored activation");
                    }
                }
                None => {
                    self.engine.announce_live(
                        "Nothing is focused. Say \"next\" to move to an element.",
                        Politeness::Polite,
                    );
                }
            },
            Action::Next => self.move_focus(true),
            Action::Previous => self.move_focus(false),
            Action::Read => {
                let text: String = self
                    .page
                    .main_text()
                    .chars()
                    .take(self.settings.read_limit)
                    .collect();
                let text = text.trim();
                if text.is_empty() {
                    self.engine.speak("There is no content to read on this page.");
                } else {
                    self.engine.speak(text);
                }
            }
            Action::AnnounceLocation => {
                let title = self
                    .page
                    .page_title()
                    .unwrap_or_else(|| context.current_location.clone());
                self.engine.speak(format!("You are on the {title} page."));
            }
            Action::Logout => {
                if let Some(message) = &command.message {
                    self.engine.announce_live(message, Politeness::Assertive);
                }
                self.engine.store().reset_for_logout();
                self.navigator.logout();
            }
            Action::Help | Action::LogoutConfirm | Action::Error => {
                if let Some(message) = &command.message {
                    self.engine.announce_live(message, Politeness::Polite);
                }
            }
        }
    }

    fn move_focus(&self, forward: bool) {
        let elements = self.page.focusable();
        let current = self
            .page
            .focused()
            .and_then(|focused| elements.iter().position(|e| e.id == focused.id));

        let target = if forward {
            let next = current.map_or(0, |i| i + 1);
            (next < elements.len()).then_some(next)
        } else {
            current.and_then(|i| i.checked_sub(1))
        };

        match target {
            Some(index) => {
                let element = &elements[index];
                self.page.focus(element);
                self.engine.describe_element(
                    &Narration::new(element.spoken()).with_ordinal(index, elements.len()),
                );
            }
            None => {
                let edge = if forward { "last" } else { "first" };
                self.engine.announce_live(
                    &format!("You are at the {edge} element on this page."),
                    Politeness::Polite,
                );
            }
        }
    }

    fn schedule_arrival(self: &Arc<Self>) {
        let weak: Weak<Self> = Arc::downgrade(self);
        self.engine.timer().schedule(
            self.settings.focus_settle_delay,
            Box::new(move || {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                if inner.state.lock().phase == ListeningState::Idle {
                    return;
                }
                let title = inner.page.page_title().unwrap_or_else(|| "new".to_string());
                inner.engine.speak(format!(
                    "You are now on the {title} page. Say \"help\" to hear available commands."
                ));
            }),
        );
    }
}

impl Drop for ControllerInner {
    fn drop(&mut self) {
        if let Some(id) = self.subscription.get_mut().take() {
            self.engine.store().unsubscribe(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_follow_tili_settings() {
        let settings = TiliSettings::default().with_restart_delay(Duration::from_millis(250));
        let controller = ControllerSettings::from(&settings);

        assert_eq!(controller.restart_delay, Duration::from_millis(250));
        assert_eq!(controller.focus_settle_delay, Duration::from_millis(500));
        assert_eq!(controller.read_limit, 500);
        assert_eq!(controller.max_alternatives, 1);
    }

    #[test]
    fn state_names() {
        assert_eq!(ListeningState::Restarting.to_string(), "restarting");
    }
}
