//! Continuous recognition controller against fake recognizer and page

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tili_input::{
    Action, ContinuousRecognitionController, ControllerSettings, ListeningState, Navigator,
    PageSurface, RecognitionError, RecognitionEvent, Section, SpeechRecognizer,
};
use tili_prefs::{Flag, Value};
use tili_test_utils::{FakePage, FakeRecognizer, Harness, RecordingNavigator};

struct Fixture {
    harness: Harness,
    recognizer: Arc<FakeRecognizer>,
    page: Arc<FakePage>,
    navigator: Arc<RecordingNavigator>,
    controller: ContinuousRecognitionController,
}

impl Fixture {
    fn new(needs: &[&str], page: FakePage) -> Self {
        Self::with_settings(needs, page, ControllerSettings::default())
    }

    fn with_settings(needs: &[&str], page: FakePage, settings: ControllerSettings) -> Self {
        let harness = Harness::with_needs(needs);
        let recognizer = Arc::new(FakeRecognizer::new());
        let page = Arc::new(page);
        let navigator = Arc::new(RecordingNavigator::new());
        let controller = ContinuousRecognitionController::new(
            harness.engine.clone(),
            Arc::clone(&recognizer) as Arc<dyn SpeechRecognizer>,
            Arc::clone(&page) as Arc<dyn PageSurface>,
            Arc::clone(&navigator) as Arc<dyn Navigator>,
            settings,
        );
        Self {
            harness,
            recognizer,
            page,
            navigator,
            controller,
        }
    }

    /// Attached controller for a blind user on the dashboard
    fn listening() -> Self {
        let fixture = Self::new(
            &["cant-see"],
            FakePage::new("dashboard")
                .with_title("Dashboard")
                .with_buttons(&["Save", "Cancel"]),
        );
        fixture.controller.attach();
        fixture
    }

    fn say(&self, utterance: &str) -> Option<tili_input::Command> {
        self.controller
            .handle_event(RecognitionEvent::final_result(utterance))
    }

    /// Platform ends the session, as it does after silence
    fn end(&self) {
        self.recognizer.end_session();
        self.controller.handle_event(RecognitionEvent::End);
    }

    fn set_voice_navigation(&self, on: bool) {
        self.harness
            .store
            .set(Flag::VoiceNavigation, Value::Bool(on))
            .unwrap();
    }
}

#[test]
fn attach_starts_when_voice_navigation_is_on() {
    let fixture = Fixture::listening();

    assert_eq!(fixture.controller.state(), ListeningState::Listening);
    assert_eq!(fixture.recognizer.starts(), 1);
    assert!(fixture
        .harness
        .live
        .contains("Voice navigation activated. Say commands like"));

    let options = fixture.recognizer.last_options().unwrap();
    assert!(options.continuous);
    assert_eq!(options.locale, "en-US");
}

#[test]
fn continuous_voice_input_changes_activation_message() {
    let fixture = Fixture::new(&["cant-use-hands"], FakePage::new("dashboard"));
    fixture.controller.attach();

    assert!(fixture.harness.live.contains("listening continuously"));
}

#[test]
fn attach_stays_idle_by_default() {
    let fixture = Fixture::new(&[], FakePage::new("dashboard"));
    fixture.controller.attach();

    assert_eq!(fixture.controller.state(), ListeningState::Idle);
    assert_eq!(fixture.recognizer.starts(), 0);
}

#[test]
fn follows_the_preference() {
    let fixture = Fixture::new(&[], FakePage::new("dashboard"));
    fixture.controller.attach();

    fixture.set_voice_navigation(true);
    assert_eq!(fixture.controller.state(), ListeningState::Listening);

    fixture.set_voice_navigation(false);
    assert_eq!(fixture.controller.state(), ListeningState::Idle);
    assert_eq!(fixture.recognizer.stops(), 1);
    assert_eq!(
        fixture.harness.live.last().as_deref(),
        Some("Voice navigation deactivated")
    );
}

#[test]
fn unrelated_store_writes_do_not_restart_a_stopped_session() {
    let fixture = Fixture::listening();

    fixture.controller.stop();
    fixture
        .harness
        .store
        .set(Flag::HapticFeedback, Value::Bool(true))
        .unwrap();

    assert_eq!(fixture.controller.state(), ListeningState::Idle);
    assert_eq!(fixture.recognizer.starts(), 1);
}

#[test]
fn start_and_stop_are_idempotent() {
    let fixture = Fixture::listening();

    fixture.controller.start();
    assert_eq!(fixture.recognizer.starts(), 1);

    fixture.controller.stop();
    fixture.controller.stop();
    assert_eq!(fixture.recognizer.stops(), 1);
    assert_eq!(fixture.controller.state(), ListeningState::Idle);
}

#[test]
fn ended_session_restarts_after_delay() {
    let fixture = Fixture::listening();

    for round in 1..=5 {
        fixture.end();
        assert_eq!(fixture.controller.state(), ListeningState::Restarting);
        fixture.harness.advance_ms(99);
        assert_eq!(fixture.controller.state(), ListeningState::Restarting);
        fixture.harness.advance_ms(1);
        assert_eq!(fixture.controller.state(), ListeningState::Listening);
        assert_eq!(fixture.controller.stats().restarts, round);
    }

    assert_eq!(fixture.recognizer.starts(), 6);
    assert_eq!(fixture.recognizer.max_live_sessions(), 1);
}

#[test]
fn duplicate_end_events_schedule_one_restart() {
    let fixture = Fixture::listening();

    fixture.end();
    fixture.controller.handle_event(RecognitionEvent::End);
    fixture.controller.handle_event(RecognitionEvent::End);

    assert_eq!(fixture.harness.timer.pending(), 1);
    fixture.harness.advance_ms(100);
    assert_eq!(fixture.recognizer.starts(), 2);
}

#[test]
fn disabling_mid_restart_cancels_the_restart() {
    let fixture = Fixture::listening();

    fixture.end();
    fixture.set_voice_navigation(false);
    fixture.harness.advance(Duration::from_secs(1));

    assert_eq!(fixture.controller.state(), ListeningState::Idle);
    assert_eq!(fixture.recognizer.starts(), 1);
    assert_eq!(fixture.harness.timer.pending(), 0);
}

#[test]
fn permission_denial_blocks_auto_start() {
    let fixture = Fixture::new(&["cant-see"], FakePage::new("dashboard"));
    fixture.recognizer.deny_permission();
    fixture.controller.attach();

    assert_eq!(fixture.controller.state(), ListeningState::Idle);
    assert!(fixture.controller.is_auto_start_blocked());
    assert!(fixture
        .harness
        .live
        .contains("Failed to start voice navigation. Please check microphone permissions."));

    fixture.recognizer.allow();
    fixture.set_voice_navigation(false);
    fixture.set_voice_navigation(true);
    assert_eq!(fixture.controller.state(), ListeningState::Idle);

    fixture.controller.start();
    assert_eq!(fixture.controller.state(), ListeningState::Listening);
    assert!(!fixture.controller.is_auto_start_blocked());
}

#[test]
fn fatal_error_event_stops_listening() {
    let fixture = Fixture::listening();

    fixture
        .controller
        .handle_event(RecognitionEvent::Error(RecognitionError::NotAllowed));
    fixture.controller.handle_event(RecognitionEvent::End);

    assert_eq!(fixture.controller.state(), ListeningState::Idle);
    assert_eq!(fixture.harness.timer.pending(), 0);
    assert!(!fixture.recognizer.is_active());
    assert!(fixture
        .harness
        .live
        .contains("Microphone access denied. Please enable microphone permissions."));
}

#[test]
fn recoverable_error_keeps_the_loop_alive() {
    let fixture = Fixture::listening();

    fixture
        .controller
        .handle_event(RecognitionEvent::Error(RecognitionError::NoSpeech));
    assert_eq!(
        fixture.harness.live.last().as_deref(),
        Some("No speech detected. Please try again.")
    );
    assert_eq!(fixture.controller.state(), ListeningState::Listening);

    fixture.end();
    fixture.harness.advance_ms(100);
    assert_eq!(fixture.controller.state(), ListeningState::Listening);
    assert_eq!(fixture.controller.stats().errors, 1);
}

#[test]
fn failed_restart_retries_until_the_recognizer_recovers() {
    let fixture = Fixture::listening();

    fixture.end();
    fixture.recognizer.fail_with(RecognitionError::Network);
    fixture.harness.advance_ms(100);

    assert_eq!(fixture.controller.state(), ListeningState::Restarting);
    assert!(!fixture.controller.is_auto_start_blocked());
    assert!(fixture
        .harness
        .live
        .contains("Voice recognition problem: network error"));
    assert_eq!(fixture.harness.timer.pending(), 1);

    fixture.harness.advance_ms(100);
    assert_eq!(fixture.controller.state(), ListeningState::Restarting);

    fixture.recognizer.allow();
    fixture.harness.advance_ms(100);
    assert_eq!(fixture.controller.state(), ListeningState::Listening);
    assert!(fixture.recognizer.is_active());
    assert_eq!(fixture.recognizer.starts(), 2);
    assert_eq!(fixture.controller.stats().errors, 2);
}

#[test]
fn failed_restart_with_denied_permission_goes_idle() {
    let fixture = Fixture::listening();

    fixture.end();
    fixture.recognizer.deny_permission();
    fixture.harness.advance_ms(100);

    assert_eq!(fixture.controller.state(), ListeningState::Idle);
    assert!(fixture.controller.is_auto_start_blocked());
    assert_eq!(fixture.harness.timer.pending(), 0);
}

#[test]
fn stop_cancels_a_pending_retry() {
    let fixture = Fixture::listening();

    fixture.end();
    fixture.recognizer.fail_with(RecognitionError::AudioCapture);
    fixture.harness.advance_ms(100);
    fixture.controller.stop();
    fixture.recognizer.allow();
    fixture.harness.advance_ms(1_000);

    assert_eq!(fixture.controller.state(), ListeningState::Idle);
    assert_eq!(fixture.recognizer.starts(), 1);
}

#[test]
fn navigation_announces_and_defers_arrival() {
    let fixture = Fixture::listening();

    let command = fixture.say("go to projects").unwrap();

    assert_eq!(command.target, Some(Section::Projects));
    assert_eq!(fixture.navigator.navigations(), vec![Section::Projects]);
    assert_eq!(
        fixture.harness.synth.last().as_deref(),
        Some("Navigating to Projects")
    );

    fixture.harness.advance_ms(500);
    assert_eq!(
        fixture.harness.synth.last().as_deref(),
        Some("You are now on the Dashboard page. Say \"help\" to hear available commands.")
    );
}

#[test]
fn arrival_is_skipped_once_stopped() {
    let fixture = Fixture::listening();

    fixture.say("documents");
    fixture.controller.stop();
    fixture.harness.advance_ms(500);

    assert_eq!(
        fixture.harness.synth.last().as_deref(),
        Some("Voice navigation deactivated")
    );
}

#[test]
fn unavailable_target_is_not_navigated() {
    let fixture = Fixture::listening();
    fixture.page.remove_section(Section::Meetings);

    fixture.say("meetings");

    assert!(fixture.navigator.navigations().is_empty());
    assert_eq!(
        fixture.harness.live.last().as_deref(),
        Some("Meetings is not available. Please say \"help\" to hear available sections.")
    );
}

#[test]
fn navigation_phrase_takes_precedence() {
    let fixture = Fixture::listening();

    let command = fixture.say("can you help me go to dashboard").unwrap();
    assert_eq!(command.action, Action::Navigate);
    assert_eq!(command.target, Some(Section::Dashboard));

    let command = fixture.say("open the help commands").unwrap();
    assert_eq!(command.action, Action::Error);
    assert!(!command.valid);
    assert!(fixture.harness.live.contains("Valid sections are dashboard"));
}

#[test]
fn logout_needs_confirmation() {
    let fixture = Fixture::listening();
    fixture.harness.store.set_has_configured(true);

    let first = fixture.say("Logout!").unwrap();
    assert_eq!(first.action, Action::LogoutConfirm);
    assert_eq!(fixture.navigator.logouts(), 0);
    assert!(fixture.harness.live.contains("Are you sure you want to log out?"));

    let second = fixture.say("confirm logout").unwrap();
    assert_eq!(second.action, Action::Logout);
    assert_eq!(fixture.navigator.logouts(), 1);
    assert!(!fixture.harness.store.get().has_configured);
}

#[test]
fn intervening_utterance_cancels_logout() {
    let fixture = Fixture::listening();

    fixture.say("sign out");
    fixture.say("next");
    let third = fixture.say("confirm logout").unwrap();

    assert_eq!(third.action, Action::LogoutConfirm);
    assert_eq!(fixture.navigator.logouts(), 0);
}

#[test]
fn next_and_previous_walk_focus_with_boundaries() {
    let fixture = Fixture::listening();

    fixture.say("next");
    assert_eq!(fixture.page.focused_index(), Some(0));
    assert_eq!(
        fixture.harness.synth.last().as_deref(),
        Some("Save, button. First of 2.")
    );

    fixture.say("next");
    assert_eq!(
        fixture.harness.synth.last().as_deref(),
        Some("Cancel, button. Last of 2.")
    );

    fixture.say("forward");
    assert_eq!(fixture.page.focused_index(), Some(1));
    assert_eq!(
        fixture.harness.live.last().as_deref(),
        Some("You are at the last element on this page.")
    );

    fixture.say("previous");
    fixture.say("back");
    assert_eq!(fixture.page.focused_index(), Some(0));
    assert_eq!(
        fixture.harness.live.last().as_deref(),
        Some("You are at the first element on this page.")
    );
}

#[test]
fn click_activates_focused_element() {
    let fixture = Fixture::listening();
    fixture.page.focus_index(1);

    fixture.say("click");

    assert_eq!(fixture.page.activated(), vec!["cancel"]);
}

#[test]
fn click_without_focus_is_corrected() {
    let fixture = Fixture::listening();

    let command = fixture.say("press").unwrap();

    assert_eq!(command.action, Action::Error);
    assert!(fixture.page.activated().is_empty());
    assert!(fixture.harness.live.contains("Nothing is focused"));
}

#[test]
fn read_is_truncated() {
    let settings = ControllerSettings {
        read_limit: 10,
        ..ControllerSettings::default()
    };
    let fixture = Fixture::with_settings(
        &["cant-see"],
        FakePage::new("documents").with_main_text("Quarterly report for the board"),
        settings,
    );
    fixture.controller.attach();

    fixture.say("read");

    assert_eq!(fixture.harness.synth.last().as_deref(), Some("Quarterly"));
}

#[test]
fn read_on_empty_page() {
    let fixture = Fixture::listening();

    fixture.say("describe");

    assert_eq!(
        fixture.harness.synth.last().as_deref(),
        Some("There is no content to read on this page.")
    );
}

#[test]
fn location_prefers_page_title() {
    let fixture = Fixture::listening();
    assert_eq!(fixture.page.current_location(), "dashboard");

    fixture.say("where am I?");

    assert_eq!(
        fixture.harness.synth.last().as_deref(),
        Some("You are on the Dashboard page.")
    );
}

#[test]
fn transcripts_are_ignored_while_idle() {
    let fixture = Fixture::new(&["cant-see"], FakePage::new("dashboard"));

    assert!(fixture.say("go to projects").is_none());
    assert!(fixture
        .controller
        .handle_event(RecognitionEvent::interim("go to"))
        .is_none());
    assert!(fixture.navigator.navigations().is_empty());
}

#[test]
fn detach_stops_following_the_store() {
    let fixture = Fixture::listening();

    assert!(fixture.controller.detach());
    assert!(!fixture.controller.detach());
    fixture.set_voice_navigation(false);

    assert_eq!(fixture.controller.state(), ListeningState::Listening);
}

#[test]
fn stats_count_commands() {
    let fixture = Fixture::listening();

    fixture.say("help");
    fixture.say("banana");

    let stats = fixture.controller.stats();
    assert_eq!(stats.sessions_started, 1);
    assert_eq!(stats.commands, 2);
}

#[derive(Debug, Clone)]
enum Op {
    End,
    Advance(u64),
    Enable,
    Disable,
    Start,
    Stop,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::End),
        3 => (0u64..300).prop_map(Op::Advance),
        1 => Just(Op::Enable),
        1 => Just(Op::Disable),
        1 => Just(Op::Start),
        1 => Just(Op::Stop),
    ]
}

proptest! {
    #[test]
    fn prop_at_most_one_live_session(ops in proptest::collection::vec(op(), 1..40)) {
        let fixture = Fixture::listening();

        for op in ops {
            match op {
                Op::End => fixture.end(),
                Op::Advance(ms) => {
                    fixture.harness.advance_ms(ms);
                }
                Op::Enable => fixture.set_voice_navigation(true),
                Op::Disable => fixture.set_voice_navigation(false),
                Op::Start => fixture.controller.start(),
                Op::Stop => fixture.controller.stop(),
            }

            prop_assert!(fixture.recognizer.max_live_sessions() <= 1);
            prop_assert!(fixture.harness.timer.pending() <= 1);
            prop_assert_eq!(
                fixture.controller.state() == ListeningState::Listening,
                fixture.recognizer.is_active()
            );
        }
    }
}
