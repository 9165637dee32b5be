//! Keyboard shortcuts and focus narration

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tili_input::keyboard::SHORTCUT_HELP;
use tili_input::{Key, KeyEvent, KeyOutcome, KeyboardShortcuts, Navigator, PageSurface, Section};
use tili_prefs::{Flag, Value};
use tili_test_utils::{FakePage, Harness, RecordingNavigator};

struct Fixture {
    harness: Harness,
    page: Arc<FakePage>,
    navigator: Arc<RecordingNavigator>,
    keys: KeyboardShortcuts,
}

fn fixture(needs: &[&str], page: FakePage) -> Fixture {
    let harness = Harness::with_needs(needs);
    let page = Arc::new(page);
    let navigator = Arc::new(RecordingNavigator::new());
    let keys = KeyboardShortcuts::new(
        harness.engine.clone(),
        Arc::clone(&page) as Arc<dyn PageSurface>,
        Arc::clone(&navigator) as Arc<dyn Navigator>,
    )
    .with_tab_delay(Duration::from_millis(100));
    Fixture {
        harness,
        page,
        navigator,
        keys,
    }
}

#[test]
fn alt_letters_navigate_with_shortcuts_enabled() {
    let f = fixture(&["limited-dexterity"], FakePage::new("dashboard"));

    let outcome = f.keys.handle_key(&KeyEvent::alt('p'));

    assert_eq!(outcome, KeyOutcome::Navigated(Section::Projects));
    assert!(outcome.is_handled());
    assert_eq!(f.navigator.navigations(), vec![Section::Projects]);
    assert_eq!(
        f.harness.live.last().as_deref(),
        Some("Navigating to Projects")
    );
}

#[test]
fn alt_letters_need_keyboard_shortcuts() {
    let f = fixture(&[], FakePage::new("dashboard"));

    assert_eq!(f.keys.handle_key(&KeyEvent::alt('m')), KeyOutcome::Ignored);
    assert!(f.navigator.navigations().is_empty());
}

#[test]
fn keys_in_text_inputs_are_ignored() {
    let f = fixture(&["limited-dexterity"], FakePage::new("dashboard"));

    let typed = KeyEvent::alt('d').in_text_input();
    let question = KeyEvent::new(Key::Char('?')).in_text_input();

    assert_eq!(f.keys.handle_key(&typed), KeyOutcome::Ignored);
    assert_eq!(f.keys.handle_key(&question), KeyOutcome::Ignored);
    assert!(f.harness.live.messages().is_empty());
}

#[test]
fn question_mark_shows_help_regardless_of_shift() {
    let f = fixture(&[], FakePage::new("dashboard"));

    let outcome = f.keys.handle_key(&KeyEvent::new(Key::Char('?')).with_shift());

    assert_eq!(outcome, KeyOutcome::HelpShown);
    assert_eq!(f.harness.live.last().as_deref(), Some(SHORTCUT_HELP));
}

#[test]
fn alt_h_shows_help() {
    let f = fixture(&["cant-speak"], FakePage::new("dashboard"));

    assert_eq!(f.keys.handle_key(&KeyEvent::alt('H')), KeyOutcome::HelpShown);
}

#[test]
fn inactive_when_both_keyboard_flags_are_off() {
    let f = fixture(&[], FakePage::new("dashboard").with_dialog_open());
    f.harness
        .store
        .set(Flag::KeyboardNavigation, Value::Bool(false))
        .unwrap();

    assert_eq!(
        f.keys.handle_key(&KeyEvent::new(Key::Char('?'))),
        KeyOutcome::Ignored
    );
    assert_eq!(f.keys.handle_key(&KeyEvent::new(Key::Escape)), KeyOutcome::Ignored);
    assert!(f.page.is_dialog_open());
}

#[test]
fn escape_closes_open_dialog() {
    let f = fixture(&[], FakePage::new("settings").with_dialog_open());

    assert_eq!(
        f.keys.handle_key(&KeyEvent::new(Key::Escape)),
        KeyOutcome::DialogClosed
    );
    assert_eq!(f.harness.live.last().as_deref(), Some("Dialog closed"));
    assert_eq!(f.keys.handle_key(&KeyEvent::new(Key::Escape)), KeyOutcome::Ignored);
}

#[test]
fn tab_describes_new_focus_after_delay() {
    let f = fixture(
        &["cant-see"],
        FakePage::new("dashboard").with_buttons(&["Save", "Cancel"]),
    );

    let outcome = f.keys.handle_key(&KeyEvent::new(Key::Tab));
    assert!(matches!(outcome, KeyOutcome::DescriptionScheduled(_)));
    assert!(!outcome.is_handled());

    // Host moves focus before the delay expires
    f.page.focus_index(1);
    f.harness.advance_ms(100);

    assert_eq!(f.harness.synth.last().as_deref(), Some("Cancel, button"));
}

#[test]
fn tab_without_descriptive_audio_is_silent() {
    let f = fixture(
        &["limited-dexterity"],
        FakePage::new("dashboard").with_buttons(&["Save"]),
    );

    assert_eq!(f.keys.handle_key(&KeyEvent::new(Key::Tab)), KeyOutcome::Ignored);
    assert_eq!(f.harness.timer.pending(), 0);
}

#[test]
fn skip_to_main_focuses_content() {
    let f = fixture(&[], FakePage::new("documents"));

    assert!(f.keys.skip_to_main());
    assert!(f.page.is_main_focused());
    assert_eq!(
        f.harness.live.last().as_deref(),
        Some("Skipped to main content")
    );
}

#[test]
fn enabled_notice_is_deferred() {
    let f = fixture(&["limited-dexterity"], FakePage::new("dashboard"));

    assert!(f.keys.announce_enabled().is_some());
    assert!(f.harness.live.messages().is_empty());

    f.harness.advance(Duration::from_secs(1));
    assert_eq!(
        f.harness.live.last().as_deref(),
        Some("Keyboard shortcuts are enabled. Press Alt + H for help.")
    );
}

#[test]
fn no_enabled_notice_without_shortcuts() {
    let f = fixture(&[], FakePage::new("dashboard"));

    assert!(f.keys.announce_enabled().is_none());
}
