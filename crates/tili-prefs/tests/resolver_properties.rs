use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tili_prefs::{resolve, Configuration, FontSize, NeedId, NEEDS};

fn need_ids() -> Vec<&'static str> {
    NEEDS.iter().map(|n| n.id).collect()
}

fn selection() -> impl Strategy<Value = Vec<&'static str>> {
    proptest::sample::subsequence(need_ids(), 0..=NEEDS.len()).prop_shuffle()
}

fn without_order(mut config: Configuration) -> Configuration {
    config.accessibility_needs.sort();
    config
}

#[test]
fn test_defaults_before_setup() {
    let config = Configuration::default();
    assert!(!config.has_configured);
    assert!(config.accessibility_needs.is_empty());
}

#[test]
fn test_cant_see_yields_screenless_profile() {
    let config = resolve(["cant-see"], &Configuration::default());
    assert!(config.voice_navigation);
    assert!(config.descriptive_audio);
    assert!(config.keyboard_navigation);
    assert_eq!(config.font_size, FontSize::Large);
}

#[test]
fn test_hands_then_hearing_drops_voice_control() {
    let hands = resolve(["cant-use-hands"], &Configuration::default());
    let hearing = resolve(["cant-hear"], &hands);

    assert!(!hearing.voice_navigation);
    assert!(!hearing.voice_input);
    assert!(!hearing.auto_save);
    assert!(hearing.visual_confirmations);
    assert_eq!(
        hearing.accessibility_needs.iter().collect::<Vec<_>>(),
        vec![&NeedId::from("cant-hear")]
    );
}

#[test]
fn test_deaf_blind_pair_in_either_order() {
    for order in [["cant-hear", "cant-see"], ["cant-see", "cant-hear"]] {
        let config = resolve(order, &Configuration::default());
        assert!(config.haptic_feedback, "{order:?}");
        assert!(config.voice_input, "{order:?}");
    }
}

proptest! {
    #[test]
    fn prop_resolve_is_idempotent(needs in selection()) {
        let once = resolve(&needs, &Configuration::default());
        let twice = resolve(&needs, &once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_previous_selection_leaves_no_trace(
        first in selection(),
        second in selection(),
    ) {
        let fresh = resolve(&second, &Configuration::default());
        let after = resolve(&second, &resolve(&first, &Configuration::default()));
        prop_assert_eq!(fresh, after);
    }

    #[test]
    fn prop_selection_order_is_irrelevant(needs in selection()) {
        let mut reversed = needs.clone();
        reversed.reverse();

        let a = without_order(resolve(&needs, &Configuration::default()));
        let b = without_order(resolve(&reversed, &Configuration::default()));
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_caller_fields_are_preserved(
        needs in selection(),
        configured in any::<bool>(),
        welcome in any::<bool>(),
        language in prop_oneof![Just("en"), Just("fr"), Just("fr-CA")],
    ) {
        let mut current = Configuration::default();
        current.has_configured = configured;
        current.show_welcome = welcome;
        current.language = language.to_string();

        let config = resolve(&needs, &current);
        prop_assert_eq!(config.has_configured, configured);
        prop_assert_eq!(config.show_welcome, welcome);
        prop_assert_eq!(config.language.as_str(), language);
    }

    #[test]
    fn prop_selection_is_recorded_without_duplicates(needs in selection()) {
        let mut doubled = needs.clone();
        doubled.extend(needs.iter().copied());

        let config = resolve(&doubled, &Configuration::default());
        let recorded: Vec<&str> = config.accessibility_needs.iter().map(NeedId::as_str).collect();
        prop_assert_eq!(recorded, needs);
    }
}
