//! Needs resolution
//!
//! Maps a selection of need ids to a complete [`Configuration`]:
//! 1. Start from the reset baseline (every derived flag at its default)
//! 2. Fold each selected need's `enables` then `sets`, in catalog order
//! 3. Apply pairwise [`CombinationRule`]s, in table order
//!
//! Catalog order makes the result independent of selection order. When
//! three or more needs overlap, later rules win.

use crate::catalog::{AccessibilityNeed, CombinationRule, COMBINATION_RULES, NEEDS};
use crate::config::{Configuration, Flag, NeedId, Value};
use indexmap::IndexSet;

/// Pure resolver over a needs table and a rules table
#[derive(Debug, Clone, Copy)]
pub struct NeedsResolver {
    needs: &'static [AccessibilityNeed],
    rules: &'static [CombinationRule],
}

impl Default for NeedsResolver {
    fn default() -> Self {
        Self::new(NEEDS, COMBINATION_RULES)
    }
}

impl NeedsResolver {
    /// Create resolver over custom tables
    #[inline]
    #[must_use]
    pub fn new(needs: &'static [AccessibilityNeed], rules: &'static [CombinationRule]) -> Self {
        Self { needs, rules }
    }

    /// The reset baseline for `current`
    ///
    /// Derived flags take their defaults; caller-owned fields
    /// (`language`, `hasConfigured`, `showWelcome`) are kept.
    #[must_use]
    pub fn baseline(current: &Configuration) -> Configuration {
        let mut base = Configuration::default();
        base.carry_caller_fields(current);
        base
    }

    /// Resolve `selected` against `current`
    ///
    /// Unknown ids are dropped (and logged); duplicates collapse to their
    /// first occurrence. An empty selection yields the baseline.
    #[must_use]
    pub fn resolve<I, S>(&self, selected: I, current: &Configuration) -> Configuration
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut chosen: IndexSet<NeedId> = IndexSet::new();
        for id in selected {
            let id = id.as_ref().trim();
            if self.needs.iter().any(|need| need.id == id) {
                chosen.insert(NeedId::from(id));
            } else {
                tracing::warn!(need = id, "ignoring unknown accessibility need");
            }
        }

        let mut config = Self::baseline(current);

        for need in self.needs {
            if chosen.iter().any(|id| id.as_str() == need.id) {
                apply_need(&mut config, need);
            }
        }

        let ids = chosen.iter().map(NeedId::as_str);
        for rule in self.rules {
            if rule.applies(ids.clone()) {
                tracing::debug!(a = rule.needs.0, b = rule.needs.1, "combination rule applied");
                apply_effects(&mut config, rule.effects);
            }
        }

        config.accessibility_needs = chosen;
        config
    }
}

/// Resolve with the built-in catalog
#[inline]
#[must_use]
pub fn resolve<I, S>(selected: I, current: &Configuration) -> Configuration
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    NeedsResolver::default().resolve(selected, current)
}

fn apply_need(config: &mut Configuration, need: &AccessibilityNeed) {
    for &flag in need.enables {
        set_checked(config, flag, Value::Bool(true));
    }
    apply_effects(config, need.sets);
}

fn apply_effects(config: &mut Configuration, effects: &[(Flag, Value)]) {
    for (flag, value) in effects {
        set_checked(config, *flag, value.clone());
    }
}

fn set_checked(config: &mut Configuration, flag: Flag, value: Value) {
    // Catalog tables are checked by unit tests; a bad entry is skipped, not fatal.
    if let Err(e) = config.set(flag, value) {
        tracing::error!(%flag, error = %e, "invalid catalog effect");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FontSize;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_selection_is_baseline() {
        let current = Configuration::default();
        let empty: [&str; 0] = [];
        assert_eq!(resolve(empty, &current), NeedsResolver::baseline(&current));
    }

    #[test]
    fn cant_see_scenario() {
        let config = resolve(["cant-see"], &Configuration::default());
        assert!(config.voice_navigation);
        assert!(config.descriptive_audio);
        assert!(config.keyboard_navigation);
        assert_eq!(config.font_size, FontSize::Large);
        assert!(!config.has_configured);
    }

    #[test]
    fn removing_need_clears_its_flags() {
        let first = resolve(["cant-use-hands"], &Configuration::default());
        assert!(first.voice_navigation);

        let second = resolve(["cant-hear"], &first);
        assert!(!second.voice_navigation);
        assert!(!second.voice_input);
        assert!(!second.auto_save);
    }

    #[test]
    fn selection_order_does_not_matter() {
        let a = resolve(["cant-hear", "cant-see"], &Configuration::default());
        let b = resolve(["cant-see", "cant-hear"], &Configuration::default());
        assert!(a.haptic_feedback && a.voice_input);
        assert!(b.haptic_feedback && b.voice_input);

        // Only the stored selection order differs
        let mut b_reordered = b.clone();
        b_reordered.accessibility_needs = a.accessibility_needs.clone();
        assert_eq!(a, b_reordered);
    }

    #[test]
    fn hearing_and_hands_rule_silences_audio() {
        let config = resolve(["cant-use-hands", "cant-hear"], &Configuration::default());
        assert!(config.voice_input);
        assert!(config.visual_confirmations);
        assert!(!config.audio_feedback);
        assert!(config.spatial_guidance);
    }

    #[test]
    fn blind_and_mute_rule_enables_keyboard() {
        let config = resolve(["cant-speak", "cant-see"], &Configuration::default());
        assert!(config.keyboard_shortcuts);
        assert!(config.descriptive_audio);
        assert!(config.spatial_guidance);
        assert!(!config.voice_navigation);
    }

    #[test]
    fn triple_overlap_is_deterministic() {
        let needs = ["cant-hear", "cant-see", "cant-use-hands"];
        let config = resolve(needs, &Configuration::default());
        // Second rule runs after the first and turns audio feedback off.
        assert!(!config.audio_feedback);
        assert!(config.haptic_feedback);
        assert!(config.voice_input);
        assert_eq!(config, resolve(needs, &config));
    }

    #[test]
    fn unknown_and_duplicate_ids_are_normalised() {
        let config = resolve(
            ["cant-see", "cant-fly", "cant-see"],
            &Configuration::default(),
        );
        let ids: Vec<&str> = config.accessibility_needs.iter().map(NeedId::as_str).collect();
        assert_eq!(ids, vec!["cant-see"]);
    }

    #[test]
    fn caller_fields_survive_resolution() {
        let mut current = Configuration::default();
        current.language = "fr".to_string();
        current.has_configured = true;
        current.show_welcome = false;

        let config = resolve(["low-vision"], &current);
        assert_eq!(config.language, "fr");
        assert!(config.has_configured);
        assert!(!config.show_welcome);
    }
}
