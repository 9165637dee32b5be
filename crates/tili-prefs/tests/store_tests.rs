use parking_lot::Mutex;
use std::sync::Arc;
use tili_prefs::{
    Configuration, Contrast, FileStorage, Flag, FontSize, NullDocumentRoot, PreferenceStorage,
    PreferenceStore, Value, DEFAULT_STORAGE_KEY,
};

fn file_store(dir: &std::path::Path) -> PreferenceStore {
    PreferenceStore::open(
        Arc::new(FileStorage::new(dir)),
        Arc::new(NullDocumentRoot),
        DEFAULT_STORAGE_KEY,
    )
}

#[test]
fn test_configuration_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = file_store(dir.path());
        store.complete_setup(["low-vision", "limited-dexterity"]).unwrap();
    }

    let reopened = file_store(dir.path()).get();
    assert!(reopened.has_configured);
    assert_eq!(reopened.font_size, FontSize::XLarge);
    assert_eq!(reopened.contrast, Contrast::High);
    assert!(reopened.keyboard_shortcuts);
    assert_eq!(reopened.accessibility_needs.len(), 2);
}

#[test]
fn test_partial_record_on_disk_takes_defaults() {
    let dir = tempfile::tempdir().unwrap();
    FileStorage::new(dir.path())
        .save(DEFAULT_STORAGE_KEY, r#"{"hasConfigured":true,"language":"fr"}"#)
        .unwrap();

    let config = file_store(dir.path()).get();
    assert!(config.has_configured);
    assert_eq!(config.speech_locale(), "fr-FR");
    assert!(config.keyboard_navigation);
}

#[test]
fn test_listeners_see_each_committed_state() {
    let store = PreferenceStore::in_memory();
    let seen: Arc<Mutex<Vec<Configuration>>> = Arc::default();
    let sink = Arc::clone(&seen);
    store.subscribe(Arc::new(move |config| sink.lock().push(config.clone())));

    store.apply_accessibility_needs(["cant-use-hands"]);
    store.set(Flag::SpeechRate, Value::Number(1.5)).unwrap();
    store.apply_accessibility_needs(["cant-hear"]);

    let seen = seen.lock();
    assert_eq!(seen.len(), 3);
    assert!(seen[0].voice_navigation);
    assert!((seen[1].speech_rate - 1.5).abs() < f32::EPSILON);
    assert!(!seen[2].voice_navigation);
    // Resolution resets speech tuning along with every other derived field
    assert!((seen[2].speech_rate - 1.0).abs() < f32::EPSILON);
}

#[test]
fn test_listener_can_write_back() {
    let store = Arc::new(PreferenceStore::in_memory());
    let weak = Arc::downgrade(&store);
    store.subscribe(Arc::new(move |config| {
        if config.voice_input && !config.audio_feedback && !config.haptic_feedback {
            if let Some(store) = weak.upgrade() {
                let _ = store.set(Flag::HapticFeedback, Value::Bool(true));
            }
        }
    }));

    store.apply_accessibility_needs(["cant-use-hands", "cant-hear"]);
    assert!(store.get().haptic_feedback);
}
