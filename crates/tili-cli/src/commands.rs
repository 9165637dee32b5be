//! Subcommand implementations
//!
//! Each command returns its output as a string so it can be tested without
//! a terminal.

use crate::console::{ConsoleLiveRegion, ConsoleSynthesizer, ScriptedSite, Transcript};
use anyhow::{bail, Context, Result};
use serde_json::json;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tili_input::{
    CommandInterpreter, ContinuousRecognitionController, ControllerSettings, InterpretContext,
    ListeningState, Navigator, PageSurface, RecognitionError, RecognitionEvent,
    RecognitionOptions, SpeechRecognizer,
};
use tili_prefs::catalog;
use tili_prefs::{
    Configuration, FileStorage, Flag, NeedsResolver, NullDocumentRoot, PreferenceStore,
    PrefsError, TiliSettings, Value,
};
use tili_speech::{AnnouncementEngine, EngineTiming, TimerQueue};

/// Directory used when settings name none
pub const DEFAULT_STORAGE_DIR: &str = ".tili";

/// List the needs catalog by category
///
/// # Errors
/// JSON encoding failure.
pub fn needs(as_json: bool) -> Result<String> {
    if as_json {
        let entries: Vec<_> = catalog::NEEDS
            .iter()
            .map(|need| {
                json!({
                    "id": need.id,
                    "label": need.label,
                    "category": need.category,
                    "description": need.description,
                })
            })
            .collect();
        return Ok(serde_json::to_string_pretty(&entries)?);
    }

    let mut out = String::new();
    for (category, needs) in catalog::grouped() {
        writeln!(out, "{category}")?;
        for need in needs {
            writeln!(out, "  {:<20} {}", need.id, need.label)?;
        }
    }
    Ok(out.trim_end().to_string())
}

/// Resolve `selected` against the defaults without touching storage
///
/// # Errors
/// JSON encoding failure.
pub fn resolve(selected: &[String], as_json: bool) -> Result<String> {
    let config = NeedsResolver::default().resolve(selected, &Configuration::default());
    render_config(&config, as_json)
}

/// Print the stored configuration
///
/// # Errors
/// JSON encoding failure.
pub fn show(settings: &TiliSettings, as_json: bool) -> Result<String> {
    let store = open_store(settings);
    render_config(&store.get(), as_json)
}

/// Set one stored field
///
/// # Errors
/// Unknown flag names and values that do not fit the flag.
pub fn set(settings: &TiliSettings, flag: &str, raw: &str) -> Result<String> {
    let flag: Flag = flag.parse()?;
    let value = Value::parse_for(flag, raw)?;
    let store = open_store(settings);
    store
        .set(flag, value)
        .with_context(|| format!("failed to set {flag}"))?;
    Ok(format!("{flag} = {}", store.get().get(flag)))
}

/// Complete first-time setup with `selected`
///
/// # Errors
/// An empty or entirely unknown selection.
pub fn setup(settings: &TiliSettings, selected: &[String]) -> Result<String> {
    let store = open_store(settings);
    match store.complete_setup(selected) {
        Ok(config) => {
            let ids: Vec<&str> = config.accessibility_needs.iter().map(|n| n.as_str()).collect();
            Ok(format!("Setup complete: {}", ids.join(", ")))
        }
        Err(PrefsError::EmptySelection) => {
            bail!("no known accessibility need selected; run `tili-a11y needs` to list them")
        }
        Err(e) => Err(e.into()),
    }
}

/// Interpret utterances in order, one JSON command per line
///
/// Utterances share one interpreter, so a logout confirmation carries over.
///
/// # Errors
/// JSON encoding failure.
pub fn interpret(utterances: &[String], location: &str, focused: bool) -> Result<String> {
    let mut interpreter = CommandInterpreter::new();
    let context = InterpretContext::new(location, focused);
    let mut lines = Vec::with_capacity(utterances.len());
    for utterance in utterances {
        let command = interpreter.interpret(utterance, &context);
        lines.push(serde_json::to_string(&command)?);
    }
    Ok(lines.join("\n"))
}

/// Recognizer for simulations; every start succeeds
#[derive(Debug, Default)]
struct ScriptedRecognizer;

impl SpeechRecognizer for ScriptedRecognizer {
    fn start(&self, options: &RecognitionOptions) -> Result<(), RecognitionError> {
        tracing::debug!(locale = options.locale, "recognition started");
        Ok(())
    }

    fn stop(&self) {
        tracing::debug!("recognition stopped");
    }
}

/// Run utterances through a full voice navigation stack
///
/// Narration goes to the returned transcript. Voice navigation is started
/// explicitly if `selected` does not enable it.
#[must_use]
pub fn simulate(settings: &TiliSettings, selected: &[String], utterances: &[String]) -> String {
    let transcript = Transcript::new();
    let store = Arc::new(PreferenceStore::in_memory());
    store.apply_accessibility_needs(selected);

    let timer = Arc::new(TimerQueue::new());
    let engine = AnnouncementEngine::new(
        Arc::clone(&store),
        Arc::new(ConsoleSynthesizer::new(transcript.clone())),
        Arc::new(ConsoleLiveRegion::new(transcript.clone())),
        Arc::clone(&timer) as Arc<dyn tili_speech::Timer>,
        EngineTiming::from(settings),
    );
    let site = Arc::new(ScriptedSite::default());
    let controller_settings = ControllerSettings::from(settings);
    let controller = ContinuousRecognitionController::new(
        engine,
        Arc::new(ScriptedRecognizer) as Arc<dyn SpeechRecognizer>,
        Arc::clone(&site) as Arc<dyn PageSurface>,
        Arc::clone(&site) as Arc<dyn Navigator>,
        controller_settings,
    );

    controller.attach();
    if controller.state() == ListeningState::Idle {
        controller.start();
    }

    let settle = controller_settings
        .focus_settle_delay
        .max(settings.narration_stagger());
    for utterance in utterances {
        transcript.push(format!("> {utterance}"));
        controller.handle_event(RecognitionEvent::final_result(utterance.as_str()));
        timer.advance(settle);
        if site.is_logged_out() {
            transcript.push("(session ended)");
            break;
        }
    }

    controller.stop();
    tracing::info!(stats = ?controller.stats(), "simulation finished");
    transcript.render()
}

fn open_store(settings: &TiliSettings) -> PreferenceStore {
    let dir = settings
        .storage_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR));
    PreferenceStore::open(
        Arc::new(FileStorage::new(dir)),
        Arc::new(NullDocumentRoot),
        settings.storage_key.clone(),
    )
}

fn render_config(config: &Configuration, as_json: bool) -> Result<String> {
    if as_json {
        return Ok(serde_json::to_string_pretty(config)?);
    }
    let mut out = String::new();
    for flag in Flag::ALL {
        writeln!(out, "{flag}: {}", config.get(flag))?;
    }
    let ids: Vec<&str> = config.accessibility_needs.iter().map(|n| n.as_str()).collect();
    write!(out, "accessibilityNeeds: [{}]", ids.join(", "))?;
    Ok(out)
}
