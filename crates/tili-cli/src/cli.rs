//! Argument parsing and dispatch

use crate::commands;
use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use tili_prefs::TiliSettings;

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}

fn need_arg() -> Arg {
    Arg::new("need")
        .long("need")
        .short('n')
        .action(ArgAction::Append)
        .help("Accessibility need id (repeatable)")
}

/// Command-line definition
#[must_use]
pub fn build_cli() -> Command {
    Command::new("tili-a11y")
        .version(tili_prefs::VERSION)
        .about("TILI accessibility engine: needs, preferences and voice navigation")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML settings file"),
        )
        .arg(
            Arg::new("storage-dir")
                .long("storage-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Directory holding stored preferences"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("needs")
                .about("List the accessibility needs catalog")
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("resolve")
                .about("Show the configuration a selection of needs produces")
                .arg(need_arg())
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("show")
                .about("Show the stored configuration")
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("set")
                .about("Set one stored configuration field")
                .arg(Arg::new("flag").required(true).help("Field name, e.g. fontSize"))
                .arg(Arg::new("value").required(true).help("New value")),
        )
        .subcommand(
            Command::new("setup")
                .about("Complete first-time setup with a selection of needs")
                .arg(need_arg().required(true)),
        )
        .subcommand(
            Command::new("interpret")
                .about("Interpret voice commands and print them as JSON")
                .arg(
                    Arg::new("utterance")
                        .required(true)
                        .num_args(1..)
                        .help("Utterances, interpreted in order"),
                )
                .arg(
                    Arg::new("location")
                        .long("location")
                        .default_value("dashboard")
                        .help("Current page name"),
                )
                .arg(
                    Arg::new("focused")
                        .long("focused")
                        .action(ArgAction::SetTrue)
                        .help("An element holds focus"),
                ),
        )
        .subcommand(
            Command::new("simulate")
                .about("Run utterances through voice navigation on a scripted site")
                .arg(need_arg())
                .arg(
                    Arg::new("utterance")
                        .required(true)
                        .num_args(1..)
                        .help("Utterances, spoken in order"),
                ),
        )
}

/// Settings from `--config` with `--storage-dir` applied
///
/// # Errors
/// Unreadable or invalid settings file.
pub fn load_settings(matches: &ArgMatches) -> Result<TiliSettings> {
    let mut settings = match matches.get_one::<PathBuf>("config") {
        Some(path) => TiliSettings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => TiliSettings::default(),
    };
    if let Some(dir) = matches.get_one::<PathBuf>("storage-dir") {
        settings = settings.with_storage_dir(dir);
    }
    Ok(settings)
}

fn strings(args: &ArgMatches, id: &str) -> Vec<String> {
    args.get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

/// Run the selected subcommand and return its output
///
/// # Errors
/// Whatever the subcommand reports.
pub fn dispatch(matches: &ArgMatches) -> Result<String> {
    let settings = load_settings(matches)?;

    match matches.subcommand() {
        Some(("needs", args)) => commands::needs(args.get_flag("json")),
        Some(("resolve", args)) => commands::resolve(&strings(args, "need"), args.get_flag("json")),
        Some(("show", args)) => commands::show(&settings, args.get_flag("json")),
        Some(("set", args)) => {
            let flag = args.get_one::<String>("flag").context("missing flag")?;
            let value = args.get_one::<String>("value").context("missing value")?;
            commands::set(&settings, flag, value)
        }
        Some(("setup", args)) => commands::setup(&settings, &strings(args, "need")),
        Some(("interpret", args)) => {
            let location = args
                .get_one::<String>("location")
                .map_or("dashboard", String::as_str);
            commands::interpret(&strings(args, "utterance"), location, args.get_flag("focused"))
        }
        Some(("simulate", args)) => Ok(commands::simulate(
            &settings,
            &strings(args, "need"),
            &strings(args, "utterance"),
        )),
        Some((other, _)) => anyhow::bail!("unknown command '{other}'"),
        None => anyhow::bail!("no command given"),
    }
}
