//! TILI CLI - Command-line front end
//!
//! Inspect the needs catalog, resolve and store preferences, interpret voice
//! commands and simulate voice navigation sessions from a terminal.
//!
//! # Example
//!
//! ```text
//! tili-a11y resolve --need cant-see --need cant-hear
//! tili-a11y simulate --need cant-see "go to projects" "next" "click"
//! ```

#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod console;

pub use cli::{build_cli, dispatch, load_settings};
pub use console::{ConsoleLiveRegion, ConsoleSynthesizer, ScriptedSite, Transcript};

/// Install the global subscriber; logs go to stderr
///
/// `RUST_LOG` overrides the default `info` level.
pub fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
