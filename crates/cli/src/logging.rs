//! Logging setup for the CLI.
//!
//! The library crates log through the `log` facade; the subscriber's
//! `tracing-log` bridge picks those records up. Output goes to stderr so
//! `--json` on stdout stays clean, and carries colors only on a terminal.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Level for a `-v` count: none -> warn, one -> info, two or more -> debug.
pub fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Build an `EnvFilter` from the verbosity, respecting `RUST_LOG` env var.
fn build_env_filter(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // External crates (calamine, zip) stay at warn.
        EnvFilter::new(format!(
            "warn,packlist={level},packlist_cli={level},packlist_recon={level},packlist_io={level}",
            level = level_for(verbose)
        ))
    })
}

/// Install the global subscriber.
pub fn init(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        build_env_filter(verbose)
    };

    // Already installed is fine.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();
}
