//! Logging setup for binaries.
//!
//! The library only emits `tracing` events; installing a subscriber is left to the program
//! embedding it. Output goes to stderr so stdout carries nothing but rendered transcripts.

use std::io::{self, IsTerminal};
use tracing_subscriber::{fmt, EnvFilter};

/// Build the filter from `RUST_LOG`, falling back to `default_filter` (then to "info" if
/// that does not parse either).
pub fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global stderr subscriber. Calling it twice is harmless: the second install
/// is ignored.
pub fn init_logging(default_filter: &str) {
    let _ = fmt()
        .with_env_filter(env_filter(default_filter))
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}
