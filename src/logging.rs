// src/logging.rs

use std::env;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info";

/// Install the process-wide subscriber. Called once from `main` before any
/// component runs; everything else logs through `tracing` macros and spans.
///
/// `LIANKE_LOG` wins over `RUST_LOG`. Logs go to stderr so stdout carries only
/// the status line of a lifecycle command.
pub fn init() {
    fmt::Subscriber::builder()
        .with_env_filter(filter())
        .with_writer(std::io::stderr)
        .init();
}

fn filter() -> EnvFilter {
    env::var("LIANKE_LOG")
        .ok()
        .and_then(|s| EnvFilter::try_new(s).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}
