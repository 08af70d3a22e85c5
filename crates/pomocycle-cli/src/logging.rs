//! Tracing setup for the binary.
//!
//! Log lines go to stderr; stdout carries notices and JSON output only.

use clap::ValueEnum;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter directive read from the environment. Overrides `-v`.
pub const LOG_ENV: &str = "POMOCYCLE_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

/// Level used when `POMOCYCLE_LOG` is unset. Each `-v` lowers it by one
/// step from `warn`.
pub fn level_for(verbosity: u8) -> LevelFilter {
    [
        LevelFilter::WARN,
        LevelFilter::INFO,
        LevelFilter::DEBUG,
        LevelFilter::TRACE,
    ][usize::from(verbosity.min(3))]
}

/// Install the global subscriber. A second call leaves the first in place.
pub fn init_logging(format: LogFormat, verbosity: u8) {
    let filter = EnvFilter::builder()
        .with_default_directive(level_for(verbosity).into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    let output = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity >= 2);
    let output = match format {
        LogFormat::Human => output.boxed(),
        LogFormat::Json => output.json().boxed(),
    };

    if tracing_subscriber::registry()
        .with(filter)
        .with(output)
        .try_init()
        .is_err()
    {
        tracing::debug!("subscriber already installed");
    }
}
