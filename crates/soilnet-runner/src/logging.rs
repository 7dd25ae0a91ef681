//! Logging setup for the command-line runner.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{RunnerError, RunnerResult};

/// Install a global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `verbosity` picks the level:
/// 0 is `info`, 1 is `debug`, 2 or more is `trace`.
pub fn init_logging(verbosity: u8) -> RunnerResult<()> {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| RunnerError::Logging(e.to_string()))
}
