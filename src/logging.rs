//! Minimal `log` backend for the binaries.
//!
//! Records go to stderr as `LEVEL [target] message` so they never mix with
//! the board and prompts on stdout. The level comes from `BROADSIDE_LOG`
//! (`error`, `warn`, `info`, `debug`, `trace` or `off`).

use std::env;
use std::eprintln;

use log::{LevelFilter, Log, Metadata, Record};

/// Environment variable holding the log level.
pub const LOG_ENV: &str = "BROADSIDE_LOG";

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{:<5} [{}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

/// Level named by `BROADSIDE_LOG`, or `default` when it is unset or not a
/// level name.
pub fn level_from_env(default: LevelFilter) -> LevelFilter {
    env::var(LOG_ENV)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

/// Install the stderr logger. A second call keeps the first logger and only
/// updates the level.
pub fn init_logging(default: LevelFilter) {
    let level = level_from_env(default);
    if log::set_logger(&LOGGER).is_err() {
        log::debug!("logger already installed");
    }
    log::set_max_level(level);
}
