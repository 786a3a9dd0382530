//! Console logging for the mock server binary.

use std::io::stdout;
use std::time::SystemTime;

use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use fern::Dispatch;
use humantime::format_rfc3339;
use log::{LevelFilter, SetLoggerError};

#[cfg(debug_assertions)]
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::Debug;

#[cfg(not(debug_assertions))]
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::Info;

/// Parse a `RUST_LOG`-style level name, falling back to `DEFAULT_LEVEL`.
pub fn level_from(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(DEFAULT_LEVEL)
}

/// Install a colored stdout dispatcher. Fails if a logger is already set.
pub fn initialize(level: LevelFilter) -> Result<(), SetLoggerError> {
    let colors = ColoredLevelConfig::new()
        .debug(Blue)
        .info(Green)
        .warn(Yellow)
        .error(Red)
        .trace(Magenta);

    Dispatch::new()
        .level(level)
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{date} - {level}] {message} [{target}]",
                date = format_rfc3339(SystemTime::now()),
                level = colors.color(record.level()),
                target = record.target(),
            ))
        })
        .chain(stdout())
        .apply()
}
