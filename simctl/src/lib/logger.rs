//! A `log` backend writing to stderr.
//!
//! Engines and sessions log through the `log` facade; binaries pick the
//! level once at start-up.
use crate::utils::*;
use log::{Level, Metadata, Record, SetLoggerError};

static LOGGER: StderrLogger = StderrLogger;

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            match record.level() {
                Level::Info => eprintln!("{}", record.args()),
                lvl         => eprintln!("[{}] {}", lvl, record.args()),
            }
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

/// Installs the logger. Fails if some other logger got there first.
pub fn init(max_level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(max_level);

    Ok(())
}
