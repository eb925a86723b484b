//! Client-facing logger interface (spec §4.8).
//!
//! This is distinct from the crate's internal `tracing` instrumentation:
//! `Logger` is part of the documented public surface (injected via
//! [`crate::CondDB::set_logger`]), while `tracing` events are for
//! debugging the crate itself.
//!
//! Grounded on `examples/original_source/include/GitCondDB.h` (`struct
//! Logger`) and `src/BasicLogger.h` (the default sink).

use colored::Colorize;
use std::fmt;

/// Verbosity gate, ordered from most to least chatty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Verbose,
    Quiet,
    Nothing,
}

/// Sink for the three message severities a [`crate::CondDB`] may emit
/// while resolving a `get`/`iov_boundaries` call.
pub trait Logger: fmt::Debug {
    fn warning(&self, msg: &str);
    fn info(&self, msg: &str);
    fn debug(&self, msg: &str);
}

/// A logger that discards everything, so internal code never needs to
/// null-check the configured logger.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn warning(&self, _msg: &str) {}
    fn info(&self, _msg: &str) {}
    fn debug(&self, _msg: &str) {}
}

/// Default logger: writes `"<level:7>: <msg>\n"` to standard output,
/// gated by `level`. `warning` is gated at `Quiet`, `info` at `Verbose`,
/// `debug` at `Debug` — i.e. each message prints only while the
/// configured level is at least as chatty as the message's own
/// severity, matching `BasicLogger.h` exactly.
#[derive(Debug, Clone, Copy)]
pub struct DefaultLogger {
    pub level: Level,
}

impl Default for DefaultLogger {
    fn default() -> Self {
        DefaultLogger { level: Level::Quiet }
    }
}

impl DefaultLogger {
    pub fn new(level: Level) -> Self {
        DefaultLogger { level }
    }

    fn print(&self, level_name: &str, msg: &str, color: colored::Color) {
        let padded = format!("{level_name:<7}");
        println!("{}: {}", padded.color(color), msg);
    }
}

impl Logger for DefaultLogger {
    fn warning(&self, msg: &str) {
        if self.level <= Level::Quiet {
            self.print("warning", msg, colored::Color::Yellow);
        }
    }

    fn info(&self, msg: &str) {
        if self.level <= Level::Verbose {
            self.print("info", msg, colored::Color::Cyan);
        }
    }

    fn debug(&self, msg: &str) {
        if self.level <= Level::Debug {
            self.print("debug", msg, colored::Color::White);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_ordering() {
        assert!(Level::Debug < Level::Verbose);
        assert!(Level::Verbose < Level::Quiet);
        assert!(Level::Quiet < Level::Nothing);
    }

    #[test]
    fn null_logger_never_panics() {
        let log = NullLogger;
        log.warning("x");
        log.info("x");
        log.debug("x");
    }

    #[test]
    fn default_logger_defaults_to_quiet() {
        assert_eq!(DefaultLogger::default().level, Level::Quiet);
    }
}
