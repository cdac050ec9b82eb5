//! Leveled logging capability for the pipeline.
//!
//! There is no process-wide default logger: callers construct a logger
//! and pass it down explicitly. The pipeline emits at most one fatal
//! message per run plus per-row diagnostic traces at verbose level.

use std::str::FromStr;

/// Severity levels, ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Verbose,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Verbose => "verbose",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "verbose" => Ok(LogLevel::Verbose),
            other => Err(format!(
                "Unknown log level '{other}': expected error, warn, info or verbose"
            )),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logger-like sink accepting leveled messages.
pub trait Logger {
    fn log(&self, level: LogLevel, message: &str);

    /// Whether a level would be emitted; lets callers skip building
    /// expensive trace messages.
    fn enabled(&self, _level: LogLevel) -> bool {
        true
    }

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    fn verbose(&self, message: &str) {
        self.log(LogLevel::Verbose, message);
    }
}

/// Logger writing to stderr with a level threshold.
///
/// Everything goes to stderr so the JSON documents on stdout stay clean.
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, level: LogLevel, message: &str) {
        if level <= self.level {
            eprintln!("{}: {}", level, message);
        }
    }

    fn enabled(&self, level: LogLevel) -> bool {
        level <= self.level
    }
}

/// Logger that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: LogLevel, _message: &str) {}

    fn enabled(&self, _level: LogLevel) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Verbose);
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!("verbose".parse::<LogLevel>().unwrap(), LogLevel::Verbose);
        assert_eq!("INFO".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert!("debug".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_console_logger_threshold() {
        let logger = ConsoleLogger::new(LogLevel::Warn);
        assert!(logger.enabled(LogLevel::Error));
        assert!(logger.enabled(LogLevel::Warn));
        assert!(!logger.enabled(LogLevel::Info));
        assert!(!logger.enabled(LogLevel::Verbose));
    }

    #[test]
    fn test_null_logger_disabled() {
        assert!(!NullLogger.enabled(LogLevel::Error));
    }
}
