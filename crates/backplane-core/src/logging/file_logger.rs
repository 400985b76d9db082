//! Process-wide debug log file
//!
//! Off unless `BACKPLANE_DEBUG` is `1` or `true`. The minimum level comes from
//! `BACKPLANE_LOG_LEVEL` (default `debug`). Lines go to `backplane-debug.log` in
//! the system temp directory.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::SystemTime;

use parking_lot::Mutex;

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    /// Parse a level name, falling back to `Debug` for anything unrecognised
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "info" => LogLevel::Info,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Debug,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO ",
            LogLevel::Warn => "WARN ",
            LogLevel::Error => "ERROR",
        };
        f.write_str(label)
    }
}

struct FileLoggerState {
    file: Option<File>,
    min_level: LogLevel,
    enabled: bool,
}

impl FileLoggerState {
    fn from_env() -> Self {
        let enabled = std::env::var("BACKPLANE_DEBUG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let min_level = std::env::var("BACKPLANE_LOG_LEVEL")
            .map(|v| LogLevel::parse(&v))
            .unwrap_or(LogLevel::Debug);

        // Only touch the filesystem when somebody asked for the log.
        let file = if enabled {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file_path())
                .ok()
        } else {
            None
        };

        Self { file, min_level, enabled }
    }

    fn write(&mut self, level: LogLevel, module: &str, message: &str) {
        if !self.enabled || level < self.min_level {
            return;
        }

        if let Some(file) = self.file.as_mut() {
            let millis = SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default();

            let _ = writeln!(file, "[{}] [{}] [{}] {}", millis, level, module, message);
            let _ = file.flush();
        }
    }
}

static LOGGER: OnceLock<Mutex<FileLoggerState>> = OnceLock::new();

fn state() -> &'static Mutex<FileLoggerState> {
    LOGGER.get_or_init(|| Mutex::new(FileLoggerState::from_env()))
}

/// Log a message at the specified level
pub fn log(level: LogLevel, module: &str, message: &str) {
    state().lock().write(level, module, message);
}

/// Log a trace message
pub fn trace(module: &str, message: &str) {
    log(LogLevel::Trace, module, message);
}

/// Log a debug message
pub fn debug(module: &str, message: &str) {
    log(LogLevel::Debug, module, message);
}

/// Log an info message
pub fn info(module: &str, message: &str) {
    log(LogLevel::Info, module, message);
}

/// Log a warning message
pub fn warn(module: &str, message: &str) {
    log(LogLevel::Warn, module, message);
}

/// Log an error message
pub fn error(module: &str, message: &str) {
    log(LogLevel::Error, module, message);
}

/// Debug line tagged with the calling module path
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        $crate::logging::file_logger::debug(module_path!(), &format!($($arg)*))
    };
}

/// Warning line tagged with the calling module path
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        $crate::logging::file_logger::warn(module_path!(), &format!($($arg)*))
    };
}

/// Path of the debug log file
pub fn log_file_path() -> PathBuf {
    std::env::temp_dir().join("backplane-debug.log")
}
