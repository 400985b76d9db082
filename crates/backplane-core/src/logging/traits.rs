//! Logger trait, the no-op sink and formatting macros

use std::sync::Arc;

/// Logger abstraction for runtime-agnostic logging
///
/// Implementations:
/// - `NoOpLogger`: Silent logger, the default for every component
/// - Host adapters: bootstrap code forwards to its own logging backend
pub trait Logger: Send + Sync {
    /// Log a debug message
    fn debug(&self, message: &str);

    /// Log an info message
    fn info(&self, message: &str);

    /// Log a warning message
    fn warn(&self, message: &str);

    /// Log an error message
    fn error(&self, message: &str);
}

/// Type alias for an Arc-wrapped logger
pub type SharedLogger = Arc<dyn Logger>;

/// A logger that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl NoOpLogger {
    /// Create a new no-op logger
    pub fn new() -> Self {
        Self
    }

    /// Shared handle to a no-op logger
    pub fn shared() -> SharedLogger {
        Arc::new(Self)
    }
}

impl Logger for NoOpLogger {
    fn debug(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

/// Convenience macros for logging through a `Logger` handle
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warn(&format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Capture {
        lines: Mutex<Vec<String>>,
    }

    impl Logger for Capture {
        fn debug(&self, message: &str) {
            self.lines.lock().push(format!("debug {}", message));
        }
        fn info(&self, message: &str) {
            self.lines.lock().push(format!("info {}", message));
        }
        fn warn(&self, message: &str) {
            self.lines.lock().push(format!("warn {}", message));
        }
        fn error(&self, message: &str) {
            self.lines.lock().push(format!("error {}", message));
        }
    }

    #[test]
    fn test_noop_logger_accepts_everything() {
        let logger = NoOpLogger::shared();
        logger.debug("d");
        logger.info("i");
        logger.warn("w");
        logger.error("e");
    }

    #[test]
    fn test_macros_write_through_logger() {
        let capture = Capture::default();
        log_debug!(capture, "engine {} ready", "file");
        log_info!(capture, "registered {}", "core-data");
        log_warn!(capture, "{} retries", 3);

        let lines = capture.lines.lock();
        assert_eq!(
            *lines,
            vec![
                "debug engine file ready".to_string(),
                "info registered core-data".to_string(),
                "warn 3 retries".to_string(),
            ]
        );
    }
}
