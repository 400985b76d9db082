//! Runtime-agnostic logging
//!
//! Components take a [`SharedLogger`] when the embedding host wants their output
//! routed somewhere specific. Library internals that have no logger handle write
//! to the process-wide debug file through [`file_logger`].
//!
//! Credential material (tokens, private keys) must never be passed to any logger.

mod traits;
pub mod file_logger;

pub use traits::{Logger, NoOpLogger, SharedLogger};

pub use file_logger::{log, trace, debug, info, warn, error, log_file_path, LogLevel};
