//! Structured console logging
//!
//! This module provides a small, ergonomic logging API with:
//! - Standard log levels (Error/Warning/Info/Debug/Verbose)
//! - Per-module debug control via --debug-<module> flags
//! - Colored, aligned console output
//!
//! ## Usage
//!
//! ```rust
//! use mind_orchestrator::logger::{self, LogTag};
//!
//! logger::error(LogTag::Runner, "Runner failed (1): boom");
//! logger::info(LogTag::Webserver, "Listening on http://127.0.0.1:8000");
//! logger::debug(LogTag::Runner, "Spawned runner"); // Only with --debug-runner
//! ```
//!
//! ## Initialization
//!
//! Call [`init`] once at startup, after the command-line arguments are final.

mod config;
mod core;
mod format;
mod levels;
mod tags;

pub use config::{
    config_from_args, get_logger_config, init_from_args, set_logger_config, LoggerConfig,
};
pub use levels::{LogLevel, UnknownLevel};
pub use tags::LogTag;

/// Initialize the logger from command-line arguments
pub fn init() {
    config::init_from_args();
}

/// Log at ERROR level (always shown, critical issues)
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level (important issues, still shown with --quiet)
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level (standard operations)
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level
///
/// Only shown when the --debug-<module> flag for the tag is provided.
///
/// # Example
/// ```rust
/// use mind_orchestrator::logger::{self, LogTag};
///
/// // Only shown with --debug-runner flag
/// logger::debug(LogTag::Runner, "Runner exited with status 0");
/// ```
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level (very detailed tracing, --verbose only)
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}
