//! Core logging implementation with automatic filtering
//!
//! Checks whether a line should be displayed based on level and tag, then
//! hands it to the format module.

use super::config::{get_logger_config, LoggerConfig};
use super::levels::LogLevel;
use super::tags::LogTag;

/// Check if a log message should be displayed
///
/// Filtering rules:
/// 1. Errors are always shown
/// 2. Check against minimum log level threshold
/// 3. Debug level requires --debug-<module> flag for that tag (or --verbose)
/// 4. Verbose level requires --verbose flag OR --verbose-<module> flag for that tag
///    (the per-tag flag bypasses the level threshold)
pub fn should_log(config: &LoggerConfig, tag: &LogTag, level: LogLevel) -> bool {
    if level == LogLevel::Error {
        return true;
    }

    let key = tag.to_debug_key();

    if level == LogLevel::Verbose && config.verbose_tags.contains(&key) {
        return true;
    }

    if level > config.min_level {
        return false;
    }

    !(level == LogLevel::Debug
        && config.min_level != LogLevel::Verbose
        && !config.debug_tags.contains(&key))
}

/// Internal logging function with automatic filtering
pub fn log_internal(tag: LogTag, level: LogLevel, message: &str) {
    if !should_log(&get_logger_config(), &tag, level) {
        return;
    }

    super::format::format_and_log(tag, level.as_str(), message);
}
