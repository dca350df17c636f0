//! Logger configuration derived from command-line flags
//!
//! Held in a process-wide `RwLock` so every log call can check its filter
//! without threading a handle through the code.

use super::levels::LogLevel;
use super::tags::LogTag;
use crate::arguments::{self, patterns};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Lines above this level are dropped
    pub min_level: LogLevel,

    /// Tags with `--debug-<tag>` set
    pub debug_tags: HashSet<String>,

    /// Tags with `--verbose-<tag>` set
    pub verbose_tags: HashSet<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            verbose_tags: HashSet::new(),
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

/// Snapshot of the current logger configuration
pub fn get_logger_config() -> LoggerConfig {
    match LOGGER_CONFIG.read() {
        Ok(config) => config.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Replace the logger configuration
pub fn set_logger_config(config: LoggerConfig) {
    match LOGGER_CONFIG.write() {
        Ok(mut current) => *current = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

/// Build the configuration from the stored command-line arguments
pub fn init_from_args() {
    set_logger_config(config_from_args());
}

/// Pure translation of the current arguments into a `LoggerConfig`
pub fn config_from_args() -> LoggerConfig {
    let mut config = LoggerConfig::default();

    if patterns::is_quiet_mode() {
        config.min_level = LogLevel::Warning;
    }
    if patterns::is_verbose_mode() {
        config.min_level = LogLevel::Verbose;
    }
    if let Some(value) = arguments::get_arg_value("--log-level") {
        match value.parse::<LogLevel>() {
            Ok(level) => config.min_level = level,
            // Logger is not configured yet
            Err(e) => eprintln!("Ignoring --log-level: {}", e),
        }
    }

    for tag in LogTag::all() {
        let key = tag.to_debug_key();
        if arguments::has_arg(&format!("--debug-{}", key)) {
            config.debug_tags.insert(key.clone());
            if config.min_level < LogLevel::Debug {
                config.min_level = LogLevel::Debug;
            }
        }
        if arguments::has_arg(&format!("--verbose-{}", key)) {
            config.verbose_tags.insert(key.clone());
        }
    }

    config
}
