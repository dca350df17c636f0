//! Configuration utilities - loading and layering
//!
//! This module provides the functions that turn the different configuration
//! sources into a single validated `Config`:
//! - Optional TOML file
//! - `.env` file (seeds the environment, never overrides it)
//! - Process environment
//! - Command-line flags
use super::schemas::Config;
use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::logger::{self, LogTag};

/// Config file looked up when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Runner executable
pub const ENV_RUNNER: &str = "OLLAMA_CMD";
/// Model identifier
pub const ENV_MODEL: &str = "OLLAMA_MODEL";
/// Bind host
pub const ENV_HOST: &str = "ORCHESTRATOR_HOST";
/// Bind port
pub const ENV_PORT: &str = "ORCHESTRATOR_PORT";

/// Values taken from command-line flags; `None` leaves the lower layer alone
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub runner: Option<String>,
    pub model: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
}

/// Build the effective configuration
///
/// `explicit_path` is the value of `--config`. When it is `None` the default
/// path is tried and silently skipped if absent; an explicit path must exist.
pub fn load_config(explicit_path: Option<&str>, overrides: &ConfigOverrides) -> Result<Config> {
    let mut config = match explicit_path {
        Some(path) => read_config_file(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => read_config_file(DEFAULT_CONFIG_PATH)?,
        None => {
            logger::debug(
                LogTag::Config,
                &format!(
                    "Config file '{}' not found, using default values",
                    DEFAULT_CONFIG_PATH
                ),
            );
            Config::default()
        }
    };

    load_dotenv();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    apply_arg_overrides(&mut config, overrides)?;
    validate_config(&config)?;

    Ok(config)
}

/// Parse a TOML configuration file
pub fn read_config_file(path: &str) -> Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path))?;

    let config = toml::from_str::<Config>(&contents)
        .with_context(|| format!("Failed to parse config file '{}'", path))?;

    logger::info(LogTag::Config, &format!("Loaded config file '{}'", path));
    Ok(config)
}

/// Load `.env` from the working directory (or a parent) into the environment
///
/// Variables already present in the environment keep their value.
pub fn load_dotenv() {
    match dotenv::dotenv() {
        Ok(path) => {
            logger::debug(
                LogTag::Config,
                &format!("Loaded environment file {}", path.display()),
            );
        }
        Err(dotenv::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            logger::warning(
                LogTag::Config,
                &format!("Ignoring unreadable .env file: {}", e),
            );
        }
    }
}

/// Apply environment variables on top of `config`
///
/// `lookup` abstracts the environment so callers can layer a fixed map.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(binary) = lookup(ENV_RUNNER) {
        config.runner.binary = binary;
    }
    if let Some(model) = lookup(ENV_MODEL) {
        config.runner.model = model;
    }
    if let Some(host) = lookup(ENV_HOST) {
        config.webserver.host = host;
    }
    if let Some(port) = lookup(ENV_PORT) {
        config.webserver.port = parse_port(&port).with_context(|| format!("Invalid {}", ENV_PORT))?;
    }
    Ok(())
}

/// Apply command-line flag values on top of `config`
pub fn apply_arg_overrides(config: &mut Config, overrides: &ConfigOverrides) -> Result<()> {
    if let Some(binary) = &overrides.runner {
        config.runner.binary = binary.clone();
    }
    if let Some(model) = &overrides.model {
        config.runner.model = model.clone();
    }
    if let Some(host) = &overrides.host {
        config.webserver.host = host.clone();
    }
    if let Some(port) = &overrides.port {
        config.webserver.port = parse_port(port).context("Invalid --port")?;
    }
    Ok(())
}

/// Reject settings the runner invocation cannot work with
///
/// Existence of the binary or model is only discovered at invocation time.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.runner.binary.trim().is_empty() {
        bail!("Runner binary must not be empty");
    }
    if config.runner.model.trim().is_empty() {
        bail!("Runner model must not be empty");
    }
    if config.webserver.host.trim().is_empty() {
        bail!("Webserver host must not be empty");
    }
    Ok(())
}

fn parse_port(value: &str) -> Result<u16> {
    value
        .trim()
        .parse::<u16>()
        .with_context(|| format!("'{}' is not a valid port", value))
}
