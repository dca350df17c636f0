//! Centralized argument handling
//!
//! Stores the process arguments once so the logger, the config loader and
//! `main` all read the same list. Tests override it with [`set_cmd_args`].

use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

use crate::config::ConfigOverrides;
use crate::logger::LogTag;

/// Global command-line arguments storage
pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

/// Sets the global command-line arguments
pub fn set_cmd_args(args: Vec<String>) {
    if let Ok(mut cmd_args) = CMD_ARGS.lock() {
        *cmd_args = args;
    }
}

/// Gets a copy of the current command-line arguments
pub fn get_cmd_args() -> Vec<String> {
    match CMD_ARGS.lock() {
        Ok(args) => args.clone(),
        Err(_) => env::args().collect(),
    }
}

/// Checks if a specific argument is present in the command line
pub fn has_arg(arg: &str) -> bool {
    get_cmd_args().iter().any(|a| a == arg)
}

/// Gets the value of a command-line argument that follows a flag
///
/// Accepts both `--flag value` and `--flag=value`.
pub fn get_arg_value(flag: &str) -> Option<String> {
    let args = get_cmd_args();
    let inline_prefix = format!("{}=", flag);
    for (i, arg) in args.iter().enumerate() {
        if arg == flag && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
        if let Some(value) = arg.strip_prefix(&inline_prefix) {
            return Some(value.to_string());
        }
    }
    None
}

// =============================================================================
// CONFIGURATION FLAGS
// =============================================================================

/// Path given with --config
pub fn get_config_path() -> Option<String> {
    get_arg_value("--config")
}

/// Collect --runner/--model/--host/--port into config overrides
pub fn get_config_overrides() -> ConfigOverrides {
    ConfigOverrides {
        runner: get_arg_value("--runner"),
        model: get_arg_value("--model"),
        host: get_arg_value("--host"),
        port: get_arg_value("--port"),
    }
}

// =============================================================================
// DEBUG FLAGS
// =============================================================================

/// Gets a list of all enabled --debug-<module> flags
pub fn get_enabled_debug_modes() -> Vec<String> {
    LogTag::all()
        .iter()
        .map(|tag| tag.to_debug_key())
        .filter(|key| has_arg(&format!("--debug-{}", key)))
        .collect()
}

/// Checks if any debug mode is enabled
pub fn is_any_debug_enabled() -> bool {
    !get_enabled_debug_modes().is_empty()
}

// =============================================================================
// HELP SYSTEM
// =============================================================================

/// Displays the help menu with all available flags and their descriptions
pub fn print_help() {
    println!("mind-orchestrator - stream a local LLM runner over HTTP");
    println!();
    println!("USAGE:");
    println!("    mind-orchestrator [FLAGS]");
    println!();
    println!("CORE FLAGS:");
    println!("    --config <path>           TOML config file (default: config.toml if present)");
    println!("    --runner <binary>         Runner executable (env: OLLAMA_CMD, default: ollama)");
    println!("    --model <id>              Model identifier (env: OLLAMA_MODEL, default: gemma3:1b)");
    println!("    --host <ip>               Bind address (env: ORCHESTRATOR_HOST, default: 127.0.0.1)");
    println!("    --port <port>             Bind port (env: ORCHESTRATOR_PORT, default: 8000)");
    println!("    --help, -h                Show this help message");
    println!("    --version, -V             Show version");
    println!();
    println!("LOGGING FLAGS:");
    println!("    --quiet, -q               Only warnings and errors");
    println!("    --verbose, -v             Everything, including debug output of all modules");
    println!("    --log-level <level>       error | warning | info | debug | verbose");
    println!("    --debug-config            Configuration loading debug mode");
    println!("    --debug-runner            Runner process debug mode");
    println!("    --debug-system            System lifecycle debug mode");
    println!("    --debug-webserver         Request handling debug mode");
    println!("    --verbose-<module>        Verbose output for one module only");
    println!();
    println!("EXAMPLES:");
    println!("    mind-orchestrator                                  # Serve on 127.0.0.1:8000");
    println!("    mind-orchestrator --model llama3.2 --port 9000     # Different model and port");
    println!("    mind-orchestrator --debug-runner                   # Trace runner processes");
}

/// Prints the arguments and enabled debug modes (only when debugging)
pub fn print_debug_info() {
    if !is_any_debug_enabled() {
        return;
    }
    println!("Command-line arguments: {:?}", get_cmd_args());
    println!("Enabled debug modes: {:?}", get_enabled_debug_modes());
}

// =============================================================================
// COMMON ARGUMENT PATTERNS
// =============================================================================

pub mod patterns {
    use super::*;

    /// Checks for help flags
    pub fn is_help_requested() -> bool {
        has_arg("--help") || has_arg("-h")
    }

    /// Checks for version flags
    pub fn is_version_requested() -> bool {
        has_arg("--version") || has_arg("-V")
    }

    /// Checks for quiet/silent mode
    pub fn is_quiet_mode() -> bool {
        has_arg("--quiet") || has_arg("-q")
    }

    /// Checks for verbose mode
    pub fn is_verbose_mode() -> bool {
        has_arg("--verbose") || has_arg("-v")
    }
}
