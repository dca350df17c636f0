//! Configuration schemas - all config structures defined once with defaults
use crate::config_struct;

// ============================================================================
// RUNNER CONFIGURATION
// ============================================================================

config_struct! {
    /// External inference runner, invoked as `<binary> run <model> <prompt>`
    pub struct RunnerConfig {
        /// Executable name or path (resolved through PATH when bare)
        binary: String = "ollama".to_string(),

        /// Model identifier passed as the runner's model argument
        model: String = "gemma3:1b".to_string(),
    }
}

// ============================================================================
// WEBSERVER CONFIGURATION
// ============================================================================

config_struct! {
    /// HTTP listener settings
    pub struct WebserverConfig {
        /// Host/IP address to bind (127.0.0.1 = localhost only, 0.0.0.0 = all interfaces)
        host: String = "127.0.0.1".to_string(),

        /// Port to bind
        port: u16 = 8000,
    }
}

// ============================================================================
// ROOT CONFIGURATION
// ============================================================================

config_struct! {
    /// Root configuration structure containing all sub-configurations
    pub struct Config {
        runner: RunnerConfig = RunnerConfig::default(),
        webserver: WebserverConfig = WebserverConfig::default(),
    }
}

impl WebserverConfig {
    /// `host:port` string suitable for `SocketAddr` parsing
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
