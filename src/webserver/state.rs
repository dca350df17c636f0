//! Shared application state for the webserver
//!
//! Holds the immutable configuration handed to every route handler. Nothing
//! in here is mutated after startup.

use crate::config::{Config, RunnerConfig};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Effective configuration
    pub config: Arc<Config>,

    /// Server startup time
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self::from_shared(Arc::new(config))
    }

    pub fn from_shared(config: Arc<Config>) -> Self {
        Self {
            config,
            startup_time: chrono::Utc::now(),
        }
    }

    pub fn runner(&self) -> &RunnerConfig {
        &self.config.runner
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        (chrono::Utc::now() - self.startup_time)
            .num_seconds()
            .max(0) as u64
    }
}
