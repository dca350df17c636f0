use std::sync::Arc;

use mind_orchestrator::{
    arguments::{get_config_overrides, get_config_path, patterns, print_debug_info, print_help},
    config,
    logger::{self as logger, LogTag},
    webserver,
};

/// Main entry point for mind-orchestrator
///
/// Loads configuration once, then serves `POST /v1/chat/completions` until
/// Ctrl-C or SIGTERM.
#[tokio::main]
async fn main() {
    // Check for help/version first (before any other processing)
    if patterns::is_help_requested() {
        print_help();
        std::process::exit(0);
    }
    if patterns::is_version_requested() {
        println!("mind-orchestrator {}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    logger::init();

    logger::info(LogTag::System, "🚀 mind-orchestrator starting up...");

    // Print debug information if any debug modes are enabled
    print_debug_info();

    let config = match config::load_config(get_config_path().as_deref(), &get_config_overrides()) {
        Ok(config) => config,
        Err(e) => {
            logger::error(LogTag::Config, &format!("❌ Failed to load configuration: {:#}", e));
            std::process::exit(1);
        }
    };

    logger::info(
        LogTag::Config,
        &format!(
            "Runner '{}' with model '{}'",
            config.runner.binary, config.runner.model
        ),
    );

    match webserver::start_server(Arc::new(config)).await {
        Ok(()) => {
            logger::info(LogTag::System, "✅ mind-orchestrator stopped");
        }
        Err(e) => {
            logger::error(LogTag::System, &format!("❌ Webserver failed: {}", e));
            std::process::exit(1);
        }
    }
}
